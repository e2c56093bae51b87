//! Events reported by a connected [`crate::Client`].

/// Something the client observed on, or wrote to, the connection.
///
/// Events are emitted after the roster has been updated, so a handler that
/// looks at [`crate::Client::channel_users`] sees the post-event state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A line arrived from the server (already parsed, re-serialized).
    RawMessage(String),
    /// A line was written to the server.
    LineWritten(String),
    /// Registration completed (RPL_WELCOME). Carries the nick the server
    /// accepted, which may differ from the requested one.
    Registered {
        /// Accepted nickname.
        nickname: String,
    },
    /// Someone joined a channel, possibly us.
    Joined {
        /// Channel name as sent by the server.
        channel: String,
        /// Joining nick.
        nick: String,
        /// Username (ident) from the prefix.
        ident: String,
        /// Hostname from the prefix.
        host: String,
    },
    /// Someone left a channel, possibly us.
    Parted {
        /// Channel name.
        channel: String,
        /// Departing nick.
        nick: String,
    },
    /// Someone was kicked, possibly us.
    Kicked {
        /// Channel name.
        channel: String,
        /// Kicked nick.
        nick: String,
        /// Who kicked them, if known.
        by: Option<String>,
    },
    /// `+o` was set on a nick.
    OpGranted {
        /// Channel name.
        channel: String,
        /// Nick that received operator status.
        nick: String,
        /// Who set the mode, if known.
        by: Option<String>,
    },
    /// `-o` was set on a nick.
    OpRevoked {
        /// Channel name.
        channel: String,
        /// Nick that lost operator status.
        nick: String,
        /// Who removed it, if known.
        by: Option<String>,
    },
    /// The WHO reply for a channel we are in has ended, so every member's
    /// ident and host is now known.
    ChannelSynced {
        /// Channel name.
        channel: String,
    },
    /// A nick change, possibly ours.
    NickChanged {
        /// Previous nickname.
        old: String,
        /// New nickname.
        new: String,
    },
    /// The connection is gone. Emitted exactly once per connection.
    Disconnected {
        /// Reason from the server's ERROR line or the socket, if any.
        reason: Option<String>,
    },
}

/// How outbound text is framed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SendType {
    /// Plain PRIVMSG.
    Message,
    /// CTCP ACTION inside a PRIVMSG.
    Action,
}
