//! Error types for the client library.
//!
//! Three layers, innermost first: [`ModeParseError`] for mode strings,
//! [`MessageParseError`] for single lines, [`ProtocolError`] for the codec,
//! and [`ClientError`] for the connected handle.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Codec-level errors. Any of these ends the read side of a connection.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Line exceeded the configured maximum length.
    #[error("line too long: {actual} bytes (limit: {limit})")]
    LineTooLong {
        /// Actual line length.
        actual: usize,
        /// Maximum allowed length.
        limit: usize,
    },

    /// Outgoing line contained a character that cannot be put on the wire.
    #[error("illegal control character in outgoing line: {0:?}")]
    IllegalControlChar(char),
}

/// Errors encountered when parsing a single IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Line was empty after stripping the terminator.
    #[error("empty message")]
    EmptyMessage,

    /// Command token was missing or not a valid command name.
    #[error("invalid command")]
    InvalidCommand,

    /// Prefix was started but never terminated by a space.
    #[error("unterminated origin/prefix")]
    UnterminatedOrigin,

    /// Tags section was started but never terminated by a space.
    #[error("unterminated tags section")]
    UnterminatedTags,

    /// Not enough parameters for the command.
    #[error("{command}: not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Command name.
        command: String,
        /// Expected number of arguments.
        expected: usize,
        /// Actual number of arguments.
        got: usize,
    },
}

/// Errors encountered when parsing channel mode strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModeParseError {
    /// Mode string did not start with `+` or `-`.
    #[error("missing mode modifier")]
    MissingModeModifier,

    /// A mode that requires an argument had none left.
    #[error("mode '{0}' requires an argument but none provided")]
    MissingArgument(char),
}

/// Errors surfaced by a [`crate::Client`] handle.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The connection is gone (or was never established).
    #[error("not connected")]
    NotConnected,

    /// No configured server accepted the connection.
    #[error("could not connect to any of [{servers}] on port {port}: {source}")]
    ConnectFailed {
        /// Comma-separated list of attempted servers.
        servers: String,
        /// Port that was tried.
        port: u16,
        /// Last socket error seen.
        #[source]
        source: std::io::Error,
    },

    /// Codec or socket failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ClientError {
    /// Static label for logging.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::ConnectFailed { .. } => "connect_failed",
            Self::Protocol(_) => "protocol",
        }
    }
}
