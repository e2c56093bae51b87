//! Sans-IO roster tracker.
//!
//! Follows what the server tells us about our own nick, joined channels and
//! their members, and turns the interesting parts into [`Event`]s. It never
//! touches a socket: [`Tracker::feed`] takes a parsed message and returns the
//! [`Action`]s the caller must perform, in order.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::casemap::{irc_eq, irc_to_lower, is_channel_name};
use crate::command::{
    Command, ERR_NICKNAMEINUSE, RPL_ENDOFWHO, RPL_ISUPPORT, RPL_NAMREPLY, RPL_WELCOME,
    RPL_WHOREPLY,
};
use crate::ctcp;
use crate::event::Event;
use crate::message::Message;
use crate::mode::ModeSpec;
use crate::prefix::Prefix;

/// Something the caller has to do after feeding a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Write this message to the server.
    Send(Message),
    /// Report this event to the application.
    Emit(Event),
}

/// Behaviour switches for the tracker.
#[derive(Clone, Debug, Default)]
pub struct TrackerConfig {
    /// Rejoin a channel right after being kicked from it.
    pub auto_rejoin_on_kick: bool,
    /// Reply to CTCP VERSION with this string, if set.
    pub version: Option<String>,
}

/// One member of a channel as far as we know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelUser {
    /// Nickname as last seen.
    pub nick: String,
    /// Username (ident), once learned from JOIN, NAMES or WHO.
    pub ident: Option<String>,
    /// Hostname, once learned.
    pub host: Option<String>,
    /// Holds `+o` in this channel.
    pub is_op: bool,
    /// Holds `+v` in this channel.
    pub is_voice: bool,
}

impl ChannelUser {
    fn new(nick: &str) -> Self {
        Self {
            nick: nick.to_string(),
            ident: None,
            host: None,
            is_op: false,
            is_voice: false,
        }
    }
}

/// A joined channel and its members, keyed by lowercased nick.
#[derive(Clone, Debug)]
pub struct Channel {
    name: String,
    users: HashMap<String, ChannelUser>,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            users: HashMap::new(),
        }
    }

    /// Channel name as the server sent it on our JOIN.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a member.
    pub fn user(&self, nick: &str) -> Option<&ChannelUser> {
        self.users.get(&irc_to_lower(nick))
    }

    /// All known members, in no particular order.
    pub fn users(&self) -> impl Iterator<Item = &ChannelUser> {
        self.users.values()
    }

    fn user_mut(&mut self, nick: &str) -> &mut ChannelUser {
        self.users
            .entry(irc_to_lower(nick))
            .or_insert_with(|| ChannelUser::new(nick))
    }
}

/// Client-side view of the connection.
#[derive(Clone, Debug)]
pub struct Tracker {
    config: TrackerConfig,
    nickname: String,
    registered: bool,
    channels: HashMap<String, Channel>,
    modes: ModeSpec,
}

impl Tracker {
    /// Start tracking with the nickname we are about to register.
    #[must_use]
    pub fn new(nickname: &str, config: TrackerConfig) -> Self {
        Self {
            config,
            nickname: nickname.to_string(),
            registered: false,
            channels: HashMap::new(),
            modes: ModeSpec::default(),
        }
    }

    /// Our current nickname.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Whether RPL_WELCOME has been seen.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Names of all joined channels, sorted for stable output.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.values().map(|c| c.name.clone()).collect();
        names.sort_by_key(|n| irc_to_lower(n));
        names
    }

    /// Whether we are in `channel`.
    pub fn is_joined(&self, channel: &str) -> bool {
        self.channels.contains_key(&irc_to_lower(channel))
    }

    /// Look up a joined channel.
    pub fn channel(&self, channel: &str) -> Option<&Channel> {
        self.channels.get(&irc_to_lower(channel))
    }

    fn is_self(&self, nick: &str) -> bool {
        irc_eq(nick, &self.nickname)
    }

    /// Feed one inbound message.
    #[must_use]
    pub fn feed(&mut self, msg: &Message) -> Vec<Action> {
        let source = msg.source_nickname();
        match &msg.command {
            Command::PING(token, _) => {
                vec![Action::Send(Command::PONG(token.clone(), None).into())]
            }
            Command::Response(code, params) => self.handle_numeric(*code, params),
            Command::JOIN(channel, _) => match &msg.prefix {
                Some(Prefix::Nickname(nick, ident, host)) => {
                    self.handle_join(channel, nick, ident, host)
                }
                _ => Vec::new(),
            },
            Command::PART(channel, _) => match source {
                Some(nick) => self.handle_part(channel, nick),
                None => Vec::new(),
            },
            Command::KICK(channel, nick, _) => self.handle_kick(channel, nick, source),
            Command::QUIT(_) => {
                if let Some(nick) = source {
                    let key = irc_to_lower(nick);
                    for chan in self.channels.values_mut() {
                        chan.users.remove(&key);
                    }
                }
                Vec::new()
            }
            Command::NICK(new) => match source {
                Some(old) => self.handle_nick(old, new),
                None => Vec::new(),
            },
            Command::MODE(target, args) if is_channel_name(target) => {
                self.handle_mode(target, args, source)
            }
            Command::PRIVMSG(_, text) => self.handle_ctcp(source, text),
            _ => Vec::new(),
        }
    }

    fn handle_numeric(&mut self, code: u16, params: &[String]) -> Vec<Action> {
        match code {
            RPL_WELCOME => {
                if let Some(nick) = params.first() {
                    self.nickname = nick.clone();
                }
                self.registered = true;
                vec![Action::Emit(Event::Registered {
                    nickname: self.nickname.clone(),
                })]
            }
            RPL_ISUPPORT => {
                // target, tokens..., "are supported by this server"
                if params.len() > 2 {
                    for token in &params[1..params.len() - 1] {
                        self.modes.apply_isupport(token);
                    }
                }
                Vec::new()
            }
            ERR_NICKNAMEINUSE if !self.registered => {
                self.nickname.push('_');
                debug!(nick = %self.nickname, "Nickname in use, retrying");
                vec![Action::Send(Command::NICK(self.nickname.clone()).into())]
            }
            RPL_NAMREPLY => {
                if let [_, _, channel, names] = params {
                    self.handle_names(channel, names);
                }
                Vec::new()
            }
            RPL_WHOREPLY => {
                if let [_, channel, ident, host, _, nick, flags, ..] = params {
                    self.handle_who(channel, ident, host, nick, flags);
                }
                Vec::new()
            }
            RPL_ENDOFWHO => {
                // only channel WHOs we are in mark a roster as complete
                let synced = params
                    .get(1)
                    .and_then(|mask| self.channels.get(&irc_to_lower(mask)));
                match synced {
                    Some(chan) => vec![Action::Emit(Event::ChannelSynced {
                        channel: chan.name().to_string(),
                    })],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }

    fn handle_join(&mut self, channel: &str, nick: &str, ident: &str, host: &str) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_self(nick) {
            self.channels
                .insert(irc_to_lower(channel), Channel::new(channel));
            actions.push(Action::Send(Command::WHO(channel.to_string()).into()));
        }
        if let Some(chan) = self.channels.get_mut(&irc_to_lower(channel)) {
            let user = chan.user_mut(nick);
            user.ident = Some(ident.to_string());
            user.host = Some(host.to_string());
        }
        actions.push(Action::Emit(Event::Joined {
            channel: channel.to_string(),
            nick: nick.to_string(),
            ident: ident.to_string(),
            host: host.to_string(),
        }));
        actions
    }

    fn remove_member(&mut self, channel: &str, nick: &str) {
        let key = irc_to_lower(channel);
        if self.is_self(nick) {
            self.channels.remove(&key);
        } else if let Some(chan) = self.channels.get_mut(&key) {
            chan.users.remove(&irc_to_lower(nick));
        }
    }

    fn handle_part(&mut self, channel: &str, nick: &str) -> Vec<Action> {
        self.remove_member(channel, nick);
        vec![Action::Emit(Event::Parted {
            channel: channel.to_string(),
            nick: nick.to_string(),
        })]
    }

    fn handle_kick(&mut self, channel: &str, nick: &str, by: Option<&str>) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.is_self(nick) && self.config.auto_rejoin_on_kick {
            actions.push(Action::Send(
                Command::JOIN(channel.to_string(), None).into(),
            ));
        }
        self.remove_member(channel, nick);
        actions.push(Action::Emit(Event::Kicked {
            channel: channel.to_string(),
            nick: nick.to_string(),
            by: by.map(str::to_string),
        }));
        actions
    }

    fn handle_nick(&mut self, old: &str, new: &str) -> Vec<Action> {
        if self.is_self(old) {
            self.nickname = new.to_string();
        }
        let old_key = irc_to_lower(old);
        for chan in self.channels.values_mut() {
            if let Some(mut user) = chan.users.remove(&old_key) {
                user.nick = new.to_string();
                chan.users.insert(irc_to_lower(new), user);
            }
        }
        vec![Action::Emit(Event::NickChanged {
            old: old.to_string(),
            new: new.to_string(),
        })]
    }

    fn handle_mode(&mut self, channel: &str, args: &[String], by: Option<&str>) -> Vec<Action> {
        let changes = match self.modes.parse(args) {
            Ok(changes) => changes,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Ignoring unparsable MODE");
                return Vec::new();
            }
        };

        let mut actions = Vec::new();
        for change in changes {
            let Some(nick) = change.arg.as_deref() else {
                continue;
            };
            if let Some(chan) = self.channels.get_mut(&irc_to_lower(channel)) {
                match change.mode {
                    'o' => chan.user_mut(nick).is_op = change.adding,
                    'v' => chan.user_mut(nick).is_voice = change.adding,
                    _ => {}
                }
            }
            if change.mode != 'o' {
                continue;
            }
            let event = if change.adding {
                Event::OpGranted {
                    channel: channel.to_string(),
                    nick: nick.to_string(),
                    by: by.map(str::to_string),
                }
            } else {
                Event::OpRevoked {
                    channel: channel.to_string(),
                    nick: nick.to_string(),
                    by: by.map(str::to_string),
                }
            };
            actions.push(Action::Emit(event));
        }
        actions
    }

    fn handle_names(&mut self, channel: &str, names: &str) {
        let modes = &self.modes;
        let Some(chan) = self.channels.get_mut(&irc_to_lower(channel)) else {
            return;
        };
        for entry in names.split(' ').filter(|e| !e.is_empty()) {
            // multi-prefix may stack several symbols
            let bare = entry.trim_start_matches(|c| modes.is_prefix_symbol(c));
            let symbols = &entry[..entry.len() - bare.len()];
            // userhost-in-names
            let (nick, ident, host) = match Prefix::parse(bare) {
                Prefix::Nickname(nick, ident, host) => (nick, ident, host),
                Prefix::ServerName(nick) => (nick, String::new(), String::new()),
            };
            if nick.is_empty() {
                continue;
            }

            let user = chan.user_mut(&nick);
            user.is_op = symbols.chars().any(|s| modes.mode_for_symbol(s) == Some('o'));
            user.is_voice = symbols.chars().any(|s| modes.mode_for_symbol(s) == Some('v'));
            if !ident.is_empty() {
                user.ident = Some(ident);
            }
            if !host.is_empty() {
                user.host = Some(host);
            }
        }
    }

    fn handle_who(&mut self, channel: &str, ident: &str, host: &str, nick: &str, flags: &str) {
        let key = irc_to_lower(nick);
        let is_op = flags.contains('@');
        let is_voice = flags.contains('+');
        let channel_key = irc_to_lower(channel);
        for (name, chan) in self.channels.iter_mut() {
            let in_reply_channel = *name == channel_key;
            let user = if in_reply_channel {
                Some(chan.user_mut(nick))
            } else {
                chan.users.get_mut(&key)
            };
            if let Some(user) = user {
                user.ident = Some(ident.to_string());
                user.host = Some(host.to_string());
                if in_reply_channel {
                    user.is_op = is_op;
                    user.is_voice = is_voice;
                }
            }
        }
    }

    fn handle_ctcp(&self, source: Option<&str>, text: &str) -> Vec<Action> {
        let (Some(nick), Some(version)) = (source, self.config.version.as_deref()) else {
            return Vec::new();
        };
        match ctcp::parse(text) {
            Some((command, _)) if command.eq_ignore_ascii_case("VERSION") => {
                vec![Action::Send(
                    Command::NOTICE(nick.to_string(), ctcp::reply("VERSION", version)).into(),
                )]
            }
            _ => Vec::new(),
        }
    }
}
