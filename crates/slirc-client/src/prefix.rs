//! IRC message prefix types.
//!
//! A prefix identifies where a message came from: either a server name or
//! a user's `nick!user@host` mask.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt;

/// Origin of a message.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix {
    /// Server name (e.g., "irc.example.com").
    ServerName(String),
    /// User prefix: (nickname, username, hostname). Username and hostname
    /// are empty when the server only sent a bare nick.
    Nickname(String, String, String),
}

impl Prefix {
    /// Parse a prefix without the leading `:`.
    ///
    /// Lenient: anything that is not clearly a server name becomes a
    /// `Nickname` with whatever parts were present.
    pub fn parse(s: &str) -> Self {
        let (name, user_host) = match s.find(['!', '@']) {
            Some(pos) => (&s[..pos], Some(&s[pos..])),
            None => (s, None),
        };

        let Some(rest) = user_host else {
            return if name.contains('.') {
                Prefix::ServerName(name.to_string())
            } else {
                Prefix::Nickname(name.to_string(), String::new(), String::new())
            };
        };

        let (user, host) = match rest.strip_prefix('!') {
            Some(after_bang) => match after_bang.split_once('@') {
                Some((user, host)) => (user, host),
                None => (after_bang, ""),
            },
            None => ("", rest.trim_start_matches('@')),
        };

        Prefix::Nickname(name.to_string(), user.to_string(), host.to_string())
    }

    /// Create a user prefix from its parts.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }

    /// Nickname, if this is a user prefix with one.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// Username (ident), if present.
    pub fn user(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(_, user, _) if !user.is_empty() => Some(user),
            _ => None,
        }
    }

    /// Hostname, or the server name for server prefixes.
    pub fn host(&self) -> Option<&str> {
        match self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{user}")?;
                }
                if !host.is_empty() {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        Prefix::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_user_prefix() {
        let p = Prefix::parse("Alice!~alice@host.example.org");
        assert_eq!(p.nick(), Some("Alice"));
        assert_eq!(p.user(), Some("~alice"));
        assert_eq!(p.host(), Some("host.example.org"));
        assert_eq!(p.to_string(), "Alice!~alice@host.example.org");
    }

    #[test]
    fn test_server_prefix() {
        let p = Prefix::parse("irc.straylight.net");
        assert_eq!(p, Prefix::ServerName("irc.straylight.net".to_string()));
        assert_eq!(p.nick(), None);
    }

    #[test]
    fn test_partial_prefixes() {
        assert_eq!(Prefix::parse("nick"), Prefix::new("nick", "", ""));
        assert_eq!(Prefix::parse("nick@host"), Prefix::new("nick", "", "host"));
        assert_eq!(Prefix::parse("nick!user"), Prefix::new("nick", "user", ""));
    }
}
