//! Owned IRC messages: parsing and serialization.
//!
//! IRCv3 tags are accepted on input and dropped; nothing in the client
//! reads them.

use std::fmt;
use std::str::FromStr;

use crate::command::Command;
use crate::error::MessageParseError;
use crate::prefix::Prefix;

/// An owned IRC message.
///
/// ```
/// use slirc_client::{Command, Message};
///
/// let msg: Message = ":nick!user@host PRIVMSG #channel :Hello!".parse().unwrap();
/// assert_eq!(msg.source_nickname(), Some("nick"));
/// assert_eq!(msg.command, Command::PRIVMSG("#channel".into(), "Hello!".into()));
/// ```
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Nickname from the prefix, if this came from a user.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }

    /// Attach a prefix (used by tests and loopback servers).
    #[must_use]
    pub fn with_prefix(mut self, prefix: Prefix) -> Self {
        self.prefix = Some(prefix);
        self
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

/// Split a parameter section into middle params and an optional trailing one.
fn split_params(rest: &str) -> Vec<&str> {
    let (middle, trailing) = if let Some(t) = rest.strip_prefix(':') {
        ("", Some(t))
    } else {
        match rest.find(" :") {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 2..])),
            None => (rest, None),
        }
    };

    let mut params: Vec<&str> = middle.split(' ').filter(|p| !p.is_empty()).collect();
    if let Some(t) = trailing {
        params.push(t);
    }
    params
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']);
        if rest.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }

        if rest.starts_with('@') {
            let (_, after) = rest
                .split_once(' ')
                .ok_or(MessageParseError::UnterminatedTags)?;
            rest = after.trim_start_matches(' ');
        }

        let prefix = match rest.strip_prefix(':') {
            Some(origin) => {
                let (origin, after) = origin
                    .split_once(' ')
                    .ok_or(MessageParseError::UnterminatedOrigin)?;
                rest = after.trim_start_matches(' ');
                Some(Prefix::parse(origin))
            }
            None => None,
        };

        let (name, params) = match rest.split_once(' ') {
            Some((name, params)) => (name, params.trim_start_matches(' ')),
            None => (rest, ""),
        };

        let command = Command::new(name, split_params(params))?;
        Ok(Message { prefix, command })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref prefix) = self.prefix {
            write!(f, ":{prefix} ")?;
        }
        write!(f, "{}\r\n", self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{RPL_NAMREPLY, RPL_WELCOME};

    #[test]
    fn test_parse_ping() {
        let msg: Message = "PING :irc.straylight.net\r\n".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::PING("irc.straylight.net".to_string(), None)
        );
        assert!(msg.prefix.is_none());
    }

    #[test]
    fn test_parse_tags_are_skipped() {
        let msg: Message = "@time=2024-01-01T00:00:00Z;msgid=abc :a!b@c JOIN #chan"
            .parse()
            .unwrap();
        assert_eq!(msg.source_nickname(), Some("a"));
        assert_eq!(msg.command, Command::JOIN("#chan".to_string(), None));
    }

    #[test]
    fn test_parse_numeric_with_trailing() {
        let msg: Message = ":irc.example.net 353 decbot = #chan :@alice +bob carol"
            .parse()
            .unwrap();
        assert_eq!(
            msg.command,
            Command::Response(
                RPL_NAMREPLY,
                vec![
                    "decbot".to_string(),
                    "=".to_string(),
                    "#chan".to_string(),
                    "@alice +bob carol".to_string()
                ]
            )
        );
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg: Message = ":srv 001 decbot :".parse().unwrap();
        assert_eq!(
            msg.command,
            Command::Response(RPL_WELCOME, vec!["decbot".to_string(), String::new()])
        );
    }

    #[test]
    fn test_parse_mode_with_args() {
        let msg: Message = ":ChanServ!s@services MODE #chan +ov alice bob"
            .parse()
            .unwrap();
        assert_eq!(
            msg.command,
            Command::MODE(
                "#chan".to_string(),
                vec!["+ov".to_string(), "alice".to_string(), "bob".to_string()]
            )
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            "\r\n".parse::<Message>(),
            Err(MessageParseError::EmptyMessage)
        );
        assert_eq!(
            ":lonelyprefix".parse::<Message>(),
            Err(MessageParseError::UnterminatedOrigin)
        );
        assert_eq!(
            ":srv PR!VMSG #x".parse::<Message>(),
            Err(MessageParseError::InvalidCommand)
        );
    }

    #[test]
    fn test_display_round_trips_privmsg() {
        let line = ":alice!a@host PRIVMSG #chan :hello world\r\n";
        let msg: Message = line.parse().unwrap();
        assert_eq!(msg.to_string(), line);
    }
}
