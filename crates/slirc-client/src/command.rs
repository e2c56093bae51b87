//! IRC commands used by a client.
//!
//! Only the commands a bot sends or reacts to get typed variants. Everything
//! else, including numerics the tracker does not care about, is still
//! representable through [`Command::Response`] and [`Command::Raw`].
//!
//! # Reference
//! - RFC 2812: Internet Relay Chat: Client Protocol

use std::fmt;

use crate::error::MessageParseError;

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Command {
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode :realname`
    USER(String, String, String),
    /// `QUIT [:message]`
    QUIT(Option<String>),
    /// `PING token [target]`
    PING(String, Option<String>),
    /// `PONG token [target]`
    PONG(String, Option<String>),
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [:message]`
    PART(String, Option<String>),
    /// `KICK channel nick [:comment]`
    KICK(String, String, Option<String>),
    /// `MODE target [modestring [args...]]`
    MODE(String, Vec<String>),
    /// `PRIVMSG target :text`
    PRIVMSG(String, String),
    /// `NOTICE target :text`
    NOTICE(String, String),
    /// `WHO mask`
    WHO(String),
    /// `ERROR :message` (server closing the link)
    ERROR(String),
    /// Numeric reply: code plus all parameters, target included.
    Response(u16, Vec<String>),
    /// Any other command, parameters kept verbatim.
    Raw(String, Vec<String>),
}

/// RPL_WELCOME
pub const RPL_WELCOME: u16 = 1;
/// RPL_ISUPPORT
pub const RPL_ISUPPORT: u16 = 5;
/// RPL_ENDOFWHO
pub const RPL_ENDOFWHO: u16 = 315;
/// RPL_WHOREPLY
pub const RPL_WHOREPLY: u16 = 352;
/// RPL_NAMREPLY
pub const RPL_NAMREPLY: u16 = 353;
/// ERR_NICKNAMEINUSE
pub const ERR_NICKNAMEINUSE: u16 = 433;

fn require(command: &str, args: &[&str], expected: usize) -> Result<(), MessageParseError> {
    if args.len() < expected {
        return Err(MessageParseError::NotEnoughArguments {
            command: command.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

fn opt(args: &[&str], idx: usize) -> Option<String> {
    args.get(idx).map(|s| s.to_string())
}

impl Command {
    /// Build a command from its name and already-split parameters.
    pub fn new(name: &str, args: Vec<&str>) -> Result<Command, MessageParseError> {
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(MessageParseError::InvalidCommand);
        }

        if name.len() == 3 && name.chars().all(|c| c.is_ascii_digit()) {
            let code = name
                .parse::<u16>()
                .map_err(|_| MessageParseError::InvalidCommand)?;
            return Ok(Command::Response(code, owned(&args)));
        }

        let upper = name.to_ascii_uppercase();
        let cmd = match upper.as_str() {
            "NICK" => {
                require(&upper, &args, 1)?;
                Command::NICK(args[0].to_string())
            }
            "USER" => {
                require(&upper, &args, 4)?;
                Command::USER(args[0].to_string(), args[1].to_string(), args[3].to_string())
            }
            "QUIT" => Command::QUIT(opt(&args, 0)),
            "PING" => {
                require(&upper, &args, 1)?;
                Command::PING(args[0].to_string(), opt(&args, 1))
            }
            "PONG" => {
                require(&upper, &args, 1)?;
                Command::PONG(args[0].to_string(), opt(&args, 1))
            }
            "JOIN" => {
                require(&upper, &args, 1)?;
                // extended-join appends account and realname; the key slot
                // is only meaningful on outbound JOINs.
                let key = if args.len() == 2 { opt(&args, 1) } else { None };
                Command::JOIN(args[0].to_string(), key)
            }
            "PART" => {
                require(&upper, &args, 1)?;
                Command::PART(args[0].to_string(), opt(&args, 1))
            }
            "KICK" => {
                require(&upper, &args, 2)?;
                Command::KICK(args[0].to_string(), args[1].to_string(), opt(&args, 2))
            }
            "MODE" => {
                require(&upper, &args, 1)?;
                Command::MODE(args[0].to_string(), owned(&args[1..]))
            }
            "PRIVMSG" => {
                require(&upper, &args, 2)?;
                Command::PRIVMSG(args[0].to_string(), args[1].to_string())
            }
            "NOTICE" => {
                require(&upper, &args, 2)?;
                Command::NOTICE(args[0].to_string(), args[1].to_string())
            }
            "WHO" => {
                require(&upper, &args, 1)?;
                Command::WHO(args[0].to_string())
            }
            "ERROR" => Command::ERROR(opt(&args, 0).unwrap_or_default()),
            _ => Command::Raw(upper, owned(&args)),
        };
        Ok(cmd)
    }

    /// Wire name of this command (numerics are zero padded).
    pub fn name(&self) -> String {
        match self {
            Command::NICK(_) => "NICK".into(),
            Command::USER(..) => "USER".into(),
            Command::QUIT(_) => "QUIT".into(),
            Command::PING(..) => "PING".into(),
            Command::PONG(..) => "PONG".into(),
            Command::JOIN(..) => "JOIN".into(),
            Command::PART(..) => "PART".into(),
            Command::KICK(..) => "KICK".into(),
            Command::MODE(..) => "MODE".into(),
            Command::PRIVMSG(..) => "PRIVMSG".into(),
            Command::NOTICE(..) => "NOTICE".into(),
            Command::WHO(_) => "WHO".into(),
            Command::ERROR(_) => "ERROR".into(),
            Command::Response(code, _) => format!("{code:03}"),
            Command::Raw(name, _) => name.clone(),
        }
    }
}

/// A parameter needs the trailing `:` form if it is empty, has a space, or
/// itself starts with `:`.
fn needs_colon(param: &str) -> bool {
    param.is_empty() || param.contains(' ') || param.starts_with(':')
}

/// Write `name middle... [:trailing]`.
///
/// `force_trailing` always colon-prefixes the last parameter, which is how
/// free-text fields (messages, reasons) are conventionally sent.
fn write_params(
    f: &mut fmt::Formatter<'_>,
    name: &str,
    params: &[&str],
    force_trailing: bool,
) -> fmt::Result {
    f.write_str(name)?;
    let Some((last, middle)) = params.split_last() else {
        return Ok(());
    };
    for param in middle {
        write!(f, " {param}")?;
    }
    if force_trailing || needs_colon(last) {
        write!(f, " :{last}")
    } else {
        write!(f, " {last}")
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut params: Vec<&str> = Vec::new();
        let force_trailing = match self {
            Command::NICK(nick) => {
                params.push(nick);
                false
            }
            Command::USER(user, mode, realname) => {
                params.extend([user.as_str(), mode.as_str(), "*", realname.as_str()]);
                true
            }
            Command::QUIT(reason) => {
                params.extend(reason.as_deref());
                true
            }
            Command::PING(token, target) | Command::PONG(token, target) => {
                params.push(token);
                params.extend(target.as_deref());
                false
            }
            Command::JOIN(chan, key) => {
                params.push(chan);
                params.extend(key.as_deref());
                false
            }
            Command::PART(chan, reason) => {
                params.push(chan);
                params.extend(reason.as_deref());
                reason.is_some()
            }
            Command::KICK(chan, nick, reason) => {
                params.extend([chan.as_str(), nick.as_str()]);
                params.extend(reason.as_deref());
                reason.is_some()
            }
            Command::MODE(target, args) => {
                params.push(target);
                params.extend(args.iter().map(String::as_str));
                false
            }
            Command::PRIVMSG(target, text) | Command::NOTICE(target, text) => {
                params.extend([target.as_str(), text.as_str()]);
                true
            }
            Command::WHO(mask) => {
                params.push(mask);
                false
            }
            Command::ERROR(text) => {
                params.push(text);
                true
            }
            Command::Response(_, args) | Command::Raw(_, args) => {
                params.extend(args.iter().map(String::as_str));
                false
            }
        };
        write_params(f, &self.name(), &params, force_trailing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_becomes_response() {
        let cmd = Command::new("001", vec!["decbot", "Welcome to IRC"]).unwrap();
        assert_eq!(
            cmd,
            Command::Response(
                RPL_WELCOME,
                vec!["decbot".to_string(), "Welcome to IRC".to_string()]
            )
        );
        assert_eq!(cmd.name(), "001");
    }

    #[test]
    fn test_missing_args_rejected() {
        let err = Command::new("KICK", vec!["#chan"]).unwrap_err();
        assert_eq!(
            err,
            MessageParseError::NotEnoughArguments {
                command: "KICK".to_string(),
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_extended_join_drops_account_fields() {
        let cmd = Command::new("JOIN", vec!["#chan", "account", "Real Name"]).unwrap();
        assert_eq!(cmd, Command::JOIN("#chan".to_string(), None));
    }

    #[test]
    fn test_unknown_command_kept_raw() {
        let cmd = Command::new("topic", vec!["#chan", "new topic"]).unwrap();
        assert_eq!(
            cmd,
            Command::Raw(
                "TOPIC".to_string(),
                vec!["#chan".to_string(), "new topic".to_string()]
            )
        );
    }

    #[test]
    fn test_serialize_free_text_uses_trailing() {
        assert_eq!(
            Command::PRIVMSG("#chan".into(), "hi".into()).to_string(),
            "PRIVMSG #chan :hi"
        );
        assert_eq!(
            Command::PART("#chan".into(), Some("Cycling.".into())).to_string(),
            "PART #chan :Cycling."
        );
        assert_eq!(
            Command::USER("decbot".into(), "0".into(), "Dec Bot".into()).to_string(),
            "USER decbot 0 * :Dec Bot"
        );
        assert_eq!(Command::QUIT(None).to_string(), "QUIT");
    }

    #[test]
    fn test_serialize_mode_grant() {
        let cmd = Command::MODE("#chan".into(), vec!["+o".into(), "alice".into()]);
        assert_eq!(cmd.to_string(), "MODE #chan +o alice");
    }
}
