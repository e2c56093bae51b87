//! Configuration validation.
//!
//! Runs on every load, so a bad `/reload` is rejected the same way a bad
//! startup config is.

use super::Config;
use slirc_client::is_channel_name;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("irc.server is required")]
    MissingServer,
    #[error("irc.nickname is required")]
    MissingNickname,
    #[error("irc.nickname must not contain spaces, got '{0}'")]
    InvalidNickname(String),
    #[error("irc.port must be non-zero")]
    InvalidPort,
    #[error("irc.channels entry is not a channel name: '{0}'")]
    InvalidChannel(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let irc = &config.irc;

    if irc.server.trim().is_empty() {
        errors.push(ValidationError::MissingServer);
    }
    if irc.nickname.trim().is_empty() {
        errors.push(ValidationError::MissingNickname);
    } else if irc.nickname.contains(' ') {
        errors.push(ValidationError::InvalidNickname(irc.nickname.clone()));
    }
    if irc.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    for channel in &irc.channels {
        if !is_channel_name(channel) {
            errors.push(ValidationError::InvalidChannel(channel.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_unchecked(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse_unchecked(
            r##"
[irc]
server = "irc.example.net"
nickname = "decbot"
channels = "#one,&two"
"##,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_all_errors_reported() {
        let config = parse_unchecked(
            r#"
[irc]
server = ""
nickname = ""
port = 0
channels = "general"
"#,
        );
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServer)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingNickname)));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidPort)));
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::InvalidChannel(c) if c == "general"))
        );
    }

    #[test]
    fn test_nickname_with_space_rejected() {
        let config = parse_unchecked(
            r#"
[irc]
server = "irc.example.net"
nickname = "dec bot"
"#,
        );
        let errors = validate(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidNickname(_)));
    }
}
