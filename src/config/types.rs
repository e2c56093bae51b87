//! Core configuration types and loading.

use serde::{Deserialize, Deserializer};
use slirc_client::ClientConfig;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::validation::{ValidationError, validate};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Connection and identity.
    #[serde(alias = "IRC")]
    pub irc: IrcConfig,
    /// Trusted identities, `name = "ident@host"`. Kept as raw TOML so that a
    /// single bad entry is skipped instead of failing the whole file.
    #[serde(default, alias = "AutoOp")]
    pub autoop: toml::Table,
}

impl Config {
    /// Read, parse and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Async variant of [`Config::load`] for use inside the runtime.
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

/// `[irc]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Server hostname.
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub nickname: String,
    /// Realname (gecos). Falls back to the nickname.
    #[serde(default)]
    pub realname: Option<String>,
    /// Channels joined after registration. Accepts `"#a,#b"` or a list.
    #[serde(default, deserialize_with = "channel_list")]
    pub channels: Vec<String>,
    /// Minimum gap between outbound lines, in milliseconds.
    #[serde(default = "default_send_delay_ms")]
    pub send_delay_ms: u64,
    /// Pause between reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
    #[serde(default = "default_true")]
    pub auto_rejoin_on_kick: bool,
}

impl IrcConfig {
    pub fn realname(&self) -> &str {
        self.realname
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(&self.nickname)
    }

    pub fn send_delay(&self) -> Duration {
        Duration::from_millis(self.send_delay_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    /// Connection parameters for the protocol client.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(
            vec![self.server.clone()],
            self.port,
            self.nickname.clone(),
            self.realname().to_string(),
        );
        config.send_delay = self.send_delay();
        config.auto_rejoin_on_kick = self.auto_rejoin_on_kick;
        config
    }
}

fn default_port() -> u16 {
    6667
}

fn default_send_delay_ms() -> u64 {
    400
}

fn default_reconnect_delay_secs() -> u64 {
    2
}

fn default_true() -> bool {
    true
}

fn channel_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Channels {
        Joined(String),
        List(Vec<String>),
    }

    let raw = match Channels::deserialize(deserializer)? {
        Channels::Joined(s) => s.split(',').map(str::to_string).collect(),
        Channels::List(list) => list,
    };
    Ok(raw
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect())
}
