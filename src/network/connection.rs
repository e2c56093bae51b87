//! The seam between the bot and the protocol client.
//!
//! Everything above this module talks to a `dyn Connection`, so tests can
//! swap in a recording double without opening a socket.

use std::sync::Arc;

use async_trait::async_trait;
use slirc_client::{ChannelUser, Client, ClientError, EventStream, SendType, irc_eq};

use crate::config::IrcConfig;

/// Operations the bot performs on a live connection.
pub trait Connection: Send + Sync {
    fn nickname(&self) -> String;
    fn is_connected(&self) -> bool;
    fn joined_channels(&self) -> Vec<String>;

    /// Case-insensitive membership check against the joined channels.
    fn is_joined(&self, channel: &str) -> bool {
        self.joined_channels().iter().any(|c| irc_eq(c, channel))
    }

    fn channel_users(&self, channel: &str) -> Vec<ChannelUser>;
    fn channel_user(&self, channel: &str, nick: &str) -> Option<ChannelUser>;

    fn login(&self, nickname: &str, realname: &str) -> Result<(), ClientError>;
    fn join(&self, channel: &str) -> Result<(), ClientError>;
    fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError>;
    fn op(&self, channel: &str, nick: &str) -> Result<(), ClientError>;
    fn change_nick(&self, nick: &str) -> Result<(), ClientError>;
    fn send(&self, kind: SendType, target: &str, text: &str) -> Result<(), ClientError>;
    fn write_line(&self, line: &str) -> Result<(), ClientError>;
    fn quit(&self, reason: Option<&str>) -> Result<(), ClientError>;
    fn disconnect(&self);
}

impl Connection for Client {
    fn nickname(&self) -> String {
        Client::nickname(self)
    }

    fn is_connected(&self) -> bool {
        Client::is_connected(self)
    }

    fn joined_channels(&self) -> Vec<String> {
        Client::joined_channels(self)
    }

    fn channel_users(&self, channel: &str) -> Vec<ChannelUser> {
        Client::channel_users(self, channel)
    }

    fn channel_user(&self, channel: &str, nick: &str) -> Option<ChannelUser> {
        Client::channel_user(self, channel, nick)
    }

    fn login(&self, nickname: &str, realname: &str) -> Result<(), ClientError> {
        Client::login(self, nickname, realname)
    }

    fn join(&self, channel: &str) -> Result<(), ClientError> {
        Client::join(self, channel)
    }

    fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        Client::part(self, channel, reason)
    }

    fn op(&self, channel: &str, nick: &str) -> Result<(), ClientError> {
        Client::op(self, channel, nick)
    }

    fn change_nick(&self, nick: &str) -> Result<(), ClientError> {
        Client::change_nick(self, nick)
    }

    fn send(&self, kind: SendType, target: &str, text: &str) -> Result<(), ClientError> {
        Client::send(self, kind, target, text)
    }

    fn write_line(&self, line: &str) -> Result<(), ClientError> {
        Client::write_line(self, line)
    }

    fn quit(&self, reason: Option<&str>) -> Result<(), ClientError> {
        Client::quit(self, reason)
    }

    fn disconnect(&self) {
        Client::disconnect(self)
    }
}

/// Opens connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        config: &IrcConfig,
    ) -> Result<(Arc<dyn Connection>, EventStream), ClientError>;
}

/// Plain TCP connector backed by [`slirc_client::Client`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(
        &self,
        config: &IrcConfig,
    ) -> Result<(Arc<dyn Connection>, EventStream), ClientError> {
        let (client, events) = Client::connect(config.client_config()).await?;
        Ok((Arc::new(client), events))
    }
}
