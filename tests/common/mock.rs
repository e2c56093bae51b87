//! Connection doubles.
//!
//! `MockConnection` records every call instead of writing to a socket and
//! serves a roster the test sets up. `MockConnector` hands out mock
//! connections (or failures) according to a script and records when each
//! attempt happened.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use slirc_client::{ChannelUser, ClientError, Event, EventStream, SendType, irc_to_lower};
use slircbot::config::IrcConfig;
use slircbot::network::{Connection, Connector};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// A call made on a [`MockConnection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Login(String, String),
    Join(String),
    Part(String, Option<String>),
    Op(String, String),
    Nick(String),
    Send(SendType, String, String),
    Raw(String),
    Quit(Option<String>),
    Disconnect,
}

/// Build a roster entry.
pub fn user(nick: &str, ident: &str, host: &str, is_op: bool) -> ChannelUser {
    ChannelUser {
        nick: nick.to_string(),
        ident: Some(ident.to_string()),
        host: Some(host.to_string()),
        is_op,
        is_voice: false,
    }
}

pub struct MockConnection {
    nickname: Mutex<String>,
    channels: Mutex<HashMap<String, (String, Vec<ChannelUser>)>>,
    failing_ops: Mutex<HashSet<String>>,
    sent: Mutex<Vec<Sent>>,
    connected: AtomicBool,
    events: Mutex<Option<mpsc::UnboundedSender<Event>>>,
}

impl MockConnection {
    pub fn new(nickname: &str) -> Arc<Self> {
        Arc::new(Self {
            nickname: Mutex::new(nickname.to_string()),
            channels: Mutex::new(HashMap::new()),
            failing_ops: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            events: Mutex::new(None),
        })
    }

    /// Create a connection plus the event stream a connector would return.
    pub fn with_events(nickname: &str) -> (Arc<Self>, EventStream) {
        let connection = Self::new(nickname);
        let (tx, rx) = mpsc::unbounded_channel();
        *connection.events.lock() = Some(tx);
        (connection, rx)
    }

    /// Put the bot in `channel` with the given members.
    pub fn set_channel(&self, channel: &str, users: Vec<ChannelUser>) {
        self.channels
            .lock()
            .insert(irc_to_lower(channel), (channel.to_string(), users));
    }

    /// Make every `op` call for `nick` fail.
    pub fn fail_op_for(&self, nick: &str) {
        self.failing_ops.lock().insert(irc_to_lower(nick));
    }

    /// Push an event as if the server had sent something.
    pub fn emit(&self, event: Event) {
        if let Some(tx) = self.events.lock().as_ref() {
            let _ = tx.send(event);
        }
    }

    /// Simulate the server dropping the link.
    pub fn drop_link(&self, reason: &str) {
        self.connected.store(false, Ordering::SeqCst);
        if let Some(tx) = self.events.lock().take() {
            let _ = tx.send(Event::Disconnected {
                reason: Some(reason.to_string()),
            });
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Just the `(channel, nick)` op grants, in order.
    pub fn ops(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Op(channel, nick) => Some((channel, nick)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }

    fn record(&self, sent: Sent) -> Result<(), ClientError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(ClientError::NotConnected);
        }
        self.sent.lock().push(sent);
        Ok(())
    }
}

impl Connection for MockConnection {
    fn nickname(&self) -> String {
        self.nickname.lock().clone()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn joined_channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .lock()
            .values()
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn channel_users(&self, channel: &str) -> Vec<ChannelUser> {
        self.channels
            .lock()
            .get(&irc_to_lower(channel))
            .map(|(_, users)| users.clone())
            .unwrap_or_default()
    }

    fn channel_user(&self, channel: &str, nick: &str) -> Option<ChannelUser> {
        self.channel_users(channel)
            .into_iter()
            .find(|u| irc_to_lower(&u.nick) == irc_to_lower(nick))
    }

    fn login(&self, nickname: &str, realname: &str) -> Result<(), ClientError> {
        self.record(Sent::Login(nickname.to_string(), realname.to_string()))
    }

    fn join(&self, channel: &str) -> Result<(), ClientError> {
        self.record(Sent::Join(channel.to_string()))
    }

    fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        self.record(Sent::Part(
            channel.to_string(),
            reason.map(str::to_string),
        ))
    }

    fn op(&self, channel: &str, nick: &str) -> Result<(), ClientError> {
        if self.failing_ops.lock().contains(&irc_to_lower(nick)) {
            return Err(ClientError::NotConnected);
        }
        self.record(Sent::Op(channel.to_string(), nick.to_string()))
    }

    fn change_nick(&self, nick: &str) -> Result<(), ClientError> {
        self.record(Sent::Nick(nick.to_string()))
    }

    fn send(&self, kind: SendType, target: &str, text: &str) -> Result<(), ClientError> {
        self.record(Sent::Send(kind, target.to_string(), text.to_string()))
    }

    fn write_line(&self, line: &str) -> Result<(), ClientError> {
        self.record(Sent::Raw(line.to_string()))
    }

    fn quit(&self, reason: Option<&str>) -> Result<(), ClientError> {
        self.record(Sent::Quit(reason.map(str::to_string)))
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            self.sent.lock().push(Sent::Disconnect);
        }
        if let Some(tx) = self.events.lock().take() {
            let _ = tx.send(Event::Disconnected { reason: None });
        }
    }
}

/// One scripted connect outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Accept,
    Refuse,
}

/// Connector that follows a script. Once the script runs out every attempt
/// is refused.
pub struct MockConnector {
    script: Mutex<VecDeque<Plan>>,
    attempts: Mutex<Vec<Instant>>,
    attempt_count: watch::Sender<usize>,
    connections: Mutex<Vec<Arc<MockConnection>>>,
}

impl MockConnector {
    pub fn new(script: impl IntoIterator<Item = Plan>) -> Arc<Self> {
        let (attempt_count, _) = watch::channel(0);
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: Mutex::new(Vec::new()),
            attempt_count,
            connections: Mutex::new(Vec::new()),
        })
    }

    /// When each attempt happened.
    pub fn attempts(&self) -> Vec<Instant> {
        self.attempts.lock().clone()
    }

    /// Connections handed out so far.
    pub fn connections(&self) -> Vec<Arc<MockConnection>> {
        self.connections.lock().clone()
    }

    /// Wait until at least `n` attempts were made.
    pub async fn wait_for_attempts(&self, n: usize) {
        let mut rx = self.attempt_count.subscribe();
        let _ = rx.wait_for(|count| *count >= n).await;
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        config: &IrcConfig,
    ) -> Result<(Arc<dyn Connection>, EventStream), ClientError> {
        self.attempts.lock().push(Instant::now());
        let plan = self.script.lock().pop_front().unwrap_or(Plan::Refuse);
        self.attempt_count.send_modify(|count| *count += 1);

        match plan {
            Plan::Accept => {
                let (connection, events) = MockConnection::with_events(&config.nickname);
                self.connections.lock().push(Arc::clone(&connection));
                Ok((connection, events))
            }
            Plan::Refuse => Err(ClientError::ConnectFailed {
                servers: config.server.clone(),
                port: config.port,
                source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            }),
        }
    }
}
