//! Connected client handle.
//!
//! [`Client::connect`] opens the socket and spawns two tasks: a reader that
//! feeds every inbound message through the [`Tracker`] and a writer that
//! drains the outbound queue with a fixed delay between lines. The handle
//! itself is cheap to clone; every clone talks to the same connection.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::RwLock;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::codec::IrcCodec;
use crate::command::Command;
use crate::ctcp;
use crate::error::ClientError;
use crate::event::{Event, SendType};
use crate::message::Message;
use crate::tracker::{Action, ChannelUser, Tracker, TrackerConfig};

/// Receiving half of a connection's events. Ends after
/// [`Event::Disconnected`].
pub type EventStream = mpsc::UnboundedReceiver<Event>;

/// Connection parameters.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Servers to try, in order. The first that accepts wins.
    pub servers: Vec<String>,
    /// Port used for every server.
    pub port: u16,
    /// Nickname to register with.
    pub nickname: String,
    /// Realname (gecos). Also used as the CTCP VERSION reply.
    pub realname: String,
    /// Minimum gap between two outbound lines.
    pub send_delay: Duration,
    /// Rejoin channels we get kicked from.
    pub auto_rejoin_on_kick: bool,
}

impl ClientConfig {
    /// Config with a 400ms send delay and rejoin-on-kick enabled.
    pub fn new(
        servers: Vec<String>,
        port: u16,
        nickname: impl Into<String>,
        realname: impl Into<String>,
    ) -> Self {
        Self {
            servers,
            port,
            nickname: nickname.into(),
            realname: realname.into(),
            send_delay: Duration::from_millis(400),
            auto_rejoin_on_kick: true,
        }
    }
}

enum Outbound {
    Line(String),
    Close,
}

struct Shared {
    outbound: mpsc::UnboundedSender<Outbound>,
    tracker: RwLock<Tracker>,
    connected: AtomicBool,
    closer: CancellationToken,
}

impl Shared {
    fn queue(&self, line: String) -> Result<(), ClientError> {
        if !self.connected.load(Ordering::Acquire) {
            return Err(ClientError::NotConnected);
        }
        self.outbound
            .send(Outbound::Line(line))
            .map_err(|_| ClientError::NotConnected)
    }
}

/// Handle to one live connection.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("nickname", &self.nickname())
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn strip_crlf(line: &str) -> String {
    line.trim_end_matches(['\r', '\n']).to_string()
}

impl Client {
    /// Connect to the first reachable server and start the I/O tasks.
    ///
    /// Registration is not sent automatically; call [`Client::login`].
    pub async fn connect(config: ClientConfig) -> Result<(Client, EventStream), ClientError> {
        let mut last_error = io::Error::new(io::ErrorKind::InvalidInput, "no servers configured");
        for server in &config.servers {
            match TcpStream::connect((server.as_str(), config.port)).await {
                Ok(stream) => {
                    info!(server = %server, port = config.port, "Connected");
                    return Ok(Client::from_stream(stream, config));
                }
                Err(e) => {
                    warn!(server = %server, port = config.port, error = %e, "Connect attempt failed");
                    last_error = e;
                }
            }
        }
        Err(ClientError::ConnectFailed {
            servers: config.servers.join(", "),
            port: config.port,
            source: last_error,
        })
    }

    /// Run a client over an already established stream.
    pub fn from_stream<S>(stream: S, config: ClientConfig) -> (Client, EventStream)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read_half, write_half) = tokio::io::split(stream);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let tracker = Tracker::new(
            &config.nickname,
            TrackerConfig {
                auto_rejoin_on_kick: config.auto_rejoin_on_kick,
                version: Some(config.realname.clone()),
            },
        );
        let shared = Arc::new(Shared {
            outbound: outbound_tx,
            tracker: RwLock::new(tracker),
            connected: AtomicBool::new(true),
            closer: CancellationToken::new(),
        });

        tokio::spawn(write_loop(
            FramedWrite::new(write_half, IrcCodec::new()),
            outbound_rx,
            event_tx.clone(),
            shared.closer.clone(),
            config.send_delay,
        ));
        tokio::spawn(read_loop(
            FramedRead::new(read_half, IrcCodec::new()),
            Arc::clone(&shared),
            event_tx,
        ));

        (Client { shared }, event_rx)
    }

    /// Queue a message.
    pub fn send_message(&self, msg: impl Into<Message>) -> Result<(), ClientError> {
        self.shared.queue(strip_crlf(&msg.into().to_string()))
    }

    /// Queue a raw line exactly as typed. Anything after an embedded line
    /// break is dropped.
    pub fn write_line(&self, line: &str) -> Result<(), ClientError> {
        let line = IrcCodec::sanitize(line)?;
        self.shared.queue(line.to_string())
    }

    /// Send NICK and USER.
    pub fn login(&self, nickname: &str, realname: &str) -> Result<(), ClientError> {
        self.send_message(Command::NICK(nickname.to_string()))?;
        self.send_message(Command::USER(
            nickname.to_string(),
            "0".to_string(),
            realname.to_string(),
        ))
    }

    /// JOIN a channel.
    pub fn join(&self, channel: &str) -> Result<(), ClientError> {
        self.send_message(Command::JOIN(channel.to_string(), None))
    }

    /// PART a channel.
    pub fn part(&self, channel: &str, reason: Option<&str>) -> Result<(), ClientError> {
        self.send_message(Command::PART(
            channel.to_string(),
            reason.map(str::to_string),
        ))
    }

    /// Give `nick` operator status in `channel`.
    pub fn op(&self, channel: &str, nick: &str) -> Result<(), ClientError> {
        self.send_message(Command::MODE(
            channel.to_string(),
            vec!["+o".to_string(), nick.to_string()],
        ))
    }

    /// Request a nickname change.
    pub fn change_nick(&self, nick: &str) -> Result<(), ClientError> {
        self.send_message(Command::NICK(nick.to_string()))
    }

    /// Send text to a channel or nick.
    pub fn send(&self, kind: SendType, target: &str, text: &str) -> Result<(), ClientError> {
        let command = match kind {
            SendType::Message => Command::PRIVMSG(target.to_string(), text.to_string()),
            SendType::Action => Command::PRIVMSG(target.to_string(), ctcp::action(text)),
        };
        self.send_message(command)
    }

    /// Send QUIT. The server closes the link in response.
    pub fn quit(&self, reason: Option<&str>) -> Result<(), ClientError> {
        self.send_message(Command::QUIT(reason.map(str::to_string)))
    }

    /// Flush queued lines, then close the socket. Idempotent.
    pub fn disconnect(&self) {
        if self.shared.connected.swap(false, Ordering::AcqRel) {
            debug!("Disconnect requested");
            let _ = self.shared.outbound.send(Outbound::Close);
        }
    }

    /// Our current nickname.
    pub fn nickname(&self) -> String {
        self.shared.tracker.read().nickname().to_string()
    }

    /// Whether the connection is still up.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::Acquire)
    }

    /// Names of joined channels.
    pub fn joined_channels(&self) -> Vec<String> {
        self.shared.tracker.read().channel_names()
    }

    /// Snapshot of a channel's members. Empty if we are not in it.
    pub fn channel_users(&self, channel: &str) -> Vec<ChannelUser> {
        self.shared
            .tracker
            .read()
            .channel(channel)
            .map(|c| c.users().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of one member.
    pub fn channel_user(&self, channel: &str, nick: &str) -> Option<ChannelUser> {
        self.shared
            .tracker
            .read()
            .channel(channel)
            .and_then(|c| c.user(nick).cloned())
    }
}

async fn write_loop<W>(
    mut sink: FramedWrite<W, IrcCodec>,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<Event>,
    closer: CancellationToken,
    send_delay: Duration,
) where
    W: AsyncWrite + Unpin,
{
    let mut last_write: Option<Instant> = None;
    while let Some(item) = outbound.recv().await {
        let line = match item {
            Outbound::Line(line) => line,
            Outbound::Close => break,
        };
        if let Some(last) = last_write {
            tokio::time::sleep_until(last + send_delay).await;
        }
        if let Err(e) = sink.send(line.clone()).await {
            warn!(error = %e, "Write failed");
            break;
        }
        last_write = Some(Instant::now());
        let _ = events.send(Event::LineWritten(line));
    }

    if let Err(e) = SinkExt::<String>::close(&mut sink).await {
        debug!(error = %e, "Shutdown of write half failed");
    }
    closer.cancel();
}

async fn read_loop<R>(
    mut stream: FramedRead<R, IrcCodec>,
    shared: Arc<Shared>,
    events: mpsc::UnboundedSender<Event>,
) where
    R: AsyncRead + Unpin,
{
    let mut reason = None;
    loop {
        let next = tokio::select! {
            _ = shared.closer.cancelled() => break,
            next = stream.next() => next,
        };
        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                warn!(error = %e, "Read failed");
                reason = Some(e.to_string());
                break;
            }
            None => break,
        };

        let _ = events.send(Event::RawMessage(strip_crlf(&msg.to_string())));
        if let Command::ERROR(text) = &msg.command {
            reason = Some(text.clone());
        }

        let actions = shared.tracker.write().feed(&msg);
        for action in actions {
            match action {
                Action::Send(reply) => {
                    let _ = shared.queue(strip_crlf(&reply.to_string()));
                }
                Action::Emit(event) => {
                    let _ = events.send(event);
                }
            }
        }
    }

    shared.connected.store(false, Ordering::Release);
    let _ = shared.outbound.send(Outbound::Close);
    info!(reason = reason.as_deref().unwrap_or("connection closed"), "Disconnected");
    let _ = events.send(Event::Disconnected { reason });
}
