//! Connection lifecycle: connect, pump events, reconnect.
//!
//! The controller owns the only connect loop. After every disconnect or
//! failed attempt it waits `irc.reconnect_delay_secs` and tries again, with
//! no upper bound, until the quit token fires. The wait is itself
//! cancellable, so `/quit` never sits out a full delay.

use std::sync::Arc;
use std::time::Duration;

use slirc_client::{Event, EventStream, irc_eq};
use tracing::{debug, info, warn};

use super::connection::{Connection, Connector};
use crate::console::output;
use crate::session::{ConnectionStatus, Session};

/// Upper bound on waiting for QUIT to reach the server at shutdown.
const SHUTDOWN_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// How a pump ended.
enum PumpExit {
    Disconnected(Option<String>),
    Quit,
}

pub struct Controller {
    session: Arc<Session>,
    connector: Arc<dyn Connector>,
}

impl Controller {
    pub fn new(session: Arc<Session>, connector: Arc<dyn Connector>) -> Self {
        Self { session, connector }
    }

    /// Run until quit is requested.
    pub async fn run(&self) {
        let quit = self.session.quit_token().clone();
        while !quit.is_cancelled() {
            let config = self.session.config();
            self.session.set_status(ConnectionStatus::Connecting);
            output::notify(&format!("Connecting to: {}", config.irc.server));

            match self.connector.connect(&config.irc).await {
                Ok((connection, mut events)) => {
                    self.session.set_connection(Some(Arc::clone(&connection)));
                    self.session.set_status(ConnectionStatus::Connected);

                    let exit = match connection.login(&config.irc.nickname, config.irc.realname()) {
                        Ok(()) => self.pump(connection.as_ref(), &mut events).await,
                        Err(e) => PumpExit::Disconnected(Some(e.to_string())),
                    };
                    let reason = match exit {
                        PumpExit::Quit => {
                            self.shutdown(connection.as_ref(), events).await;
                            return;
                        }
                        PumpExit::Disconnected(reason) => reason,
                    };

                    info!(
                        reason = reason.as_deref().unwrap_or("connection closed"),
                        "Disconnected from server"
                    );
                    connection.disconnect();
                    self.session.set_connection(None);
                    self.session.set_status(ConnectionStatus::Disconnected);
                    output::notify("Disconnected from server. Attempting reconnect.");
                }
                Err(e) => {
                    self.session.set_status(ConnectionStatus::Disconnected);
                    warn!(error = %e, code = e.error_code(), "Couldn't connect");
                    output::error(&format!("Couldn't connect! Reason: {e}"));
                }
            }

            let delay = config.irc.reconnect_delay();
            tokio::select! {
                _ = quit.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.session.set_status(ConnectionStatus::ShuttingDown);
    }

    async fn pump(&self, connection: &dyn Connection, events: &mut EventStream) -> PumpExit {
        let quit = self.session.quit_token();
        loop {
            let event = tokio::select! {
                _ = quit.cancelled() => return PumpExit::Quit,
                event = events.recv() => event,
            };
            match event {
                Some(Event::Disconnected { reason }) => return PumpExit::Disconnected(reason),
                Some(event) => self.handle_event(connection, event),
                None => return PumpExit::Disconnected(None),
            }
        }
    }

    /// React to one inbound event.
    pub fn handle_event(&self, connection: &dyn Connection, event: Event) {
        match event {
            Event::RawMessage(line) => {
                debug!(line = %line, "recv");
                output::incoming(&line);
            }
            Event::LineWritten(line) => {
                debug!(line = %line, "send");
                output::outgoing(&line);
            }
            Event::Registered { nickname } => {
                info!(nickname = %nickname, "Registered");
                let config = self.session.config();
                for channel in &config.irc.channels {
                    if let Err(e) = connection.join(channel) {
                        warn!(channel = %channel, error = %e, "Join failed");
                        output::error(&format!("Could not join {channel}: {e}"));
                    }
                }
            }
            Event::ChannelSynced { channel } => {
                // without ops the scan waits for OpGranted
                let opped = connection
                    .channel_user(&channel, &connection.nickname())
                    .is_some_and(|me| me.is_op);
                debug!(channel = %channel, opped, "Roster synced");
                if opped && let Some(auto_op) = self.session.auto_op() {
                    auto_op.op_channel(&channel);
                }
            }
            Event::Joined {
                channel,
                nick,
                ident,
                host,
            } => {
                if irc_eq(&nick, &connection.nickname()) {
                    info!(channel = %channel, "Joined");
                } else if let Some(auto_op) = self.session.auto_op() {
                    auto_op.on_join(&channel, &nick, &ident, &host);
                }
            }
            Event::OpGranted { channel, nick, .. } => {
                if irc_eq(&nick, &connection.nickname())
                    && let Some(auto_op) = self.session.auto_op()
                {
                    auto_op.on_self_op(&channel);
                }
            }
            Event::OpRevoked { channel, nick, by } => {
                info!(channel = %channel, nick = %nick, by = by.as_deref().unwrap_or("?"), "Deop");
                if let Some(auto_op) = self.session.auto_op() {
                    auto_op.on_deop(&channel, &nick);
                }
            }
            Event::Kicked { channel, nick, by } => {
                if irc_eq(&nick, &connection.nickname()) {
                    warn!(channel = %channel, by = by.as_deref().unwrap_or("?"), "Kicked");
                }
            }
            Event::NickChanged { old, new } => {
                if irc_eq(&new, &connection.nickname()) {
                    info!(old = %old, new = %new, "Nickname changed");
                }
            }
            Event::Parted { .. } | Event::Disconnected { .. } => {}
        }
    }

    /// Send QUIT, close, and give the writer a moment to flush. Failures
    /// here are expected when the link is already gone.
    async fn shutdown(&self, connection: &dyn Connection, mut events: EventStream) {
        self.session.set_status(ConnectionStatus::ShuttingDown);
        if let Err(e) = connection.quit(None) {
            debug!(error = %e, "QUIT not sent");
        }
        connection.disconnect();

        let drained = tokio::time::timeout(SHUTDOWN_FLUSH_TIMEOUT, async {
            while let Some(event) = events.recv().await {
                match event {
                    Event::LineWritten(line) => output::outgoing(&line),
                    Event::Disconnected { .. } => break,
                    _ => {}
                }
            }
        })
        .await;
        if drained.is_err() {
            debug!("Connection did not close before shutdown timeout");
        }
        self.session.set_connection(None);
    }
}
