//! Auto-op enforcement.
//!
//! Grants `+o` to trusted identities when they join, when the bot itself
//! gets opped, and whenever someone in a channel is deopped. Every grant
//! checks the roster first, so running a pass twice sends nothing new.
//! Failures are reported per user or channel and never stop a pass.

use std::sync::Arc;

use slirc_client::{ClientError, irc_eq};
use tracing::{debug, info, warn};

use crate::console::output;
use crate::network::Connection;
use crate::trust::TrustedIdentitySet;

/// Auto-op engine bound to one connection and one trusted-set snapshot.
pub struct AutoOp {
    connection: Arc<dyn Connection>,
    trusted: Arc<TrustedIdentitySet>,
}

fn report(context: &str, err: &ClientError) {
    warn!(error = %err, code = err.error_code(), "{context}");
    output::error(&format!("{context}: {err}"));
}

impl AutoOp {
    pub fn new(connection: Arc<dyn Connection>, trusted: Arc<TrustedIdentitySet>) -> Self {
        Self {
            connection,
            trusted,
        }
    }

    /// Op every trusted, not-yet-opped member of `channel`. Returns the
    /// number of grants sent.
    pub fn op_channel(&self, channel: &str) -> usize {
        self.scan(channel, None)
    }

    fn scan(&self, channel: &str, skip: Option<&str>) -> usize {
        let mut granted = 0;
        for user in self.connection.channel_users(channel) {
            if user.is_op || skip.is_some_and(|nick| irc_eq(nick, &user.nick)) {
                continue;
            }
            let (Some(ident), Some(host)) = (user.ident.as_deref(), user.host.as_deref()) else {
                continue;
            };
            if !self.trusted.is_trusted(ident, host) {
                continue;
            }
            match self.connection.op(channel, &user.nick) {
                Ok(()) => {
                    debug!(channel = %channel, nick = %user.nick, "Auto-op grant");
                    granted += 1;
                }
                Err(e) => report(
                    &format!("Could not op {} ({ident}@{host}) in {channel}", user.nick),
                    &e,
                ),
            }
        }
        granted
    }

    /// The bot was opped in `channel`: catch up on everyone trusted.
    pub fn on_self_op(&self, channel: &str) -> usize {
        info!(channel = %channel, "Opped, scanning channel");
        self.op_channel(channel)
    }

    /// `nick` lost `+o` in `channel`. Re-grant if trusted, then rescan the
    /// whole channel. The rescan skips a nick that was just re-granted, as
    /// the roster still shows it deopped until the server echoes the mode.
    pub fn on_deop(&self, channel: &str, nick: &str) -> usize {
        let mut regranted = false;
        if let Some(user) = self.connection.channel_user(channel, nick) {
            let trusted = match (user.ident.as_deref(), user.host.as_deref()) {
                (Some(ident), Some(host)) => self.trusted.is_trusted(ident, host),
                _ => false,
            };
            if trusted {
                match self.connection.op(channel, nick) {
                    Ok(()) => regranted = true,
                    Err(e) => report(&format!("Could not re-op {nick} in {channel}"), &e),
                }
            }
        }
        let skip = regranted.then_some(nick);
        usize::from(regranted) + self.scan(channel, skip)
    }

    /// Someone joined `channel`.
    pub fn on_join(&self, channel: &str, nick: &str, ident: &str, host: &str) -> bool {
        if !self.trusted.is_trusted(ident, host) {
            return false;
        }
        match self.connection.op(channel, nick) {
            Ok(()) => {
                info!(channel = %channel, nick = %nick, "Auto-op on join");
                true
            }
            Err(e) => {
                report(&format!("Could not op {nick} in {channel}"), &e);
                false
            }
        }
    }

    /// Scan every joined channel.
    pub fn op_all(&self) -> usize {
        if self.trusted.is_empty() {
            return 0;
        }
        let channels = self.connection.joined_channels();
        if channels.is_empty() {
            return 0;
        }
        channels.iter().map(|c| self.op_channel(c)).sum()
    }
}
