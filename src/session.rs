//! Shared bot state.
//!
//! One `Session` is shared by the controller and the console. Config and the
//! trusted set are `RwLock<Arc<T>>`: readers take a cheap snapshot, reload
//! builds a complete replacement and swaps it in with one assignment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::autoop::AutoOp;
use crate::config::{Config, ConfigError};
use crate::network::Connection;
use crate::trust::TrustedIdentitySet;

/// Where the connection lifecycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    ShuttingDown,
}

pub struct Session {
    config_path: PathBuf,
    config: RwLock<Arc<Config>>,
    trusted: RwLock<Arc<TrustedIdentitySet>>,
    status: RwLock<ConnectionStatus>,
    connection: RwLock<Option<Arc<dyn Connection>>>,
    quit: CancellationToken,
}

impl Session {
    /// Build a session from an already loaded config.
    pub fn new(config_path: impl Into<PathBuf>, config: Config) -> Self {
        let trusted = TrustedIdentitySet::rebuild(&config.autoop);
        Self {
            config_path: config_path.into(),
            config: RwLock::new(Arc::new(config)),
            trusted: RwLock::new(Arc::new(trusted)),
            status: RwLock::new(ConnectionStatus::Disconnected),
            connection: RwLock::new(None),
            quit: CancellationToken::new(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config.read())
    }

    pub fn trusted(&self) -> Arc<TrustedIdentitySet> {
        Arc::clone(&self.trusted.read())
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.read()
    }

    pub fn set_status(&self, status: ConnectionStatus) {
        *self.status.write() = status;
    }

    pub fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.connection.read().clone()
    }

    /// Replace (or clear) the live connection.
    pub fn set_connection(&self, connection: Option<Arc<dyn Connection>>) {
        *self.connection.write() = connection;
    }

    /// Ask both loops to stop. Idempotent.
    pub fn request_quit(&self) {
        self.quit.cancel();
    }

    pub fn is_quitting(&self) -> bool {
        self.quit.is_cancelled()
    }

    pub fn quit_token(&self) -> &CancellationToken {
        &self.quit
    }

    /// Re-read the config file and swap config and trusted set.
    ///
    /// On error nothing is replaced.
    pub async fn reload(&self) -> Result<Arc<TrustedIdentitySet>, ConfigError> {
        let config = Config::load_async(&self.config_path).await?;
        let trusted = Arc::new(TrustedIdentitySet::rebuild(&config.autoop));

        *self.config.write() = Arc::new(config);
        *self.trusted.write() = Arc::clone(&trusted);
        info!(path = %self.config_path.display(), trusted = trusted.len(), "Config reloaded");
        Ok(trusted)
    }

    /// Auto-op engine bound to the current connection and trusted set.
    pub fn auto_op(&self) -> Option<AutoOp> {
        self.connection()
            .map(|connection| AutoOp::new(connection, self.trusted()))
    }

    pub fn joined_channels(&self) -> Vec<String> {
        self.connection()
            .map(|c| c.joined_channels())
            .unwrap_or_default()
    }
}
