//! Console command errors.
//!
//! Every console handler returns [`HandlerResult`]. Errors are reported to
//! the operator by the console loop and never end it.

use slirc_client::ClientError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while running a console command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Wrong number of arguments. Carries the usage hint.
    #[error("{0}")]
    Usage(&'static str),

    #[error("You are not in the channel '{0}'.")]
    NotInChannel(String),

    #[error("not connected")]
    NotConnected,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("reload failed: {0}")]
    Reload(#[from] ConfigError),
}

impl CommandError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::NotInChannel(_) => "not_in_channel",
            Self::NotConnected => "not_connected",
            Self::Client(_) => "client_error",
            Self::Reload(_) => "reload_failed",
        }
    }
}

/// Result type for console handlers.
pub type HandlerResult = Result<(), CommandError>;
