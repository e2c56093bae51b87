//! Configuration loading and management.
//!
//! - [`types`]: config struct definitions and file loading
//! - [`validation`]: startup checks that report every problem at once

mod types;
mod validation;

pub use types::{Config, ConfigError, IrcConfig};
pub use validation::{ValidationError, validate};
