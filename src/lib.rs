//! slircbot - Straylight IRC Bot
//!
//! Keeps one connection to an IRC server, joins the configured channels and
//! keeps trusted users opped: on join, when the bot itself is opped, and
//! whenever anyone is deopped. An interactive console runs alongside the
//! network loop and can reload the trusted set without reconnecting.

pub mod autoop;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod network;
pub mod session;
pub mod trust;
