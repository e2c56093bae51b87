//! # slirc-client
//!
//! Client-side IRC plumbing for long-running bots.
//!
//! The crate covers the parts of the protocol a bot actually needs:
//!
//! - parsing and serializing the client command subset ([`Message`], [`Command`])
//! - a tokio line codec that skips malformed lines instead of tearing down
//!   the connection ([`IrcCodec`])
//! - a sans-IO roster tracker that follows JOIN/PART/KICK/QUIT/NICK/MODE,
//!   NAMES and WHO replies ([`Tracker`])
//! - a connected [`Client`] handle that paces outbound lines and reports
//!   everything it sees as an [`Event`] stream
//!
//! ## Quick Start
//!
//! ```no_run
//! use slirc_client::{Client, ClientConfig, Event};
//!
//! # async fn demo() -> Result<(), slirc_client::ClientError> {
//! let config = ClientConfig::new(vec!["irc.example.net".into()], 6667, "decbot", "Dec Bot");
//! let (client, mut events) = Client::connect(config).await?;
//! client.login("decbot", "Dec Bot")?;
//!
//! while let Some(event) = events.recv().await {
//!     if let Event::Registered { .. } = event {
//!         client.join("#straylight")?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod casemap;
pub mod client;
pub mod codec;
pub mod command;
pub mod ctcp;
pub mod error;
pub mod event;
pub mod message;
pub mod mode;
pub mod prefix;
pub mod tracker;

pub use self::casemap::{irc_eq, irc_to_lower, is_channel_name};
pub use self::client::{Client, ClientConfig, EventStream};
pub use self::codec::IrcCodec;
pub use self::command::Command;
pub use self::error::{ClientError, MessageParseError, ModeParseError, ProtocolError};
pub use self::event::{Event, SendType};
pub use self::message::Message;
pub use self::mode::{ModeChange, ModeSpec};
pub use self::prefix::Prefix;
pub use self::tracker::{Action, Channel, ChannelUser, Tracker, TrackerConfig};
