//! Integration test common infrastructure.
//!
//! Provides a recording connection double, a scripted connector, a loopback
//! IRC server, and config helpers.

#![allow(dead_code)]

pub mod mock;
pub mod server;

#[allow(unused_imports)]
pub use mock::{MockConnection, MockConnector, Plan, Sent, user};
#[allow(unused_imports)]
pub use server::{FakeClient, FakeServer};

use std::future::Future;
use std::time::Duration;

use slircbot::config::Config;

/// Minimal valid config with the given channels and autoop body.
pub fn config(channels: &str, autoop: &str) -> Config {
    Config::parse(&config_text(channels, autoop)).expect("test config must parse")
}

pub fn config_text(channels: &str, autoop: &str) -> String {
    format!(
        r#"
[irc]
server = "irc.example.net"
nickname = "decbot"
realname = "Dec Bot"
channels = "{channels}"
send_delay_ms = 0
reconnect_delay_secs = 2

[autoop]
{autoop}
"#
    )
}

/// Poll `check` until it holds, yielding to other tasks in between.
///
/// Works under paused time: each round sleeps 10ms of virtual time.
pub async fn eventually<F>(mut check: F)
where
    F: FnMut() -> bool,
{
    for _ in 0..500 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not met in time");
}

/// Await `fut` with a generous timeout.
pub async fn within<T>(fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(30), fut)
        .await
        .expect("timed out")
}
