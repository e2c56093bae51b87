//! Interactive operator console.
//!
//! Lines come from a dedicated stdin thread over an `mpsc` channel, so the
//! loop can `select!` on the quit token and never blocks the runtime. A line
//! whose first word is a registered alias runs that handler; anything else
//! is sent to the server verbatim when connected.

mod commands;
pub mod output;
mod registry;

use std::io::{self, BufRead};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

pub use commands::CYCLE_REASON;
pub use registry::{Context, Handler, Registry};

use crate::session::Session;

/// Handle one console line.
pub async fn process_line(session: &Arc<Session>, registry: &Registry, line: &str) {
    let raw = line.trim_end_matches(['\r', '\n']);
    let line = raw.trim_end_matches(' ');
    if line.is_empty() {
        return;
    }

    let mut words = line.split(' ');
    let command = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    match registry.get(command) {
        Some(handler) => {
            let ctx = Context { session, registry };
            if let Err(e) = handler.handle(&ctx, &args).await {
                debug!(command = %command, error = %e, code = e.error_code(), "Console command failed");
                output::error(&format!("Unable to perform command: {e}"));
            }
        }
        None => {
            let Some(connection) = session.connection() else {
                debug!(line = %raw, "Not connected, dropping raw line");
                return;
            };
            // verbatim, trailing spaces included
            if let Err(e) = connection.write_line(raw) {
                output::error(&format!("Unable to perform command: {e}"));
            }
        }
    }
}

/// Run until quit is requested or input ends.
pub async fn run(
    session: Arc<Session>,
    registry: Registry,
    mut lines: mpsc::UnboundedReceiver<String>,
) {
    loop {
        let line = tokio::select! {
            _ = session.quit_token().cancelled() => break,
            line = lines.recv() => line,
        };
        let Some(line) = line else {
            debug!("Console input closed");
            break;
        };
        process_line(&session, &registry, &line).await;
    }
}

/// Read stdin on its own thread and forward each line.
///
/// The thread exits at EOF or once the receiver is gone.
pub fn spawn_stdin_reader() -> io::Result<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("console-stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Console read failed");
                        break;
                    }
                }
            }
        })?;
    Ok(rx)
}
