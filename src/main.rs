//! slircbot - Straylight IRC Bot

use std::sync::Arc;

use clap::Parser;
use slircbot::cli::{Cli, init_tracing};
use slircbot::config::Config;
use slircbot::console::{self, Registry, output};
use slircbot::network::{Controller, TcpConnector};
use slircbot::session::Session;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.logfile.as_ref())?;

    output::notify("Starting slircbot.");

    let config = Config::load(&cli.config).map_err(|e| {
        error!(path = %cli.config.display(), error = %e, "Failed to load config");
        e
    })?;

    info!(
        server = %config.irc.server,
        port = config.irc.port,
        nickname = %config.irc.nickname,
        channels = config.irc.channels.len(),
        "Starting slircbot"
    );

    let session = Arc::new(Session::new(&cli.config, config));
    info!(trusted = session.trusted().len(), "Loaded autoop entries");

    let console_task = match console::spawn_stdin_reader() {
        Ok(lines) => Some(tokio::spawn(console::run(
            Arc::clone(&session),
            Registry::new(),
            lines,
        ))),
        Err(e) => {
            warn!(error = %e, "Console unavailable");
            None
        }
    };

    {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C");
                    session.request_quit();
                }
                Err(e) => warn!(error = %e, "Unable to listen for Ctrl+C"),
            }
        });
    }

    Controller::new(Arc::clone(&session), Arc::new(TcpConnector))
        .run()
        .await;

    session.request_quit();
    if let Some(task) = console_task {
        let _ = task.await;
    }

    output::notify("Shutting down.");
    info!("Shutdown complete");
    Ok(())
}
