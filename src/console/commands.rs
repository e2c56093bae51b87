//! Console command handlers.

use async_trait::async_trait;
use slirc_client::SendType;
use tracing::info;

use super::output;
use super::registry::{Context, Handler};
use crate::error::{CommandError, HandlerResult};
use crate::network::Connection;

const NEED_CHANNEL_AND_MESSAGE: &str = "Must supply a channel and message.";
const NEED_CHANNEL: &str = "Must supply at least one channel.";
const NEED_MESSAGE: &str = "Must supply a message.";
const NEED_ONE_NAME: &str = "Must supply a name, and only one name.";
const NEED_CHANNEL_AND_NICK: &str = "Must specify a channel name and a user nickname.";

/// Part reason used by `/cycle`.
pub const CYCLE_REASON: &str = "Cycling.";

fn require_joined(connection: &dyn Connection, channel: &str) -> Result<(), CommandError> {
    if connection.is_joined(channel) {
        Ok(())
    } else {
        Err(CommandError::NotInChannel(channel.to_string()))
    }
}

async fn send_to_channel(ctx: &Context<'_>, kind: SendType, args: &[&str]) -> HandlerResult {
    let [channel, words @ ..] = args else {
        return Err(CommandError::Usage(NEED_CHANNEL_AND_MESSAGE));
    };
    if words.is_empty() {
        return Err(CommandError::Usage(NEED_CHANNEL_AND_MESSAGE));
    }
    let connection = ctx.connection()?;
    require_joined(connection.as_ref(), channel)?;

    let text = words.join(" ");
    connection.send(kind, channel, &text)?;
    info!(channel = %channel, kind = ?kind, text = %text, "Sent");
    Ok(())
}

/// `/say <channel> <message...>`
pub struct SendMessage;

#[async_trait]
impl Handler for SendMessage {
    fn name(&self) -> &'static str {
        "SendMessage"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        send_to_channel(ctx, SendType::Message, args).await
    }
}

/// `/me <channel> <action...>`
pub struct SendAction;

#[async_trait]
impl Handler for SendAction {
    fn name(&self) -> &'static str {
        "SendAction"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        send_to_channel(ctx, SendType::Action, args).await
    }
}

/// `/join <channel...>`
pub struct JoinChannels;

#[async_trait]
impl Handler for JoinChannels {
    fn name(&self) -> &'static str {
        "JoinChannels"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        if args.is_empty() {
            return Err(CommandError::Usage(NEED_CHANNEL));
        }
        let connection = ctx.connection()?;
        for channel in args {
            if let Err(e) = connection.join(channel) {
                output::error(&format!("Could not join {channel}: {e}"));
            }
        }
        Ok(())
    }
}

/// `/part <channel...>`
pub struct PartChannels;

#[async_trait]
impl Handler for PartChannels {
    fn name(&self) -> &'static str {
        "PartChannels"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        if args.is_empty() {
            return Err(CommandError::Usage(NEED_CHANNEL));
        }
        let connection = ctx.connection()?;
        for channel in args {
            let result = require_joined(connection.as_ref(), channel)
                .and_then(|()| connection.part(channel, None).map_err(CommandError::from));
            match result {
                Ok(()) => {}
                Err(e @ CommandError::NotInChannel(_)) => output::error(&e.to_string()),
                Err(e) => output::error(&format!("Could not part {channel}: {e}")),
            }
        }
        Ok(())
    }
}

/// `/cycle <channel...>`: part and rejoin.
pub struct CycleChannels;

#[async_trait]
impl Handler for CycleChannels {
    fn name(&self) -> &'static str {
        "CycleChannels"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        if args.is_empty() {
            return Err(CommandError::Usage(NEED_CHANNEL));
        }
        let connection = ctx.connection()?;
        for channel in args {
            if let Err(e) = connection.part(channel, Some(CYCLE_REASON)) {
                output::error(&format!("Could not part {channel}: {e}"));
            }
            if let Err(e) = connection.join(channel) {
                output::error(&format!("Could not join {channel}: {e}"));
            }
        }
        Ok(())
    }
}

/// `/list`: show joined channels.
pub struct ListChannels;

#[async_trait]
impl Handler for ListChannels {
    fn name(&self) -> &'static str {
        "ListChannels"
    }

    async fn handle(&self, ctx: &Context<'_>, _args: &[&str]) -> HandlerResult {
        let channels = ctx.session.joined_channels();
        output::notify(&format!(
            "You are on these channels: {}",
            channels.join(", ")
        ));
        Ok(())
    }
}

/// `/sayall <message...>`
pub struct SendMessageToAll;

#[async_trait]
impl Handler for SendMessageToAll {
    fn name(&self) -> &'static str {
        "SendMessageToAll"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        if args.is_empty() {
            return Err(CommandError::Usage(NEED_MESSAGE));
        }
        let connection = ctx.connection()?;
        let text = args.join(" ");
        for channel in connection.joined_channels() {
            match connection.send(SendType::Message, &channel, &text) {
                Ok(()) => info!(channel = %channel, text = %text, "Sent"),
                Err(e) => output::error(&format!("Could not send to {channel}: {e}")),
            }
        }
        Ok(())
    }
}

/// `/reload`: re-read the config file and re-run auto-op.
pub struct ReloadConfig;

#[async_trait]
impl Handler for ReloadConfig {
    fn name(&self) -> &'static str {
        "ReloadConfig"
    }

    async fn handle(&self, ctx: &Context<'_>, _args: &[&str]) -> HandlerResult {
        output::notify("Reloading config.");
        let trusted = ctx.session.reload().await?;

        output::notify("Config reloaded:");
        output::notify("\tAuto ops:");
        for entry in trusted.sorted() {
            output::notify(&format!("\t\t{entry}"));
        }

        if let Some(auto_op) = ctx.session.auto_op() {
            auto_op.op_all();
        }
        Ok(())
    }
}

/// `/help`
pub struct PrintHelp;

#[async_trait]
impl Handler for PrintHelp {
    fn name(&self) -> &'static str {
        "PrintHelp"
    }

    async fn handle(&self, ctx: &Context<'_>, _args: &[&str]) -> HandlerResult {
        for line in ctx.registry.help_lines() {
            output::notify(&line);
        }
        Ok(())
    }
}

/// `/nick <name>`
pub struct ChangeName;

#[async_trait]
impl Handler for ChangeName {
    fn name(&self) -> &'static str {
        "ChangeName"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        let [nick] = args else {
            return Err(CommandError::Usage(NEED_ONE_NAME));
        };
        ctx.connection()?.change_nick(nick)?;
        Ok(())
    }
}

/// `/op` runs auto-op everywhere; `/op <channel> <nick>` ops one user.
pub struct OpUser;

#[async_trait]
impl Handler for OpUser {
    fn name(&self) -> &'static str {
        "OpUser"
    }

    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        match args {
            [] => {
                let auto_op = ctx.session.auto_op().ok_or(CommandError::NotConnected)?;
                let granted = auto_op.op_all();
                info!(granted, "Manual auto-op pass");
                Ok(())
            }
            [channel, nick] => {
                let connection = ctx.connection()?;
                require_joined(connection.as_ref(), channel)?;
                connection.op(channel, nick)?;
                Ok(())
            }
            _ => Err(CommandError::Usage(NEED_CHANNEL_AND_NICK)),
        }
    }
}

/// `/quit`
pub struct Quit;

#[async_trait]
impl Handler for Quit {
    fn name(&self) -> &'static str {
        "Quit"
    }

    async fn handle(&self, ctx: &Context<'_>, _args: &[&str]) -> HandlerResult {
        info!("Quit requested from console");
        ctx.session.request_quit();
        Ok(())
    }
}
