//! Console command registry and dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::commands::{
    ChangeName, CycleChannels, JoinChannels, ListChannels, OpUser, PartChannels, PrintHelp, Quit,
    ReloadConfig, SendAction, SendMessage, SendMessageToAll,
};
use crate::error::{CommandError, HandlerResult};
use crate::network::Connection;
use crate::session::Session;

/// What a handler gets to work with.
pub struct Context<'a> {
    pub session: &'a Arc<Session>,
    pub registry: &'a Registry,
}

impl Context<'_> {
    /// The live connection, or [`CommandError::NotConnected`].
    pub fn connection(&self) -> Result<Arc<dyn Connection>, CommandError> {
        self.session.connection().ok_or(CommandError::NotConnected)
    }
}

/// A console command.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name shown by `/help`.
    fn name(&self) -> &'static str;

    /// Run the command. `args` are the space-separated words after the
    /// command itself.
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult;
}

/// Alias table. Each handler is registered once under all of its aliases.
pub struct Registry {
    handlers: Vec<(Vec<&'static str>, Box<dyn Handler>)>,
    aliases: HashMap<&'static str, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a registry with every console command.
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: Vec::new(),
            aliases: HashMap::new(),
        };

        registry.register(&["/say"], SendMessage);
        registry.register(&["/me"], SendAction);
        registry.register(&["/join", "/j"], JoinChannels);
        registry.register(&["/part", "/p"], PartChannels);
        registry.register(&["/cycle", "/c"], CycleChannels);
        registry.register(&["/list", "/ls", "/l", "/listchannels"], ListChannels);
        registry.register(&["/sayall"], SendMessageToAll);
        registry.register(&["/reload"], ReloadConfig);
        registry.register(&["/help"], PrintHelp);
        registry.register(&["/nick"], ChangeName);
        registry.register(&["/op"], OpUser);
        registry.register(&["/quit", "/q"], Quit);

        registry
    }

    fn register(&mut self, aliases: &[&'static str], handler: impl Handler + 'static) {
        let index = self.handlers.len();
        for alias in aliases {
            self.aliases.insert(*alias, index);
        }
        self.handlers.push((aliases.to_vec(), Box::new(handler)));
    }

    /// Look up a handler by alias. Aliases are matched exactly.
    pub fn get(&self, command: &str) -> Option<&dyn Handler> {
        self.aliases
            .get(command)
            .map(|&index| self.handlers[index].1.as_ref())
    }

    /// One line per handler: `aliases - HandlerName`, in registration order.
    pub fn help_lines(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|(aliases, handler)| format!("{} - {}", aliases.join(", "), handler.name()))
            .collect()
    }
}
