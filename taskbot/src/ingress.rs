//! Inbound message handling.
//!
//! Every command is dispatched as its own tokio task, so one user's slow store
//! call never holds up another reply. Consecutive commands of the same user
//! are not ordered either: they run fully concurrently.

use crate::commands::CommandRouter;
use crate::connectors::ChatConnector;
use crate::task_store::TaskStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, error, info_span};

/// A command received from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InboundMessage {
    /// Conversation the reply goes to
    pub chat_id: u64,
    /// Stable identifier of the sender, used as the user document key
    pub sender_id: u64,
    /// Display name of the sender, may be empty
    pub sender_name: String,
    /// Command keyword without the prefix
    pub command: String,
    /// Everything after the keyword
    pub arguments: String,
}

impl InboundMessage {
    /// Parses `content` as `<prefix><command> <arguments>`.
    ///
    /// Returns `None` for text that is not a command.
    pub fn parse(
        prefix: &str,
        chat_id: u64,
        sender_id: u64,
        sender_name: impl Into<String>,
        content: &str,
    ) -> Option<Self> {
        let body = content.trim_start().strip_prefix(prefix)?;
        let (command, arguments) = match body.split_once(char::is_whitespace) {
            Some((command, arguments)) => (command, arguments.trim()),
            None => (body.trim_end(), ""),
        };
        if command.is_empty() {
            return None;
        }
        Some(Self {
            chat_id,
            sender_id,
            sender_name: sender_name.into(),
            command: command.to_string(),
            arguments: arguments.to_string(),
        })
    }
}

/// Fans inbound messages out to concurrent command units.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<CommandRouter>,
    store: Arc<dyn TaskStore>,
    connector: Arc<dyn ChatConnector>,
}

impl Dispatcher {
    pub fn new(
        router: Arc<CommandRouter>,
        store: Arc<dyn TaskStore>,
        connector: Arc<dyn ChatConnector>,
    ) -> Self {
        Self {
            router,
            store,
            connector,
        }
    }

    pub fn prefix(&self) -> &str {
        self.router.prefix()
    }

    /// Starts handling `message` and returns the handle of its command unit.
    ///
    /// Making sure the user document exists runs on a separate task that
    /// nothing waits for.
    pub fn dispatch(&self, message: InboundMessage) -> JoinHandle<()> {
        let store = self.store.clone();
        let user_id = message.sender_id.to_string();
        let username = message.sender_name.clone();
        tokio::spawn(async move { store.ensure_user_exists(&user_id, &username).await });

        let router = self.router.clone();
        let connector = self.connector.clone();
        let span = info_span!("command", chat_id = message.chat_id, user_id = message.sender_id);
        tokio::spawn(
            async move {
                let reply = router.route(&message).await;
                if let Err(e) = connector.send_message(message.chat_id, &reply).await {
                    error!("Failed to send reply: {e}");
                }
            }
            .instrument(span),
        )
    }
}
