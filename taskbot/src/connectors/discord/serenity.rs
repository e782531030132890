//! Serenity-based implementation of Discord connectivity.

use crate::connectors::discord::{MESSAGE_LIMIT, split_message};
use crate::connectors::{ChatConnector, Error};
use crate::ingress::{Dispatcher, InboundMessage};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{debug, warn};

/// Discord connector sending replies through the Serenity HTTP client.
#[derive(Clone)]
pub struct SerenityChatConnector {
    http: Arc<serenity::Http>,
}

impl SerenityChatConnector {
    /// Creates a new SerenityChatConnector instance.
    ///
    /// # Arguments
    ///
    /// * `http` - HTTP client of the running Serenity client
    pub fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChatConnector for SerenityChatConnector {
    async fn send_message(&self, recipient_id: u64, message: &str) -> Result<(), Error> {
        let channel = serenity::ChannelId::new(recipient_id);
        for chunk in split_message(message, MESSAGE_LIMIT) {
            if let Err(e) = channel.say(self.http.as_ref(), chunk).await {
                warn!("Discord rejected message to channel {recipient_id}: {e}");
                return Err(Error::CannotSendReply);
            }
        }
        Ok(())
    }
}

/// State shared with the Poise framework
pub struct Data {
    pub dispatcher: Dispatcher,
}

/// Hands a created message to the dispatcher if it is a command from a human.
pub fn on_message_create(data: &Data, message: &serenity::Message) {
    if message.author.bot {
        return;
    }
    let sender_name = message
        .author
        .global_name
        .clone()
        .unwrap_or_else(|| message.author.name.clone());
    let Some(inbound) = InboundMessage::parse(
        data.dispatcher.prefix(),
        message.channel_id.get(),
        message.author.id.get(),
        sender_name,
        &message.content,
    ) else {
        return;
    };
    debug!("Dispatching '{}' from {}", inbound.command, inbound.sender_id);
    data.dispatcher.dispatch(inbound);
}
