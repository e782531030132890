//! Chat transport connectivity.
//!
//! The bot only needs to send text back to a conversation; receiving is done
//! by the transport's own event loop, which turns messages into
//! [`InboundMessage`](crate::ingress::InboundMessage)s and hands them to the
//! dispatcher. A Discord implementation using Serenity lives in [`discord`].

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod discord;

/// Errors that can occur while talking to the chat transport.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to send a reply message
    #[error("Cannot send reply")]
    CannotSendReply,
}

/// Outbound side of a chat transport.
#[automock]
#[async_trait]
pub trait ChatConnector: Send + Sync {
    /// Sends `message` to the conversation identified by `recipient_id`.
    async fn send_message(&self, recipient_id: u64, message: &str) -> Result<(), Error>;
}
