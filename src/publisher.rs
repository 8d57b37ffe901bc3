//! Atomic batch publishing.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::message::Message;
use crate::transport::Transport;
use crate::wire::PubRequest;

/// Outcome of a publish call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublishResult {
    messages_received: i64,
}

impl PublishResult {
    /// Messages the server reports as received.
    pub fn messages_received(&self) -> i64 {
        self.messages_received
    }
}

/// Validates a batch and submits it in a single call.
pub struct BatchPublisher<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> BatchPublisher<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Publish `messages` as one batch.
    ///
    /// The batch must be non-empty and every message needs a topic. Input
    /// is checked before anything goes on the wire, so a bad batch is never
    /// partially submitted.
    pub fn publish(&self, messages: &[Message]) -> Result<PublishResult> {
        validate(messages)?;
        debug!(count = messages.len(), "Publishing batch of messages");

        let request = PubRequest {
            messages: messages.iter().map(Message::to_wire).collect(),
        };
        let response = self
            .transport
            .publish(request)
            .map_err(Error::from_publish_status)?;

        info!(
            received = response.messages_received,
            "Successfully published messages"
        );
        Ok(PublishResult {
            messages_received: response.messages_received,
        })
    }
}

fn validate(messages: &[Message]) -> Result<()> {
    if messages.is_empty() {
        return Err(Error::validation("Messages array cannot be empty"));
    }
    if let Some(index) = messages.iter().position(|m| m.topic().is_empty()) {
        return Err(Error::validation(format!(
            "Message topic is required (message at index {})",
            index
        )));
    }
    Ok(())
}
