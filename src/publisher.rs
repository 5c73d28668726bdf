//! Queue handoff for canonical events.
//!
//! [`QueuePublisher`] serializes a [`CanonicalEvent`] and hands it to a
//! [`QueueClient`] under a queue name resolved once at construction. Delivery
//! guarantees (retries, acknowledgements) belong to the client.

use crate::{
    error::{BoxError, PublishError, PublishErrorKind},
    event::CanonicalEvent,
};
use std::{future::Future, sync::Arc};
use tokio::sync::mpsc;
use tracing::debug;

/// The external queue collaborator.
///
/// Shared by every in-flight delivery, so implementations must be safe for
/// concurrent use.
pub trait QueueClient: Send + Sync {
    /// Enqueues `body` on `queue_name`.
    fn send_message(
        &self,
        body: String,
        queue_name: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<Q: QueueClient> QueueClient for Arc<Q> {
    fn send_message(
        &self,
        body: String,
        queue_name: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).send_message(body, queue_name)
    }
}

/// Publishes canonical events to one queue.
#[derive(Clone, Debug)]
pub struct QueuePublisher<Q> {
    client: Q,
    queue_name: String,
}

impl<Q: QueueClient> QueuePublisher<Q> {
    pub fn new(client: Q, queue_name: impl Into<String>) -> Self {
        Self {
            client,
            queue_name: queue_name.into(),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Serializes and enqueues one event. Either failure is returned as is.
    pub async fn publish(&self, event: &CanonicalEvent) -> Result<(), PublishError> {
        let body = serde_json::to_string(event).map_err(|err| self.error(err.into()))?;

        debug!(
            queue_name = %self.queue_name,
            event_type = %event.event_type(),
            size_bytes = body.len(),
            "Publishing canonical event"
        );

        self.client
            .send_message(body, &self.queue_name)
            .await
            .map_err(|err| self.error(PublishErrorKind::Send(err)))
    }

    fn error(&self, kind: PublishErrorKind) -> PublishError {
        PublishError {
            queue_name: self.queue_name.clone(),
            kind,
        }
    }
}

/// A message handed to a [`ChannelQueue`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QueuedMessage {
    pub queue_name: String,
    pub body: String,
}

/// An in-process queue backed by an unbounded channel.
///
/// Sending fails once the receiving half is dropped.
#[derive(Clone, Debug)]
pub struct ChannelQueue {
    sender: mpsc::UnboundedSender<QueuedMessage>,
}

impl ChannelQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QueuedMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl QueueClient for ChannelQueue {
    fn send_message(
        &self,
        body: String,
        queue_name: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        let sent = self
            .sender
            .send(QueuedMessage {
                queue_name: queue_name.to_owned(),
                body,
            })
            .map_err(BoxError::from);
        std::future::ready(sent)
    }
}
