//! Handler registry.
//!
//! Each [`EventType`] has exactly one handler. [`Handlers`] holds both and
//! routes a [`Delivery`] to the one registered for its type. The two handlers
//! differ in how they fail:
//!
//! - [`QualityUpdateHandler`] is all-or-nothing. A parse or publish failure is
//!   returned so the caller can have the delivery sent again.
//! - [`MessagesHandler`] is best-effort. Everything is logged and recovered
//!   locally and it always reports success.

use crate::{
    dispatch::{dispatch_messages, MessageHandler},
    envelope::WebhookEnvelope,
    error::Error,
    event::EventType,
    normalize::{messages_event, quality_update_events},
    publisher::{QueueClient, QueuePublisher},
};
use futures::FutureExt as _;
use std::{future::Future, panic::AssertUnwindSafe};
use tracing::{error, info, warn};

/// One delivery as handed over by the ingress.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Delivery {
    /// The raw body.
    pub payload: Option<String>,
    /// Delivery-level timestamp, in epoch seconds.
    pub timestamp: Option<i64>,
}

impl Delivery {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            timestamp: None,
        }
    }

    /// A delivery without a body.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_timestamp(mut self, seconds: i64) -> Self {
        self.timestamp = Some(seconds);
        self
    }
}

/// Consumes deliveries of one event type.
pub trait EventHandler: Send + Sync {
    /// The type this handler is registered under.
    const EVENT_TYPE: EventType;

    fn handle(&self, delivery: Delivery) -> impl Future<Output = Result<(), Error>> + Send;
}

/// Normalizes template quality updates and publishes each event.
#[derive(Clone, Debug)]
pub struct QualityUpdateHandler<Q> {
    publisher: QueuePublisher<Q>,
}

impl<Q: QueueClient> QualityUpdateHandler<Q> {
    pub fn new(publisher: QueuePublisher<Q>) -> Self {
        Self { publisher }
    }
}

impl<Q: QueueClient> EventHandler for QualityUpdateHandler<Q> {
    const EVENT_TYPE: EventType = EventType::MessageTemplateQualityUpdate;

    /// Publishing stops at the first failure.
    async fn handle(&self, delivery: Delivery) -> Result<(), Error> {
        let envelope = WebhookEnvelope::parse(delivery.payload.as_deref())?;
        let events = quality_update_events(&envelope, delivery.timestamp);

        for event in &events {
            self.publisher.publish(event).await?;
            info!(
                queue_name = %self.publisher.queue_name(),
                waba_id = ?event.waba_id,
                "Queued template quality update"
            );
        }

        Ok(())
    }
}

/// Reads canonical MESSAGES events and dispatches their messages by kind.
#[derive(Clone, Debug)]
pub struct MessagesHandler<M> {
    message_handler: M,
}

impl<M: MessageHandler> MessagesHandler<M> {
    pub fn new(message_handler: M) -> Self {
        Self { message_handler }
    }

    async fn process(&self, delivery: Delivery) {
        let event = match messages_event(&delivery) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "Skipping messages delivery");
                return;
            }
        };

        let Some(details) = event.messages_details() else {
            warn!(waba_id = ?event.waba_id, "Messages event carries no details");
            return;
        };

        let dispatched = dispatch_messages(&self.message_handler, details).await;
        info!(
            waba_id = ?event.waba_id,
            webhook_triggered_timestamp = ?event.webhook_triggered_timestamp,
            dispatched,
            "Processed messages"
        );
    }
}

impl<M: MessageHandler> EventHandler for MessagesHandler<M> {
    const EVENT_TYPE: EventType = EventType::Messages;

    /// Never fails. A panic inside a message arm is logged and contained.
    async fn handle(&self, delivery: Delivery) -> Result<(), Error> {
        if AssertUnwindSafe(self.process(delivery))
            .catch_unwind()
            .await
            .is_err()
        {
            error!("Message processing panicked; batch abandoned");
        }

        Ok(())
    }
}

/// The closed mapping from [`EventType`] to its handler.
#[derive(Clone, Debug)]
pub struct Handlers<Q, M> {
    pub quality_updates: QualityUpdateHandler<Q>,
    pub messages: MessagesHandler<M>,
}

impl<Q: QueueClient, M: MessageHandler> Handlers<Q, M> {
    pub fn new(publisher: QueuePublisher<Q>, message_handler: M) -> Self {
        Self {
            quality_updates: QualityUpdateHandler::new(publisher),
            messages: MessagesHandler::new(message_handler),
        }
    }

    /// Routes the delivery to the handler registered for `event_type`.
    pub async fn dispatch(&self, event_type: EventType, delivery: Delivery) -> Result<(), Error> {
        match event_type {
            EventType::MessageTemplateQualityUpdate => self.quality_updates.handle(delivery).await,
            EventType::Messages => self.messages.handle(delivery).await,
        }
    }
}
