#![deny(clippy::future_not_send)]

//! # whatsapp_webhook_events
//!
//! Normalization and dispatch for WhatsApp Business Platform webhook deliveries.
//!
//! A delivery from Meta carries one or more *entries* (one per business account),
//! each holding one or more *changes*. This crate turns those heterogeneous,
//! partially-populated payloads into a small canonical event model and routes
//! each event to where it belongs:
//!
//! - **Business events** (message template quality updates) are serialized and
//!   handed to a queue through a [`QueueClient`].
//! - **Inbound user messages** are dispatched per message kind (text, media,
//!   location, interactive replies, orders, ...) to a [`MessageHandler`], whose
//!   default arms emit structured logs.
//!
//! ## ✨ Features
//!
//! - **Canonical event model**: [`CanonicalEvent`] with mutually exclusive
//!   template / messages details, selected by [`EventType`].
//! - **Envelope parsing**: [`WebhookEnvelope::parse`] preserves the difference
//!   between a field that is missing and one that is `null` (see [`Nullable`]).
//! - **Tagged messages**: [`Message`] holds exactly one [`MessageKind`] payload,
//!   so a message typed `audio` carrying an image is unrepresentable.
//! - **Handler registry**: [`Handlers`] maps each [`EventType`] to its handler.
//! - **Webhook server**: [`Server`] and [`WebhookService`] for receiving
//!   deliveries over HTTP.
//!
//! ## 🚀 Examples
//!
//! ---
//!
//! ### Route a quality update to a queue
//! ```rust,no_run
//! use whatsapp_webhook_events::{
//!     ChannelQueue, Delivery, EventType, Handlers, LoggingHandler, QueuePublisher,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (queue, mut received) = ChannelQueue::new();
//! let handlers = Handlers::new(
//!     QueuePublisher::new(queue, "template-quality-updates"),
//!     LoggingHandler,
//! );
//!
//! let body = r#"{"entry":[{"id":"W1","time":1000,"changes":[{
//!     "field":"message_template_quality_update",
//!     "value":{"previousQualityScore":"GREEN","newQualityScore":"RED"}}]}]}"#;
//!
//! handlers
//!     .dispatch(EventType::MessageTemplateQualityUpdate, Delivery::new(body))
//!     .await?;
//!
//! let queued = received.recv().await.unwrap();
//! println!("{} -> {}", queued.queue_name, queued.body);
//! # Ok(()) }
//! ```
//!
//! ---
//!
//! ### React to inbound messages
//! ```rust,no_run
//! use whatsapp_webhook_events::{
//!     dispatch::{InboundContext, MessageHandler},
//!     message::Audio,
//! };
//!
//! struct VoiceNotes;
//!
//! impl MessageHandler for VoiceNotes {
//!     async fn on_audio(&self, ctx: InboundContext<'_>, audio: &Audio) {
//!         if audio.is_voice_recording == Some(true) {
//!             println!("voice note {:?} from {:?}", audio.id, ctx.message.from);
//!         }
//!     }
//! }
//! ```
//!
//! ---
//!
//! ### Serve the webhook
//! ```rust,no_run
//! use whatsapp_webhook_events::{
//!     Handlers, HttpQueueClient, LoggingHandler, QueuePublisher, Server,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = HttpQueueClient::new("http://localhost:9324")?;
//! let handlers = Handlers::new(
//!     QueuePublisher::new(queue, "template-quality-updates"),
//!     LoggingHandler,
//! );
//!
//! Server::builder()
//!     .endpoint("127.0.0.1:8080".parse().unwrap())
//!     .verify_token("very_secret")
//!     .build()
//!     .serve(handlers)
//!     .await?;
//! # Ok(()) }
//! ```

#[macro_use]
mod rest;
pub mod config;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod event;
pub mod handler;
pub mod message;
pub mod normalize;
pub mod publisher;
pub mod server;
pub mod telemetry;
pub mod webhook_service;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Represents a timestamp sent by the WhatsApp Business Platform.
///
/// Meta uses UNIX timestamps (`seconds since epoch`) in webhook payloads,
/// sometimes as a JSON number and sometimes as a numeric string. Both forms
/// are accepted.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Timestamp {
    pub(crate) inner: i64,
}

impl Timestamp {
    /// Creates a timestamp from raw seconds.
    pub fn from_seconds(seconds: i64) -> Self {
        Self { inner: seconds }
    }

    /// Returns the raw timestamp in seconds.
    pub fn seconds(&self) -> i64 {
        self.inner
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rest::deserialize_str::<i64, D>(deserializer).map(Timestamp::from_seconds)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.inner)
    }
}

pub use crate::config::Settings;
pub use dispatch::{LoggingHandler, MessageHandler};
pub use envelope::WebhookEnvelope;
pub use error::Error;
pub use event::{CanonicalEvent, EventType};
pub use handler::{Delivery, EventHandler, Handlers};
pub use message::{Message, MessageKind};
pub use publisher::{ChannelQueue, QueueClient, QueuePublisher};
pub use rest::client::{HttpQueueClient, HttpQueueClientBuilder};
pub use rest::Nullable;
pub use server::Server;
pub use webhook_service::WebhookService;
