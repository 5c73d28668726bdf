//! Error Handling
//!
//! This module defines the crate's error types. The split mirrors how failures
//! are treated downstream: a malformed envelope or a failed queue handoff on the
//! template quality path is fatal for the whole delivery, while problems with a
//! single inbound message are recorded as [`MalformedMessage`] and skipped.

use std::error::Error as StdError;

/// The **top-level error enum** for the `whatsapp-webhook-events` crate.
///
/// It uses `#[non_exhaustive]` to allow for future additions of error variants
/// without breaking client code.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The delivery body was absent, was not valid JSON, or did not match the
    /// expected envelope structure (e.g. a change without a `field`).
    #[error("Malformed webhook envelope: {0}")]
    MalformedEnvelope(#[from] ParseError),

    /// The event type discriminator did not match what the handler expects.
    #[error("Unrecognized event type '{0}'")]
    UnrecognizedEventType(String),

    /// A canonical event could not be serialized or handed to the queue.
    #[error("Failed to publish event: {0}")]
    Publish(#[from] PublishError),

    /// Represents an error occurring while binding or serving the webhook
    /// endpoint.
    #[error("A network error occurred: {0}")]
    Network(BoxError),
}

impl Error {
    pub(crate) fn network(err: impl Into<BoxError>) -> Self {
        Self::Network(err.into())
    }
}

/// Represents an error that occurred during **payload parsing or deserialization**.
///
/// # Fields
/// - `source`: An optional `BoxError` representing the underlying cause of the
///   parsing failure (e.g., a `serde_json::Error`).
/// - `body`: The original raw `String` content that could not be parsed,
///   useful for debugging.
#[derive(thiserror::Error, Debug)]
#[error("Failed to parse the payload body. Raw body content was: '{}'.", body)]
#[non_exhaustive]
pub struct ParseError {
    #[source]
    pub(crate) source: Option<BoxError>,
    pub body: String,
}

impl ParseError {
    pub(crate) fn new(source: impl Into<BoxError>, body: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            body: body.into(),
        }
    }

    /// The delivery carried no body at all.
    pub(crate) fn absent() -> Self {
        Self::new("payload body is absent", "")
    }
}

/// Represents a failure to hand a canonical event to the queue.
#[derive(thiserror::Error, Debug)]
#[error("could not publish to queue '{queue_name}': {kind}")]
#[non_exhaustive]
pub struct PublishError {
    pub queue_name: String,
    #[source]
    pub kind: PublishErrorKind,
}

/// The stage at which publishing failed.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PublishErrorKind {
    /// The event could not be rendered to JSON.
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The queue collaborator rejected or failed the handoff.
    #[error("queue handoff failed: {0}")]
    Send(#[source] BoxError),
}

/// Why a single position in a messages batch could not be dispatched.
///
/// These never fail the batch; the position is skipped with a warning.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum MalformedMessage {
    #[error("message is null")]
    Null,

    #[error("message {id:?} has no type")]
    MissingType { id: Option<String> },

    /// A payload for another message kind is populated.
    #[error("message {id:?} is typed '{tag}' but carries a '{found}' payload")]
    ForeignPayload {
        id: Option<String>,
        tag: String,
        found: &'static str,
    },

    /// The message object did not deserialize.
    #[error("message could not be read: {0}")]
    Invalid(String),
}

/// A wire tag that does not name any known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown tag '{0}'")]
pub struct UnknownTag(pub String);

/// A convenient type alias for a boxed, trait-object error that can be sent across threads.
///
/// This is typically used to erase the concrete type of an error when it needs to be
/// stored or passed up the call stack generically.
pub type BoxError = Box<dyn StdError + Send + Sync>;
