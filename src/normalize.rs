//! Event normalizers: from a parsed envelope (or a canonical body) to
//! [`CanonicalEvent`]s.
//!
//! Timestamp policy, shared by every normalizer: the delivery-level timestamp
//! always wins when present, otherwise the one carried in the body is kept.

use crate::{
    envelope::{ChangeValue, Entry, MessagingValue, QualityUpdateValue, WebhookEnvelope},
    error::{Error, ParseError},
    event::{CanonicalEvent, EventDetails, EventType, MessagesDetails, QualityUpdate, TemplateInfo},
    handler::Delivery,
    rest::or_null,
    Timestamp,
};
use tracing::{debug, info, warn};

/// `delivered_at` when present, else the body's own timestamp.
pub fn resolve_timestamp(delivered_at: Option<i64>, fallback: Option<Timestamp>) -> Option<String> {
    delivered_at
        .map(|seconds| seconds.to_string())
        .or_else(|| fallback.map(|time| time.to_string()))
}

/// One template quality event per `(entry, change)` pair of the envelope.
///
/// Changes under any other field are skipped with a warning.
pub fn quality_update_events(
    envelope: &WebhookEnvelope,
    delivered_at: Option<i64>,
) -> Vec<CanonicalEvent> {
    envelope
        .changes()
        .filter_map(|(entry, change)| match &change.value {
            ChangeValue::QualityUpdate(value) => {
                Some(quality_update_event(entry, value, delivered_at))
            }
            _ => {
                warn!(
                    waba_id = %entry.id,
                    field = %change.field,
                    "Skipping change that is not a template quality update"
                );
                None
            }
        })
        .collect()
}

fn quality_update_event(
    entry: &Entry,
    value: &QualityUpdateValue,
    delivered_at: Option<i64>,
) -> CanonicalEvent {
    let quality_update = QualityUpdate {
        previous_quality_score: value.previous_quality_score.clone(),
        new_quality_score: value.new_quality_score.clone(),
    };

    if quality_update.is_empty() {
        debug!(waba_id = %entry.id, "Quality update carries no scores");
    }

    let template_info = TemplateInfo {
        template_id: value.message_template_id.clone(),
        template_name: value.message_template_name.clone(),
        template_language: value.message_template_language.clone(),
        quality_update,
    };

    let event = CanonicalEvent {
        waba_id: Some(entry.id.clone()),
        webhook_triggered_timestamp: resolve_timestamp(delivered_at, entry.time),
        details: EventDetails::MessageTemplateQualityUpdate { template_info },
    };

    info!(
        waba_id = %entry.id,
        template_id = %value.message_template_id,
        template_name = %value.message_template_name,
        template_language = %value.message_template_language,
        previous_quality_score = %value.previous_quality_score,
        new_quality_score = %value.new_quality_score,
        webhook_triggered_timestamp = %or_null(event.webhook_triggered_timestamp.as_deref()),
        "Normalized template quality update"
    );

    event
}

/// One MESSAGES event per `(entry, messages change)` pair of the envelope.
///
/// Changes under any other field are ignored.
pub fn messaging_events(
    envelope: &WebhookEnvelope,
    delivered_at: Option<i64>,
) -> Vec<CanonicalEvent> {
    envelope
        .changes()
        .filter_map(|(entry, change)| match &change.value {
            ChangeValue::Messaging(value) => Some(messaging_event(entry, value, delivered_at)),
            _ => None,
        })
        .collect()
}

fn messaging_event(
    entry: &Entry,
    value: &MessagingValue,
    delivered_at: Option<i64>,
) -> CanonicalEvent {
    let messages_details = MessagesDetails {
        business_phone_number_id: value.business_phone_number_id().map(str::to_owned),
        messages: value.messages.clone(),
    };

    debug!(
        waba_id = %entry.id,
        business_phone_number_id = %or_null(messages_details.business_phone_number_id.as_deref()),
        messages = messages_details.messages.as_ref().map_or(0, Vec::len),
        "Normalized messages change"
    );

    CanonicalEvent {
        waba_id: Some(entry.id.clone()),
        webhook_triggered_timestamp: resolve_timestamp(delivered_at, entry.time),
        details: EventDetails::Messages {
            messages_details: Some(messages_details),
        },
    }
}

/// Reads a canonical MESSAGES event straight from a delivery body.
///
/// The delivery timestamp, when present, overwrites the one in the body.
pub fn messages_event(delivery: &Delivery) -> Result<CanonicalEvent, Error> {
    let body = delivery.payload.as_deref().ok_or_else(ParseError::absent)?;

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| ParseError::new(err, body))?;

    match value.get("type").and_then(serde_json::Value::as_str) {
        Some(tag) if tag == EventType::Messages.as_str() => {}
        tag => return Err(Error::UnrecognizedEventType(or_null(tag).to_string())),
    }

    let mut event: CanonicalEvent =
        serde_json::from_value(value).map_err(|err| ParseError::new(err, body))?;

    if let Some(seconds) = delivery.timestamp {
        event.webhook_triggered_timestamp = Some(seconds.to_string());
    }

    Ok(event)
}
