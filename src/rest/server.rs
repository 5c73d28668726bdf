use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use std::{borrow::Cow, collections::HashMap, sync::Arc};
use tracing::{error, info, warn};

use crate::{
    dispatch::MessageHandler,
    envelope::WebhookEnvelope,
    event::EventType,
    handler::{Delivery, Handlers},
    normalize::messaging_events,
    publisher::QueueClient,
};

/// Header carrying the delivery-level timestamp, in epoch seconds.
pub(crate) const DELIVERY_TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// Shared state of the webhook routes.
/// This struct is used by both the high-level server and the low-level service.
pub(crate) struct InnerServer<Q, M> {
    pub(crate) handlers: Handlers<Q, M>,
    pub(crate) verify_token: Option<String>,
}

// Subscription handshake
pub(crate) async fn handle_verification<Q, M>(
    State(state): State<Arc<InnerServer<Q, M>>>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Cow<'static, str>) {
    let Some(verify_token) = &state.verify_token else {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            "GET method not supported without a verify_token configured.".into(),
        );
    };

    let received = query.get("hub.verify_token").map(String::as_str);
    if received == Some(verify_token.as_str()) {
        let challenge = query.get("hub.challenge").cloned().unwrap_or_default();
        info!("Webhook subscription verified");
        (StatusCode::OK, challenge.into())
    } else {
        warn!(
            received = ?received,
            "Invalid verification token"
        );
        (StatusCode::FORBIDDEN, "Invalid verification token".into())
    }
}

// Webhook handler
pub(crate) async fn handle_webhook<Q, M>(
    State(state): State<Arc<InnerServer<Q, M>>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Cow<'static, str>)
where
    Q: QueueClient,
    M: MessageHandler,
{
    let scan = match serde_json::from_slice::<FieldScan>(&body) {
        Ok(scan) => scan,
        Err(err) => {
            warn!(error = %err, "Rejecting unparsable webhook body");
            return (
                StatusCode::BAD_REQUEST,
                "Invalid JSON payload. \
                 Please ensure the body is a webhook envelope."
                    .into(),
            );
        }
    };

    let event_types = scan.event_types();
    if event_types.is_empty() {
        info!("Webhook delivery carries no change with a registered handler");
        return (StatusCode::OK, "".into());
    }

    let delivered_at = delivery_timestamp(&headers);
    let payload = String::from_utf8_lossy(&body).into_owned();

    // Quality updates go first: on failure the whole delivery is redelivered,
    // so its messages are left for that attempt.
    if event_types.contains(&EventType::MessageTemplateQualityUpdate) {
        let delivery = Delivery {
            payload: Some(payload.clone()),
            timestamp: delivered_at,
        };

        if let Err(err) = state
            .handlers
            .dispatch(EventType::MessageTemplateQualityUpdate, delivery)
            .await
        {
            error!(error = %err, "Template quality update delivery failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process webhook event \
                 due to an internal server error. Check server logs for details."
                    .into(),
            );
        }
    }

    if event_types.contains(&EventType::Messages) {
        handle_messages(&state.handlers, &payload, delivered_at).await;
    }

    (StatusCode::OK, "".into())
}

/// Best-effort: every failure is logged and the delivery still succeeds.
async fn handle_messages<Q, M>(handlers: &Handlers<Q, M>, payload: &str, delivered_at: Option<i64>)
where
    Q: QueueClient,
    M: MessageHandler,
{
    let envelope = match WebhookEnvelope::parse(Some(payload)) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(error = %err, "Skipping malformed messages delivery");
            return;
        }
    };

    for event in messaging_events(&envelope, delivered_at) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(waba_id = ?event.waba_id, error = %err, "Could not serialize messages event");
                continue;
            }
        };

        let delivery = Delivery {
            payload: Some(payload),
            timestamp: delivered_at,
        };
        if let Err(err) = handlers.dispatch(EventType::Messages, delivery).await {
            warn!(waba_id = ?event.waba_id, error = %err, "Messages handler reported an error");
        }
    }
}

fn delivery_timestamp(headers: &HeaderMap) -> Option<i64> {
    let value = headers.get(DELIVERY_TIMESTAMP_HEADER)?;
    match value.to_str().ok().and_then(|v| v.trim().parse().ok()) {
        Some(seconds) => Some(seconds),
        None => {
            warn!(value = ?value, "Ignoring unreadable delivery timestamp header");
            None
        }
    }
}

/// Just enough of the envelope to pick a handler.
#[derive(Deserialize, Debug)]
struct FieldScan {
    entry: Vec<ScanEntry>,
}

#[derive(Deserialize, Debug)]
struct ScanEntry {
    changes: Vec<ScanChange>,
}

#[derive(Deserialize, Debug)]
struct ScanChange {
    field: String,
}

impl FieldScan {
    fn fields(&self) -> impl Iterator<Item = &str> {
        self.entry
            .iter()
            .flat_map(|entry| &entry.changes)
            .map(|change| change.field.as_str())
    }

    /// Every registered event type the delivery carries, in order of first
    /// appearance. Unregistered fields are logged and left out.
    fn event_types(&self) -> Vec<EventType> {
        let mut found = Vec::new();
        for field in self.fields() {
            match EventType::from_field(field) {
                Some(event_type) if !found.contains(&event_type) => found.push(event_type),
                Some(_) => {}
                None => info!(field = %field, "Ignoring webhook field with no registered handler"),
            }
        }
        found
    }
}
