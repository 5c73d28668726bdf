//! Canonical Event Model
//!
//! Every delivery is normalized into one or more [`CanonicalEvent`]s. A
//! canonical event is queue-ready: it serializes to the JSON shape downstream
//! consumers read, e.g. for a template quality update:
//!
//! ```json
//! {
//!   "wabaId": "W1",
//!   "webhookTriggeredTimestamp": "1000",
//!   "type": "MESSAGE_TEMPLATE_QUALITY_UPDATE",
//!   "templateInfo": {
//!     "templateId": "T1",
//!     "templateName": "promo",
//!     "templateLanguage": "en_US",
//!     "qualityUpdate": {
//!       "previousQualityScore": "GREEN",
//!       "newQualityScore": "RED"
//!     }
//!   }
//! }
//! ```
//!
//! The type-specific details ([`TemplateInfo`] or [`MessagesDetails`]) live in
//! [`EventDetails`], so an event can only ever carry the details matching its
//! [`EventType`].

use crate::{
    message::{Message, Received},
    rest::{deserialize_string_opt, Nullable},
};
use serde::{Deserialize, Serialize};

wire_enum! {
    /// The closed set of event kinds this crate normalizes.
    pub enum EventType {
        /// A message template's quality rating changed.
        MessageTemplateQualityUpdate => "MESSAGE_TEMPLATE_QUALITY_UPDATE",
        /// Inbound user messages.
        Messages => "MESSAGES",
    }
}

impl EventType {
    /// The webhook `field` this event type is registered under.
    pub fn field(&self) -> &'static str {
        match self {
            EventType::MessageTemplateQualityUpdate => "message_template_quality_update",
            EventType::Messages => "messages",
        }
    }

    /// Resolves a webhook change `field` to its event type.
    pub fn from_field(field: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.field() == field)
    }
}

/// The normalized, queue-ready record produced from a delivery.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Correlation id: the WhatsApp Business Account the change belongs to.
    #[serde(default)]
    pub waba_id: Option<String>,

    /// When the webhook was triggered, as a string of epoch seconds. Also
    /// read from a bare number.
    #[serde(default, deserialize_with = "deserialize_string_opt")]
    pub webhook_triggered_timestamp: Option<String>,

    /// The type tag and its matching details.
    #[serde(flatten)]
    pub details: EventDetails,
}

impl CanonicalEvent {
    pub fn event_type(&self) -> EventType {
        match self.details {
            EventDetails::MessageTemplateQualityUpdate { .. } => {
                EventType::MessageTemplateQualityUpdate
            }
            EventDetails::Messages { .. } => EventType::Messages,
        }
    }

    pub fn template_info(&self) -> Option<&TemplateInfo> {
        match &self.details {
            EventDetails::MessageTemplateQualityUpdate { template_info } => Some(template_info),
            _ => None,
        }
    }

    pub fn messages_details(&self) -> Option<&MessagesDetails> {
        match &self.details {
            EventDetails::Messages { messages_details } => messages_details.as_ref(),
            _ => None,
        }
    }
}

/// Type-specific details of a [`CanonicalEvent`], tagged by `type`.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum EventDetails {
    #[serde(rename = "MESSAGE_TEMPLATE_QUALITY_UPDATE")]
    MessageTemplateQualityUpdate {
        #[serde(rename = "templateInfo", default)]
        template_info: TemplateInfo,
    },

    #[serde(rename = "MESSAGES")]
    Messages {
        #[serde(rename = "messagesDetails", default)]
        messages_details: Option<MessagesDetails>,
    },
}

/// The template whose quality changed.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateInfo {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub template_id: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub template_name: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub template_language: Nullable<String>,
    #[serde(default)]
    pub quality_update: QualityUpdate,
}

/// Previous and new quality rating (e.g. `GREEN`, `YELLOW`, `RED`, `UNKNOWN`).
///
/// Either score may be missing; it is left unset rather than defaulted.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityUpdate {
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub previous_quality_score: Nullable<String>,
    #[serde(default, skip_serializing_if = "Nullable::is_absent")]
    pub new_quality_score: Nullable<String>,
}

impl QualityUpdate {
    /// Neither score was sent.
    pub fn is_empty(&self) -> bool {
        !self.previous_quality_score.is_present() && !self.new_quality_score.is_present()
    }
}

/// The business number messages were sent to, and the messages in order.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessagesDetails {
    #[serde(default)]
    pub business_phone_number_id: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<Received>>,
}

impl MessagesDetails {
    /// The valid messages of the batch, skipping malformed positions.
    pub fn valid_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .flatten()
            .filter_map(Received::message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_keys_resolve() {
        assert_eq!(
            EventType::from_field("message_template_quality_update"),
            Some(EventType::MessageTemplateQualityUpdate)
        );
        assert_eq!(EventType::from_field("messages"), Some(EventType::Messages));
        assert_eq!(EventType::from_field("account_update"), None);
    }

    #[test]
    fn quality_update_event_shape() {
        let event = CanonicalEvent {
            waba_id: Some("W1".into()),
            webhook_triggered_timestamp: Some("1000".into()),
            details: EventDetails::MessageTemplateQualityUpdate {
                template_info: TemplateInfo {
                    template_id: Nullable::Present("T1".into()),
                    template_name: Nullable::Present("promo".into()),
                    template_language: Nullable::Null,
                    quality_update: QualityUpdate {
                        previous_quality_score: Nullable::Present("GREEN".into()),
                        new_quality_score: Nullable::Present("RED".into()),
                    },
                },
            },
        };

        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "wabaId": "W1",
                "webhookTriggeredTimestamp": "1000",
                "type": "MESSAGE_TEMPLATE_QUALITY_UPDATE",
                "templateInfo": {
                    "templateId": "T1",
                    "templateName": "promo",
                    "templateLanguage": null,
                    "qualityUpdate": {
                        "previousQualityScore": "GREEN",
                        "newQualityScore": "RED"
                    }
                }
            })
        );
    }

    #[test]
    fn messages_event_reads_back() {
        let event: CanonicalEvent = serde_json::from_value(json!({
            "wabaId": "W1",
            "webhookTriggeredTimestamp": "42",
            "type": "MESSAGES",
            "messagesDetails": {
                "businessPhoneNumberId": "P1",
                "messages": [
                    { "messageId": "M1", "type": "TEXT", "text": "hi" },
                    null
                ]
            }
        }))
        .unwrap();

        assert_eq!(event.event_type(), EventType::Messages);
        let details = event.messages_details().unwrap();
        assert_eq!(details.business_phone_number_id.as_deref(), Some("P1"));
        assert_eq!(details.messages.as_ref().unwrap().len(), 2);
        assert_eq!(details.valid_messages().count(), 1);
    }

    #[test]
    fn numeric_timestamp_is_read_as_string() {
        let event: CanonicalEvent = serde_json::from_value(json!({
            "webhookTriggeredTimestamp": 1000,
            "type": "MESSAGES",
            "messagesDetails": { "messages": [{ "messageId": "M1", "type": "TEXT", "text": "hi" }] }
        }))
        .unwrap();

        assert_eq!(event.webhook_triggered_timestamp.as_deref(), Some("1000"));
        assert_eq!(event.messages_details().unwrap().valid_messages().count(), 1);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = serde_json::from_value::<CanonicalEvent>(json!({ "type": "ACCOUNT_UPDATE" }));
        assert!(err.is_err());
    }
}
