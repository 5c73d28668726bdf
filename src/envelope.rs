//! Webhook Envelope
//!
//! The outer structure of a delivery: an `object` marker and a list of
//! entries, each with a list of changes. Each change's `value` is decoded into
//! the shape its `field` selects.
//!
//! ```json
//! {
//!   "object": "whatsapp_business_account",
//!   "entry": [{
//!     "id": "W1",
//!     "time": 1000,
//!     "changes": [{ "field": "message_template_quality_update", "value": { ... } }]
//!   }]
//! }
//! ```

use crate::{
    error::ParseError,
    event::EventType,
    message::Received,
    rest::{deserialize_id, Nullable},
    Timestamp,
};
use serde::{Deserialize, Deserializer};

/// A parsed delivery. Immutable once parsed.
#[derive(Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct WebhookEnvelope {
    /// The subscribed object, `whatsapp_business_account` for WhatsApp.
    #[serde(default)]
    pub object: Option<String>,

    #[serde(rename = "entry")]
    pub entries: Vec<Entry>,
}

impl WebhookEnvelope {
    /// Parses the textual body of a delivery.
    ///
    /// Fails when the body is absent, is not a JSON object, or does not match
    /// the envelope structure. Every change must carry a `field` and a `value`.
    pub fn parse(payload: Option<&str>) -> Result<Self, ParseError> {
        let body = payload.ok_or_else(ParseError::absent)?;
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|err| ParseError::new(err, body))?;

        // serde also reads structs from sequences
        if !value.is_object() {
            return Err(ParseError::new("webhook envelope is not a JSON object", body));
        }

        serde_json::from_value(value).map_err(|err| ParseError::new(err, body))
    }

    /// Every `(entry, change)` pair, in delivery order.
    pub fn changes(&self) -> impl Iterator<Item = (&Entry, &Change)> {
        self.entries
            .iter()
            .flat_map(|entry| entry.changes.iter().map(move |change| (entry, change)))
    }
}

/// One business account's changes.
#[derive(Deserialize, PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Entry {
    /// The WhatsApp Business Account id.
    pub id: String,

    /// When the notification was sent.
    #[serde(default)]
    pub time: Option<Timestamp>,

    pub changes: Vec<Change>,
}

/// One field-level update.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub struct Change {
    pub field: String,
    pub value: ChangeValue,
}

impl Change {
    pub fn event_type(&self) -> Option<EventType> {
        EventType::from_field(&self.field)
    }
}

/// The payload of a [`Change`], shaped by its `field`.
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub enum ChangeValue {
    QualityUpdate(QualityUpdateValue),
    Messaging(MessagingValue),
    /// A field this crate does not normalize. Kept verbatim.
    Other(serde_json::Value),
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error as _;

        #[derive(Deserialize)]
        struct RawChange {
            field: String,
            value: serde_json::Value,
        }

        let RawChange { field, value } = RawChange::deserialize(deserializer)?;

        let value = match EventType::from_field(&field) {
            Some(EventType::MessageTemplateQualityUpdate) => {
                ChangeValue::QualityUpdate(serde_json::from_value(value).map_err(D::Error::custom)?)
            }
            Some(EventType::Messages) => {
                ChangeValue::Messaging(serde_json::from_value(value).map_err(D::Error::custom)?)
            }
            None => ChangeValue::Other(value),
        };

        Ok(Change { field, value })
    }
}

/// The value of a `message_template_quality_update` change.
///
/// Every field may be missing or `null`, and the two are kept apart.
#[derive(Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct QualityUpdateValue {
    #[serde(default, alias = "previous_quality_score")]
    pub previous_quality_score: Nullable<String>,
    #[serde(default, alias = "new_quality_score")]
    pub new_quality_score: Nullable<String>,
    #[serde(
        default,
        alias = "message_template_id",
        deserialize_with = "deserialize_id"
    )]
    pub message_template_id: Nullable<String>,
    #[serde(default, alias = "message_template_name")]
    pub message_template_name: Nullable<String>,
    #[serde(default, alias = "message_template_language")]
    pub message_template_language: Nullable<String>,
}

/// The value of a `messages` change.
#[derive(Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct MessagingValue {
    #[serde(default, alias = "business_phone_number_id")]
    pub business_phone_number_id: Nullable<String>,

    /// Meta's form: the receiving business number.
    #[serde(default)]
    pub metadata: Option<PhoneMetadata>,

    #[serde(default)]
    pub messages: Option<Vec<Received>>,
}

impl MessagingValue {
    /// The receiving business number, from either wire form.
    pub fn business_phone_number_id(&self) -> Option<&str> {
        self.business_phone_number_id.as_option().map(String::as_str).or_else(|| {
            self.metadata
                .as_ref()
                .and_then(|metadata| metadata.phone_number_id.as_deref())
        })
    }
}

#[derive(Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct PhoneMetadata {
    #[serde(default)]
    pub display_phone_number: Option<String>,
    #[serde(default)]
    pub phone_number_id: Option<String>,
}
