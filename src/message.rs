//! Inbound WhatsApp Message Types
//!
//! This module defines the strongly-typed representation of messages users send
//! to a business, as carried in a MESSAGES event.
//!
//! ## Key Types
//!
//! - [`Message`]: one inbound message. Its metadata (`id`, `from`, `timestamp`,
//!   reply `context`, ad `referral`) sits next to exactly one [`MessageKind`].
//! - [`MessageKind`]: a tagged union with one variant per [`MessageType`], each
//!   carrying only its own payload ([`Audio`], [`Location`], [`Order`], ...).
//! - [`Received`]: one position of a batch as it arrived. Null or malformed
//!   positions are kept (with the reason) instead of failing the whole batch.
//!
//! ## Wire format
//!
//! On the wire a message is a flat object: a `type` tag plus one payload key per
//! kind, all of them nullable. The crate reads both the canonical camelCase
//! names and Meta's snake_case names:
//!
//! ```json
//! { "messageId": "A1", "type": "AUDIO",
//!   "audio": { "id": "A1", "mimeType": "audio/ogg", "isVoiceRecording": true } }
//! { "id": "wamid.X", "from": "16315551234", "type": "audio",
//!   "audio": { "id": "A1", "mime_type": "audio/ogg", "voice": true } }
//! ```
//!
//! Building a [`Message`] enforces that only the payload matching the tag is
//! populated. A message typed `audio` that also carries an `image` is rejected
//! as [`MalformedMessage::ForeignPayload`]. A missing payload for the declared
//! kind is tolerated and yields an empty payload (every field `None`).

use crate::{
    error::MalformedMessage,
    rest::{deserialize_str_opt, or_null},
    Timestamp,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

wire_enum! {
    /// The message kinds WhatsApp delivers to a business number.
    pub enum MessageType {
        Text => "TEXT",
        Audio => "AUDIO",
        Image => "IMAGE",
        Document => "DOCUMENT",
        Video => "VIDEO",
        Sticker => "STICKER",
        /// WhatsApp could not process the message; carries error details.
        Unsupported => "UNSUPPORTED",
        Order => "ORDER",
        Location => "LOCATION",
        /// A quick-reply button press on a template message.
        Button => "BUTTON",
        /// A reply to an interactive list or reply-button message.
        Interactive => "INTERACTIVE",
        Contacts => "CONTACTS",
        Reaction => "REACTION",
    }
}

/// An inbound message.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug)]
#[serde(try_from = "RawMessage", into = "RawMessage")]
#[non_exhaustive]
pub struct Message {
    /// The WhatsApp message id (`wamid...`).
    pub id: Option<String>,
    /// The sender's phone number.
    pub from: Option<String>,
    pub timestamp: Option<Timestamp>,
    /// Set when the user replied to (or forwarded) another message.
    pub context: Option<ReplyContext>,
    /// Set when the message came from a click-to-WhatsApp ad.
    pub referral: Option<Referral>,
    pub kind: MessageKind,
}

impl Message {
    /// Builds a message with no metadata.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            id: None,
            from: None,
            timestamp: None,
            context: None,
            referral: None,
            kind,
        }
    }

    #[inline]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[inline]
    pub fn sender(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// The type tag as received (canonical form for known kinds).
    pub fn tag(&self) -> &str {
        self.kind.tag()
    }
}

/// The payload of a [`Message`], one variant per [`MessageType`].
#[derive(PartialEq, Clone, Debug)]
#[non_exhaustive]
pub enum MessageKind {
    Text(Text),
    Audio(Audio),
    Image(Image),
    Document(Document),
    Video(Video),
    Sticker(Sticker),
    Unsupported(Vec<ErrorDetail>),
    Order(Order),
    Location(Location),
    Button(Button),
    Interactive(Interactive),
    Contacts(Vec<Contact>),
    Reaction(Reaction),
    /// A tag this crate has no variant for. The payload is not interpreted.
    Unrecognized(String),
}

impl MessageKind {
    /// `None` for [`MessageKind::Unrecognized`].
    pub fn message_type(&self) -> Option<MessageType> {
        Some(match self {
            MessageKind::Text(_) => MessageType::Text,
            MessageKind::Audio(_) => MessageType::Audio,
            MessageKind::Image(_) => MessageType::Image,
            MessageKind::Document(_) => MessageType::Document,
            MessageKind::Video(_) => MessageType::Video,
            MessageKind::Sticker(_) => MessageType::Sticker,
            MessageKind::Unsupported(_) => MessageType::Unsupported,
            MessageKind::Order(_) => MessageType::Order,
            MessageKind::Location(_) => MessageType::Location,
            MessageKind::Button(_) => MessageType::Button,
            MessageKind::Interactive(_) => MessageType::Interactive,
            MessageKind::Contacts(_) => MessageType::Contacts,
            MessageKind::Reaction(_) => MessageType::Reaction,
            MessageKind::Unrecognized(_) => return None,
        })
    }

    pub fn tag(&self) -> &str {
        match self {
            MessageKind::Unrecognized(tag) => tag,
            known => known.message_type().map_or("", |t| t.as_str()),
        }
    }
}

/// Text content
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Text {
    pub body: Option<String>,
}

impl Text {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
        }
    }
}

/// An emoji reaction to an earlier message. An empty emoji removes a reaction.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Reaction {
    /// The message reacted to.
    #[serde(default, alias = "message_id", skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

/// Audio content. `is_voice_recording` is set for push-to-talk voice notes.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Audio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, alias = "voice", skip_serializing_if = "Option::is_none")]
    pub is_voice_recording: Option<bool>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, alias = "filename", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Video {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Sticker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, alias = "mime_type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, alias = "animated", skip_serializing_if = "Option::is_none")]
    pub is_animated: Option<bool>,
}

/// Why WhatsApp could not deliver the original content, e.g.
/// `131051 Unsupported message type`.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(code: {}) {}",
            or_null(self.code.as_ref()),
            or_null(self.title.as_deref())
        )?;
        if let Some(details) = &self.details {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

/// A cart sent from a catalog.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Order {
    #[serde(default, alias = "catalog_id", skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<String>,
    /// Note sent along with the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "product_items")]
    pub products: Vec<ProductItem>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ProductItem {
    #[serde(
        default,
        alias = "product_retailer_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_retailer_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_str_opt::<u64, __D>",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<u64>,
    #[serde(
        default,
        alias = "item_price",
        deserialize_with = "deserialize_str_opt::<f64, __D>",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A shared location.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Location {
    #[serde(
        default,
        deserialize_with = "deserialize_str_opt::<f64, __D>",
        skip_serializing_if = "Option::is_none"
    )]
    pub latitude: Option<f64>,
    #[serde(
        default,
        deserialize_with = "deserialize_str_opt::<f64, __D>",
        skip_serializing_if = "Option::is_none"
    )]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A quick-reply button pressed on a template message.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Button {
    /// The developer-defined payload of the button.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    /// The button label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A reply to an interactive message: either a list row or a reply button.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Interactive {
    /// `list_reply` or `button_reply`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub reply_type: Option<String>,
    #[serde(default, alias = "list_reply", skip_serializing_if = "Option::is_none")]
    pub list_reply: Option<ListReply>,
    #[serde(default, alias = "button_reply", skip_serializing_if = "Option::is_none")]
    pub button_reply: Option<ButtonReply>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ListReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ButtonReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A contact card shared by the user.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ContactName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phones: Vec<ContactPhone>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ContactName {
    #[serde(default, alias = "formatted_name", skip_serializing_if = "Option::is_none")]
    pub formatted_name: Option<String>,
    #[serde(default, alias = "first_name", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, alias = "last_name", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ContactPhone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, alias = "wa_id", skip_serializing_if = "Option::is_none")]
    pub wa_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub phone_type: Option<String>,
}

/// The message a user replied to.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[non_exhaustive]
pub struct ReplyContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Click-to-WhatsApp ad metadata.
#[derive(Serialize, Deserialize, PartialEq, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct Referral {
    #[serde(default, alias = "source_url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, alias = "source_id", skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    #[serde(default, alias = "source_type", skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// One position of a messages batch, as it arrived.
#[derive(PartialEq, Clone, Debug)]
pub enum Received {
    Message(Message),
    /// The position could not be turned into a [`Message`]. `raw` keeps the
    /// original JSON so the batch re-serializes unchanged.
    Malformed {
        reason: MalformedMessage,
        raw: serde_json::Value,
    },
}

impl Received {
    pub fn message(&self) -> Option<&Message> {
        match self {
            Received::Message(message) => Some(message),
            Received::Malformed { .. } => None,
        }
    }

    /// Reads one batch position, recording rather than failing on problems.
    pub fn from_value(value: serde_json::Value) -> Self {
        if value.is_null() {
            return Received::Malformed {
                reason: MalformedMessage::Null,
                raw: value,
            };
        }

        let raw = match RawMessage::deserialize(&value) {
            Ok(raw) => raw,
            Err(err) => {
                return Received::Malformed {
                    reason: MalformedMessage::Invalid(err.to_string()),
                    raw: value,
                }
            }
        };

        match Message::try_from(raw) {
            Ok(message) => Received::Message(message),
            Err(reason) => Received::Malformed { reason, raw: value },
        }
    }
}

impl From<Message> for Received {
    fn from(message: Message) -> Self {
        Received::Message(message)
    }
}

impl<'de> Deserialize<'de> for Received {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Received::from_value)
    }
}

impl Serialize for Received {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Received::Message(message) => message.serialize(serializer),
            Received::Malformed { raw, .. } => raw.serialize(serializer),
        }
    }
}

/// Flat wire form of a message: a tag plus every payload key, all optional.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMessage {
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(default, alias = "from", skip_serializing_if = "Option::is_none")]
    user_phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<Timestamp>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    message_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<ReplyContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    referral: Option<Referral>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<RawText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reaction: Option<Reaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    audio: Option<Audio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<Image>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video: Option<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sticker: Option<Sticker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<ErrorDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    button: Option<Button>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    interactive: Option<Interactive>,
    #[serde(default, alias = "contacts", skip_serializing_if = "Option::is_none")]
    contact: Option<Vec<Contact>>,
}

/// Canonical payloads send text as a bare string, Meta as `{ "body": ... }`.
#[derive(Serialize, Deserialize, Debug)]
#[serde(untagged)]
enum RawText {
    Plain(String),
    Body {
        #[serde(default)]
        body: Option<String>,
    },
}

impl RawText {
    fn into_body(self) -> Option<String> {
        match self {
            RawText::Plain(body) => Some(body),
            RawText::Body { body } => body,
        }
    }
}

impl RawMessage {
    /// The kinds whose payload key is populated.
    fn populated(&self) -> impl Iterator<Item = MessageType> {
        [
            (MessageType::Text, self.text.is_some()),
            (
                MessageType::Reaction,
                self.emoji.is_some() || self.reaction.is_some(),
            ),
            (MessageType::Audio, self.audio.is_some()),
            (MessageType::Image, self.image.is_some()),
            (MessageType::Document, self.document.is_some()),
            (MessageType::Video, self.video.is_some()),
            (MessageType::Sticker, self.sticker.is_some()),
            (MessageType::Unsupported, self.errors.is_some()),
            (MessageType::Order, self.order.is_some()),
            (MessageType::Location, self.location.is_some()),
            (MessageType::Button, self.button.is_some()),
            (MessageType::Interactive, self.interactive.is_some()),
            (MessageType::Contacts, self.contact.is_some()),
        ]
        .into_iter()
        .filter_map(|(message_type, populated)| populated.then_some(message_type))
    }
}

impl TryFrom<RawMessage> for Message {
    type Error = MalformedMessage;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        let Some(tag) = raw.message_type.as_deref() else {
            return Err(MalformedMessage::MissingType { id: raw.message_id });
        };

        let declared = tag.parse::<MessageType>().ok();
        if let Some(declared) = declared {
            if let Some(found) = raw.populated().find(|kind| *kind != declared) {
                return Err(MalformedMessage::ForeignPayload {
                    id: raw.message_id,
                    tag: tag.to_owned(),
                    found: found.as_str(),
                });
            }
        }

        let RawMessage {
            message_id,
            user_phone_number,
            timestamp,
            message_type,
            context,
            referral,
            text,
            emoji,
            reaction,
            audio,
            image,
            document,
            video,
            sticker,
            errors,
            order,
            location,
            button,
            interactive,
            contact,
        } = raw;

        let kind = match declared {
            None => MessageKind::Unrecognized(message_type.unwrap_or_default()),
            Some(MessageType::Text) => MessageKind::Text(Text {
                body: text.and_then(RawText::into_body),
            }),
            Some(MessageType::Reaction) => {
                let mut reaction = reaction.unwrap_or_default();
                if reaction.emoji.is_none() {
                    reaction.emoji = emoji;
                }
                MessageKind::Reaction(reaction)
            }
            Some(MessageType::Audio) => MessageKind::Audio(audio.unwrap_or_default()),
            Some(MessageType::Image) => MessageKind::Image(image.unwrap_or_default()),
            Some(MessageType::Document) => MessageKind::Document(document.unwrap_or_default()),
            Some(MessageType::Video) => MessageKind::Video(video.unwrap_or_default()),
            Some(MessageType::Sticker) => MessageKind::Sticker(sticker.unwrap_or_default()),
            Some(MessageType::Unsupported) => {
                MessageKind::Unsupported(errors.unwrap_or_default())
            }
            Some(MessageType::Order) => MessageKind::Order(order.unwrap_or_default()),
            Some(MessageType::Location) => MessageKind::Location(location.unwrap_or_default()),
            Some(MessageType::Button) => MessageKind::Button(button.unwrap_or_default()),
            Some(MessageType::Interactive) => {
                MessageKind::Interactive(interactive.unwrap_or_default())
            }
            Some(MessageType::Contacts) => MessageKind::Contacts(contact.unwrap_or_default()),
        };

        Ok(Message {
            id: message_id,
            from: user_phone_number,
            timestamp,
            context,
            referral,
            kind,
        })
    }
}

impl From<Message> for RawMessage {
    fn from(message: Message) -> Self {
        let mut raw = RawMessage {
            message_id: message.id,
            user_phone_number: message.from,
            timestamp: message.timestamp,
            message_type: Some(message.kind.tag().to_owned()),
            context: message.context,
            referral: message.referral,
            ..Default::default()
        };

        match message.kind {
            MessageKind::Text(text) => raw.text = text.body.map(RawText::Plain),
            MessageKind::Reaction(reaction) => raw.reaction = Some(reaction),
            MessageKind::Audio(audio) => raw.audio = Some(audio),
            MessageKind::Image(image) => raw.image = Some(image),
            MessageKind::Document(document) => raw.document = Some(document),
            MessageKind::Video(video) => raw.video = Some(video),
            MessageKind::Sticker(sticker) => raw.sticker = Some(sticker),
            MessageKind::Unsupported(errors) => raw.errors = Some(errors),
            MessageKind::Order(order) => raw.order = Some(order),
            MessageKind::Location(location) => raw.location = Some(location),
            MessageKind::Button(button) => raw.button = Some(button),
            MessageKind::Interactive(interactive) => raw.interactive = Some(interactive),
            MessageKind::Contacts(contacts) => raw.contact = Some(contacts),
            MessageKind::Unrecognized(_) => {}
        }

        raw
    }
}
