//! Message-kind dispatch.
//!
//! [`dispatch_messages`] walks a [`MessagesDetails`] batch in order and calls
//! the [`MessageHandler`] arm matching each message's kind. Malformed positions
//! are skipped with a warning and never stop the batch.
//!
//! Every arm has a default implementation that emits one structured log line
//! with `null` placeholders for missing fields, so implementors override only
//! the kinds they act on.

use crate::{
    event::MessagesDetails,
    message::{
        Audio, Button, Contact, Document, ErrorDetail, Image, Interactive, Location, Message,
        MessageKind, Order, Reaction, Received, Sticker, Text, Video,
    },
    rest::or_null,
};
use std::future::Future;
use tracing::{info, warn};

/// What is known about an inbound message besides its payload.
#[derive(Clone, Copy, Debug)]
pub struct InboundContext<'a> {
    /// The business number the message was sent to.
    pub business_phone_number_id: Option<&'a str>,
    pub message: &'a Message,
}

impl InboundContext<'_> {
    pub fn message_id(&self) -> Option<&str> {
        self.message.id.as_deref()
    }
}

/// Per-kind processing of inbound messages.
///
/// Each arm is independent; overriding one does not affect the others. The
/// default arms log and return.
pub trait MessageHandler: Send + Sync {
    /// Routes a message to the arm matching its kind.
    fn handle_message(&self, ctx: InboundContext<'_>) -> impl Future<Output = ()> + Send {
        async move {
            match &ctx.message.kind {
                MessageKind::Text(text) => self.on_text(ctx, text).await,
                MessageKind::Audio(audio) => self.on_audio(ctx, audio).await,
                MessageKind::Image(image) => self.on_image(ctx, image).await,
                MessageKind::Document(document) => self.on_document(ctx, document).await,
                MessageKind::Video(video) => self.on_video(ctx, video).await,
                MessageKind::Sticker(sticker) => self.on_sticker(ctx, sticker).await,
                MessageKind::Unsupported(errors) => self.on_unsupported(ctx, errors).await,
                MessageKind::Order(order) => self.on_order(ctx, order).await,
                MessageKind::Location(location) => self.on_location(ctx, location).await,
                MessageKind::Button(button) => self.on_button(ctx, button).await,
                MessageKind::Interactive(interactive) => {
                    self.on_interactive(ctx, interactive).await
                }
                MessageKind::Contacts(contacts) => self.on_contacts(ctx, contacts).await,
                MessageKind::Reaction(reaction) => self.on_reaction(ctx, reaction).await,
                MessageKind::Unrecognized(tag) => self.on_unrecognized(ctx, tag).await,
            }
        }
    }

    fn on_text(&self, ctx: InboundContext<'_>, text: &Text) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "TEXT",
                from = %or_null(ctx.message.from.as_deref()),
                body = %or_null(text.body.as_deref()),
                "Received text message"
            );
        }
    }

    fn on_audio(&self, ctx: InboundContext<'_>, audio: &Audio) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "AUDIO",
                audio_id = %or_null(audio.id.as_deref()),
                caption = %or_null(audio.caption.as_deref()),
                mime_type = %or_null(audio.mime_type.as_deref()),
                is_voice_recording = %or_null(audio.is_voice_recording.as_ref()),
                "Received audio message"
            );
        }
    }

    fn on_image(&self, ctx: InboundContext<'_>, image: &Image) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "IMAGE",
                image_id = %or_null(image.id.as_deref()),
                caption = %or_null(image.caption.as_deref()),
                mime_type = %or_null(image.mime_type.as_deref()),
                sha256 = %or_null(image.sha256.as_deref()),
                "Received image message"
            );
        }
    }

    fn on_document(
        &self,
        ctx: InboundContext<'_>,
        document: &Document,
    ) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "DOCUMENT",
                document_id = %or_null(document.id.as_deref()),
                file_name = %or_null(document.file_name.as_deref()),
                caption = %or_null(document.caption.as_deref()),
                mime_type = %or_null(document.mime_type.as_deref()),
                sha256 = %or_null(document.sha256.as_deref()),
                "Received document message"
            );
        }
    }

    fn on_video(&self, ctx: InboundContext<'_>, video: &Video) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "VIDEO",
                video_id = %or_null(video.id.as_deref()),
                caption = %or_null(video.caption.as_deref()),
                mime_type = %or_null(video.mime_type.as_deref()),
                sha256 = %or_null(video.sha256.as_deref()),
                "Received video message"
            );
        }
    }

    fn on_sticker(
        &self,
        ctx: InboundContext<'_>,
        sticker: &Sticker,
    ) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "STICKER",
                sticker_id = %or_null(sticker.id.as_deref()),
                mime_type = %or_null(sticker.mime_type.as_deref()),
                sha256 = %or_null(sticker.sha256.as_deref()),
                is_animated = %or_null(sticker.is_animated.as_ref()),
                "Received sticker message"
            );
        }
    }

    fn on_unsupported(
        &self,
        ctx: InboundContext<'_>,
        errors: &[ErrorDetail],
    ) -> impl Future<Output = ()> + Send {
        async move {
            for error in errors {
                info!(
                    message_id = %or_null(ctx.message_id()),
                    message_type = "UNSUPPORTED",
                    error = %error,
                    "Received unsupported message"
                );
            }
            if errors.is_empty() {
                info!(
                    message_id = %or_null(ctx.message_id()),
                    message_type = "UNSUPPORTED",
                    error = "null",
                    "Received unsupported message"
                );
            }
        }
    }

    fn on_order(&self, ctx: InboundContext<'_>, order: &Order) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "ORDER",
                catalog_id = %or_null(order.catalog_id.as_deref()),
                text = %or_null(order.text.as_deref()),
                products = order.products.len(),
                "Received order message"
            );
        }
    }

    fn on_location(
        &self,
        ctx: InboundContext<'_>,
        location: &Location,
    ) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "LOCATION",
                latitude = %or_null(location.latitude.as_ref()),
                longitude = %or_null(location.longitude.as_ref()),
                address = %or_null(location.address.as_deref()),
                "Received location message"
            );
        }
    }

    fn on_button(
        &self,
        ctx: InboundContext<'_>,
        button: &Button,
    ) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "BUTTON",
                payload = %or_null(button.payload.as_deref()),
                text = %or_null(button.text.as_deref()),
                "Received button message"
            );
        }
    }

    fn on_interactive(
        &self,
        ctx: InboundContext<'_>,
        interactive: &Interactive,
    ) -> impl Future<Output = ()> + Send {
        async move {
            let (reply_id, reply_title) = match (&interactive.list_reply, &interactive.button_reply)
            {
                (Some(list), _) => (list.id.as_deref(), list.title.as_deref()),
                (None, Some(button)) => (button.id.as_deref(), button.title.as_deref()),
                (None, None) => (None, None),
            };

            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "INTERACTIVE",
                reply_type = %or_null(interactive.reply_type.as_deref()),
                reply_id = %or_null(reply_id),
                reply_title = %or_null(reply_title),
                "Received interactive message"
            );
        }
    }

    fn on_contacts(
        &self,
        ctx: InboundContext<'_>,
        contacts: &[Contact],
    ) -> impl Future<Output = ()> + Send {
        async move {
            let first_name = contacts
                .first()
                .and_then(|contact| contact.name.as_ref())
                .and_then(|name| name.formatted_name.as_deref());

            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "CONTACTS",
                contacts = contacts.len(),
                first_name = %or_null(first_name),
                "Received contacts message"
            );
        }
    }

    fn on_reaction(
        &self,
        ctx: InboundContext<'_>,
        reaction: &Reaction,
    ) -> impl Future<Output = ()> + Send {
        async move {
            info!(
                message_id = %or_null(ctx.message_id()),
                message_type = "REACTION",
                from = %or_null(ctx.message.from.as_deref()),
                reacted_to = %or_null(reaction.message_id.as_deref()),
                emoji = %or_null(reaction.emoji.as_deref()),
                "Received reaction message"
            );
        }
    }

    /// A message kind with no arm. Warns and moves on.
    fn on_unrecognized(
        &self,
        ctx: InboundContext<'_>,
        tag: &str,
    ) -> impl Future<Output = ()> + Send {
        async move {
            warn!(
                message_id = %or_null(ctx.message_id()),
                message_type = %tag,
                "Unrecognized message type"
            );
        }
    }
}

/// Logs every message. The binary's default handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingHandler;

impl MessageHandler for LoggingHandler {}

impl<H: MessageHandler> MessageHandler for std::sync::Arc<H> {
    fn handle_message(&self, ctx: InboundContext<'_>) -> impl Future<Output = ()> + Send {
        (**self).handle_message(ctx)
    }
}

/// Dispatches each message of the batch, in order. Returns how many were
/// dispatched.
pub async fn dispatch_messages<H: MessageHandler>(handler: &H, details: &MessagesDetails) -> usize {
    let business_phone_number_id = details.business_phone_number_id.as_deref();
    let mut dispatched = 0;

    for (position, received) in details.messages.iter().flatten().enumerate() {
        match received {
            Received::Message(message) => {
                info!(
                    message_id = %or_null(message.id.as_deref()),
                    message_type = %message.tag(),
                    business_phone_number_id = %or_null(business_phone_number_id),
                    "Dispatching message"
                );
                let ctx = InboundContext {
                    business_phone_number_id,
                    message,
                };
                handler.handle_message(ctx).await;
                dispatched += 1;
            }
            Received::Malformed { reason, .. } => {
                warn!(
                    position,
                    business_phone_number_id = %or_null(business_phone_number_id),
                    reason = %reason,
                    "Skipping malformed message"
                );
            }
        }
    }

    dispatched
}
