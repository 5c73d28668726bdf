use serde_json::{json, Value};
use std::{
    future::Future,
    sync::{Arc, Mutex},
};
use whatsapp_webhook_events::{
    dispatch::{InboundContext, MessageHandler},
    error::BoxError,
    message::{Audio, Text},
    Handlers, QueueClient, QueuePublisher,
};

// --- CONSTANTS ---
#[allow(dead_code)]
pub const WABA_ID: &str = "W1";
#[allow(dead_code)]
pub const PHONE_ID: &str = "phone_id_222";
#[allow(dead_code)]
pub const QUEUE_NAME: &str = "template-quality-updates";
#[allow(dead_code)]
pub const VERIFY_TOKEN: &str = "very_secret";

// --- COLLABORATORS ---

/// Records every handoff. Optionally fails the n-th one (0-based).
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingQueue {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    attempts: Arc<Mutex<usize>>,
    fail_at: Option<usize>,
}

#[allow(dead_code)]
impl RecordingQueue {
    pub fn failing_at(attempt: usize) -> Self {
        Self {
            fail_at: Some(attempt),
            ..Default::default()
        }
    }

    /// Bodies handed over successfully, parsed back to JSON.
    pub fn sent(&self) -> Vec<Value> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(body, _)| serde_json::from_str(body).unwrap())
            .collect()
    }

    pub fn queue_names(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, queue_name)| queue_name.clone())
            .collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl QueueClient for RecordingQueue {
    fn send_message(
        &self,
        body: String,
        queue_name: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        let result = {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = *attempts;
            *attempts += 1;

            if self.fail_at == Some(attempt) {
                Err(BoxError::from("queue unavailable"))
            } else {
                self.sent
                    .lock()
                    .unwrap()
                    .push((body, queue_name.to_owned()));
                Ok(())
            }
        };
        std::future::ready(result)
    }
}

/// One arm invocation.
#[derive(Clone, Debug, PartialEq)]
#[allow(dead_code)]
pub enum Call {
    Text {
        id: Option<String>,
        body: Option<String>,
    },
    Audio {
        id: Option<String>,
        business_phone_number_id: Option<String>,
        audio: Audio,
    },
    Unrecognized {
        id: Option<String>,
        tag: String,
    },
}

/// Records the text, audio and unrecognized arms; every other arm logs.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingHandler {
    calls: Arc<Mutex<Vec<Call>>>,
}

#[allow(dead_code)]
impl RecordingHandler {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MessageHandler for RecordingHandler {
    async fn on_text(&self, ctx: InboundContext<'_>, text: &Text) {
        self.push(Call::Text {
            id: ctx.message.id.clone(),
            body: text.body.clone(),
        });
    }

    async fn on_audio(&self, ctx: InboundContext<'_>, audio: &Audio) {
        self.push(Call::Audio {
            id: ctx.message.id.clone(),
            business_phone_number_id: ctx.business_phone_number_id.map(str::to_owned),
            audio: audio.clone(),
        });
    }

    async fn on_unrecognized(&self, ctx: InboundContext<'_>, tag: &str) {
        self.push(Call::Unrecognized {
            id: ctx.message.id.clone(),
            tag: tag.to_owned(),
        });
    }
}

#[allow(dead_code)]
pub fn handlers(
    queue: &RecordingQueue,
    handler: &RecordingHandler,
) -> Handlers<RecordingQueue, RecordingHandler> {
    Handlers::new(
        QueuePublisher::new(queue.clone(), QUEUE_NAME),
        handler.clone(),
    )
}

// --- FIXTURES ---

/// A quality update change for `template_id`.
#[allow(dead_code)]
pub fn quality_change(template_id: &str, previous: &str, new: &str) -> Value {
    json!({
        "field": "message_template_quality_update",
        "value": {
            "previousQualityScore": previous,
            "newQualityScore": new,
            "messageTemplateId": template_id,
            "messageTemplateName": "promo",
            "messageTemplateLanguage": "en_US"
        }
    })
}

/// A provider `messages` envelope carrying `messages`.
#[allow(dead_code)]
pub fn messages_envelope(messages: Value) -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": WABA_ID,
            "time": 1731617831,
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": {
                        "display_phone_number": "15550001111",
                        "phone_number_id": PHONE_ID
                    },
                    "messages": messages
                }
            }]
        }]
    })
}
