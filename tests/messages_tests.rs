mod common;

use common::*;
use serde_json::json;
use whatsapp_webhook_events::{Delivery, EventType};

async fn deliver(handler: &RecordingHandler, queue: &RecordingQueue, body: Option<String>) {
    let delivery = Delivery {
        payload: body,
        timestamp: Some(1731617831),
    };

    handlers(queue, handler)
        .dispatch(EventType::Messages, delivery)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_canonical_audio_is_dispatched_once() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    let body = json!({
        "wabaId": WABA_ID,
        "webhookTriggeredTimestamp": "1000",
        "type": "MESSAGES",
        "messagesDetails": {
            "businessPhoneNumberId": PHONE_ID,
            "messages": [{
                "messageId": "A1",
                "userPhoneNumber": "16505551234",
                "type": "AUDIO",
                "audio": { "id": "media-1", "mimeType": "audio/ogg", "voice": true }
            }]
        }
    });

    deliver(&handler, &queue, Some(body.to_string())).await;

    let calls = handler.calls();
    assert_eq!(calls.len(), 1);
    let Call::Audio {
        id,
        business_phone_number_id,
        audio,
    } = &calls[0]
    else {
        panic!("expected the audio arm, got {calls:?}");
    };
    assert_eq!(id.as_deref(), Some("A1"));
    assert_eq!(business_phone_number_id.as_deref(), Some(PHONE_ID));
    assert_eq!(audio.id.as_deref(), Some("media-1"));
    assert_eq!(audio.mime_type.as_deref(), Some("audio/ogg"));
    assert_eq!(audio.is_voice_recording, Some(true));

    // Inbound messages are never published.
    assert_eq!(queue.attempts(), 0);
}

#[tokio::test]
async fn test_malformed_position_does_not_stop_the_batch() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    let body = json!({
        "wabaId": WABA_ID,
        "type": "MESSAGES",
        "messagesDetails": {
            "businessPhoneNumberId": PHONE_ID,
            "messages": [
                { "messageId": "M1", "type": "TEXT", "text": "first" },
                { "messageId": "M2", "type": null, "text": "lost" },
                { "messageId": "M3", "type": "TEXT", "text": { "body": "third" } }
            ]
        }
    });

    deliver(&handler, &queue, Some(body.to_string())).await;

    assert_eq!(
        handler.calls(),
        [
            Call::Text {
                id: Some("M1".into()),
                body: Some("first".into())
            },
            Call::Text {
                id: Some("M3".into()),
                body: Some("third".into())
            },
        ]
    );
}

#[tokio::test]
async fn test_unknown_kind_reaches_the_fallback_arm() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    let body = json!({
        "type": "MESSAGES",
        "messagesDetails": {
            "messages": [{ "messageId": "S1", "type": "SYSTEM", "system": { "body": "changed" } }]
        }
    });

    deliver(&handler, &queue, Some(body.to_string())).await;

    assert_eq!(
        handler.calls(),
        [Call::Unrecognized {
            id: Some("S1".into()),
            tag: "SYSTEM".into()
        }]
    );
}

#[tokio::test]
async fn test_other_kinds_use_default_arms() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    let body = json!({
        "type": "MESSAGES",
        "messagesDetails": {
            "messages": [
                { "messageId": "L1", "type": "LOCATION", "location": { "latitude": "1.5", "longitude": 2 } },
                { "messageId": "R1", "type": "REACTION", "reaction": { "message_id": "M1", "emoji": "👍" } },
                { "messageId": "T1", "type": "TEXT", "text": "after" }
            ]
        }
    });

    deliver(&handler, &queue, Some(body.to_string())).await;

    assert_eq!(
        handler.calls(),
        [Call::Text {
            id: Some("T1".into()),
            body: Some("after".into())
        }]
    );
}

#[tokio::test]
async fn test_bad_deliveries_are_absorbed() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    for body in [
        None,
        Some("{ not json".to_owned()),
        Some(json!({ "type": "MESSAGE_TEMPLATE_QUALITY_UPDATE" }).to_string()),
        Some(json!({ "messagesDetails": { "messages": [] } }).to_string()),
        Some(json!({ "type": "MESSAGES" }).to_string()),
        Some(json!({ "type": "MESSAGES", "messagesDetails": {} }).to_string()),
    ] {
        deliver(&handler, &queue, body).await;
    }

    assert!(handler.calls().is_empty());
    assert_eq!(queue.attempts(), 0);
}

#[tokio::test]
async fn test_numeric_trigger_timestamp_is_accepted() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();

    let body = json!({
        "wabaId": WABA_ID,
        "webhookTriggeredTimestamp": 1000,
        "type": "MESSAGES",
        "messagesDetails": {
            "businessPhoneNumberId": PHONE_ID,
            "messages": [{ "messageId": "T1", "type": "TEXT", "text": "numeric" }]
        }
    });

    deliver(&handler, &queue, Some(body.to_string())).await;

    assert_eq!(
        handler.calls(),
        [Call::Text {
            id: Some("T1".into()),
            body: Some("numeric".into())
        }]
    );
}
