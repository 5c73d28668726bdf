mod common;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use common::*;
use serde_json::{json, Value};
use whatsapp_webhook_events::{webhook_service::WebhookServiceBuilder, WebhookService};

fn service(
    queue: &RecordingQueue,
    handler: &RecordingHandler,
) -> WebhookService<RecordingQueue, RecordingHandler> {
    WebhookServiceBuilder::new()
        .verify_token(VERIFY_TOKEN)
        .build(handlers(queue, handler))
}

fn post(body: impl Into<Body>) -> Request<Body> {
    Request::post("http://localhost/webhook")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn quality_envelope() -> Value {
    json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": WABA_ID,
            "time": 1000,
            "changes": [quality_change("T1", "GREEN", "RED")]
        }]
    })
}

#[tokio::test]
async fn test_handshake() {
    let service = service(&RecordingQueue::default(), &RecordingHandler::default());

    let request = Request::get(format!(
        "http://localhost/webhook?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token={VERIFY_TOKEN}"
    ))
    .body(Body::empty())
    .unwrap();
    let response = service.handle(request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "1158201444");

    let request = Request::get(
        "http://localhost/webhook?hub.mode=subscribe&hub.challenge=1158201444&hub.verify_token=guess",
    )
    .body(Body::empty())
    .unwrap();
    let response = service.handle(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_quality_update_is_published() {
    let queue = RecordingQueue::default();
    let service = service(&queue, &RecordingHandler::default());

    let request = Request::post("http://localhost/webhook")
        .header("x-webhook-timestamp", "1700000000")
        .body(Body::from(quality_envelope().to_string()))
        .unwrap();
    let response = service.handle(request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let sent = queue.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["wabaId"], WABA_ID);
    assert_eq!(sent[0]["webhookTriggeredTimestamp"], "1700000000");
    assert_eq!(sent[0]["templateInfo"]["templateId"], "T1");
}

#[tokio::test]
async fn test_publish_failure_asks_for_redelivery() {
    let queue = RecordingQueue::failing_at(0);
    let service = service(&queue, &RecordingHandler::default());

    let response = service.handle(post(quality_envelope().to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(queue.sent().is_empty());
}

#[tokio::test]
async fn test_malformed_quality_envelope_asks_for_redelivery() {
    let queue = RecordingQueue::default();
    let service = service(&queue, &RecordingHandler::default());

    // The change routes to the quality handler but the entry has no id.
    let body = json!({
        "entry": [{
            "changes": [{ "field": "message_template_quality_update", "value": {} }]
        }]
    });
    let response = service.handle(post(body.to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(queue.attempts(), 0);
}

#[tokio::test]
async fn test_provider_messages_are_dispatched() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();
    let service = service(&queue, &handler);

    let body = messages_envelope(json!([
        {
            "from": "16505551234",
            "id": "wamid.A1",
            "timestamp": "1731617831",
            "type": "audio",
            "audio": {
                "mime_type": "audio/ogg; codecs=opus",
                "sha256": "b3Jp",
                "id": "media-1",
                "voice": true
            }
        },
        {
            "from": "16505551234",
            "id": "wamid.T1",
            "timestamp": "1731617832",
            "type": "text",
            "text": { "body": "hello" }
        }
    ]));
    let response = service.handle(post(body.to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);

    let calls = handler.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Audio {
            id,
            business_phone_number_id,
            audio,
        } => {
            assert_eq!(id.as_deref(), Some("wamid.A1"));
            assert_eq!(business_phone_number_id.as_deref(), Some(PHONE_ID));
            assert_eq!(audio.mime_type.as_deref(), Some("audio/ogg; codecs=opus"));
            assert_eq!(audio.is_voice_recording, Some(true));
        }
        other => panic!("expected the audio arm, got {other:?}"),
    }
    assert_eq!(
        calls[1],
        Call::Text {
            id: Some("wamid.T1".into()),
            body: Some("hello".into())
        }
    );

    assert_eq!(queue.attempts(), 0);
}

#[tokio::test]
async fn test_malformed_messages_delivery_still_succeeds() {
    let handler = RecordingHandler::default();
    let service = service(&RecordingQueue::default(), &handler);

    let body = json!({
        "entry": [{ "changes": [{ "field": "messages", "value": { "messages": [] } }] }]
    });
    let response = service.handle(post(body.to_string())).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_unregistered_field_is_acknowledged() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();
    let service = service(&queue, &handler);

    let body = json!({
        "entry": [{
            "id": WABA_ID,
            "changes": [{ "field": "account_update", "value": { "event": "VERIFIED_ACCOUNT" } }]
        }]
    });
    let response = service.handle(post(body.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = service
        .handle(post(json!({ "entry": [] }).to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(queue.attempts(), 0);
    assert!(handler.calls().is_empty());
}

#[tokio::test]
async fn test_unparsable_body_is_rejected() {
    let service = service(&RecordingQueue::default(), &RecordingHandler::default());

    let response = service.handle(post("{ not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = service
        .handle(post(json!({ "object": "whatsapp_business_account" }).to_string()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn mixed_envelope() -> Value {
    let mut body = messages_envelope(json!([
        { "from": "16505551234", "id": "wamid.T1", "type": "text", "text": { "body": "hello" } }
    ]));
    body["entry"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "id": "W2", "time": 1000, "changes": [quality_change("T1", "GREEN", "RED")] }));
    body
}

#[tokio::test]
async fn test_mixed_delivery_runs_both_paths() {
    let queue = RecordingQueue::default();
    let handler = RecordingHandler::default();
    let service = service(&queue, &handler);

    let response = service.handle(post(mixed_envelope().to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sent = queue.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["wabaId"], "W2");
    assert_eq!(sent[0]["templateInfo"]["templateId"], "T1");

    assert_eq!(
        handler.calls(),
        [Call::Text {
            id: Some("wamid.T1".into()),
            body: Some("hello".into())
        }]
    );
}

#[tokio::test]
async fn test_mixed_delivery_fails_on_publish_failure() {
    let queue = RecordingQueue::failing_at(0);
    let handler = RecordingHandler::default();
    let service = service(&queue, &handler);

    let response = service.handle(post(mixed_envelope().to_string())).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(queue.attempts(), 1);
    // Messages wait for the redelivery.
    assert!(handler.calls().is_empty());
}
