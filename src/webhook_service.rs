//! For "Bring Your Own Server" (BYOS) integrations.
//!
//! This module provides a low-level `WebhookService` that encapsulates the request
//! handling logic for the webhook. It is designed to be integrated into any
//! web server framework that uses standard `http` types, such as `axum` or `hyper`.
//!
//! For a fully managed server, see the [`crate::server`] module.
//!
//! # Key Components
//!
//! - [`WebhookServiceBuilder`]: A builder to configure the service with your
//!   `verify_token`.
//! - [`WebhookService`]: The handler service. It's `Clone`, `Send`, `Sync`, and `'static`,
//!   making it suitable for use as shared state in any web framework.
//! - [`WebhookService::handle`]: The single, asynchronous method that processes an
//!   incoming `http::Request` and returns an `http::Response`.
//!
//! # Usage Example (with axum)
//!
//! ```rust,no_run
//! use axum::{routing::any, Router};
//! use whatsapp_webhook_events::{
//!     webhook_service::WebhookServiceBuilder, ChannelQueue, Handlers, LoggingHandler,
//!     QueuePublisher,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let (queue, _received) = ChannelQueue::new();
//!     let handlers = Handlers::new(QueuePublisher::new(queue, "quality"), LoggingHandler);
//!
//!     // 1. Build the service
//!     let service = WebhookServiceBuilder::new()
//!         .verify_token("my_secret_token")
//!         .build(handlers);
//!
//!     // 2. Integrate into your router
//!     let app = Router::new().route(
//!         "/webhook",
//!         any(move |req: axum::extract::Request| async move { service.handle(req).await }),
//!     );
//!
//!     // 3. Run your server
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
use crate::{
    dispatch::MessageHandler,
    handler::Handlers,
    publisher::QueueClient,
    rest::server::{handle_verification, handle_webhook, InnerServer},
};
use axum::{
    extract::{Query, State},
    http::{Method, Request, Response, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

/// Largest body the service reads.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// A builder for creating a [`WebhookService`].
///
/// It does **not** configure server details like endpoint or shutdown signals.
#[derive(Debug, Default, Clone)]
#[must_use]
pub struct WebhookServiceBuilder {
    verify_token: Option<String>,
}

impl WebhookServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the verification token for the webhook challenge-response handshake.
    ///
    /// See [`crate::server::ServerBuilder::verify_token`] for details.
    pub fn verify_token(mut self, verify_token: impl Into<String>) -> Self {
        self.verify_token = Some(verify_token.into());
        self
    }

    /// Builds the service around the handler registry.
    pub fn build<Q, M>(self, handlers: Handlers<Q, M>) -> WebhookService<Q, M>
    where
        Q: QueueClient + 'static,
        M: MessageHandler + 'static,
    {
        WebhookService {
            inner: Arc::new(InnerServer {
                handlers,
                verify_token: self.verify_token,
            }),
        }
    }
}

pub type Body = axum::body::Body;

/// A low-level service to handle webhook requests.
///
/// This struct is created using [`WebhookService::builder`] and is designed
/// to be integrated into an existing web server.
pub struct WebhookService<Q, M> {
    inner: Arc<InnerServer<Q, M>>,
}

impl<Q, M> Clone for WebhookService<Q, M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<Q, M> WebhookService<Q, M>
where
    Q: QueueClient + 'static,
    M: MessageHandler + 'static,
{
    /// Returns a new builder to create a `WebhookService`.
    pub fn builder() -> WebhookServiceBuilder {
        WebhookServiceBuilder::new()
    }

    /// The primary request handler for your BYOS server.
    ///
    /// GET answers the subscription handshake, POST processes a delivery. The
    /// delivery-level timestamp is read from the `x-webhook-timestamp` header.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Body>
    where
        B: Into<Body>,
    {
        let (parts, body) = req.map(Into::<Body>::into).into_parts();
        let state = State(self.inner.clone());

        match parts.method {
            Method::GET => match Query::try_from_uri(&parts.uri) {
                Ok(query) => handle_verification(state, query).await.into_response(),
                Err(rejection) => rejection.into_response(),
            },
            Method::POST => match axum::body::to_bytes(body, BODY_LIMIT).await {
                Ok(bytes) => handle_webhook(state, parts.headers, bytes)
                    .await
                    .into_response(),
                Err(_) => (StatusCode::PAYLOAD_TOO_LARGE, "Unreadable request body").into_response(),
            },
            _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }
}
