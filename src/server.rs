//! Webhook server implementation
//!
//! This module provides a high-level `Server` that handles the networking,
//! routing, and lifecycle management for you. It's the easiest way to get started.
//!
//! For a more flexible, low-level integration, see the [`crate::webhook_service`] module.
//!
//! # Key Components
//! - [`ServerBuilder`]: Configure the server's endpoint, route, shutdown signal, and
//!   verification token.
//! - [`Server`]: The configured server, ready to run.
//! - [`Server::serve`]: Takes the [`Handlers`] registry and runs the server until it's
//!   shut down.
//!
//! # Example
//! ```rust,no_run
//! use whatsapp_webhook_events::{
//!     ChannelQueue, Handlers, LoggingHandler, QueuePublisher, Server,
//! };
//!
//! # async fn example() -> Result<(), whatsapp_webhook_events::Error> {
//! let (queue, _received) = ChannelQueue::new();
//! let handlers = Handlers::new(QueuePublisher::new(queue, "quality"), LoggingHandler);
//!
//! Server::builder()
//!     .endpoint("127.0.0.1:8080".parse().unwrap())
//!     .shutdown(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .build()
//!     .serve(handlers)
//!     .await?;
//! # Ok(()) }
//! ```

use crate::{
    dispatch::MessageHandler,
    error::Error,
    handler::Handlers,
    publisher::QueueClient,
    rest::server::{handle_verification, handle_webhook, InnerServer},
};
use axum::{routing::get, Router};
use std::{
    future::Future,
    net::{Ipv4Addr, SocketAddr},
    pin::Pin,
    sync::Arc,
};
use tokio::net::TcpListener;
use tracing::info;

// Default Server configuration...
const DEFAULT_ENDPOINT: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 3000);
const DEFAULT_ROUTE_PATH: &str = "/";

/// Webhook server
///
/// Listens for deliveries and routes them to the [`Handlers`] registry.
/// Create using [`Server::builder()`] or [`Server::new()`].
#[derive(Default)]
pub struct Server {
    pub(crate) config: ServerBuilder,
}

impl Server {
    /// Create a new server with default settings
    pub fn new() -> Self {
        ServerBuilder::new().build()
    }

    /// Create a server builder for custom configuration
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the configured endpoint and serves until the shutdown signal
    /// resolves (or forever, without one).
    pub async fn serve<Q, M>(self, handlers: Handlers<Q, M>) -> Result<(), Error>
    where
        Q: QueueClient + 'static,
        M: MessageHandler + 'static,
    {
        let listener = TcpListener::bind(&self.config.endpoint)
            .await
            .map_err(Error::network)?;
        self.serve_with_listener(listener, handlers).await
    }

    /// Serves on an already bound listener.
    pub async fn serve_with_listener<Q, M>(
        self,
        listener: TcpListener,
        handlers: Handlers<Q, M>,
    ) -> Result<(), Error>
    where
        Q: QueueClient + 'static,
        M: MessageHandler + 'static,
    {
        let state = Arc::new(InnerServer {
            handlers,
            verify_token: self.config.verify_token,
        });

        let app = Router::new()
            .route(
                &self.config.route_path,
                get(handle_verification::<Q, M>).post(handle_webhook::<Q, M>),
            )
            .with_state(state);

        info!(
            endpoint = ?listener.local_addr().ok(),
            route = %self.config.route_path,
            "Webhook server listening"
        );

        let served = if let Some(shutdown) = self.config.shutdown {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
        } else {
            axum::serve(listener, app).await
        };

        served.map_err(Error::network)
    }
}

/// Builder for [`Server`].
///
/// # Example
/// ```rust,no_run
/// use whatsapp_webhook_events::Server;
///
/// let server = Server::builder()
///     .endpoint("127.0.0.1:8080".parse().unwrap())
///     .route("/webhook")
///     .build();
/// ```
#[must_use]
pub struct ServerBuilder {
    pub(crate) endpoint: SocketAddr,
    pub(crate) route_path: String,
    pub(crate) shutdown: Option<Pin<Box<dyn Future<Output = ()> + Send + 'static>>>,
    pub(crate) verify_token: Option<String>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT,
            route_path: DEFAULT_ROUTE_PATH.to_owned(),
            shutdown: None,
            verify_token: None,
        }
    }
}

impl ServerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address and port the server binds to. Defaults to `127.0.0.1:3000`.
    pub fn endpoint(mut self, endpoint: SocketAddr) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the URL path deliveries are posted to. Defaults to `/`.
    pub fn route<P: Into<String>>(mut self, path: P) -> Self {
        self.route_path = path.into();
        self
    }

    /// Sets a `Future` that, when resolved, shuts the server down gracefully.
    ///
    /// # Example
    /// ```rust,no_run
    /// use whatsapp_webhook_events::server::ServerBuilder;
    ///
    /// let builder = ServerBuilder::new().shutdown(async {
    ///     let _ = tokio::signal::ctrl_c().await;
    /// });
    /// ```
    pub fn shutdown<F>(mut self, shutdown: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shutdown = Some(Box::pin(shutdown));
        self
    }

    /// Sets the token for the subscription handshake.
    ///
    /// When registering the webhook, Meta sends a GET request with
    /// `hub.verify_token` and `hub.challenge` query parameters. If the token
    /// matches, the challenge is echoed back. Without a token, GET requests are
    /// refused with `405`.
    pub fn verify_token(mut self, verify_token: impl Into<String>) -> Self {
        self.verify_token = Some(verify_token.into());
        self
    }

    /// Builds the [`Server`].
    pub fn build(self) -> Server {
        Server { config: self }
    }
}
