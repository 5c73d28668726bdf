use crate::{
    error::{BoxError, Error},
    publisher::QueueClient,
};
use reqwest::{
    header::CONTENT_TYPE, Client as HttpClient, ClientBuilder as HttpClientBuilder, Url,
};
use std::{future::Future, time::Duration};
use tracing::debug;

/// A [`QueueClient`] speaking a queue's HTTP API.
///
/// Each message is `POST`ed as JSON to `{endpoint}/queues/{queue_name}/messages`,
/// with the queue name percent-encoded as a single path segment.
/// Any non-2xx response is a failed handoff.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Example
/// ```rust,no_run
/// use std::time::Duration;
/// use whatsapp_webhook_events::HttpQueueClient;
///
/// # fn example() -> Result<(), whatsapp_webhook_events::Error> {
/// let queue = HttpQueueClient::builder()
///     .timeout(Duration::from_secs(5))
///     .build("http://localhost:9324")?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct HttpQueueClient {
    http: HttpClient,
    endpoint: Url,
}

impl HttpQueueClient {
    /// Creates a client with default settings.
    pub fn new(endpoint: impl AsRef<str>) -> Result<Self, Error> {
        Self::builder().build(endpoint)
    }

    pub fn builder() -> HttpQueueClientBuilder {
        HttpQueueClientBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str().trim_end_matches('/')
    }

    fn messages_url(&self, queue_name: &str) -> Result<Url, BoxError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| format!("queue endpoint '{}' cannot carry a path", self.endpoint))?
            .pop_if_empty()
            .extend(["queues", queue_name, "messages"]);
        Ok(url)
    }
}

/// Builder for [`HttpQueueClient`].
#[derive(Debug, Default)]
pub struct HttpQueueClientBuilder {
    http: HttpClientBuilder,
}

impl HttpQueueClientBuilder {
    /// Sets the timeout for each handoff.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.http = self.http.timeout(duration);
        self
    }

    pub fn build(self, endpoint: impl AsRef<str>) -> Result<HttpQueueClient, Error> {
        let endpoint = Url::parse(endpoint.as_ref()).map_err(Error::network)?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::network(format!(
                "queue endpoint '{endpoint}' cannot carry a path"
            )));
        }

        let http = self.http.build().map_err(Error::network)?;
        Ok(HttpQueueClient { http, endpoint })
    }
}

/// The queue answered, but did not accept the message.
#[derive(thiserror::Error, Debug)]
#[error("queue responded with status {status}: '{body}'")]
pub(crate) struct QueueRejected {
    status: u16,
    body: String,
}

impl QueueClient for HttpQueueClient {
    fn send_message(
        &self,
        body: String,
        queue_name: &str,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        let request = self.messages_url(queue_name).map(|url| {
            self.http
                .post(url)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
        });

        async move {
            let response = request?.send().await?;
            let url = response.url().clone();
            let status = response.status();

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(QueueRejected {
                    status: status.as_u16(),
                    body,
                }
                .into());
            }

            debug!(url = %url, status = status.as_u16(), "Queue accepted message");
            Ok(())
        }
    }
}
