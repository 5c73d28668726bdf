//! Webhook receiver: template quality updates go to the queue, inbound
//! messages are logged per kind.

use anyhow::Context;
use tracing::info;
use whatsapp_webhook_events::{
    telemetry, EventType, Handlers, HttpQueueClient, LoggingHandler, QueuePublisher, Server,
    Settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let settings = Settings::load().context("failed to load configuration")?;
    telemetry::init_tracing(&settings.log)?;

    let queue = HttpQueueClient::builder()
        .timeout(settings.queue.timeout())
        .build(&settings.queue.endpoint)?;
    let queue_name = settings
        .queues
        .for_event(EventType::MessageTemplateQualityUpdate)
        .context("no queue configured for template quality updates")?;

    let handlers = Handlers::new(QueuePublisher::new(queue, queue_name), LoggingHandler);

    let mut server = Server::builder()
        .endpoint(settings.server.endpoint)
        .route(settings.server.route.as_str())
        .shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        });
    if let Some(verify_token) = &settings.server.verify_token {
        server = server.verify_token(verify_token.as_str());
    }

    info!(
        queue_endpoint = %settings.queue.endpoint,
        queue_name = %queue_name,
        "Starting webhook receiver"
    );
    server.build().serve(handlers).await?;

    Ok(())
}
