//! Static settings for the webhook binary.
//!
//! Read from an optional `webhook.{toml,yaml,json}` file, then overridden by
//! environment variables prefixed with `WEBHOOK` and using `__` as the section
//! separator:
//!
//! ```text
//! WEBHOOK__SERVER__ENDPOINT=0.0.0.0:8080
//! WEBHOOK__SERVER__VERIFY_TOKEN=very_secret
//! WEBHOOK__QUEUES__MESSAGE_TEMPLATE_QUALITY_UPDATE=template-quality-updates
//! WEBHOOK__LOG__JSON=false
//! ```

use crate::event::EventType;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

const FILE_NAME: &str = "webhook";
const ENV_PREFIX: &str = "WEBHOOK";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub queue: QueueSettings,
    pub queues: QueueNames,
    pub log: LogSettings,
}

impl Settings {
    /// Load configuration from the optional file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(FILE_NAME).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub endpoint: SocketAddr,
    /// Path deliveries are posted to
    pub route: String,
    /// Token for the subscription handshake; GET is refused without one.
    pub verify_token: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            endpoint: SocketAddr::from((Ipv4Addr::LOCALHOST, 3000)),
            route: "/".to_owned(),
            verify_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// Base URL of the queue's HTTP API
    pub endpoint: String,
    /// Timeout for one handoff, in seconds
    pub timeout_secs: u64,
}

impl QueueSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9324".to_owned(),
            timeout_secs: 10,
        }
    }
}

/// Queue names, one per event type that is published.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueNames {
    pub message_template_quality_update: String,
}

impl QueueNames {
    /// The queue events of `event_type` are published to. Inbound messages are
    /// not published.
    pub fn for_event(&self, event_type: EventType) -> Option<&str> {
        match event_type {
            EventType::MessageTemplateQualityUpdate => {
                Some(self.message_template_quality_update.as_str())
            }
            EventType::Messages => None,
        }
    }
}

impl Default for QueueNames {
    fn default() -> Self {
        Self {
            message_template_quality_update: "message-template-quality-update".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: true,
        }
    }
}
