//! Delivery of diff documents.
//!
//! Pushes go through OneSignal: the topic name is the heading and the diff
//! document is the body. Without credentials, documents are only logged.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{NotifierConfig, Topic};
use crate::utils::http;

/// Receives the diff document of each topic that changed.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, topic: Topic, document: &str) -> Result<()>;

    /// Whether a successful `send` actually reached subscribers.
    fn delivers(&self) -> bool {
        true
    }
}

/// Only logs the documents it would send.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, topic: Topic, document: &str) -> Result<()> {
        log::info!("[dry-run] {}: {}", topic, document);
        Ok(())
    }

    fn delivers(&self) -> bool {
        false
    }
}

/// Localized text block of a OneSignal push.
#[derive(Debug, Serialize)]
struct Localized<'a> {
    en: &'a str,
}

/// OneSignal notification request body.
#[derive(Debug, Serialize)]
struct PushPayload<'a> {
    app_id: &'a str,
    included_segments: &'a [String],
    headings: Localized<'a>,
    contents: Localized<'a>,
}

/// Sends push notifications through the OneSignal REST API.
#[derive(Debug, Clone)]
pub struct OneSignalNotifier {
    client: reqwest::Client,
    api_url: String,
    app_id: String,
    segments: Vec<String>,
    auth: String,
}

impl OneSignalNotifier {
    pub fn new(client: reqwest::Client, config: &NotifierConfig, auth: impl Into<String>) -> Self {
        Self {
            client,
            api_url: config.api_url.clone(),
            app_id: config.app_id.clone(),
            segments: config.segments.clone(),
            auth: auth.into(),
        }
    }

    /// Build a notifier reading the Authorization value from `config.auth_env`.
    pub fn from_config(config: &NotifierConfig) -> Result<Self> {
        let auth = std::env::var(&config.auth_env).map_err(|_| {
            AppError::config(format!("environment variable {} is not set", config.auth_env))
        })?;
        let client = http::create_async_client(config)?;
        Ok(Self::new(client, config, auth))
    }

    fn payload<'a>(&'a self, topic: Topic, document: &'a str) -> PushPayload<'a> {
        PushPayload {
            app_id: &self.app_id,
            included_segments: &self.segments,
            headings: Localized {
                en: topic.as_str(),
            },
            contents: Localized { en: document },
        }
    }
}

#[async_trait]
impl Notifier for OneSignalNotifier {
    async fn send(&self, topic: Topic, document: &str) -> Result<()> {
        let body = serde_json::to_string(&self.payload(topic, document))?;

        let response = self
            .client
            .post(&self.api_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::AUTHORIZATION, &self.auth)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        check_status(status)?;
        log::debug!("Push for {} accepted ({})", topic, status.as_u16());
        Ok(())
    }
}

/// OneSignal answers 200 for a created notification; anything else,
/// including other 2xx codes, is a rejection.
fn check_status(status: reqwest::StatusCode) -> Result<()> {
    if status != reqwest::StatusCode::OK {
        return Err(AppError::notify(format!(
            "push notification rejected ({})",
            status.as_u16()
        )));
    }
    Ok(())
}

/// Build the notifier selected by the configuration.
///
/// `dry_run` or a disabled notifier yields a [`LogNotifier`].
pub fn from_config(config: &NotifierConfig, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run || !config.enabled {
        return Ok(Box::new(LogNotifier));
    }
    Ok(Box::new(OneSignalNotifier::from_config(config)?))
}
