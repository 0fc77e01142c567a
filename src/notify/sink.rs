//! # Notification Sinks
//!
//! Where notices go. A webhook when one is configured, nowhere otherwise.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use super::errors::{NotifyError, NotifyResult};
use super::notice::Notice;
use crate::discord::model::{Embed, WebhookPayload};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

/// Webhook requests give up after this long
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification sink trait for abstraction
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notice
    async fn send(&self, notice: &Notice) -> NotifyResult<()>;

    /// False when notices are dropped without an attempt
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Discord webhook sink
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
    footer: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, server_name: &str) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            footer: format!("{} Bot", server_name),
        })
    }

    fn payload(&self, notice: &Notice) -> WebhookPayload {
        WebhookPayload {
            embeds: vec![Embed::from_notice(notice, &self.footer, Utc::now())],
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, notice: &Notice) -> NotifyResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(notice))
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Used when no webhook is configured
#[derive(Debug, Default)]
pub struct DisabledSink;

#[async_trait]
impl NotificationSink for DisabledSink {
    async fn send(&self, _notice: &Notice) -> NotifyResult<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Records notices in memory, for testing
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: RwLock<Vec<Notice>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every send until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Notices delivered so far
    pub fn sent(&self) -> Vec<Notice> {
        self.sent.read().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn clear(&self) {
        if let Ok(mut sent) = self.sent.write() {
            sent.clear();
        }
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn send(&self, notice: &Notice) -> NotifyResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected {
                status: 500,
                body: "memory sink failing".to_string(),
            });
        }
        self.sent
            .write()
            .map_err(|_| NotifyError::Request("lock poisoned".to_string()))?
            .push(notice.clone());
        Ok(())
    }
}

/// Create a notification sink based on config
///
/// A webhook URL that cannot back a client falls back to the disabled sink.
pub fn create_notification_sink(
    webhook_url: Option<&str>,
    server_name: &str,
) -> Arc<dyn NotificationSink> {
    match webhook_url {
        Some(url) => match WebhookSink::new(url, server_name) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::NotificationFailed,
                    &[("kind", e.kind()), ("reason", reason.as_str())],
                );
                Arc::new(DisabledSink)
            }
        },
        None => Arc::new(DisabledSink),
    }
}

/// Send a notice, logging the outcome. Never fails.
pub async fn deliver(
    sink: &dyn NotificationSink,
    notice: &Notice,
    kind: &str,
    metrics: &MetricsRegistry,
) -> bool {
    if !sink.is_enabled() {
        return false;
    }

    match sink.send(notice).await {
        Ok(()) => {
            metrics.increment_notifications_sent();
            log_event_with_fields(
                Event::NotificationSent,
                &[("kind", kind), ("title", notice.title.as_str())],
            );
            true
        }
        Err(e) => {
            metrics.increment_notification_failures();
            let reason = e.to_string();
            log_event_with_fields(
                Event::NotificationFailed,
                &[
                    ("error", e.kind()),
                    ("kind", kind),
                    ("reason", reason.as_str()),
                ],
            );
            false
        }
    }
}
