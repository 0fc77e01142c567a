//! Operational counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the poll loop and its outbound calls
///
/// Relaxed ordering is enough: values are only read for the shutdown summary.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    cycles_run: AtomicU64,
    cycles_skipped: AtomicU64,
    cycles_failed: AtomicU64,
    fetch_failures: AtomicU64,
    publishes: AtomicU64,
    publish_failures: AtomicU64,
    notifications_sent: AtomicU64,
    notification_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_cycles_run(&self) {
        self.cycles_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cycles_skipped(&self) {
        self.cycles_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cycles_failed(&self) {
        self.cycles_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_publishes(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_publish_failures(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_notifications_sent(&self) {
        self.notifications_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_notification_failures(&self) {
        self.notification_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cycles_run: self.cycles_run.load(Ordering::Relaxed),
            cycles_skipped: self.cycles_skipped.load(Ordering::Relaxed),
            cycles_failed: self.cycles_failed.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            notifications_sent: self.notifications_sent.load(Ordering::Relaxed),
            notification_failures: self.notification_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable counter values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub cycles_run: u64,
    pub cycles_skipped: u64,
    pub cycles_failed: u64,
    pub fetch_failures: u64,
    pub publishes: u64,
    pub publish_failures: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
}

impl MetricsSnapshot {
    /// Counter names and values as log fields
    pub fn to_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cycles_run", self.cycles_run.to_string()),
            ("cycles_skipped", self.cycles_skipped.to_string()),
            ("cycles_failed", self.cycles_failed.to_string()),
            ("fetch_failures", self.fetch_failures.to_string()),
            ("publishes", self.publishes.to_string()),
            ("publish_failures", self.publish_failures.to_string()),
            ("notifications_sent", self.notifications_sent.to_string()),
            ("notification_failures", self.notification_failures.to_string()),
        ]
    }
}
