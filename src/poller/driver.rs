//! # Poll Loop Driver
//!
//! One cycle: fetch → resolve → detect → remember → notify → render →
//! publish → presence. Every step after resolve is best effort; a failing
//! step is logged and counted and the cycle moves on.

use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::gate::{CycleGate, DriverState};
use crate::display::{render, Branding};
use crate::lifecycle::{contain_panics, BotClock};
use crate::notify::{
    deliver, detect_transitions, LifecycleNotice, NotificationKind, NotificationSink,
};
use crate::observability::{
    log_event_at, log_event_with_fields, CycleScope, Event, MetricsRegistry, Severity,
};
use crate::publisher::{publish_panel, ChatPublisher, PublishError};
use crate::status::{resolve, OverrideStore, ResolvedStatus, StatusSource};

/// The driver's external collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub source: Arc<dyn StatusSource>,
    pub overrides: Arc<dyn OverrideStore>,
    pub publisher: Arc<dyn ChatPublisher>,
    pub sink: Arc<dyn NotificationSink>,
}

/// What one completed cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub status: ResolvedStatus,
    pub notifications: Vec<NotificationKind>,
    /// `Some(edited)` when the panel was published
    pub published: Option<bool>,
    pub presence_set: bool,
}

/// Result of one timer tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Ran(CycleReport),
    /// A cycle was still in flight
    Skipped,
    /// The cycle panicked
    Failed(String),
}

/// Runs poll cycles on a fixed interval
pub struct PollDriver {
    collaborators: Collaborators,
    branding: Branding,
    interval: Duration,
    metrics: Arc<MetricsRegistry>,
    gate: CycleGate,
    previous: Mutex<Option<ResolvedStatus>>,
    cycles: AtomicU64,
    announce_start: AtomicBool,
    clock: BotClock,
}

impl PollDriver {
    pub fn new(
        collaborators: Collaborators,
        branding: Branding,
        interval: Duration,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            collaborators,
            branding,
            interval,
            metrics,
            gate: CycleGate::new(),
            previous: Mutex::new(None),
            cycles: AtomicU64::new(0),
            announce_start: AtomicBool::new(false),
            clock: BotClock::start(),
        }
    }

    /// Send the `Started` notice after the first completed cycle
    pub fn with_startup_notice(self, announce: bool) -> Self {
        self.announce_start.store(announce, Ordering::SeqCst);
        self
    }

    pub fn gate(&self) -> &CycleGate {
        &self.gate
    }

    pub fn state(&self) -> DriverState {
        self.gate.state()
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Status remembered from the last completed cycle
    pub fn previous(&self) -> Option<ResolvedStatus> {
        self.previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run cycles until `shutdown` resolves
    ///
    /// The first cycle starts immediately. Shutdown is observed between cycles.
    pub async fn run_until<F: Future>(&self, shutdown: F) -> F::Output {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                output = &mut shutdown => return output,
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }
    }

    /// One timer tick: run a cycle unless one is in flight
    pub async fn tick(&self) -> TickOutcome {
        let _permit = match self.gate.try_enter() {
            Some(permit) => permit,
            None => {
                self.metrics.increment_cycles_skipped();
                log_event_with_fields(Event::CycleSkipped, &[("reason", "cycle in flight")]);
                return TickOutcome::Skipped;
            }
        };

        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let scope = CycleScope::begin(cycle);

        match contain_panics(self.run_cycle(cycle)).await {
            Ok(report) => {
                self.metrics.increment_cycles_run();
                let published = match report.published {
                    Some(true) => "edited",
                    Some(false) => "posted",
                    None => "failed",
                };
                scope.complete(&[
                    ("mode", report.status.mode().as_str()),
                    ("published", published),
                ]);

                if self.announce_start.swap(false, Ordering::SeqCst) {
                    self.send_started(&report.status).await;
                }
                TickOutcome::Ran(report)
            }
            Err(payload) => {
                self.metrics.increment_cycles_failed();
                let reason = panic_message(payload.as_ref());
                scope.fail(&reason);
                TickOutcome::Failed(reason)
            }
        }
    }

    async fn run_cycle(&self, cycle: u64) -> CycleReport {
        let c = &self.collaborators;

        let reading = c.source.fetch().await;
        if !reading.reachable {
            self.metrics.increment_fetch_failures();
        }

        let flags = c.overrides.read_override_flags();
        let status = resolve(reading, &flags);
        log_resolved(&status);

        let previous = self
            .previous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(status.clone());
        let events = detect_transitions(previous.as_ref(), &status);

        let mut notifications = Vec::with_capacity(events.len());
        for event in &events {
            let kind = event.kind();
            log_event_with_fields(Event::TransitionDetected, &[("kind", kind.as_str())]);
            let notice = event.to_notice(&self.branding.server_name);
            deliver(c.sink.as_ref(), &notice, kind.as_str(), &self.metrics).await;
            notifications.push(kind);
        }

        let panel = render(&status, &self.branding);

        let published = match publish_panel(c.publisher.as_ref(), &panel).await {
            Ok((handle, edited)) => {
                self.metrics.increment_publishes();
                log_event_with_fields(
                    Event::MessagePublished,
                    &[
                        ("edited", if edited { "true" } else { "false" }),
                        ("message_id", handle.message_id.as_str()),
                    ],
                );
                Some(edited)
            }
            Err(e) => {
                self.metrics.increment_publish_failures();
                let reason = e.to_string();
                log_event_at(
                    publish_failure_severity(&e),
                    Event::PublishFailed,
                    &[("kind", e.kind()), ("reason", reason.as_str())],
                );
                None
            }
        };

        let presence_set = match c.publisher.set_presence(&panel.presence).await {
            Ok(()) => {
                log_event_with_fields(
                    Event::PresenceUpdated,
                    &[
                        ("activity", panel.presence.activity.as_str()),
                        ("status", panel.presence.indicator.as_str()),
                    ],
                );
                true
            }
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::PresenceFailed,
                    &[("kind", e.kind()), ("reason", reason.as_str())],
                );
                false
            }
        };

        CycleReport {
            cycle,
            status,
            notifications,
            published,
            presence_set,
        }
    }

    async fn send_started(&self, status: &ResolvedStatus) {
        let notice = LifecycleNotice::Started {
            status: status.clone(),
        };
        deliver(
            self.collaborators.sink.as_ref(),
            &notice.to_notice(&self.branding.server_name),
            notice.as_str(),
            &self.metrics,
        )
        .await;
    }

    /// Time since the driver was built
    pub fn uptime(&self) -> Duration {
        self.clock.uptime()
    }
}

fn log_resolved(status: &ResolvedStatus) {
    let players = status.player_count.to_string();
    let max_players = status.max_players.to_string();
    log_event_with_fields(
        Event::StatusResolved,
        &[
            ("max_players", max_players.as_str()),
            ("mode", status.mode().as_str()),
            ("online", if status.online { "true" } else { "false" }),
            ("players", players.as_str()),
        ],
    );
}

/// A rejected token fails every cycle until an operator acts
fn publish_failure_severity(e: &PublishError) -> Severity {
    if e.is_unauthorized() {
        Severity::Error
    } else {
        Severity::Warn
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "cycle panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::display::PresenceIndicator;
    use crate::notify::MemorySink;
    use crate::publisher::MemoryPublisher;
    use crate::status::{FixedSource, OverrideFlags, RawServerReading, StaticOverrides};

    struct Harness {
        source: Arc<FixedSource>,
        overrides: Arc<StaticOverrides>,
        publisher: Arc<MemoryPublisher>,
        sink: Arc<MemorySink>,
        driver: PollDriver,
    }

    fn harness(reading: RawServerReading) -> Harness {
        let source = Arc::new(FixedSource::new(reading));
        let overrides = Arc::new(StaticOverrides::new(OverrideFlags::none()));
        let publisher = Arc::new(MemoryPublisher::new());
        let sink = Arc::new(MemorySink::new());
        let driver = PollDriver::new(
            Collaborators {
                source: source.clone(),
                overrides: overrides.clone(),
                publisher: publisher.clone(),
                sink: sink.clone(),
            },
            Branding::default(),
            Duration::from_secs(60),
            Arc::new(MetricsRegistry::new()),
        );
        Harness {
            source,
            overrides,
            publisher,
            sink,
            driver,
        }
    }

    fn report(outcome: TickOutcome) -> CycleReport {
        match outcome {
            TickOutcome::Ran(report) => report,
            other => panic!("expected a completed cycle, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_first_cycle_posts_without_notifications() {
        let h = harness(RawServerReading::online(12, 48, 3600));

        let report = report(h.driver.tick().await);
        assert_eq!(report.cycle, 1);
        assert!(report.notifications.is_empty());
        assert_eq!(report.published, Some(false));
        assert!(report.presence_set);
        assert_eq!(h.sink.sent_count(), 0);
        assert_eq!(h.publisher.bot_messages().len(), 1);
        assert_eq!(h.driver.previous(), Some(report.status));
    }

    #[tokio::test]
    async fn test_online_offline_online() {
        let h = harness(RawServerReading::online(12, 48, 3600));
        h.driver.tick().await;

        h.source.set(RawServerReading::offline());
        let offline = report(h.driver.tick().await);
        assert_eq!(offline.notifications, vec![NotificationKind::BecameOffline]);

        h.source.set(RawServerReading::online(3, 48, 60));
        let online = report(h.driver.tick().await);
        assert_eq!(online.notifications, vec![NotificationKind::BecameOnline]);
        assert_eq!(online.published, Some(true));

        assert_eq!(h.sink.sent_count(), 2);
        assert_eq!(h.publisher.bot_messages().len(), 1);
    }

    #[tokio::test]
    async fn test_entering_maintenance() {
        let h = harness(RawServerReading::online(12, 48, 3600));
        h.driver.tick().await;

        h.overrides.set(OverrideFlags::maintenance("Patch 1.2"));
        let report = report(h.driver.tick().await);

        assert_eq!(
            report.notifications,
            vec![
                NotificationKind::BecameOffline,
                NotificationKind::EnteredMaintenance
            ]
        );
        let presence = h.publisher.presences().pop().unwrap();
        assert_eq!(presence.indicator, PresenceIndicator::DoNotDisturb);
    }

    #[tokio::test]
    async fn test_publish_failure_still_sets_presence() {
        let h = harness(RawServerReading::online(1, 2, 3));
        h.publisher.set_fail_publish(true);

        let report = report(h.driver.tick().await);
        assert_eq!(report.published, None);
        assert!(report.presence_set);
        assert_eq!(h.driver.metrics().snapshot().publish_failures, 1);
    }

    #[tokio::test]
    async fn test_presence_failure_does_not_fail_cycle() {
        let h = harness(RawServerReading::online(1, 2, 3));
        h.publisher.set_fail_presence(true);

        let report = report(h.driver.tick().await);
        assert!(!report.presence_set);
        assert_eq!(h.driver.metrics().snapshot().cycles_run, 1);
    }

    #[tokio::test]
    async fn test_tick_skipped_while_in_flight() {
        let h = harness(RawServerReading::offline());
        let permit = h.driver.gate().try_enter().unwrap();
        assert_eq!(h.driver.state(), DriverState::Running);

        assert_eq!(h.driver.tick().await, TickOutcome::Skipped);
        assert_eq!(h.driver.metrics().snapshot().cycles_skipped, 1);
        assert!(h.publisher.messages().is_empty());

        drop(permit);
        assert!(matches!(h.driver.tick().await, TickOutcome::Ran(_)));
    }

    /// Blocks inside `fetch` until released
    struct BlockingSource {
        entered: Arc<tokio::sync::Notify>,
        release: Arc<tokio::sync::Notify>,
    }

    #[async_trait]
    impl StatusSource for BlockingSource {
        async fn fetch(&self) -> RawServerReading {
            self.entered.notify_one();
            self.release.notified().await;
            RawServerReading::online(3, 10, 60)
        }
    }

    #[tokio::test]
    async fn test_concurrent_ticks_run_one_cycle() {
        let h = harness(RawServerReading::offline());
        let entered = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());
        let driver = PollDriver::new(
            Collaborators {
                source: Arc::new(BlockingSource {
                    entered: entered.clone(),
                    release: release.clone(),
                }),
                overrides: h.overrides.clone(),
                publisher: h.publisher.clone(),
                sink: h.sink.clone(),
            },
            Branding::default(),
            Duration::from_secs(60),
            Arc::new(MetricsRegistry::new()),
        );

        let (first, second) = tokio::join!(driver.tick(), async {
            entered.notified().await;
            let second = driver.tick().await;
            release.notify_one();
            second
        });

        assert!(matches!(first, TickOutcome::Ran(_)));
        assert_eq!(second, TickOutcome::Skipped);

        let snapshot = driver.metrics().snapshot();
        assert_eq!(snapshot.cycles_run, 1);
        assert_eq!(snapshot.cycles_skipped, 1);
        assert_eq!(h.publisher.bot_messages().len(), 1);
        assert_eq!(driver.state(), DriverState::Idle);
    }

    #[test]
    fn test_revoked_token_logged_as_error() {
        let revoked = PublishError::Http {
            status: 401,
            body: "401: Unauthorized".to_string(),
        };
        assert_eq!(publish_failure_severity(&revoked), Severity::Error);
        assert_eq!(
            publish_failure_severity(&PublishError::Request("reset".to_string())),
            Severity::Warn
        );
    }

    struct PanickingSource;

    #[async_trait]
    impl StatusSource for PanickingSource {
        async fn fetch(&self) -> RawServerReading {
            panic!("source exploded")
        }
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let h = harness(RawServerReading::offline());
        let driver = PollDriver::new(
            Collaborators {
                source: Arc::new(PanickingSource),
                overrides: h.overrides.clone(),
                publisher: h.publisher.clone(),
                sink: h.sink.clone(),
            },
            Branding::default(),
            Duration::from_secs(60),
            Arc::new(MetricsRegistry::new()),
        );

        assert_eq!(
            driver.tick().await,
            TickOutcome::Failed("source exploded".to_string())
        );
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.metrics().snapshot().cycles_failed, 1);
        assert!(!crate::lifecycle::panic_is_contained());
        assert_eq!(driver.tick().await, TickOutcome::Failed("source exploded".to_string()));
    }

    #[tokio::test]
    async fn test_startup_notice_sent_once() {
        let mut h = harness(RawServerReading::online(2, 10, 120));
        h.driver = h.driver.with_startup_notice(true);

        h.driver.tick().await;
        h.driver.tick().await;

        let sent = h.sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].title.contains("Bot Online"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_until_ticks_on_interval() {
        let h = harness(RawServerReading::online(1, 2, 3));

        let stop = tokio::time::sleep(Duration::from_secs(150));
        h.driver.run_until(stop).await;

        assert_eq!(h.driver.metrics().snapshot().cycles_run, 3);
        assert_eq!(h.publisher.bot_messages()[0].edits, 2);
    }
}
