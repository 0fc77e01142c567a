//! Observability for the status bot
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Operational counters
//!
//! Observability never fails an operation: write errors are dropped.
//!
//! # Usage
//!
//! ```ignore
//! use statusbot::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::StatusFetched, &[("players", "12")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_cycles_run();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::CycleScope;

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
///
/// Fatal events are logged at FATAL; failure-named events at WARN; the rest
/// at INFO.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity_for(event), event.as_str(), fields);
}

/// Log an event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}

fn severity_for(event: Event) -> Severity {
    if event.is_fatal() {
        return Severity::Fatal;
    }
    match event {
        Event::CycleFailed | Event::TaskFailed => Severity::Error,
        Event::StatusFetchFailed
        | Event::UptimeSourceFailed
        | Event::MarkerReadFailed
        | Event::PublishFailed
        | Event::PresenceFailed
        | Event::NotificationFailed
        | Event::GatewayDisconnected
        | Event::PanicRecovered
        | Event::CycleSkipped => Severity::Warn,
        Event::CycleBegin => Severity::Trace,
        _ => Severity::Info,
    }
}

/// Log a counter snapshot as one `METRICS` line
pub fn log_metrics(snapshot: &MetricsSnapshot) {
    let fields = snapshot.to_fields();
    let refs: Vec<(&str, &str)> = fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
    log_event_with_fields(Event::Metrics, &refs);
}
