//! Observable events
//!
//! Every log line the bot writes names one of these events. Events are
//! explicit and typed.

use std::fmt;

/// Observable events in the bot's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Configuration rejected (FATAL)
    ConfigInvalid,
    /// Bot identity resolved against the chat platform
    IdentityResolved,
    /// Startup complete, poll loop about to run
    BootComplete,
    /// Shutdown signal received
    ShutdownStart,
    /// Shutdown complete
    ShutdownComplete,
    /// A panic reached the panic hook
    UncaughtPanic,
    /// A panic inside a contained poll cycle; CYCLE_FAILED follows
    PanicRecovered,
    /// A background task ended with an error or panic
    TaskFailed,

    // Poll cycle
    /// Cycle started
    CycleBegin,
    /// Cycle finished
    CycleComplete,
    /// Cycle aborted by an error or panic
    CycleFailed,
    /// Tick arrived while a cycle was still running
    CycleSkipped,

    // Status
    /// Status API answered with a usable payload
    StatusFetched,
    /// Status API failed; reading degraded to offline
    StatusFetchFailed,
    /// Alternate uptime source failed
    UptimeSourceFailed,
    /// Marker file could not be checked or read
    MarkerReadFailed,
    /// Overrides applied, mode decided
    StatusResolved,
    /// Status transition detected
    TransitionDetected,

    // Outbound
    /// Status message posted or edited
    MessagePublished,
    /// Status message publish failed
    PublishFailed,
    /// Presence updated
    PresenceUpdated,
    /// Presence update failed
    PresenceFailed,
    /// Notification delivered to the sink
    NotificationSent,
    /// Notification delivery failed
    NotificationFailed,

    // Gateway
    /// Gateway session established
    GatewayConnected,
    /// Gateway session ended
    GatewayDisconnected,

    /// Counter snapshot
    Metrics,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOT_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::IdentityResolved => "IDENTITY_RESOLVED",
            Event::BootComplete => "BOT_STARTUP_COMPLETE",
            Event::ShutdownStart => "SHUTDOWN_START",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::UncaughtPanic => "UNCAUGHT_PANIC",
            Event::PanicRecovered => "PANIC_RECOVERED",
            Event::TaskFailed => "TASK_FAILED",

            Event::CycleBegin => "CYCLE_BEGIN",
            Event::CycleComplete => "CYCLE_COMPLETE",
            Event::CycleFailed => "CYCLE_FAILED",
            Event::CycleSkipped => "CYCLE_SKIPPED",

            Event::StatusFetched => "STATUS_FETCHED",
            Event::StatusFetchFailed => "STATUS_FETCH_FAILED",
            Event::UptimeSourceFailed => "UPTIME_SOURCE_FAILED",
            Event::MarkerReadFailed => "MARKER_READ_FAILED",
            Event::StatusResolved => "STATUS_RESOLVED",
            Event::TransitionDetected => "TRANSITION_DETECTED",

            Event::MessagePublished => "MESSAGE_PUBLISHED",
            Event::PublishFailed => "PUBLISH_FAILED",
            Event::PresenceUpdated => "PRESENCE_UPDATED",
            Event::PresenceFailed => "PRESENCE_FAILED",
            Event::NotificationSent => "NOTIFICATION_SENT",
            Event::NotificationFailed => "NOTIFICATION_FAILED",

            Event::GatewayConnected => "GATEWAY_CONNECTED",
            Event::GatewayDisconnected => "GATEWAY_DISCONNECTED",

            Event::Metrics => "METRICS",
        }
    }

    /// Returns true if this event indicates the process is about to exit non-zero
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConfigInvalid | Event::UncaughtPanic)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
