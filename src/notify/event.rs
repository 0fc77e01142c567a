//! # Notification Events
//!
//! Status transitions found by the detector, and the bot lifecycle notices
//! sent outside of it. Both are emitted, never retained.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::lifecycle::ShutdownSignal;
use crate::status::{ResolvedStatus, StatusMode};

/// Transition kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    BecameOnline,
    BecameOffline,
    EnteredMaintenance,
    EnteredAdminOnly,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::BecameOnline => "became_online",
            NotificationKind::BecameOffline => "became_offline",
            NotificationKind::EnteredMaintenance => "entered_maintenance",
            NotificationKind::EnteredAdminOnly => "entered_admin_only",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status transition with the fields relevant to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    BecameOnline {
        players: u32,
        max_players: u32,
        uptime_seconds: u64,
    },
    BecameOffline,
    EnteredMaintenance {
        reason: String,
    },
    EnteredAdminOnly {
        reason: String,
        players: u32,
        max_players: u32,
    },
}

impl NotificationEvent {
    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationEvent::BecameOnline { .. } => NotificationKind::BecameOnline,
            NotificationEvent::BecameOffline => NotificationKind::BecameOffline,
            NotificationEvent::EnteredMaintenance { .. } => NotificationKind::EnteredMaintenance,
            NotificationEvent::EnteredAdminOnly { .. } => NotificationKind::EnteredAdminOnly,
        }
    }
}

/// Notices about the bot itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleNotice {
    /// Startup finished; carries the first resolved status
    Started { status: ResolvedStatus },

    /// Chat gateway connection dropped
    GatewayDisconnected { bot_uptime: Duration },

    /// Graceful shutdown in progress
    Shutdown {
        signal: ShutdownSignal,
        bot_uptime: Duration,
        at: DateTime<Utc>,
    },
}

impl LifecycleNotice {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleNotice::Started { .. } => "started",
            LifecycleNotice::GatewayDisconnected { .. } => "gateway_disconnected",
            LifecycleNotice::Shutdown { .. } => "shutdown",
        }
    }

    /// Mode label used in the startup notice
    pub fn mode_label(mode: StatusMode) -> &'static str {
        match mode {
            StatusMode::Maintenance => "🔧 Maintenance",
            StatusMode::AdminOnly => "🛡️ Admin Only",
            StatusMode::Public => "🟢 Public Online",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        let event = NotificationEvent::EnteredMaintenance {
            reason: "x".to_string(),
        };
        assert_eq!(event.kind(), NotificationKind::EnteredMaintenance);
        assert_eq!(NotificationEvent::BecameOffline.kind().as_str(), "became_offline");
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(LifecycleNotice::mode_label(StatusMode::Public), "🟢 Public Online");
    }
}
