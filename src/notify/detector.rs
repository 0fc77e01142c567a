//! # Status Change Detector
//!
//! Diffs the previous cycle's status against the current one. Rules are
//! evaluated independently, so one cycle can emit several events:
//!
//! - `online` true -> false: `BecameOffline`; false -> true: `BecameOnline`
//! - `maintenance` false -> true: `EnteredMaintenance`
//! - `admin_only` false -> true: `EnteredAdminOnly`
//!
//! Leaving maintenance or admin-only emits nothing. No previous status (first
//! cycle) emits nothing.

use super::event::NotificationEvent;
use crate::status::ResolvedStatus;

/// Events for the transition from `previous` to `current`, in rule order
pub fn detect_transitions(
    previous: Option<&ResolvedStatus>,
    current: &ResolvedStatus,
) -> Vec<NotificationEvent> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut events = Vec::new();

    if previous.online != current.online {
        if current.online {
            events.push(NotificationEvent::BecameOnline {
                players: current.player_count,
                max_players: current.max_players,
                uptime_seconds: current.uptime_seconds,
            });
        } else {
            events.push(NotificationEvent::BecameOffline);
        }
    }

    if !previous.maintenance && current.maintenance {
        events.push(NotificationEvent::EnteredMaintenance {
            reason: current.maintenance_reason.clone().unwrap_or_default(),
        });
    }

    if !previous.admin_only && current.admin_only {
        events.push(NotificationEvent::EnteredAdminOnly {
            reason: current.admin_reason.clone().unwrap_or_default(),
            players: current.player_count,
            max_players: current.max_players,
        });
    }

    events
}
