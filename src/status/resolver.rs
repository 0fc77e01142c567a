//! # Override Resolver
//!
//! Overlays the marker flags onto a raw reading. First match wins:
//!
//! 1. Maintenance: forced offline, counters pass through untouched
//! 2. Admin-only: reachability passes through
//! 3. Neither: plain pass-through

use super::overrides::OverrideFlags;
use super::types::{RawServerReading, ResolvedStatus};

/// Reason shown when the maintenance marker is empty
pub const DEFAULT_MAINTENANCE_REASON: &str = "Server is under maintenance";

/// Reason shown when the admin-only marker is empty
pub const DEFAULT_ADMIN_REASON: &str = "Server is restricted to admins";

/// Apply overrides to a reading
pub fn resolve(reading: RawServerReading, flags: &OverrideFlags) -> ResolvedStatus {
    let mut status = ResolvedStatus::from_reading(reading);

    if let Some(content) = &flags.maintenance {
        status.online = false;
        status.maintenance = true;
        status.maintenance_reason = Some(reason_or(content, DEFAULT_MAINTENANCE_REASON));
        return status;
    }

    if let Some(content) = &flags.admin_only {
        status.admin_only = true;
        status.admin_reason = Some(reason_or(content, DEFAULT_ADMIN_REASON));
        return status;
    }

    status
}

fn reason_or(content: &str, default: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readings() -> Vec<RawServerReading> {
        vec![
            RawServerReading::offline(),
            RawServerReading::online(0, 32, 0),
            RawServerReading::online(12, 48, 3600),
            RawServerReading {
                reachable: false,
                player_count: 5,
                max_players: 10,
                uptime_seconds: 99,
            },
        ]
    }

    #[test]
    fn test_maintenance_forces_offline_for_any_reading() {
        for reading in readings() {
            for content in ["Patch 1.2", "  Patch 1.2  ", "", "   "] {
                let status = resolve(reading, &OverrideFlags::maintenance(content));

                assert!(!status.online);
                assert!(status.maintenance);
                assert!(!status.admin_only);
                let expected = if content.trim().is_empty() {
                    DEFAULT_MAINTENANCE_REASON
                } else {
                    "Patch 1.2"
                };
                assert_eq!(status.maintenance_reason.as_deref(), Some(expected));
            }
        }
    }

    #[test]
    fn test_maintenance_keeps_counters() {
        let status = resolve(
            RawServerReading::online(12, 48, 3600),
            &OverrideFlags::maintenance("x"),
        );
        assert_eq!(status.player_count, 12);
        assert_eq!(status.max_players, 48);
        assert_eq!(status.uptime_seconds, 3600);
    }

    #[test]
    fn test_admin_only_passes_reachability_through() {
        for reading in readings() {
            let status = resolve(reading, &OverrideFlags::admin_only("staff"));

            assert_eq!(status.online, reading.reachable);
            assert!(status.admin_only);
            assert!(!status.maintenance);
            assert_eq!(status.admin_reason.as_deref(), Some("staff"));
            assert_eq!(status.maintenance_reason, None);
        }
    }

    #[test]
    fn test_admin_only_default_reason() {
        let status = resolve(RawServerReading::offline(), &OverrideFlags::admin_only(""));
        assert_eq!(status.admin_reason.as_deref(), Some(DEFAULT_ADMIN_REASON));
    }

    #[test]
    fn test_both_flags_maintenance_wins() {
        let flags = OverrideFlags {
            maintenance: Some("db".to_string()),
            admin_only: Some("staff".to_string()),
        };
        let status = resolve(RawServerReading::online(1, 2, 3), &flags);

        assert!(status.maintenance);
        assert!(!status.admin_only);
        assert_eq!(status.admin_reason, None);
    }

    #[test]
    fn test_no_flags_is_pass_through() {
        for reading in readings() {
            let status = resolve(reading, &OverrideFlags::none());
            assert_eq!(status, ResolvedStatus::from_reading(reading));
        }
    }
}
