//! # Status Types
//!
//! The raw reading from the status API and the per-cycle resolved status.

use std::fmt;

/// One reading from the status API
///
/// Recomputed every cycle; carries no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawServerReading {
    /// Whether the status API answered with a usable payload
    pub reachable: bool,

    /// Connected players
    pub player_count: u32,

    /// Player slots
    pub max_players: u32,

    /// Server uptime in seconds
    pub uptime_seconds: u64,
}

impl RawServerReading {
    /// Reading used whenever the fetch fails: unreachable, all counters zero
    pub fn offline() -> Self {
        Self::default()
    }

    /// Reachable reading with the given counters
    pub fn online(player_count: u32, max_players: u32, uptime_seconds: u64) -> Self {
        Self {
            reachable: true,
            player_count,
            max_players,
            uptime_seconds,
        }
    }
}

/// Which override, if any, decided the cycle's status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Maintenance marker present
    Maintenance,
    /// Admin-only marker present (and no maintenance marker)
    AdminOnly,
    /// No marker present
    Public,
}

impl StatusMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusMode::Maintenance => "maintenance",
            StatusMode::AdminOnly => "admin_only",
            StatusMode::Public => "public",
        }
    }
}

impl fmt::Display for StatusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single authoritative status for one cycle, after overrides
///
/// Invariants:
/// - `maintenance` and `admin_only` are never both true
/// - `maintenance` implies `!online`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedStatus {
    pub online: bool,
    pub player_count: u32,
    pub max_players: u32,
    pub uptime_seconds: u64,
    pub maintenance: bool,
    pub maintenance_reason: Option<String>,
    pub admin_only: bool,
    pub admin_reason: Option<String>,
}

impl ResolvedStatus {
    /// Plain pass-through of a reading with both override flags off
    pub fn from_reading(reading: RawServerReading) -> Self {
        Self {
            online: reading.reachable,
            player_count: reading.player_count,
            max_players: reading.max_players,
            uptime_seconds: reading.uptime_seconds,
            ..Self::default()
        }
    }

    /// The override that decided this status
    pub fn mode(&self) -> StatusMode {
        if self.maintenance {
            StatusMode::Maintenance
        } else if self.admin_only {
            StatusMode::AdminOnly
        } else {
            StatusMode::Public
        }
    }
}
