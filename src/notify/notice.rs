//! # Notices
//!
//! Platform-neutral rendering of notification events: a title, a
//! description, a colour and a few short fields.

use super::event::{LifecycleNotice, NotificationEvent};
use crate::display::{format_players, format_uptime};
use crate::lifecycle::ShutdownSignal;

pub const COLOUR_ONLINE: u32 = 0x00FF_00;
pub const COLOUR_OFFLINE: u32 = 0xFF00_00;
pub const COLOUR_MAINTENANCE: u32 = 0xFFA5_00;
pub const COLOUR_ADMIN_ONLY: u32 = 0xFFFF_00;
pub const COLOUR_INFO: u32 = 0x00BF_FF;

/// Short inline field of a notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl NoticeField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }
}

/// One outbound notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub colour: u32,
    pub fields: Vec<NoticeField>,
}

impl Notice {
    fn new(title: &str, description: impl Into<String>, colour: u32) -> Self {
        Self {
            title: title.to_string(),
            description: description.into(),
            colour,
            fields: Vec::new(),
        }
    }

    fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.push(NoticeField::inline(name, value));
        self
    }
}

impl NotificationEvent {
    /// Render for the given server name
    pub fn to_notice(&self, server_name: &str) -> Notice {
        match self {
            NotificationEvent::BecameOnline {
                players,
                max_players,
                uptime_seconds,
            } => Notice::new(
                "✅ Server Online",
                format!("{} is back online!", server_name),
                COLOUR_ONLINE,
            )
            .with_field("👥 Players", format_players(*players, *max_players))
            .with_field("⏰ Uptime", format_uptime(*uptime_seconds)),

            NotificationEvent::BecameOffline => Notice::new(
                "🔴 Server Offline",
                format!("{} is offline or cannot be reached.", server_name),
                COLOUR_OFFLINE,
            ),

            NotificationEvent::EnteredMaintenance { reason } => Notice::new(
                "🔧 Maintenance Mode",
                format!("Server entered maintenance mode.\n\n**Reason:** {}", reason),
                COLOUR_MAINTENANCE,
            ),

            NotificationEvent::EnteredAdminOnly {
                reason,
                players,
                max_players,
            } => Notice::new(
                "🛡️ Admin Only Mode",
                format!("Server entered admin-only mode.\n\n**Reason:** {}", reason),
                COLOUR_ADMIN_ONLY,
            )
            .with_field("👥 Players", format_players(*players, *max_players)),
        }
    }
}

impl LifecycleNotice {
    /// Render for the given server name
    pub fn to_notice(&self, server_name: &str) -> Notice {
        match self {
            LifecycleNotice::Started { status } if status.online => Notice::new(
                "🚀 Bot Online - Server Status",
                format!(
                    "Bot started for {}.\n\n**Server status:** {}",
                    server_name,
                    LifecycleNotice::mode_label(status.mode())
                ),
                COLOUR_INFO,
            )
            .with_field(
                "👥 Players",
                format_players(status.player_count, status.max_players),
            )
            .with_field("⏰ Uptime", format_uptime(status.uptime_seconds)),

            LifecycleNotice::Started { .. } => Notice::new(
                "🚀 Bot Online - Server Offline",
                format!("Bot started but {} is offline.", server_name),
                COLOUR_OFFLINE,
            ),

            LifecycleNotice::GatewayDisconnected { bot_uptime } => Notice::new(
                "⚠️ Bot Disconnected from Discord",
                "The bot lost its Discord gateway connection.",
                COLOUR_MAINTENANCE,
            )
            .with_field("⏰ Bot Uptime", format_uptime(bot_uptime.as_secs())),

            LifecycleNotice::Shutdown {
                signal,
                bot_uptime,
                at,
            } => {
                let (title, description) = match signal {
                    ShutdownSignal::Interrupt => {
                        ("🛑 Bot Offline (Manual Shutdown)", "The bot was stopped manually.")
                    }
                    ShutdownSignal::Terminate => {
                        ("🛑 Bot Offline (System Shutdown)", "The bot was stopped by the system.")
                    }
                };
                Notice::new(title, description, COLOUR_OFFLINE)
                    .with_field("⏰ Bot Ran For", format_uptime(bot_uptime.as_secs()))
                    .with_field(
                        "📅 Shutdown Time",
                        at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                    )
            }
        }
    }
}
