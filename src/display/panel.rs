//! # Display Renderer
//!
//! Pure mapping from a resolved status to the status panel and presence.
//! No I/O; identical input gives identical output.
//!
//! Text priority: maintenance > admin-only > online > offline.

use super::format::{format_players, format_uptime};
use crate::status::ResolvedStatus;

/// Panel colour (deep sky blue)
pub const PANEL_COLOUR: u32 = 0x00BF_FF;

/// Static presentation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    /// Server name used in title and footer
    pub server_name: String,

    /// Main F8 connect address
    pub connect_main: Option<String>,

    /// Proxy F8 connect address
    pub connect_proxy: Option<String>,

    /// Channel announcing restarts
    pub restart_info_channel_id: Option<String>,

    /// Target of the connect button
    pub connect_url: Option<String>,

    /// Thumbnail image
    pub logo_url: Option<String>,

    /// Large image
    pub background_url: Option<String>,

    /// Poll interval shown in the footer
    pub poll_interval_secs: u64,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            server_name: "Game Server".to_string(),
            connect_main: None,
            connect_proxy: None,
            restart_info_channel_id: None,
            connect_url: None,
            logo_url: None,
            background_url: None,
            poll_interval_secs: 60,
        }
    }
}

/// How a field value should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStyle {
    /// Fenced code block
    Code,
    /// As-is (mentions, links)
    Plain,
}

/// One named field of the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelField {
    pub name: String,
    pub value: String,
    pub inline: bool,
    pub style: FieldStyle,
}

impl PanelField {
    fn code(name: &str, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline,
            style: FieldStyle::Code,
        }
    }

    fn plain(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: false,
            style: FieldStyle::Plain,
        }
    }
}

/// Online indicator shown next to the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceIndicator {
    Online,
    Idle,
    DoNotDisturb,
}

impl PresenceIndicator {
    /// Discord gateway status string
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceIndicator::Online => "online",
            PresenceIndicator::Idle => "idle",
            PresenceIndicator::DoNotDisturb => "dnd",
        }
    }
}

/// Bot presence for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub indicator: PresenceIndicator,
    pub activity: String,
}

/// Everything the publisher needs to show one cycle's status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPanel {
    pub title: String,
    pub headline: String,
    pub colour: u32,
    pub fields: Vec<PanelField>,
    pub footer: String,
    pub thumbnail_url: Option<String>,
    pub image_url: Option<String>,
    pub connect_url: Option<String>,
    pub presence: Presence,
}

impl DisplayPanel {
    /// Field by name, for callers that inspect the rendered panel
    pub fn field(&self, name: &str) -> Option<&PanelField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

pub const FIELD_STATUS: &str = "📡 Server Status";
pub const FIELD_PLAYERS: &str = "👥 Players";
pub const FIELD_MAINTENANCE: &str = "🔧 Maintenance Info";
pub const FIELD_ADMIN_ONLY: &str = "🛡️ Admin Only Info";
pub const FIELD_CONNECT_MAIN: &str = "🎮 F8 CONNECT (MAIN)";
pub const FIELD_CONNECT_PROXY: &str = "🎮 F8 CONNECT (PROXY)";
pub const FIELD_RESTART_INFO: &str = "⏳ Restart Info";
pub const FIELD_UPTIME: &str = "⏰ Server Uptime";

/// Render the panel for a resolved status
pub fn render(status: &ResolvedStatus, branding: &Branding) -> DisplayPanel {
    let (headline, status_value) = headline_for(status);
    let players = format_players(status.player_count, status.max_players);

    let mut fields = vec![
        PanelField::code(FIELD_STATUS, status_value, true),
        PanelField::code(FIELD_PLAYERS, players, true),
    ];

    if status.maintenance {
        let reason = status.maintenance_reason.clone().unwrap_or_default();
        fields.push(PanelField::code(FIELD_MAINTENANCE, reason, false));
    }

    if status.admin_only {
        let reason = status.admin_reason.clone().unwrap_or_default();
        fields.push(PanelField::code(FIELD_ADMIN_ONLY, reason, false));
    }

    if let Some(address) = &branding.connect_main {
        fields.push(PanelField::code(FIELD_CONNECT_MAIN, format!("connect {}", address), false));
    }

    if let Some(address) = &branding.connect_proxy {
        fields.push(PanelField::code(FIELD_CONNECT_PROXY, format!("connect {}", address), false));
    }

    if let Some(channel_id) = &branding.restart_info_channel_id {
        fields.push(PanelField::plain(
            FIELD_RESTART_INFO,
            format!("Restart announcements in <#{}>", channel_id),
        ));
    }

    let uptime = if status.online {
        format_uptime(status.uptime_seconds)
    } else {
        format_uptime(0)
    };
    fields.push(PanelField::code(FIELD_UPTIME, uptime, false));

    DisplayPanel {
        title: format!("{} • {}", branding.server_name, headline),
        headline: headline.to_string(),
        colour: PANEL_COLOUR,
        fields,
        footer: format!(
            "{} • Updated every {}s",
            branding.server_name, branding.poll_interval_secs
        ),
        thumbnail_url: branding.logo_url.clone(),
        image_url: branding.background_url.clone(),
        connect_url: branding.connect_url.clone(),
        presence: render_presence(status),
    }
}

/// Presence indicator and activity text for a resolved status
pub fn render_presence(status: &ResolvedStatus) -> Presence {
    let players = format_players(status.player_count, status.max_players);

    let activity = if status.maintenance {
        "🔧 Server Maintenance".to_string()
    } else if status.admin_only {
        if status.online {
            format!("🛡️ Admin Only ({})", players)
        } else {
            "🛡️ Admin Only (Offline)".to_string()
        }
    } else if status.online {
        format!("{} Players Online", players)
    } else {
        "🔴 Server Offline".to_string()
    };

    let indicator = if status.maintenance {
        PresenceIndicator::DoNotDisturb
    } else if status.online {
        PresenceIndicator::Online
    } else {
        PresenceIndicator::Idle
    };

    Presence { indicator, activity }
}

fn headline_for(status: &ResolvedStatus) -> (&'static str, &'static str) {
    if status.maintenance {
        ("🔴 Maintenance", "🔧 Maintenance Mode")
    } else if status.admin_only {
        if status.online {
            ("🟡 Admin Only", "🛡️ Online (Restricted)")
        } else {
            ("🟡 Admin Only (Offline)", "🛡️ Server Offline")
        }
    } else if status.online {
        ("🟢 Online", "✅ Public Server")
    } else {
        ("🔴 Offline", "Offline")
    }
}
