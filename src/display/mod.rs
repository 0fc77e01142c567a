//! # Status Display
//!
//! The status panel, the presence line, and the text formats they share.

pub mod format;
pub mod panel;

pub use format::{format_players, format_uptime};
pub use panel::{
    render, render_presence, Branding, DisplayPanel, FieldStyle, PanelField, Presence,
    PresenceIndicator, FIELD_ADMIN_ONLY, FIELD_CONNECT_MAIN, FIELD_CONNECT_PROXY,
    FIELD_MAINTENANCE, FIELD_PLAYERS, FIELD_RESTART_INFO, FIELD_STATUS, FIELD_UPTIME,
    PANEL_COLOUR,
};
