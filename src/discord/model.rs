//! # Discord Wire Types
//!
//! The subset of the Discord API v10 objects the bot sends and reads.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::display::{DisplayPanel, FieldStyle, Presence};
use crate::notify::Notice;

/// Activity type "Watching"
pub const ACTIVITY_WATCHING: u8 = 3;

/// Component type: action row
const COMPONENT_ACTION_ROW: u8 = 1;
/// Component type: button
const COMPONENT_BUTTON: u8 = 2;
/// Button style: link
const BUTTON_STYLE_LINK: u8 = 5;

/// Gateway intents: GUILDS | GUILD_MESSAGES
pub const DEFAULT_INTENTS: u64 = (1 << 0) | (1 << 9);

/// Embed limits, in characters
pub const TITLE_LIMIT: usize = 256;
pub const DESCRIPTION_LIMIT: usize = 4096;
pub const FIELD_NAME_LIMIT: usize = 256;
pub const FIELD_VALUE_LIMIT: usize = 1024;
pub const FOOTER_LIMIT: usize = 2048;

const ELLIPSIS: char = '…';
const CODE_FENCE_OVERHEAD: usize = "```\n\n```".len();

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub color: u32,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Cut `value` to at most `limit` characters, ending in an ellipsis when cut
pub fn truncate(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(limit.saturating_sub(1)).collect();
    cut.push(ELLIPSIS);
    cut
}

fn code_block(value: &str) -> String {
    format!(
        "```\n{}\n```",
        truncate(value, FIELD_VALUE_LIMIT - CODE_FENCE_OVERHEAD)
    )
}

fn field(name: &str, value: String, inline: bool) -> EmbedField {
    EmbedField {
        name: truncate(name, FIELD_NAME_LIMIT),
        value: truncate(&value, FIELD_VALUE_LIMIT),
        inline,
    }
}

fn footer(text: &str) -> Option<EmbedFooter> {
    Some(EmbedFooter {
        text: truncate(text, FOOTER_LIMIT),
    })
}

impl Embed {
    /// Status panel embed
    pub fn from_panel(panel: &DisplayPanel, at: DateTime<Utc>) -> Self {
        let fields = panel
            .fields
            .iter()
            .map(|f| {
                let value = match f.style {
                    FieldStyle::Code => code_block(&f.value),
                    FieldStyle::Plain => f.value.clone(),
                };
                field(&f.name, value, f.inline)
            })
            .collect();

        Self {
            title: Some(truncate(&panel.title, TITLE_LIMIT)),
            description: None,
            color: panel.colour,
            fields,
            footer: footer(&panel.footer),
            thumbnail: panel.thumbnail_url.clone().map(|url| EmbedImage { url }),
            image: panel.image_url.clone().map(|url| EmbedImage { url }),
            timestamp: Some(iso_timestamp(at)),
        }
    }

    /// Notification embed
    pub fn from_notice(notice: &Notice, footer_text: &str, at: DateTime<Utc>) -> Self {
        Self {
            title: Some(truncate(&notice.title, TITLE_LIMIT)),
            description: Some(truncate(&notice.description, DESCRIPTION_LIMIT)),
            color: notice.colour,
            fields: notice
                .fields
                .iter()
                .map(|f| field(&f.name, f.value.clone(), f.inline))
                .collect(),
            footer: footer(footer_text),
            thumbnail: None,
            image: None,
            timestamp: Some(iso_timestamp(at)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Button>,
}

impl ActionRow {
    pub fn link_button(label: &str, url: &str) -> Self {
        Self {
            kind: COMPONENT_ACTION_ROW,
            components: vec![Button {
                kind: COMPONENT_BUTTON,
                style: BUTTON_STYLE_LINK,
                label: label.to_string(),
                url: url.to_string(),
            }],
        }
    }
}

/// Body of create/edit message requests
///
/// `components` is always sent so an edit also clears a removed button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    pub embeds: Vec<Embed>,
    pub components: Vec<ActionRow>,
}

impl MessagePayload {
    pub fn from_panel(panel: &DisplayPanel, at: DateTime<Utc>) -> Self {
        let components = panel
            .connect_url
            .as_deref()
            .map(|url| vec![ActionRow::link_button("🚀 CONNECT SERVER", url)])
            .unwrap_or_default();

        Self {
            embeds: vec![Embed::from_panel(panel, at)],
            components,
        }
    }
}

/// Body of an execute-webhook request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub author: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// Gateway presence update (op 3) data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresenceUpdate {
    pub since: Option<u64>,
    pub activities: Vec<Activity>,
    pub status: String,
    pub afk: bool,
}

impl From<&Presence> for PresenceUpdate {
    fn from(presence: &Presence) -> Self {
        Self {
            since: None,
            activities: vec![Activity {
                name: presence.activity.clone(),
                kind: ACTIVITY_WATCHING,
            }],
            status: presence.indicator.as_str().to_string(),
            afk: false,
        }
    }
}
