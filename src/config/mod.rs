//! # Bot Configuration
//!
//! Environment-style keys from the process environment and an optional env
//! file, validated once at startup. Nothing here touches the network.
//!
//! Empty values count as missing.

mod env_file;

pub use env_file::{merge_vars, process_vars, read_env_file};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde_json::{json, Value};

use crate::cli::{CliError, CliResult};
use crate::discord::{DiscordConfig, GatewayConfig, DEFAULT_API_BASE, DEFAULT_GATEWAY_URL};
use crate::display::Branding;
use crate::observability::Severity;
use crate::status::fetcher::{DEFAULT_STATUS_API_BASE, MAX_FETCH_TIMEOUT};
use crate::status::{FetcherConfig, MarkerFileStore};

/// Default env file, read when present
pub const DEFAULT_ENV_FILE: &str = ".env";

fn default_server_name() -> String {
    "Game Server".to_string()
}

fn default_admin_panel_port() -> u16 {
    30120
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_fetch_timeout_secs() -> u64 {
    MAX_FETCH_TIMEOUT.as_secs()
}

fn default_maintenance_file() -> PathBuf {
    PathBuf::from("./maintenance.txt")
}

fn default_admin_only_file() -> PathBuf {
    PathBuf::from("./admin-only.txt")
}

/// Validated bot configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Discord bot token (BOT_TOKEN)
    pub token: String,

    /// Status channel (CHANNEL_ID)
    pub channel_id: String,

    /// Server list identifier (CFX_SERVER_ID)
    pub server_id: String,

    /// Notification webhook (WEBHOOK_URL)
    pub webhook_url: Option<String>,

    pub logo_url: Option<String>,
    pub background_url: Option<String>,
    pub connect_url: Option<String>,
    pub connect_main: Option<String>,
    pub connect_proxy: Option<String>,
    pub restart_info_channel_id: Option<String>,

    /// Branding name (SERVER_NAME, default "Game Server")
    pub server_name: String,

    /// Alternate uptime source (ADMIN_PANEL_HOST, ADMIN_PANEL_PORT)
    pub admin_panel: Option<(String, u16)>,

    pub status_api_base: String,
    pub discord_api_base: String,
    pub gateway_url: String,

    pub maintenance_file: PathBuf,
    pub admin_only_file: PathBuf,

    /// Seconds between cycles, > 0
    pub poll_interval_secs: u64,

    /// Status request timeout, 1..=10 seconds
    pub fetch_timeout_secs: u64,

    pub log_level: Severity,
}

impl BotConfig {
    /// Load from an env file overlaid with the process environment
    ///
    /// `env_file` of `None` reads `.env` when it exists; an explicit path must exist.
    pub fn load(env_file: Option<&Path>) -> CliResult<Self> {
        let file_vars = match env_file {
            Some(path) => read_env_file(path, true)?,
            None => read_env_file(Path::new(DEFAULT_ENV_FILE), false)?,
        };
        Self::from_vars(&merge_vars(file_vars, process_vars()))
    }

    /// Build and validate from a key/value map
    pub fn from_vars(vars: &HashMap<String, String>) -> CliResult<Self> {
        let admin_panel = match optional(vars, "ADMIN_PANEL_HOST") {
            Some(host) => Some((
                host,
                number(vars, "ADMIN_PANEL_PORT", default_admin_panel_port())?,
            )),
            None => None,
        };

        let config = Self {
            token: required(vars, "BOT_TOKEN")?,
            channel_id: required(vars, "CHANNEL_ID")?,
            server_id: required(vars, "CFX_SERVER_ID")?,
            webhook_url: optional(vars, "WEBHOOK_URL"),
            logo_url: optional(vars, "LOGO_URL"),
            background_url: optional(vars, "BG_URL"),
            connect_url: optional(vars, "CONNECT_URL"),
            connect_main: optional(vars, "CONNECT_MAIN"),
            connect_proxy: optional(vars, "CONNECT_PROXY"),
            restart_info_channel_id: optional(vars, "RESTART_INFO_CHANNEL_ID"),
            server_name: optional(vars, "SERVER_NAME").unwrap_or_else(default_server_name),
            admin_panel,
            status_api_base: optional(vars, "STATUS_API_BASE")
                .unwrap_or_else(|| DEFAULT_STATUS_API_BASE.to_string()),
            discord_api_base: optional(vars, "DISCORD_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            gateway_url: optional(vars, "DISCORD_GATEWAY_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_URL.to_string()),
            maintenance_file: optional(vars, "MAINTENANCE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_maintenance_file),
            admin_only_file: optional(vars, "ADMIN_ONLY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_admin_only_file),
            poll_interval_secs: number(vars, "POLL_INTERVAL_SECS", default_poll_interval_secs())?,
            fetch_timeout_secs: number(vars, "FETCH_TIMEOUT_SECS", default_fetch_timeout_secs())?,
            log_level: match optional(vars, "LOG_LEVEL") {
                Some(level) => level
                    .parse()
                    .map_err(|e: String| CliError::config_error(format!("LOG_LEVEL: {}", e)))?,
                None => Severity::Info,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(CliError::config_error("POLL_INTERVAL_SECS must be > 0"));
        }

        let max_timeout = MAX_FETCH_TIMEOUT.as_secs();
        if !(1..=max_timeout).contains(&self.fetch_timeout_secs) {
            return Err(CliError::config_error(format!(
                "FETCH_TIMEOUT_SECS must be between 1 and {}",
                max_timeout
            )));
        }

        if matches!(self.admin_panel, Some((_, 0))) {
            return Err(CliError::config_error("ADMIN_PANEL_PORT must be > 0"));
        }

        let urls = [
            ("WEBHOOK_URL", self.webhook_url.as_deref()),
            ("CONNECT_URL", self.connect_url.as_deref()),
            ("STATUS_API_BASE", Some(self.status_api_base.as_str())),
            ("DISCORD_API_BASE", Some(self.discord_api_base.as_str())),
        ];
        for (key, url) in urls {
            if let Some(url) = url {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(CliError::config_error(format!(
                        "{} must be an http(s) URL",
                        key
                    )));
                }
            }
        }

        if !(self.gateway_url.starts_with("ws://") || self.gateway_url.starts_with("wss://")) {
            return Err(CliError::config_error(
                "DISCORD_GATEWAY_URL must be a ws(s) URL",
            ));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn branding(&self) -> Branding {
        Branding {
            server_name: self.server_name.clone(),
            connect_main: self.connect_main.clone(),
            connect_proxy: self.connect_proxy.clone(),
            restart_info_channel_id: self.restart_info_channel_id.clone(),
            connect_url: self.connect_url.clone(),
            logo_url: self.logo_url.clone(),
            background_url: self.background_url.clone(),
            poll_interval_secs: self.poll_interval_secs,
        }
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig {
            api_base: self.status_api_base.clone(),
            server_id: self.server_id.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
            admin_panel: self.admin_panel.clone(),
        }
    }

    pub fn discord_config(&self) -> DiscordConfig {
        DiscordConfig {
            api_base: self.discord_api_base.clone(),
            gateway: GatewayConfig {
                url: self.gateway_url.clone(),
                ..GatewayConfig::new(self.token.clone())
            },
            ..DiscordConfig::new(self.token.clone(), self.channel_id.clone())
        }
    }

    pub fn marker_store(&self) -> MarkerFileStore {
        MarkerFileStore::new(&self.maintenance_file, &self.admin_only_file)
    }

    /// Summary safe to print: the token and webhook URL are redacted
    pub fn summary(&self) -> Value {
        let webhook = if self.webhook_url.is_some() {
            "configured"
        } else {
            "disabled"
        };
        let admin_panel = self
            .admin_panel
            .as_ref()
            .map(|(host, port)| format!("{}:{}", host, port));

        json!({
            "bot_token": redact(&self.token),
            "channel_id": self.channel_id,
            "server_id": self.server_id,
            "server_name": self.server_name,
            "webhook": webhook,
            "connect_url": self.connect_url,
            "connect_main": self.connect_main,
            "connect_proxy": self.connect_proxy,
            "restart_info_channel_id": self.restart_info_channel_id,
            "admin_panel": admin_panel,
            "status_api_base": self.status_api_base,
            "discord_api_base": self.discord_api_base,
            "maintenance_file": self.maintenance_file.display().to_string(),
            "admin_only_file": self.admin_only_file.display().to_string(),
            "poll_interval_secs": self.poll_interval_secs,
            "fetch_timeout_secs": self.fetch_timeout_secs,
            "log_level": self.log_level.as_str(),
        })
    }
}

fn optional(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn required(vars: &HashMap<String, String>, key: &str) -> CliResult<String> {
    optional(vars, key).ok_or_else(|| CliError::config_error(format!("{} is required", key)))
}

fn number<T: FromStr>(vars: &HashMap<String, String>, key: &str, default: T) -> CliResult<T> {
    match optional(vars, key) {
        Some(raw) => raw.parse().map_err(|_| {
            CliError::config_error(format!("{} must be a number, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}
