//! # Remote Status Fetcher
//!
//! Reads the server's entry from the CFX server list API. Fetching is a total
//! operation: network failures, timeouts and malformed payloads all come back
//! as an offline reading with zeroed counters.

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::errors::{FetchError, FetchResult};
use super::types::RawServerReading;
use crate::observability::{log_event_with_fields, Event};

/// Default base URL of the CFX single-server endpoint
pub const DEFAULT_STATUS_API_BASE: &str = "https://servers-frontend.fivem.net/api/servers/single";

/// Upper bound for a single status request
pub const MAX_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Sent with every status request
pub const USER_AGENT: &str = concat!(
    "statusbot/",
    env!("CARGO_PKG_VERSION"),
    " (DiscordBot; game server status relay)"
);

/// Anything that can produce one reading per cycle
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current reading. Never fails.
    async fn fetch(&self) -> RawServerReading;
}

/// Fetcher settings
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL; the server id is appended as the last path segment
    pub api_base: String,

    /// Server identifier on the server list
    pub server_id: String,

    /// Per-request timeout, clamped to `MAX_FETCH_TIMEOUT`
    pub timeout: Duration,

    /// Host and port of the server's own HTTP endpoint, used as the uptime source
    pub admin_panel: Option<(String, u16)>,
}

impl FetcherConfig {
    pub fn new(server_id: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_STATUS_API_BASE.to_string(),
            server_id: server_id.into(),
            timeout: MAX_FETCH_TIMEOUT,
            admin_panel: None,
        }
    }

    /// Full status URL for the configured server
    pub fn status_url(&self) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), self.server_id)
    }

    /// `info.json` URL on the admin panel host, if one is configured
    pub fn uptime_url(&self) -> Option<String> {
        self.admin_panel
            .as_ref()
            .map(|(host, port)| format!("http://{}:{}/info.json", host, port))
    }
}

/// HTTP fetcher for the CFX server list API
pub struct CfxStatusFetcher {
    client: reqwest::Client,
    status_url: String,
    uptime_url: Option<String>,
    timeout: Duration,
}

impl CfxStatusFetcher {
    pub fn new(config: FetcherConfig) -> FetchResult<Self> {
        let timeout = config.timeout.min(MAX_FETCH_TIMEOUT);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            status_url: config.status_url(),
            uptime_url: config.uptime_url(),
            timeout,
        })
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }

    async fn get_json(&self, url: &str) -> FetchResult<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::MalformedPayload(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout.as_millis() as u64)
        } else {
            FetchError::Request(error.to_string())
        }
    }

    async fn fetch_primary(&self) -> FetchResult<RawServerReading> {
        let body = self.get_json(&self.status_url).await?;
        parse_status_payload(&body)
    }

    async fn fetch_uptime(&self, url: &str) -> FetchResult<Option<u64>> {
        let body = self.get_json(url).await?;
        Ok(body.pointer("/vars/uptime").map(|v| lenient_u64(Some(v))))
    }
}

#[async_trait]
impl StatusSource for CfxStatusFetcher {
    async fn fetch(&self) -> RawServerReading {
        let mut reading = match self.fetch_primary().await {
            Ok(reading) => reading,
            Err(e) => {
                let reason = e.to_string();
                log_event_with_fields(
                    Event::StatusFetchFailed,
                    &[("kind", e.kind()), ("reason", reason.as_str())],
                );
                return RawServerReading::offline();
            }
        };

        if let Some(url) = &self.uptime_url {
            match self.fetch_uptime(url).await {
                Ok(Some(uptime)) => reading.uptime_seconds = uptime,
                Ok(None) => {}
                Err(e) => {
                    let reason = e.to_string();
                    log_event_with_fields(
                        Event::UptimeSourceFailed,
                        &[("kind", e.kind()), ("reason", reason.as_str())],
                    );
                }
            }
        }

        let players = reading.player_count.to_string();
        let max_players = reading.max_players.to_string();
        let uptime = reading.uptime_seconds.to_string();
        log_event_with_fields(
            Event::StatusFetched,
            &[
                ("max_players", max_players.as_str()),
                ("players", players.as_str()),
                ("uptime_seconds", uptime.as_str()),
            ],
        );

        reading
    }
}

/// Turn a server list payload into a reading
///
/// The payload must carry a `Data` object; every number inside it is optional.
pub fn parse_status_payload(body: &Value) -> FetchResult<RawServerReading> {
    let data = body
        .get("Data")
        .filter(|data| data.is_object())
        .ok_or_else(|| FetchError::MalformedPayload("missing Data object".to_string()))?;

    Ok(RawServerReading::online(
        lenient_u32(data.get("clients")),
        lenient_u32(data.get("sv_maxclients")),
        lenient_u64(data.pointer("/vars/uptime")),
    ))
}

/// Lenient unsigned parse: numbers are truncated, strings contribute their
/// leading digits, everything else is zero
pub fn lenient_u64(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}

/// `lenient_u64`, saturated to `u32`
pub fn lenient_u32(value: Option<&Value>) -> u32 {
    u32::try_from(lenient_u64(value)).unwrap_or(u32::MAX)
}

/// Settable reading, for tests and dry runs
#[derive(Debug, Default)]
pub struct FixedSource {
    reading: RwLock<RawServerReading>,
}

impl FixedSource {
    pub fn new(reading: RawServerReading) -> Self {
        Self {
            reading: RwLock::new(reading),
        }
    }

    /// Replace the reading returned from now on
    pub fn set(&self, reading: RawServerReading) {
        if let Ok(mut current) = self.reading.write() {
            *current = reading;
        }
    }
}

#[async_trait]
impl StatusSource for FixedSource {
    async fn fetch(&self) -> RawServerReading {
        self.reading.read().map(|r| *r).unwrap_or_default()
    }
}
