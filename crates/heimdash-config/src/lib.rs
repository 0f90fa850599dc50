//! Settings for the heimdash server.
//!
//! Layered loading via figment: built-in defaults, then an optional
//! `heimdash.toml`, then `HEIMDASH_`-prefixed environment variables
//! (nested keys separated by `__`, e.g. `HEIMDASH_WIFI__SSID`). The
//! validated [`Settings`] translate into `heimdash_core::DashboardConfig`
//! plus the server-side push cadences — core never reads files or
//! environment itself.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use heimdash_api::TransportConfig;
use heimdash_core::{
    CalendarConfig, DashboardConfig, LightsConfig, StationboardConfig, WifiAccess,
};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "heimdash.toml";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings structs ────────────────────────────────────────────────

/// Top-level settings, one section per concern.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static dashboard assets; omitted disables static
    /// serving (useful for API-only deployments and tests).
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub stationboard: StationboardSettings,
    #[serde(default)]
    pub lights: LightSettings,
    #[serde(default)]
    pub calendar: CalendarSettings,
    #[serde(default)]
    pub wifi: WifiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: None,
            timeout_secs: default_timeout(),
            stationboard: StationboardSettings::default(),
            lights: LightSettings::default(),
            calendar: CalendarSettings::default(),
            wifi: WifiSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationboardSettings {
    /// Stop to query. Required.
    #[serde(default)]
    pub station: String,

    #[serde(default = "default_station_limit")]
    pub limit: u32,

    #[serde(default = "default_stationboard_url")]
    pub api_url: Url,

    /// Upstream refresh cadence in seconds.
    #[serde(default = "default_stationboard_poll")]
    pub poll_interval_secs: u64,

    /// Fan-out cadence in seconds.
    #[serde(default = "default_stationboard_push")]
    pub push_interval_secs: u64,
}

impl Default for StationboardSettings {
    fn default() -> Self {
        Self {
            station: String::new(),
            limit: default_station_limit(),
            api_url: default_stationboard_url(),
            poll_interval_secs: default_stationboard_poll(),
            push_interval_secs: default_stationboard_push(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LightSettings {
    /// Bridge access token. Required.
    #[serde(default)]
    pub user: String,

    /// Address used until discovery succeeds. Required.
    #[serde(default)]
    pub bridge_fallback: String,

    #[serde(default = "default_discovery_url")]
    pub discovery_url: Url,

    #[serde(default = "default_discovery_interval")]
    pub discovery_interval_secs: u64,

    #[serde(default = "default_groups_poll")]
    pub poll_interval_secs: u64,

    /// Cadence of the low-frequency full-groups fan-out.
    #[serde(default = "default_groups_push")]
    pub push_groups_interval_secs: u64,

    /// Cadence of the convergence-aware light fan-out.
    #[serde(default = "default_light_push")]
    pub push_light_interval_secs: u64,

    /// Delay between a group write and its convergence re-read.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            user: String::new(),
            bridge_fallback: String::new(),
            discovery_url: default_discovery_url(),
            discovery_interval_secs: default_discovery_interval(),
            poll_interval_secs: default_groups_poll(),
            push_groups_interval_secs: default_groups_push(),
            push_light_interval_secs: default_light_push(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalendarSettings {
    /// Postal code for both waste-calendar providers. Required.
    #[serde(default)]
    pub zip: String,

    #[serde(default = "default_erz_url")]
    pub erz_url: Url,

    #[serde(default = "default_pickup_url")]
    pub pickup_url: Url,

    #[serde(default = "default_pickup_type")]
    pub pickup_type: String,

    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: u32,

    #[serde(default = "default_entry_limit")]
    pub entry_limit: usize,

    #[serde(default = "default_calendar_poll")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_calendar_push")]
    pub push_interval_secs: u64,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            zip: String::new(),
            erz_url: default_erz_url(),
            pickup_url: default_pickup_url(),
            pickup_type: default_pickup_type(),
            fetch_limit: default_fetch_limit(),
            entry_limit: default_entry_limit(),
            poll_interval_secs: default_calendar_poll(),
            push_interval_secs: default_calendar_push(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WifiSettings {
    /// Network name. Required.
    #[serde(default)]
    pub ssid: String,

    /// Network password. Required; kept as plain text only inside this
    /// struct — wrapped in `SecretString` the moment it leaves.
    #[serde(default)]
    pub password: String,
}

// ── Defaults ────────────────────────────────────────────────────────

fn default_port() -> u16 {
    3000
}
fn default_timeout() -> u64 {
    10
}
fn default_station_limit() -> u32 {
    5
}
fn default_stationboard_url() -> Url {
    Url::parse("https://transport.opendata.ch/v1/stationboard").expect("static URL")
}
fn default_stationboard_poll() -> u64 {
    30
}
fn default_stationboard_push() -> u64 {
    10
}
fn default_discovery_url() -> Url {
    Url::parse("https://discovery.meethue.com/").expect("static URL")
}
fn default_discovery_interval() -> u64 {
    86_400
}
fn default_groups_poll() -> u64 {
    1
}
fn default_groups_push() -> u64 {
    3600
}
fn default_light_push() -> u64 {
    1
}
fn default_settle_delay() -> u64 {
    200
}
fn default_erz_url() -> Url {
    Url::parse("https://openerz.metaodi.ch/api/calendar.json").expect("static URL")
}
fn default_pickup_url() -> Url {
    Url::parse("https://api.mr-green.ch/api/get-pickup-dates-new-main").expect("static URL")
}
fn default_pickup_type() -> String {
    "Monthly".into()
}
fn default_fetch_limit() -> u32 {
    10
}
fn default_entry_limit() -> usize {
    3
}
fn default_calendar_poll() -> u64 {
    3600
}
fn default_calendar_push() -> u64 {
    3600
}

// ── Loading & translation ───────────────────────────────────────────

impl Settings {
    /// Load settings: defaults ← optional `heimdash.toml` ← environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("HEIMDASH_").split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations that cannot possibly work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("stationboard.station", &self.stationboard.station),
            ("lights.user", &self.lights.user),
            ("lights.bridge_fallback", &self.lights.bridge_fallback),
            ("calendar.zip", &self.calendar.zip),
            ("wifi.ssid", &self.wifi.ssid),
            ("wifi.password", &self.wifi.password),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: "must not be empty".into(),
                });
            }
        }
        if self.lights.poll_interval_secs == 0 {
            return Err(ConfigError::Validation {
                field: "lights.poll_interval_secs".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Translate into the core's typed runtime configuration.
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            transport: TransportConfig {
                timeout: Duration::from_secs(self.timeout_secs),
            },
            stationboard: StationboardConfig {
                api_url: self.stationboard.api_url.clone(),
                station: self.stationboard.station.clone(),
                limit: self.stationboard.limit,
                poll_interval: Duration::from_secs(self.stationboard.poll_interval_secs),
            },
            lights: LightsConfig {
                user: self.lights.user.clone().into(),
                fallback_address: self.lights.bridge_fallback.clone(),
                discovery_url: self.lights.discovery_url.clone(),
                discovery_interval: Duration::from_secs(self.lights.discovery_interval_secs),
                poll_interval: Duration::from_secs(self.lights.poll_interval_secs),
                settle_delay: Duration::from_millis(self.lights.settle_delay_ms),
            },
            calendar: CalendarConfig {
                erz_url: self.calendar.erz_url.clone(),
                pickup_url: self.calendar.pickup_url.clone(),
                zip: self.calendar.zip.clone(),
                pickup_type: self.calendar.pickup_type.clone(),
                fetch_limit: self.calendar.fetch_limit,
                entry_limit: self.calendar.entry_limit,
                poll_interval: Duration::from_secs(self.calendar.poll_interval_secs),
            },
        }
    }

    /// Wi-Fi credentials, password wrapped as a secret.
    pub fn wifi_access(&self) -> WifiAccess {
        WifiAccess::new(self.wifi.ssid.clone(), self.wifi.password.clone().into())
    }
}
