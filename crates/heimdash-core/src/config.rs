// ── Runtime dashboard configuration ──
//
// These types describe *what* to poll and how often. They carry the
// bridge access token but never touch disk — `heimdash-config` reads
// files and environment, validates, and hands a `DashboardConfig` in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use heimdash_api::TransportConfig;

/// Transit stationboard polling.
#[derive(Debug, Clone)]
pub struct StationboardConfig {
    /// Stationboard API endpoint.
    pub api_url: Url,
    /// Stop to query.
    pub station: String,
    /// Maximum departures per fetch.
    pub limit: u32,
    /// Refresh cadence.
    pub poll_interval: Duration,
}

/// Lighting bridge discovery, polling, and write settling.
#[derive(Debug, Clone)]
pub struct LightsConfig {
    /// Bridge access token; embedded in request paths.
    pub user: SecretString,
    /// Address used until discovery first succeeds (and whenever it
    /// never does).
    pub fallback_address: String,
    /// Bridge discovery service endpoint.
    pub discovery_url: Url,
    /// Discovery cadence (long — the bridge rarely moves).
    pub discovery_interval: Duration,
    /// Group state cadence (tight — UI responsiveness to physical
    /// switches depends on it).
    pub poll_interval: Duration,
    /// Delay between a group write and its convergence re-read, letting
    /// the physical bridge settle.
    pub settle_delay: Duration,
}

/// Waste-calendar polling across both providers.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// Multi-category GET provider endpoint.
    pub erz_url: Url,
    /// Single-category POST provider endpoint.
    pub pickup_url: Url,
    /// Postal code both providers are queried with.
    pub zip: String,
    /// Subscription type for the POST provider.
    pub pickup_type: String,
    /// `limit` query parameter for the GET provider.
    pub fetch_limit: u32,
    /// Per-category cap in the merged snapshot.
    pub entry_limit: usize,
    /// Refresh cadence.
    pub poll_interval: Duration,
}

/// Everything the [`Dashboard`](crate::Dashboard) needs at runtime.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub transport: TransportConfig,
    pub stationboard: StationboardConfig,
    pub lights: LightsConfig,
    pub calendar: CalendarConfig,
}
