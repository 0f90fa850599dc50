// Public-transport stationboard client.
//
// Fetches the departure board for one configured stop. The provider
// response is kept structurally intact (unknown fields are preserved via
// flattening) because the UI renders it as-is.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, ensure_success, parse_json};

/// Departure board for one stop, as returned by the transit provider.
///
/// Only the top-level split between station metadata and the departure
/// list is modeled; everything below is provider-shaped JSON that flows
/// through to subscribers unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stationboard {
    /// Metadata for the queried stop.
    #[serde(default)]
    pub station: serde_json::Value,
    /// Upcoming departures, ordered by the provider.
    #[serde(default)]
    pub stationboard: Vec<serde_json::Value>,
    /// Anything else the provider sends along.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Client for the stationboard API.
pub struct TransitClient {
    http: reqwest::Client,
    api_url: Url,
    station: String,
    limit: u32,
}

impl TransitClient {
    /// Create a client querying `station` with at most `limit` departures
    /// per fetch.
    pub fn new(http: reqwest::Client, api_url: Url, station: String, limit: u32) -> Self {
        Self {
            http,
            api_url,
            station,
            limit,
        }
    }

    /// Fetch the current departure board.
    pub async fn stationboard(&self) -> Result<Stationboard, Error> {
        let mut url = self.api_url.clone();
        url.query_pairs_mut()
            .append_pair("station", &self.station)
            .append_pair("limit", &self.limit.to_string());
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        parse_json(resp).await
    }
}
