// Lighting bridge client.
//
// Three concerns share the bridge access token, so they live in one
// client: discovery of the bridge address, group state reads, and group
// action writes. The bridge is addressed by whatever `BridgeEndpoint`
// the caller currently holds — the client itself is address-agnostic.

use std::collections::BTreeMap;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{Error, ensure_success, parse_json};

/// Field the discovery service uses for the bridge's LAN address.
const DISCOVERY_ADDRESS_KEY: &str = "internalipaddress";

/// A resolved lighting bridge address.
///
/// Either discovered or the configured fallback; the access token lives
/// in [`BridgeClient`], not here, so endpoints are freely cloneable and
/// loggable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEndpoint {
    /// Bridge LAN address (IP or hostname, no scheme).
    pub address: String,
}

impl BridgeEndpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// One lighting group as reported by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LightGroup {
    /// Human-readable group name.
    pub name: String,
    /// Current group action state.
    #[serde(default)]
    pub action: GroupAction,
    /// Bridge fields the dashboard does not interpret (lights, class, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `action` block of a group: on/off plus whatever else the bridge
/// reports (brightness, hue, color mode, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GroupAction {
    #[serde(default)]
    pub on: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Full group mapping keyed by the bridge's group identifier.
pub type LightGroups = BTreeMap<String, LightGroup>;

/// Client for the lighting bridge and its discovery service.
pub struct BridgeClient {
    http: reqwest::Client,
    discovery_url: Url,
    /// Bridge access token; appears in request paths, never in logs.
    user: SecretString,
}

impl BridgeClient {
    pub fn new(http: reqwest::Client, discovery_url: Url, user: SecretString) -> Self {
        Self {
            http,
            discovery_url,
            user,
        }
    }

    /// Resolve the bridge address via the discovery service.
    ///
    /// The service answers with an array of candidate bridges; the first
    /// entry's address field wins. An empty array or a missing field is an
    /// [`Error::UnexpectedPayload`] — the caller keeps its current endpoint.
    pub async fn discover(&self) -> Result<BridgeEndpoint, Error> {
        debug!("GET {}", self.discovery_url);
        let resp = self.http.get(self.discovery_url.clone()).send().await?;
        let resp = ensure_success(resp).await?;
        let candidates: Vec<serde_json::Value> = parse_json(resp).await?;

        let address = candidates
            .first()
            .and_then(|c| c.get(DISCOVERY_ADDRESS_KEY))
            .and_then(|a| a.as_str())
            .ok_or(Error::UnexpectedPayload(
                "discovery response carries no bridge address",
            ))?;

        Ok(BridgeEndpoint::new(address))
    }

    /// Fetch all groups from the bridge at `endpoint`.
    pub async fn groups(&self, endpoint: &BridgeEndpoint) -> Result<LightGroups, Error> {
        let url = self.groups_url(endpoint, None)?;
        debug!(address = %endpoint.address, "fetching light groups");
        let resp = self.http.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        parse_json(resp).await
    }

    /// Switch group `group_id` on or off.
    ///
    /// The bridge's raw acknowledgement body is returned verbatim — the
    /// bridge reports per-attribute success/error entries and the UI shows
    /// them as-is. Only transport failures and non-success statuses become
    /// errors here.
    pub async fn set_group_on(
        &self,
        endpoint: &BridgeEndpoint,
        group_id: &str,
        on: bool,
    ) -> Result<serde_json::Value, Error> {
        let url = self.groups_url(endpoint, Some(group_id))?;
        debug!(address = %endpoint.address, group = group_id, on, "sending group action");

        let resp = self
            .http
            .put(url)
            .json(&serde_json::json!({ "on": on }))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        parse_json(resp).await
    }

    /// Build `http://{address}/api/{user}/groups/` or, with a group id,
    /// the group's `action/` path.
    fn groups_url(&self, endpoint: &BridgeEndpoint, group_id: Option<&str>) -> Result<Url, Error> {
        let base = format!(
            "http://{}/api/{}/groups/",
            endpoint.address,
            self.user.expose_secret()
        );
        let full = match group_id {
            Some(id) => format!("{base}{id}/action/"),
            None => base,
        };
        Ok(Url::parse(&full)?)
    }
}
