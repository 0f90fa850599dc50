// ── Dashboard facade ──
//
// Full lifecycle management for the polling core. Owns one snapshot
// cell per domain, the resolved bridge endpoint, and the convergence
// slot for light writes. `start()` runs an initial refresh cycle per
// domain before spawning the recurring poll tasks, so the HTTP surface
// never serves the empty defaults in normal operation.

use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use heimdash_api::{
    BridgeClient, BridgeEndpoint, LightGroups, Stationboard, TransitClient, WasteCalendar,
    WasteClient,
};

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::refresh;
use crate::snapshot::SnapshotCell;

/// The latest write-then-reread cycle, shared between the trigger path
/// and any number of convergence-aware subscribers. Superseded wholesale
/// on every new write — callers always await the most recent one.
pub type Settle = Shared<BoxFuture<'static, ()>>;

fn settled_already() -> Settle {
    futures_util::future::ready(()).boxed().shared()
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. One instance is shared between the HTTP
/// handlers and the background poll tasks it spawns.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    transit: TransitClient,
    bridge_client: BridgeClient,
    waste: WasteClient,

    /// Resolved bridge endpoint. Starts as the configured fallback so
    /// every lighting fetch always has a target; discovery replaces it
    /// on success and reverts it to the fallback on failure.
    bridge: ArcSwap<BridgeEndpoint>,

    stationboard: SnapshotCell<Stationboard>,
    groups: SnapshotCell<LightGroups>,
    calendar: SnapshotCell<WasteCalendar>,

    /// Latest convergence future (see [`Settle`]).
    converge: Mutex<Settle>,

    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Dashboard {
    /// Create a new Dashboard from configuration. Does NOT fetch anything —
    /// call [`start()`](Self::start) to populate snapshots and spawn the
    /// poll tasks.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let http = config
            .transport
            .build_client()
            .map_err(|e| CoreError::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        let transit = TransitClient::new(
            http.clone(),
            config.stationboard.api_url.clone(),
            config.stationboard.station.clone(),
            config.stationboard.limit,
        );
        let bridge_client = BridgeClient::new(
            http.clone(),
            config.lights.discovery_url.clone(),
            config.lights.user.clone(),
        );
        let waste = WasteClient::new(
            http,
            config.calendar.erz_url.clone(),
            config.calendar.pickup_url.clone(),
            config.calendar.zip.clone(),
            config.calendar.pickup_type.clone(),
            config.calendar.fetch_limit,
            config.calendar.entry_limit,
        );

        let fallback = BridgeEndpoint::new(config.lights.fallback_address.clone());

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                transit,
                bridge_client,
                waste,
                bridge: ArcSwap::from_pointee(fallback),
                stationboard: SnapshotCell::default(),
                groups: SnapshotCell::default(),
                calendar: SnapshotCell::default(),
                converge: Mutex::new(settled_already()),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run one refresh cycle per domain to completion, then spawn the
    /// recurring poll tasks.
    ///
    /// Refresh failures during startup are logged like any other cycle —
    /// the snapshots simply keep their empty defaults until the first
    /// successful tick.
    pub async fn start(&self) {
        self.refresh_bridge().await;
        self.refresh_groups().await;
        self.refresh_stationboard().await;
        self.refresh_calendar().await;
        info!("initial refresh complete");

        let cancel = &self.inner.cancel;
        let handles = vec![
            tokio::spawn(refresh::stationboard_poll_task(
                self.clone(),
                self.inner.config.stationboard.poll_interval,
                cancel.child_token(),
            )),
            tokio::spawn(refresh::bridge_discovery_task(
                self.clone(),
                self.inner.config.lights.discovery_interval,
                cancel.child_token(),
            )),
            tokio::spawn(refresh::groups_poll_task(
                self.clone(),
                self.inner.config.lights.poll_interval,
                cancel.child_token(),
            )),
            tokio::spawn(refresh::calendar_poll_task(
                self.clone(),
                self.inner.config.calendar.poll_interval,
                cancel.child_token(),
            )),
        ];
        self.inner
            .task_handles
            .lock()
            .expect("task handle lock poisoned")
            .extend(handles);
    }

    /// Stop all poll tasks and wait for them to wind down.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handles = std::mem::take(
            &mut *self
                .inner
                .task_handles
                .lock()
                .expect("task handle lock poisoned"),
        );
        for handle in handles {
            let _ = handle.await;
        }
        debug!("poll tasks stopped");
    }

    // ── Snapshot access ──────────────────────────────────────────────

    /// Current transit departures snapshot.
    pub fn stationboard(&self) -> Arc<Stationboard> {
        self.inner.stationboard.get()
    }

    /// Current lighting groups snapshot.
    pub fn groups(&self) -> Arc<LightGroups> {
        self.inner.groups.get()
    }

    /// Current waste-calendar snapshot.
    pub fn calendar(&self) -> Arc<WasteCalendar> {
        self.inner.calendar.get()
    }

    /// Subscribe to stationboard replacements (for fan-out channels).
    pub fn subscribe_stationboard(&self) -> watch::Receiver<Arc<Stationboard>> {
        self.inner.stationboard.subscribe()
    }

    /// Subscribe to lighting-group replacements.
    pub fn subscribe_groups(&self) -> watch::Receiver<Arc<LightGroups>> {
        self.inner.groups.subscribe()
    }

    /// Subscribe to calendar replacements.
    pub fn subscribe_calendar(&self) -> watch::Receiver<Arc<WasteCalendar>> {
        self.inner.calendar.subscribe()
    }

    /// The currently resolved bridge endpoint (fallback or discovered).
    pub fn bridge_endpoint(&self) -> Arc<BridgeEndpoint> {
        self.inner.bridge.load_full()
    }

    // ── Light write path ─────────────────────────────────────────────

    /// Switch a lighting group on or off.
    ///
    /// The bridge's acknowledgement body is returned verbatim; transport
    /// and status failures surface as [`CoreError::LightCommand`]. On a
    /// successful write a new convergence cycle is published: after the
    /// configured settle delay the groups snapshot is re-read once, so
    /// convergence-aware subscribers reflect the change on their next tick.
    pub async fn trigger_light(
        &self,
        group_id: &str,
        on: bool,
    ) -> Result<serde_json::Value, CoreError> {
        let endpoint = self.inner.bridge.load_full();
        let ack = self
            .inner
            .bridge_client
            .set_group_on(&endpoint, group_id, on)
            .await?;
        self.publish_converge();
        Ok(ack)
    }

    /// The latest convergence future.
    ///
    /// Resolves once the most recent write's re-read has completed (or
    /// immediately when no write is pending). Convergence-aware fan-out
    /// ticks await this before emitting.
    pub fn settled(&self) -> Settle {
        self.inner
            .converge
            .lock()
            .expect("converge lock poisoned")
            .clone()
    }

    /// Publish a fresh convergence future, superseding any earlier one.
    ///
    /// The superseded future is not cancelled — its re-read still runs,
    /// it is just no longer what new subscribers wait on.
    fn publish_converge(&self) {
        let dash = self.clone();
        let delay = self.inner.config.lights.settle_delay;
        let settle: Settle = async move {
            tokio::time::sleep(delay).await;
            dash.refresh_groups().await;
        }
        .boxed()
        .shared();

        // Drive the cycle to completion even if nobody ever awaits it.
        tokio::spawn(settle.clone());

        *self
            .inner
            .converge
            .lock()
            .expect("converge lock poisoned") = settle;
    }

    // ── Refresh cycles ───────────────────────────────────────────────
    //
    // Shared by the initial fetch, the recurring poll tasks, and (for
    // groups) the convergence re-read. Failures are logged and the
    // previous snapshot is retained; the next scheduled tick is the retry.

    pub async fn refresh_stationboard(&self) {
        match self.inner.transit.stationboard().await {
            Ok(board) => {
                self.inner.stationboard.replace(board);
                debug!("stationboard refreshed");
            }
            Err(e) => warn!(error = %e, "stationboard refresh failed"),
        }
    }

    /// Resolve the bridge address via discovery.
    ///
    /// On any failure the endpoint reverts to the configured fallback,
    /// even when an earlier cycle had discovered an address. A fresh
    /// discovery result and the fallback are the only two values the
    /// endpoint ever holds.
    pub async fn refresh_bridge(&self) {
        match self.inner.bridge_client.discover().await {
            Ok(endpoint) => {
                info!(address = %endpoint.address, "bridge address resolved");
                self.inner.bridge.store(Arc::new(endpoint));
            }
            Err(e) => {
                let fallback =
                    BridgeEndpoint::new(self.inner.config.lights.fallback_address.clone());
                warn!(
                    error = %e,
                    address = %fallback.address,
                    "bridge discovery failed, using fallback address"
                );
                self.inner.bridge.store(Arc::new(fallback));
            }
        }
    }

    pub async fn refresh_groups(&self) {
        let endpoint = self.inner.bridge.load_full();
        match self.inner.bridge_client.groups(&endpoint).await {
            Ok(groups) => {
                self.inner.groups.replace(groups);
                debug!("light groups refreshed");
            }
            Err(e) => warn!(error = %e, "light groups refresh failed"),
        }
    }

    pub async fn refresh_calendar(&self) {
        match self.inner.waste.fetch().await {
            Ok(calendar) => {
                self.inner.calendar.replace(calendar);
                debug!("waste calendar refreshed");
            }
            Err(e) => warn!(error = %e, "waste calendar refresh failed"),
        }
    }
}
