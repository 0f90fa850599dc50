//! Reactive data layer between `heimdash-api` and the HTTP surface.
//!
//! This crate owns the polling-cache-and-fan-out core of the dashboard:
//!
//! - **[`SnapshotCell<T>`]** — one shared mutable cell per data domain.
//!   Holds the most recently fetched value, replaced atomically per refresh
//!   cycle; readers never see a partially updated structure.
//!
//! - **[`Dashboard`]** — central facade managing the full lifecycle:
//!   [`start()`](Dashboard::start) runs one refresh cycle per domain to
//!   completion, then spawns the recurring poll tasks. Cheaply cloneable
//!   via `Arc`, so HTTP handlers and background tasks share one instance.
//!
//! - **Light convergence** — [`Dashboard::trigger_light`] writes to the
//!   bridge and publishes a single shared "settle" future covering the
//!   debounced groups re-read. A new trigger supersedes the previous
//!   future; [`Dashboard::settled`] always hands out the latest one, so
//!   fast-polling subscribers never read a just-toggled group's stale state.
//!
//! - **[`WifiAccess`]** — on-demand Wi-Fi credential snapshot with a
//!   QR-encoded join string. Regenerated per request, never cached, never
//!   logged.

pub mod config;
pub mod dashboard;
pub mod error;
mod refresh;
pub mod snapshot;
pub mod wifi;

pub use config::{CalendarConfig, DashboardConfig, LightsConfig, StationboardConfig};
pub use dashboard::{Dashboard, Settle};
pub use error::CoreError;
pub use snapshot::SnapshotCell;
pub use wifi::{WifiAccess, WifiSnapshot};

// Upstream types exposed through snapshots.
pub use heimdash_api::{BridgeEndpoint, LightGroup, LightGroups, Stationboard, WasteCalendar};
