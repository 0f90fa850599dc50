//! Async HTTP clients for every upstream service the dashboard polls.
//!
//! One client per upstream, all sharing a [`reqwest::Client`] built through
//! [`transport::TransportConfig`]:
//!
//! - **[`TransitClient`]** — public-transport stationboard (departures for a
//!   configured stop).
//! - **[`BridgeClient`]** — Hue-style lighting bridge: discovery of the
//!   bridge address, group state reads, and group action writes.
//! - **[`WasteClient`]** — the two municipal waste-calendar providers (one
//!   GET returning multiple categories, one POST returning German-formatted
//!   dates for a single category).
//!
//! Clients return typed responses where the dashboard needs structure and
//! pass provider JSON through untouched where it does not (the UI renders
//! the provider shapes directly). All failure modes are collapsed into
//! [`Error`]; callers decide whether a failure is fatal (the light write
//! path) or just a skipped refresh cycle (everything else).

pub mod error;
pub mod lights;
pub mod transit;
pub mod transport;
pub mod waste;

pub use error::Error;
pub use lights::{BridgeClient, BridgeEndpoint, GroupAction, LightGroup, LightGroups};
pub use transit::{Stationboard, TransitClient};
pub use transport::TransportConfig;
pub use waste::{WasteCalendar, WasteClient, convert_german_date};
