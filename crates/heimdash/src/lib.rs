//! Home-dashboard backend: polls upstream services, holds the latest
//! snapshot per domain, and republishes it to browsers over SSE.
//!
//! The binary in `main.rs` wires [`server::router`] to a running
//! [`heimdash_core::Dashboard`]; the modules here are exposed so the
//! HTTP surface can be exercised in-process.

pub mod server;
pub mod sse;
