// ── HTTP surface ──
//
// REST endpoint for the one write path (light toggling), SSE endpoints
// for the fan-out channels, and optional static asset serving for the
// dashboard UI.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use heimdash_config::Settings;
use heimdash_core::{Dashboard, WifiAccess};

use crate::sse::{one_shot, push_stream, push_stream_settled};

/// Fan-out cadences, one per SSE endpoint.
#[derive(Debug, Clone, Copy)]
pub struct PushCadence {
    pub stationboard: Duration,
    pub groups: Duration,
    pub light: Duration,
    pub calendar: Duration,
}

impl PushCadence {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            stationboard: Duration::from_secs(settings.stationboard.push_interval_secs),
            groups: Duration::from_secs(settings.lights.push_groups_interval_secs),
            light: Duration::from_secs(settings.lights.push_light_interval_secs),
            calendar: Duration::from_secs(settings.calendar.push_interval_secs),
        }
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
    pub wifi: Arc<WifiAccess>,
    pub cadence: PushCadence,
}

/// Build the full application router.
pub fn router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let router = Router::new()
        .route("/api/trigger-light", post(trigger_light))
        .route("/sse/stationboard", get(sse_stationboard))
        .route("/sse/groups", get(sse_groups))
        .route("/sse/light", get(sse_light))
        .route("/sse/calendar", get(sse_calendar))
        .route("/sse/wifi", get(sse_wifi))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

// ── Write path ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TriggerLightRequest {
    id: String,
    on: bool,
}

/// Toggle a lighting group. The bridge acknowledgement passes through
/// verbatim; a failed write becomes a 500 with the error detail attached.
async fn trigger_light(
    State(state): State<AppState>,
    Json(req): Json<TriggerLightRequest>,
) -> Response {
    match state.dashboard.trigger_light(&req.id, req.on).await {
        Ok(ack) => (StatusCode::OK, Json(ack)).into_response(),
        Err(e) => {
            warn!(group = %req.id, error = %e, "light trigger failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "light command failed",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

// ── Fan-out channels ────────────────────────────────────────────────

async fn sse_stationboard(State(state): State<AppState>) -> Response {
    push_stream(
        state.dashboard.subscribe_stationboard(),
        state.cadence.stationboard,
    )
    .into_response()
}

/// Low-frequency baseline sync of the full group mapping.
async fn sse_groups(State(state): State<AppState>) -> Response {
    push_stream(state.dashboard.subscribe_groups(), state.cadence.groups).into_response()
}

/// Fast, convergence-aware group stream — each tick waits for the latest
/// pending write-then-reread cycle before emitting, so a just-toggled
/// light is never served as its stale previous state.
async fn sse_light(State(state): State<AppState>) -> Response {
    let dashboard = state.dashboard.clone();
    push_stream_settled(
        state.dashboard.subscribe_groups(),
        state.cadence.light,
        move || dashboard.settled(),
    )
    .into_response()
}

async fn sse_calendar(State(state): State<AppState>) -> Response {
    push_stream(state.dashboard.subscribe_calendar(), state.cadence.calendar).into_response()
}

/// One-shot Wi-Fi credential push: compute, emit once, close.
async fn sse_wifi(State(state): State<AppState>) -> Response {
    match state.wifi.snapshot() {
        Ok(snapshot) => one_shot(snapshot).into_response(),
        Err(e) => {
            warn!(error = %e, "wifi snapshot generation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "wifi snapshot failed",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}
