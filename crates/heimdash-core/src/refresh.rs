// ── Recurring poll tasks ──
//
// One independent loop per domain, each owned by the Dashboard and
// cancelled through a child token on shutdown. Running each loop as a
// single task serialises its ticks: a slow upstream delays the next
// tick rather than starting an overlapping fetch in the same domain.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::dashboard::Dashboard;

fn poll_interval(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period);
    // If a fetch outlasts the period, resume on a fresh cadence instead
    // of firing a burst of catch-up ticks.
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

pub(crate) async fn stationboard_poll_task(
    dashboard: Dashboard,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = poll_interval(period);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tracing::trace!("stationboard poll tick");
                dashboard.refresh_stationboard().await;
            }
        }
    }
}

pub(crate) async fn bridge_discovery_task(
    dashboard: Dashboard,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = poll_interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tracing::trace!("bridge discovery tick");
                dashboard.refresh_bridge().await;
            }
        }
    }
}

pub(crate) async fn groups_poll_task(
    dashboard: Dashboard,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = poll_interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tracing::trace!("light groups poll tick");
                dashboard.refresh_groups().await;
            }
        }
    }
}

pub(crate) async fn calendar_poll_task(
    dashboard: Dashboard,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = poll_interval(period);
    interval.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tracing::trace!("waste calendar poll tick");
                dashboard.refresh_calendar().await;
            }
        }
    }
}
