// ── SSE fan-out channels ──
//
// One stream per subscriber connection, per domain. On connect the
// current snapshot is pushed immediately; afterwards the stream emits
// the current value on every tick of its cadence, changed or not — no
// diffing, no backlog. When the subscriber disconnects axum drops the
// stream, which releases the interval; nothing else to clean up.

use std::sync::Arc;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use serde::Serialize;
use tokio::sync::watch;

/// Serialize the current snapshot into one SSE frame.
fn snapshot_event<T: Serialize>(rx: &watch::Receiver<Arc<T>>) -> Result<Event, axum::Error> {
    let value = rx.borrow().clone();
    Event::default().json_data(&*value)
}

/// Periodic snapshot push: emit now, then on every tick.
pub fn push_stream<T>(
    rx: watch::Receiver<Arc<T>>,
    period: Duration,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    T: Serialize + Send + Sync + 'static,
{
    let stream = async_stream::stream! {
        yield snapshot_event(&rx);
        let mut interval = tokio::time::interval(period);
        interval.tick().await; // consume the immediate first tick
        loop {
            interval.tick().await;
            yield snapshot_event(&rx);
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Like [`push_stream`], but each tick first awaits the supplied settle
/// future so a just-written light state is re-read before it is served.
///
/// `settle` is called per tick and must hand out the *latest* pending
/// convergence — a write issued mid-stream supersedes older ones.
pub fn push_stream_settled<T, F, Fut>(
    rx: watch::Receiver<Arc<T>>,
    period: Duration,
    settle: F,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    T: Serialize + Send + Sync + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send,
{
    let stream = async_stream::stream! {
        yield snapshot_event(&rx);
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            settle().await;
            yield snapshot_event(&rx);
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// One-shot push: emit a single precomputed value, then end the stream.
pub fn one_shot<T>(value: T) -> Sse<impl Stream<Item = Result<Event, axum::Error>>>
where
    T: Serialize + Send + 'static,
{
    let stream =
        futures_util::stream::once(async move { Event::default().json_data(&value) });
    Sse::new(stream)
}
