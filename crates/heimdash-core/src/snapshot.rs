// ── Per-domain snapshot cell ──
//
// Single-writer (the domain's refresher), many readers (fan-out
// channels). Replacement is a whole-value swap through a `watch`
// channel, so readers observe either the previous or the next snapshot,
// never a partially updated structure.

use std::sync::Arc;

use tokio::sync::watch;

/// The latest known value for one data domain.
///
/// Created with the domain's documented default, so `get()` never fails
/// and never returns an absent value — before the first successful
/// refresh it returns the default, afterwards the last good fetch. A
/// failed refresh leaves the previous value in place.
pub struct SnapshotCell<T> {
    tx: watch::Sender<Arc<T>>,
}

impl<T> SnapshotCell<T> {
    /// Create a cell holding `initial`.
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// The current snapshot. Non-blocking, a cheap `Arc` clone.
    pub fn get(&self) -> Arc<T> {
        self.tx.borrow().clone()
    }

    /// Atomically replace the snapshot visible to subsequent `get` calls.
    ///
    /// `send_replace` updates unconditionally, even with zero receivers.
    pub fn replace(&self, value: T) {
        self.tx.send_replace(Arc::new(value));
    }

    /// Subscribe to snapshot replacements.
    ///
    /// The receiver's `borrow()` always yields the current value, which is
    /// what fan-out channels emit on every tick; `changed()` is available
    /// for consumers that want push notification instead.
    pub fn subscribe(&self) -> watch::Receiver<Arc<T>> {
        self.tx.subscribe()
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_before_first_replace_returns_initial() {
        let cell = SnapshotCell::new(vec![0u8; 0]);
        assert!(cell.get().is_empty());
    }

    #[test]
    fn replace_is_visible_to_subsequent_gets() {
        let cell = SnapshotCell::new(String::new());
        cell.replace("fresh".into());
        assert_eq!(*cell.get(), "fresh");
    }

    #[test]
    fn replace_swaps_whole_value() {
        let cell = SnapshotCell::new(vec![1, 2, 3]);
        let before = cell.get();
        cell.replace(vec![4]);
        // The reader holding the old Arc still sees the old value intact.
        assert_eq!(*before, vec![1, 2, 3]);
        assert_eq!(*cell.get(), vec![4]);
    }

    #[tokio::test]
    async fn subscribers_observe_replacements() {
        let cell = SnapshotCell::new(0u32);
        let mut rx = cell.subscribe();
        assert_eq!(**rx.borrow(), 0);

        cell.replace(7);
        rx.changed().await.unwrap();
        assert_eq!(**rx.borrow_and_update(), 7);
    }
}
