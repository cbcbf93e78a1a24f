//! Per-presentation history lookup.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::Mutex;

use slidedeck_core::PresentationId;

use crate::history::CommandHistory;

/// A presentation's history behind an async mutex.
///
/// Holding the lock across the whole execute/undo/redo (store round-trip
/// included) is what serializes operations on one presentation.
pub type SharedHistory = Arc<Mutex<CommandHistory>>;

/// Mapping from presentation id to its history, created lazily.
///
/// Constructed once by the host and shared by handle; it is the only component
/// that creates or removes histories. Entries are never evicted on their own:
/// callers remove them when a presentation is deleted.
#[derive(Debug, Default)]
pub struct HistoryDirectory {
    histories: RwLock<HashMap<PresentationId, SharedHistory>>,
    op_timeout: Option<Duration>,
}

impl HistoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Histories created from now on bound every store call by `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.op_timeout = timeout;
        self
    }

    /// Return the presentation's history, creating it with `max_depth` on first access.
    ///
    /// Concurrent first accesses all receive the same history (first writer
    /// wins); an existing history keeps the bound it was created with.
    pub fn get_or_create(&self, presentation_id: PresentationId, max_depth: usize) -> SharedHistory {
        if let Some(existing) = self.get(presentation_id) {
            return existing;
        }

        // Poisoning only means another thread panicked mid-insert; the map itself is intact.
        let mut histories = self
            .histories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        histories
            .entry(presentation_id)
            .or_insert_with(|| {
                tracing::debug!(%presentation_id, max_depth, "history created");
                let history = CommandHistory::with_capacity(max_depth);
                let history = match self.op_timeout {
                    Some(timeout) => history.with_timeout(timeout),
                    None => history,
                };
                Arc::new(Mutex::new(history))
            })
            .clone()
    }

    pub fn get(&self, presentation_id: PresentationId) -> Option<SharedHistory> {
        self.histories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&presentation_id)
            .cloned()
    }

    /// Discard the presentation's history. Returns whether one existed.
    ///
    /// Callers still holding the handle finish their operation on the detached
    /// history; the next access creates a fresh one.
    pub fn remove(&self, presentation_id: PresentationId) -> bool {
        let removed = self
            .histories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&presentation_id)
            .is_some();
        if removed {
            tracing::debug!(%presentation_id, "history removed");
        }
        removed
    }

    pub fn contains(&self, presentation_id: PresentationId) -> bool {
        self.histories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&presentation_id)
    }

    pub fn len(&self) -> usize {
        self.histories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Cell, SetValue};

    #[test]
    fn creates_lazily_and_reuses() {
        let directory = HistoryDirectory::new();
        let id = PresentationId::new();
        assert!(!directory.contains(id));

        let first = directory.get_or_create(id, 10);
        let second = directory.get_or_create(id, 99);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(directory.len(), 1);
    }

    #[tokio::test]
    async fn existing_history_keeps_its_bound() {
        let directory = HistoryDirectory::new();
        let id = PresentationId::new();
        directory.get_or_create(id, 3);

        let history = directory.get_or_create(id, 50);
        assert_eq!(history.lock().await.max_depth(), 3);
    }

    #[tokio::test]
    async fn remove_discards_history() {
        let directory = HistoryDirectory::new();
        let id = PresentationId::new();
        let cell = Cell::new(0);

        let history = directory.get_or_create(id, 10);
        history.lock().await.execute(SetValue::boxed(&cell, 1)).await.unwrap();

        assert!(directory.remove(id));
        assert!(!directory.remove(id));
        assert!(directory.is_empty());

        let fresh = directory.get_or_create(id, 10);
        assert!(!fresh.lock().await.can_undo());
    }

    #[tokio::test]
    async fn presentations_have_independent_histories() {
        let directory = HistoryDirectory::new();
        let (a, b) = (PresentationId::new(), PresentationId::new());
        let cell = Cell::new(0);

        directory
            .get_or_create(a, 10)
            .lock()
            .await
            .execute(SetValue::boxed(&cell, 1))
            .await
            .unwrap();

        assert!(directory.get_or_create(a, 10).lock().await.can_undo());
        assert!(!directory.get_or_create(b, 10).lock().await.can_undo());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_first_access_yields_one_history() {
        let directory = Arc::new(HistoryDirectory::new());
        let id = PresentationId::new();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let directory = directory.clone();
                tokio::spawn(async move { directory.get_or_create(id, 10) })
            })
            .collect();

        let mut histories = Vec::new();
        for handle in handles {
            histories.push(handle.await.unwrap());
        }

        assert_eq!(directory.len(), 1);
        assert!(histories.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn operations_on_one_presentation_serialize() {
        let directory = Arc::new(HistoryDirectory::new());
        let id = PresentationId::new();
        let cell = Cell::new(0);
        cell.set_delay(Some(Duration::from_millis(30)));

        let tasks: Vec<_> = (1..=2)
            .map(|v| {
                let directory = directory.clone();
                let cell = cell.clone();
                tokio::spawn(async move {
                    let history = directory.get_or_create(id, 10);
                    let mut guard = history.lock().await;
                    guard.execute(SetValue::boxed(&cell, v)).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let history = directory.get_or_create(id, 10);
        let mut guard = history.lock().await;
        assert_eq!(guard.undo_count(), 2);

        // Each command captured the value left by the one before it, so
        // undoing both lands on the initial value whatever the order was.
        guard.undo().await.unwrap();
        guard.undo().await.unwrap();
        assert_eq!(cell.get(), 0);
    }

    #[tokio::test]
    async fn timeout_applies_to_created_histories() {
        let directory = HistoryDirectory::new().with_timeout(Some(Duration::from_millis(10)));
        let id = PresentationId::new();
        let cell = Cell::new(0);
        cell.set_delay(Some(Duration::from_millis(300)));

        let history = directory.get_or_create(id, 10);
        let err = history
            .lock()
            .await
            .execute(SetValue::boxed(&cell, 1))
            .await
            .unwrap_err();
        assert!(err.cause().is_some());
        assert_eq!(cell.get(), 0);
    }
}
