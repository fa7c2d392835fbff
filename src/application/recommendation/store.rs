use std::sync::Arc;

use tokio::sync::{watch, Mutex, MutexGuard};

use super::model::MatrixFactorization;

/// Holds the current recommender model.
///
/// Readers take a snapshot and never wait on training. Trainers hold
/// [`ModelStore::lock_training`] so at most one pass runs at a time and
/// the result is published with a single swap.
pub struct ModelStore {
    current: watch::Sender<Option<Arc<MatrixFactorization>>>,
    training: Mutex<()>,
}

pub type SharedModelStore = Arc<ModelStore>;

impl ModelStore {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            training: Mutex::new(()),
        }
    }

    pub fn shared() -> SharedModelStore {
        Arc::new(Self::new())
    }

    /// Snapshot of the published model, if any
    pub fn current(&self) -> Option<Arc<MatrixFactorization>> {
        self.current.borrow().clone()
    }

    pub fn publish(&self, model: Option<MatrixFactorization>) {
        self.current.send_replace(model.map(Arc::new));
    }

    /// Notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<MatrixFactorization>>> {
        self.current.subscribe()
    }

    pub async fn lock_training(&self) -> MutexGuard<'_, ()> {
        self.training.lock().await
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::recommendation::model::FeedbackEntry;
    use crate::config::RecommenderSection;

    #[tokio::test]
    async fn publish_swaps_snapshot() {
        let store = ModelStore::new();
        let mut updates = store.subscribe();
        assert!(store.current().is_none());

        let entries = [FeedbackEntry {
            user_id: 1,
            product_id: 1,
            label: 1.0,
        }];
        let model = MatrixFactorization::train(&entries, &RecommenderSection::default());
        store.publish(model);

        updates.changed().await.unwrap();
        assert!(updates.borrow().is_some());
        let snapshot = store.current().unwrap();

        store.publish(None);
        assert!(store.current().is_none());
        // Earlier snapshots stay usable
        assert_eq!(snapshot.user_count(), 1);
    }
}
