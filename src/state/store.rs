use std::sync::Arc;
use tokio::sync::Mutex;

use super::attempt::AttemptState;

/// Shared, lock-protected record of the attempt in flight
///
/// Written by event ingestion and read by the trim pipeline; callers only
/// ever see snapshots.
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<AttemptState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current state
    pub async fn get(&self) -> AttemptState {
        self.inner.lock().await.clone()
    }

    /// Apply `f` under the lock and return the resulting snapshot
    pub async fn update<F>(&self, f: F) -> AttemptState
    where
        F: FnOnce(&mut AttemptState),
    {
        let mut state = self.inner.lock().await;
        f(&mut state);
        state.clone()
    }
}
