//! Phase notifications for the web interface
//!
//! The recorder pushes updates and never waits on consumers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Recording,
    Trimming,
    Ready,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub phase: Phase,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Fire-and-forget sink for phase changes; must not block
pub trait StatusSink: Send + Sync {
    fn send_status(&self, phase: Phase, message: &str);
}

/// Keeps the latest update and broadcasts every update to subscribers
#[derive(Clone)]
pub struct StatusBoard {
    latest: Arc<RwLock<Option<StatusUpdate>>>,
    tx: broadcast::Sender<StatusUpdate>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        Self {
            latest: Arc::new(RwLock::new(None)),
            tx,
        }
    }

    pub fn latest(&self) -> Option<StatusUpdate> {
        self.latest.read().ok().and_then(|latest| latest.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusUpdate> {
        self.tx.subscribe()
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for StatusBoard {
    fn send_status(&self, phase: Phase, message: &str) {
        let update = StatusUpdate {
            phase,
            message: message.to_string(),
            at: Utc::now(),
        };

        if let Ok(mut latest) = self.latest.write() {
            *latest = Some(update.clone());
        }

        // No subscribers is fine
        if self.tx.send(update).is_err() {
            debug!("Status update with no subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_without_subscribers() {
        let board = StatusBoard::new();
        assert!(board.latest().is_none());

        board.send_status(Phase::Recording, "Recording: Jane Doe - SNATCH attempt 1");
        let latest = board.latest().unwrap();
        assert_eq!(latest.phase, Phase::Recording);
        assert_eq!(latest.message, "Recording: Jane Doe - SNATCH attempt 1");
    }

    #[tokio::test]
    async fn test_subscribers_receive_updates() {
        let board = StatusBoard::new();
        let mut rx = board.subscribe();

        board.send_status(Phase::Trimming, "Trimming");
        board.send_status(Phase::Ready, "Videos ready");

        assert_eq!(rx.recv().await.unwrap().phase, Phase::Trimming);
        assert_eq!(rx.recv().await.unwrap().phase, Phase::Ready);
    }
}
