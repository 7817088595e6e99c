use crate::recording::TimingEvent;
use crate::status::StatusBoard;
use tokio::sync::mpsc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// In-order feed into the recorder's event loop
    pub events: mpsc::Sender<TimingEvent>,

    /// Latest phase published by the recorder
    pub status: StatusBoard,
}

impl AppState {
    pub fn new(events: mpsc::Sender<TimingEvent>, status: StatusBoard) -> Self {
        Self { events, status }
    }
}
