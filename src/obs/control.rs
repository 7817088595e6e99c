use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ControlError;

/// Remote control of the capture tool
///
/// Implementations:
/// - `ObsClient`: obs-websocket hotkey requests
/// - `LoggingControl`: dry run, logs the action and succeeds
#[async_trait]
pub trait RemoteControl: Send + Sync {
    /// Trigger the named action and wait for the tool to accept it
    async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError>;
}

/// Logical actions the recorder needs from the capture tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Reset the replay source (arm)
    Reset,
    Start,
    Stop,
}

/// Key identifiers bound to each action in the capture tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotkeys {
    pub reset: String,
    pub start: String,
    pub stop: String,
}

impl Hotkeys {
    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::Reset => &self.reset,
            Action::Start => &self.start,
            Action::Stop => &self.stop,
        }
    }
}

impl Default for Hotkeys {
    fn default() -> Self {
        Self {
            reset: "OBS_KEY_F6".to_string(),
            start: "OBS_KEY_F7".to_string(),
            stop: "OBS_KEY_F8".to_string(),
        }
    }
}

/// Control used with `--no-video`: nothing is sent to the capture tool
#[derive(Debug, Default)]
pub struct LoggingControl;

#[async_trait]
impl RemoteControl for LoggingControl {
    async fn trigger_action(&self, action_id: &str) -> Result<(), ControlError> {
        info!("Simulating control action {}", action_id);
        Ok(())
    }
}
