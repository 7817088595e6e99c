use serde::Serialize;

use crate::error::CameraFailure;
use crate::files::FinalArtifact;

/// Outcome of one decision pipeline
#[derive(Debug, Clone, Serialize)]
pub struct AttemptReport {
    /// How far into the raw captures the clips start
    pub trim_offset_ms: i64,

    /// One clip per camera that made it through
    pub artifacts: Vec<FinalArtifact>,

    /// Cameras skipped after exhausting retries or failing to file
    #[serde(skip)]
    pub failures: Vec<CameraFailure>,
}

impl AttemptReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Status message for the Ready notification
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            return "Videos ready".to_string();
        }

        let cameras: Vec<&str> = self.failures.iter().map(|f| f.camera.as_str()).collect();
        format!(
            "Videos ready ({} of {} cameras failed: {})",
            self.failures.len(),
            self.failures.len() + self.artifacts.len(),
            cameras.join(", ")
        )
    }
}
