use std::path::PathBuf;
use std::time::Duration;

use crate::obs::Hotkeys;

/// Tunables for the recorder
#[derive(Debug, Clone)]
pub struct RecorderSettings {
    /// Where the capture tool writes raw camera files
    pub capture_dir: PathBuf,

    /// Raw capture extension, without the dot (default: flv)
    pub raw_extension: String,

    /// Output container extension (default: mp4)
    pub output_extension: String,

    /// Pre-roll kept before the decision point
    /// Default: 5000 ms
    pub lead_ms: i64,

    /// Wait after stopping so the capture tool can flush its files
    /// Default: 3 seconds
    pub settle_delay: Duration,

    pub hotkeys: Hotkeys,
}

impl Default for RecorderSettings {
    fn default() -> Self {
        Self {
            capture_dir: PathBuf::from("captures"),
            raw_extension: "flv".to_string(),
            output_extension: "mp4".to_string(),
            lead_ms: 5000,
            settle_delay: Duration::from_secs(3),
            hotkeys: Hotkeys::default(),
        }
    }
}
