pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod obs;
pub mod recording;
pub mod state;
pub mod status;
pub mod trim;

pub use config::Config;
pub use error::{CameraFailure, ControlError, RecordingError, TranscodeError};
pub use files::{FileOrganizer, FinalArtifact, Placement, RawCaptureFile};
pub use http::{create_router, AppState};
pub use obs::{Action, Hotkeys, LoggingControl, ObsClient, RemoteControl};
pub use recording::{AttemptReport, Recorder, RecorderPhase, RecorderSettings, TimingEvent};
pub use state::{AttemptState, LiftType, StateStore};
pub use status::{Phase, StatusBoard, StatusSink, StatusUpdate};
pub use trim::{FfmpegTranscoder, RetryPolicy, Sleeper, TokioSleeper, Transcoder, TrimExecutor};
