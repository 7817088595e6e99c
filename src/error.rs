//! Error types for the recording pipeline
//!
//! Each seam has its own enum so callers can tell a dropped control channel
//! from a rejected hotkey or an exhausted transcoder.

use thiserror::Error;

/// Errors raised by the remote-control channel to the capture tool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Channel unreachable, handshake timed out, or connection dropped
    #[error("Control connection error: {0}")]
    Connection(String),

    /// The capture tool rejected the request
    #[error("Remote action failed (code {code}): {message}")]
    Remote { code: i64, message: String },

    /// A message could not be encoded or decoded
    #[error("Control protocol error: {0}")]
    Protocol(String),
}

/// Errors raised while trimming a single raw capture file
#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("Transcoder failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    #[error("Transcoder run failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A camera whose trim could not be completed
#[derive(Debug, Clone)]
pub struct CameraFailure {
    pub camera: String,
    pub error: String,
}

/// Errors that abort one attempt's pipeline
#[derive(Error, Debug)]
pub enum RecordingError {
    #[error(transparent)]
    Control(#[from] ControlError),

    #[error("No camera files found in captures directory {dir}")]
    FileDiscovery { dir: String },

    #[error("All {} camera(s) failed to trim", .failures.len())]
    AllCamerasFailed { failures: Vec<CameraFailure> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
