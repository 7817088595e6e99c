//! Attempt recording orchestration
//!
//! This module provides the `Recorder` state machine that:
//! - Arms and starts the capture tool when an attempt's clock starts
//! - Stops it when the decision is given
//! - Waits for the raw camera files, trims the idle lead time off each
//! - Files the clips per session and reports status

mod events;
mod recorder;
mod report;
mod settings;

pub use events::TimingEvent;
pub use recorder::{trim_offset_ms, Recorder, RecorderPhase, STAGING_DIR};
pub use report::AttemptReport;
pub use settings::RecorderSettings;
