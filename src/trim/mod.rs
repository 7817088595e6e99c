//! Trimming raw captures with an external transcoder
//!
//! - `retry`: bounded retry combinator with an injectable sleeper
//! - `transcoder`: ffmpeg stream-copy invocation
//! - `executor`: rename-or-transcode of one raw file

pub mod executor;
pub mod retry;
pub mod transcoder;

pub use executor::TrimExecutor;
pub use retry::{RetryError, RetryPolicy, Sleeper, TokioSleeper};
pub use transcoder::{FfmpegTranscoder, TranscodeJob, Transcoder};
