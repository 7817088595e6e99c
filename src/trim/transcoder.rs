use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::TranscodeError;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// One stream-copy trim of a raw capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeJob {
    /// How far into the input to start copying
    pub seek: Option<Duration>,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl TranscodeJob {
    /// ffmpeg arguments: overwrite, optional seek, stream copy, fast start
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-y".to_string()];
        if let Some(seek) = self.seek {
            args.push("-ss".to_string());
            args.push(format_seconds(seek));
        }
        args.extend([
            "-i".to_string(),
            self.input.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            self.output.display().to_string(),
        ]);
        args
    }
}

/// Seconds with millisecond precision, e.g. `3.000`
fn format_seconds(duration: Duration) -> String {
    let ms = duration.as_millis();
    format!("{}.{:03}", ms / 1000, ms % 1000)
}

/// External transcoder; one call is one full invocation
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError>;
}

/// Runs the ffmpeg binary as a child process
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    path: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, job: &TranscodeJob) -> Result<(), TranscodeError> {
        let args = job.args();
        info!("Executing {} {}", self.path.display(), args.join(" "));

        let mut cmd = Command::new(&self.path);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        cmd.creation_flags(CREATE_NO_WINDOW);

        let output = cmd.output().await.map_err(|e| {
            TranscodeError::Failed(format!("failed to start {}: {}", self.path.display(), e))
        })?;

        if output.status.success() {
            debug!("Transcoded {}", job.output.display());
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().last().unwrap_or("").trim();
        Err(TranscodeError::Failed(format!(
            "{} exited with {}: {}",
            self.path.display(),
            output.status,
            last_line
        )))
    }
}
