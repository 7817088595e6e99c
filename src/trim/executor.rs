use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tracing::{info, warn};

use super::retry::{RetryPolicy, Sleeper, TokioSleeper};
use super::transcoder::{TranscodeJob, Transcoder};
use crate::error::TranscodeError;

/// Trims one raw capture file into its output container
///
/// The raw input is deleted only after a successful trim; when every attempt
/// fails it is left in place for manual recovery.
pub struct TrimExecutor {
    transcoder: Arc<dyn Transcoder>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl TrimExecutor {
    pub fn new(transcoder: Arc<dyn Transcoder>, policy: RetryPolicy) -> Self {
        Self::with_sleeper(transcoder, policy, Arc::new(TokioSleeper))
    }

    pub fn with_sleeper(
        transcoder: Arc<dyn Transcoder>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            transcoder,
            policy,
            sleeper,
        }
    }

    /// Trim `input` starting `offset_ms` in, writing `output`.
    ///
    /// A non-positive offset renames the file instead of transcoding it.
    pub async fn trim(&self, input: &Path, offset_ms: i64, output: &Path) -> Result<(), TranscodeError> {
        if offset_ms <= 0 {
            info!(
                "No trim needed, renaming {} to {}",
                input.display(),
                output.display()
            );
            return move_file(input, output).await.map_err(TranscodeError::from);
        }

        let job = TranscodeJob {
            seek: Some(Duration::from_millis(offset_ms as u64)),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        };

        let transcoder = &self.transcoder;
        let job_ref = &job;
        self.policy
            .run(self.sleeper.as_ref(), |attempt| async move {
                info!(
                    "Trimming {} (attempt {}/{})",
                    job_ref.input.display(),
                    attempt,
                    self.policy.max_attempts
                );
                transcoder.transcode(job_ref).await
            })
            .await
            .map_err(|e| {
                warn!(
                    "Giving up on {} after {} attempts; raw file kept",
                    input.display(),
                    e.attempts
                );
                TranscodeError::Exhausted {
                    attempts: e.attempts,
                    last_error: e.last.to_string(),
                }
            })?;

        if let Err(e) = fs::remove_file(input).await {
            warn!("Failed to remove raw file {}: {}", input.display(), e);
        }

        Ok(())
    }
}

/// Rename, falling back to copy + remove across filesystems
pub(crate) async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).await.is_ok() {
        return Ok(());
    }
    fs::copy(from, to).await?;
    if let Err(e) = fs::remove_file(from).await {
        warn!("Failed to remove {} after copy: {}", from.display(), e);
    }
    Ok(())
}
