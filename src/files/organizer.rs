use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

use crate::state::{AttemptState, LiftType};
use crate::trim::executor::move_file;

/// Directory used when no session has been named
pub const UNSORTED_DIR: &str = "unsorted";

/// Second-granularity stamp shared by every camera of one attempt
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%Hh%Mm%Ss";

/// How a trimmed file reaches its final location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Move the trimmed file; nothing is left in the capture directory
    #[default]
    Move,
    /// Copy it and keep the trimmed file, for a live source that replays it
    Copy,
}

/// A filed clip for one camera of one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalArtifact {
    pub path: PathBuf,
    pub session_dir: PathBuf,
    pub timestamp: String,
    pub athlete: String,
    pub lift_type: LiftType,
    pub attempt_number: u32,
    pub camera: String,
}

pub fn sanitize(s: &str) -> String {
    s.replace(' ', "_")
}

/// Session directory name: sanitized, or `unsorted` when empty
pub fn session_dir_name(session_name: &str) -> String {
    if session_name.is_empty() {
        UNSORTED_DIR.to_string()
    } else {
        sanitize(session_name)
    }
}

pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// `<ts>_<athlete>_<LIFT>_attempt<n>_Camera<i>.<ext>`
pub fn final_file_name(timestamp: &str, attempt: &AttemptState, camera: &str, extension: &str) -> String {
    format!(
        "{}_{}_{}_attempt{}_Camera{}.{}",
        timestamp,
        sanitize(&attempt.athlete),
        attempt.lift_type,
        attempt.attempt_number,
        camera,
        extension
    )
}

/// Files trimmed clips under `<video_dir>/<session>/`
#[derive(Debug, Clone)]
pub struct FileOrganizer {
    video_dir: PathBuf,
    placement: Placement,
    extension: String,
}

impl FileOrganizer {
    pub fn new(video_dir: impl Into<PathBuf>, placement: Placement, extension: impl Into<String>) -> Self {
        Self {
            video_dir: video_dir.into(),
            placement,
            extension: extension.into(),
        }
    }

    pub fn video_dir(&self) -> &Path {
        &self.video_dir
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Destination directory for a session, created if absent
    pub async fn session_dir(&self, session_name: &str) -> std::io::Result<PathBuf> {
        let dir = self.video_dir.join(session_dir_name(session_name));
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Move or copy `trimmed` to its final name inside `session_dir`
    pub async fn place(
        &self,
        trimmed: &Path,
        session_dir: &Path,
        timestamp: &str,
        attempt: &AttemptState,
        camera: &str,
    ) -> std::io::Result<FinalArtifact> {
        let path = session_dir.join(final_file_name(timestamp, attempt, camera, &self.extension));

        match self.placement {
            Placement::Move => move_file(trimmed, &path).await?,
            Placement::Copy => {
                fs::copy(trimmed, &path).await?;
            }
        }

        info!("Filed camera {} clip at {}", camera, path.display());

        Ok(FinalArtifact {
            path,
            session_dir: session_dir.to_path_buf(),
            timestamp: timestamp.to_string(),
            athlete: attempt.athlete.clone(),
            lift_type: attempt.lift_type,
            attempt_number: attempt.attempt_number,
            camera: camera.to_string(),
        })
    }
}
