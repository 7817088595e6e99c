use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Marker the capture tool puts in every camera output file name
pub const CAMERA_MARKER: &str = "Camera";

/// A raw capture left behind by the capture tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCaptureFile {
    pub path: PathBuf,
    /// Text after the last `Camera` in the file stem, e.g. `2` or `X`
    pub camera: String,
}

/// Camera index from a file name like `Replay Camera2.flv`
pub fn camera_index(file_name: &str, extension: &str) -> Option<String> {
    let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    let idx = stem.rfind(CAMERA_MARKER)?;
    Some(stem[idx + CAMERA_MARKER.len()..].to_string())
}

/// List raw camera files in `dir`, sorted by camera index
pub async fn discover_raw_files(dir: &Path, extension: &str) -> std::io::Result<Vec<RawCaptureFile>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(camera) = camera_index(name, extension) {
            debug!("Discovered raw capture {} (camera {})", name, camera);
            files.push(RawCaptureFile {
                path: entry.path(),
                camera,
            });
        }
    }

    files.sort_by(|a, b| compare_cameras(&a.camera, &b.camera));
    Ok(files)
}

/// Numeric order when both indices are numbers, so `Camera10` follows `Camera2`
fn compare_cameras(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}
