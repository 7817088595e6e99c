//! Raw capture discovery and final clip filing

mod discovery;
mod organizer;

pub use discovery::{camera_index, discover_raw_files, RawCaptureFile, CAMERA_MARKER};
pub use organizer::{
    final_file_name, format_timestamp, sanitize, session_dir_name, FileOrganizer, FinalArtifact,
    Placement, TIMESTAMP_FORMAT, UNSORTED_DIR,
};
