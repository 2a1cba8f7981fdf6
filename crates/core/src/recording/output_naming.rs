use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::recording::recording_error::RecordingError;
use crate::shared::constants::{
    RECORDING_EXTENSION, RECORDING_PREFIX, RECORDING_TIMESTAMP_FORMAT,
};

/// `recording_YYYYMMDD_HHMMSS.mp4`
pub fn recording_file_name(timestamp: NaiveDateTime) -> String {
    format!(
        "{RECORDING_PREFIX}{}.{RECORDING_EXTENSION}",
        timestamp.format(RECORDING_TIMESTAMP_FORMAT)
    )
}

/// Path for a new recording in `dir`. Two recordings started within the
/// same second get `_1`, `_2`, ... suffixes instead of overwriting.
pub fn next_recording_path(dir: &Path, timestamp: NaiveDateTime) -> PathBuf {
    let name = recording_file_name(timestamp);
    let mut candidate = dir.join(&name);
    let stem = name
        .strip_suffix(&format!(".{RECORDING_EXTENSION}"))
        .unwrap_or(&name);
    let mut n = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{stem}_{n}.{RECORDING_EXTENSION}"));
        n += 1;
    }
    candidate
}

/// Where recordings go unless configured otherwise: the platform's video
/// folder, or `~/Movies`.
pub fn default_output_dir() -> PathBuf {
    dirs::video_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Movies")))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn ensure_output_dir(dir: &Path) -> Result<(), RecordingError> {
    fs::create_dir_all(dir).map_err(|source| RecordingError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })
}
