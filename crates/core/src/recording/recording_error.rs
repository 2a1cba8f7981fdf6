use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordingError {
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording in progress")]
    NotRecording,
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open video writer: {0}")]
    WriterOpen(String),
    #[error("failed to encode video: {0}")]
    Encode(String),
    #[error("recording worker panicked")]
    WorkerPanicked,
}
