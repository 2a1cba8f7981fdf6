use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::recording::infrastructure::threaded_recorder::{RecordingSummary, ThreadedRecorder};
use crate::recording::output_naming::{ensure_output_dir, next_recording_path};
use crate::recording::recording_clock::RecordingClock;
use crate::recording::recording_error::RecordingError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Start/stop state of the recorder, shared by the GUI and the CLI.
///
/// Frames are only forwarded to a writer between a successful `start` and
/// the matching `stop`; at any other time they are ignored.
pub struct RecordingSession {
    recorder: Option<ThreadedRecorder>,
    clock: RecordingClock,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self {
            recorder: None,
            clock: RecordingClock::new(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }

    /// Starts a recording named after `now` inside `output_dir`, creating
    /// the directory if needed.
    pub fn start(
        &mut self,
        writer: Box<dyn VideoWriter>,
        output_dir: &Path,
        metadata: &VideoMetadata,
        now: NaiveDateTime,
    ) -> Result<PathBuf, RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }
        ensure_output_dir(output_dir)?;
        let path = next_recording_path(output_dir, now);
        self.start_at(writer, &path, metadata)
    }

    /// Starts a recording to an explicit file.
    pub fn start_at(
        &mut self,
        writer: Box<dyn VideoWriter>,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<PathBuf, RecordingError> {
        if self.is_recording() {
            return Err(RecordingError::AlreadyRecording);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_output_dir(parent)?;
        }

        let recorder = ThreadedRecorder::start(writer, path, metadata)?;
        log::info!("Recording started: {}", path.display());

        self.recorder = Some(recorder);
        self.clock.reset();
        Ok(path.to_path_buf())
    }

    /// Hands a frame to the writer if a recording is running. Returns
    /// whether the frame was accepted.
    pub fn write_frame(&mut self, frame: Frame) -> Result<bool, RecordingError> {
        match self.recorder.as_mut() {
            Some(recorder) => recorder.submit(frame).map(|()| true),
            None => Ok(false),
        }
    }

    /// Advances the overlay clock by one second while recording.
    pub fn tick(&mut self) {
        if self.is_recording() {
            self.clock.tick();
        }
    }

    /// Finalizes the file. The session is idle afterwards even if
    /// finishing failed.
    pub fn stop(&mut self) -> Result<RecordingSummary, RecordingError> {
        let recorder = self.recorder.take().ok_or(RecordingError::NotRecording)?;
        let summary = recorder.finish()?;
        log::info!(
            "Recording saved: {} ({} frames, {} dropped, {}s)",
            summary.path.display(),
            summary.frames_written,
            summary.frames_dropped,
            self.clock.elapsed_seconds()
        );
        Ok(summary)
    }

    pub fn overlay_text(&self) -> Option<String> {
        self.is_recording().then(|| self.clock.overlay_text())
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.clock.elapsed_seconds()
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.recorder.as_ref().map(|r| r.path())
    }
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}
