use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::recording::recording_error::RecordingError;
use crate::shared::constants::RECORDER_QUEUE_CAPACITY;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

/// Outcome of a finished recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub frames_written: usize,
    pub frames_dropped: usize,
}

/// Runs a [`VideoWriter`] on its own thread so encoding never stalls the
/// caller.
///
/// The writer is opened synchronously in [`start`](Self::start) so open
/// failures surface immediately. Frames go through a bounded queue; when
/// the encoder falls behind, new frames are dropped and counted rather
/// than blocking capture. Dropping the recorder closes the writer.
pub struct ThreadedRecorder {
    path: PathBuf,
    frame_tx: Option<Sender<Frame>>,
    handle: Option<JoinHandle<Result<usize, String>>>,
    failed: Arc<AtomicBool>,
    frames_dropped: usize,
}

impl ThreadedRecorder {
    pub fn start(
        writer: Box<dyn VideoWriter>,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<Self, RecordingError> {
        Self::start_with_capacity(writer, path, metadata, RECORDER_QUEUE_CAPACITY)
    }

    pub fn start_with_capacity(
        mut writer: Box<dyn VideoWriter>,
        path: &Path,
        metadata: &VideoMetadata,
        capacity: usize,
    ) -> Result<Self, RecordingError> {
        writer
            .open(path, metadata)
            .map_err(|e| RecordingError::WriterOpen(e.to_string()))?;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Frame>(capacity.max(1));
        let failed = Arc::new(AtomicBool::new(false));
        let handle = spawn_writer(writer, frame_rx, failed.clone());

        Ok(Self {
            path: path.to_path_buf(),
            frame_tx: Some(frame_tx),
            handle: Some(handle),
            failed,
            frames_dropped: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_dropped(&self) -> usize {
        self.frames_dropped
    }

    /// Queues a frame for encoding. Fails once the writer thread has hit
    /// an encoding error.
    pub fn submit(&mut self, frame: Frame) -> Result<(), RecordingError> {
        if self.failed.load(Ordering::Relaxed) {
            return Err(RecordingError::Encode("writer thread stopped".into()));
        }
        let tx = self.frame_tx.as_ref().ok_or(RecordingError::NotRecording)?;
        match tx.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(frame)) => {
                self.frames_dropped += 1;
                log::warn!(
                    "Encoder queue full, dropped frame {} ({} dropped so far)",
                    frame.index(),
                    self.frames_dropped
                );
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(RecordingError::Encode("writer thread stopped".into()))
            }
        }
    }

    /// Stops accepting frames, waits for the queue to drain and closes the
    /// writer.
    pub fn finish(mut self) -> Result<RecordingSummary, RecordingError> {
        self.join()
    }

    fn join(&mut self) -> Result<RecordingSummary, RecordingError> {
        drop(self.frame_tx.take());
        let handle = self.handle.take().ok_or(RecordingError::NotRecording)?;
        let frames_written = handle
            .join()
            .map_err(|_| RecordingError::WorkerPanicked)?
            .map_err(RecordingError::Encode)?;

        Ok(RecordingSummary {
            path: self.path.clone(),
            frames_written,
            frames_dropped: self.frames_dropped,
        })
    }
}

impl Drop for ThreadedRecorder {
    fn drop(&mut self) {
        if self.handle.is_some() {
            if let Err(e) = self.join() {
                log::error!("Recording {} did not finish cleanly: {e}", self.path.display());
            }
        }
    }
}

fn spawn_writer(
    mut writer: Box<dyn VideoWriter>,
    frame_rx: Receiver<Frame>,
    failed: Arc<AtomicBool>,
) -> JoinHandle<Result<usize, String>> {
    thread::spawn(move || {
        let mut written = 0usize;
        let mut write_error = None;

        for frame in frame_rx.iter() {
            if let Err(e) = writer.write(&frame) {
                log::error!("Failed to encode frame {}: {e}", frame.index());
                failed.store(true, Ordering::Relaxed);
                write_error = Some(e.to_string());
                break;
            }
            written += 1;
        }
        drop(frame_rx);

        let close_result = writer.close().map_err(|e| e.to_string());
        match (write_error, close_result) {
            (Some(e), _) => Err(e),
            (None, Err(e)) => Err(e),
            (None, Ok(())) => Ok(written),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::test_support::{frame, metadata, MockWriter, WriterCall};

    #[test]
    fn test_frames_are_written_in_order_then_closed() {
        let (writer, calls) = MockWriter::new();
        let path = PathBuf::from("/tmp/out.mp4");

        let mut recorder = ThreadedRecorder::start(Box::new(writer), &path, &metadata()).unwrap();
        for i in 0..3 {
            recorder.submit(frame(i)).unwrap();
        }
        let summary = recorder.finish().unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                WriterCall::Open(path.clone(), 4, 2),
                WriterCall::Write(0),
                WriterCall::Write(1),
                WriterCall::Write(2),
                WriterCall::Close,
            ]
        );
        assert_eq!(
            summary,
            RecordingSummary {
                path,
                frames_written: 3,
                frames_dropped: 0,
            }
        );
    }

    #[test]
    fn test_open_failure_is_reported_without_thread() {
        let (mut writer, calls) = MockWriter::new();
        writer.fail_open = true;

        let result = ThreadedRecorder::start(Box::new(writer), Path::new("x.mp4"), &metadata());
        assert!(matches!(result, Err(RecordingError::WriterOpen(_))));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_write_failure_surfaces_on_finish() {
        let (mut writer, calls) = MockWriter::new();
        writer.fail_write_at = Some(1);

        let mut recorder =
            ThreadedRecorder::start(Box::new(writer), Path::new("x.mp4"), &metadata()).unwrap();
        for i in 0..3 {
            let _ = recorder.submit(frame(i));
        }
        let result = recorder.finish();

        assert!(matches!(result, Err(RecordingError::Encode(_))));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.last(), Some(&WriterCall::Close));
        assert!(!calls.contains(&WriterCall::Write(2)));
    }

    #[test]
    fn test_drop_closes_writer() {
        let (writer, calls) = MockWriter::new();
        {
            let mut recorder =
                ThreadedRecorder::start(Box::new(writer), Path::new("x.mp4"), &metadata()).unwrap();
            recorder.submit(frame(0)).unwrap();
        }
        assert_eq!(calls.lock().unwrap().last(), Some(&WriterCall::Close));
    }

    #[test]
    fn test_full_queue_drops_frames() {
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded::<()>();
        let (mut writer, _calls) = MockWriter::new();
        writer.gate = Some(gate_rx);

        let capacity = 4;
        let mut recorder = ThreadedRecorder::start_with_capacity(
            Box::new(writer),
            Path::new("x.mp4"),
            &metadata(),
            capacity,
        )
        .unwrap();

        let submitted = capacity + 5;
        for i in 0..submitted {
            recorder.submit(frame(i)).unwrap();
        }
        assert!(recorder.frames_dropped() >= 4);

        drop(gate_tx);
        let summary = recorder.finish().unwrap();
        assert_eq!(summary.frames_written + summary.frames_dropped, submitted);
    }
}
