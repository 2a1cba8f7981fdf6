use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use webcam_recorder_core::capture::domain::camera_device::CameraDevice;
use webcam_recorder_core::capture::domain::frame_source::{FrameSource, ReadOutcome};
use webcam_recorder_core::capture::infrastructure::ffmpeg_camera::FfmpegCamera;
use webcam_recorder_core::shared::frame::Frame;
use webcam_recorder_core::shared::video_metadata::VideoMetadata;

/// Frames the UI may fall behind by before the camera thread waits.
const EVENT_QUEUE_CAPACITY: usize = 8;

/// Longest `stop` waits for the camera thread before detaching it.
const STOP_TIMEOUT: Duration = Duration::from_secs(2);
const STOP_POLL: Duration = Duration::from_millis(20);

/// Messages sent from the camera thread to the UI.
#[derive(Debug, Clone)]
pub enum CameraEvent {
    Opened(VideoMetadata),
    Frame(Frame),
    Unavailable(String),
    Ended,
}

/// Owns the capture thread for one camera.
pub struct CameraWorker {
    events: Receiver<CameraEvent>,
    /// Disconnects once the thread has closed the camera.
    done: Receiver<()>,
    cancelled: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CameraWorker {
    pub fn spawn(device: CameraDevice) -> Self {
        Self::spawn_with(Box::new(FfmpegCamera::new()), device)
    }

    pub fn spawn_with(mut source: Box<dyn FrameSource>, device: CameraDevice) -> Self {
        let (tx, rx) = crossbeam_channel::bounded::<CameraEvent>(EVENT_QUEUE_CAPACITY);
        let cancelled = Arc::new(AtomicBool::new(false));
        let cancelled_clone = cancelled.clone();
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);

        let handle = thread::spawn(move || {
            run_camera(source.as_mut(), &device, &tx, &cancelled_clone);
            source.close();
            drop(done_tx);
        });

        Self {
            events: rx,
            done: done_rx,
            cancelled,
            handle: Some(handle),
        }
    }

    /// Everything the camera thread produced since the last call.
    pub fn drain(&self) -> Vec<CameraEvent> {
        self.events.try_iter().collect()
    }

    /// Stops capture and waits for the camera to be closed. A thread stuck
    /// inside the device driver is detached after a timeout.
    pub fn stop(&mut self) {
        self.stop_within(STOP_TIMEOUT);
    }

    fn stop_within(&mut self, timeout: Duration) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        self.cancelled.store(true, Ordering::Relaxed);

        let deadline = Instant::now() + timeout;
        loop {
            // Frees queue space so a blocked send can return and see the flag.
            let _ = self.drain();
            match self.done.recv_timeout(STOP_POLL) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) if Instant::now() >= deadline => {
                    log::warn!("Camera thread did not stop within {timeout:?}, detaching it");
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        if handle.join().is_err() {
            log::error!("Camera thread panicked");
        }
    }
}

impl Drop for CameraWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_camera(
    source: &mut dyn FrameSource,
    device: &CameraDevice,
    tx: &Sender<CameraEvent>,
    cancelled: &AtomicBool,
) {
    let metadata = match source.open(device) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::warn!("Camera {device} unavailable: {e}");
            let _ = tx.send(CameraEvent::Unavailable(e.to_string()));
            return;
        }
    };
    if tx.send(CameraEvent::Opened(metadata)).is_err() {
        return;
    }

    while !cancelled.load(Ordering::Relaxed) {
        match source.read() {
            Ok(ReadOutcome::Frame(frame)) => {
                if tx.send(CameraEvent::Frame(frame)).is_err() {
                    return;
                }
            }
            Ok(ReadOutcome::Pending) => {}
            Ok(ReadOutcome::Ended) => {
                log::warn!("Camera {device} stopped delivering frames");
                let _ = tx.send(CameraEvent::Ended);
                return;
            }
            Err(e) => {
                log::error!("Camera {device} read failed: {e}");
                let _ = tx.send(CameraEvent::Ended);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCamera {
        frames_left: Option<usize>,
        fail_open: bool,
        next_index: usize,
        closed: Arc<AtomicBool>,
    }

    impl FakeCamera {
        fn new(frames: Option<usize>) -> (Self, Arc<AtomicBool>) {
            let closed = Arc::new(AtomicBool::new(false));
            let camera = Self {
                frames_left: frames,
                fail_open: false,
                next_index: 0,
                closed: closed.clone(),
            };
            (camera, closed)
        }
    }

    impl FrameSource for FakeCamera {
        fn open(
            &mut self,
            _device: &CameraDevice,
        ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("no such device".into());
            }
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                fps: 30.0,
                codec: "rawvideo".to_string(),
                source: None,
            })
        }

        fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>> {
            if let Some(left) = self.frames_left.as_mut() {
                if *left == 0 {
                    return Ok(ReadOutcome::Ended);
                }
                *left -= 1;
            } else {
                thread::sleep(Duration::from_millis(1));
            }
            let frame = Frame::new(vec![0; 12], 2, 2, 3, self.next_index);
            self.next_index += 1;
            Ok(ReadOutcome::Frame(frame))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    fn collect_until_end(worker: &CameraWorker) -> Vec<CameraEvent> {
        let mut events = Vec::new();
        while let Ok(event) = worker.events.recv_timeout(Duration::from_secs(5)) {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_reports_opened_frames_then_end() {
        let (camera, closed) = FakeCamera::new(Some(3));
        let worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());

        let events = collect_until_end(&worker);
        assert_eq!(events.len(), 5);
        assert!(matches!(events[0], CameraEvent::Opened(ref m) if m.width == 2));
        let indices: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                CameraEvent::Frame(f) => Some(f.index()),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(matches!(events[4], CameraEvent::Ended));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_open_failure_reports_unavailable() {
        let (mut camera, closed) = FakeCamera::new(Some(3));
        camera.fail_open = true;
        let worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());

        let events = collect_until_end(&worker);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], CameraEvent::Unavailable(ref e) if e.contains("no such device")));
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_closes_live_camera() {
        let (camera, closed) = FakeCamera::new(None);
        let mut worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());
        assert!(matches!(
            worker.events.recv_timeout(Duration::from_secs(5)),
            Ok(CameraEvent::Opened(_))
        ));

        worker.stop();
        assert!(closed.load(Ordering::Relaxed));
        worker.stop();
    }

    #[test]
    fn test_drop_closes_camera() {
        let (camera, closed) = FakeCamera::new(None);
        {
            let _worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());
        }
        assert!(closed.load(Ordering::Relaxed));
    }

    /// Opens fine, then never has a frame ready.
    struct PendingCamera {
        closed: Arc<AtomicBool>,
    }

    impl FrameSource for PendingCamera {
        fn open(
            &mut self,
            _device: &CameraDevice,
        ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                fps: 30.0,
                codec: "rawvideo".to_string(),
                source: None,
            })
        }

        fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>> {
            thread::sleep(Duration::from_millis(5));
            Ok(ReadOutcome::Pending)
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    /// Blocks inside `read` until the test releases it.
    struct HungCamera {
        release: Receiver<()>,
    }

    impl FrameSource for HungCamera {
        fn open(
            &mut self,
            _device: &CameraDevice,
        ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            Ok(VideoMetadata {
                width: 2,
                height: 2,
                fps: 30.0,
                codec: "rawvideo".to_string(),
                source: None,
            })
        }

        fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>> {
            let _ = self.release.recv();
            Ok(ReadOutcome::Ended)
        }

        fn close(&mut self) {}
    }

    #[test]
    fn test_stop_returns_while_camera_never_has_a_frame() {
        let closed = Arc::new(AtomicBool::new(false));
        let camera = PendingCamera {
            closed: closed.clone(),
        };
        let mut worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());
        assert!(matches!(
            worker.events.recv_timeout(Duration::from_secs(5)),
            Ok(CameraEvent::Opened(_))
        ));

        let started = Instant::now();
        worker.stop();
        assert!(started.elapsed() < STOP_TIMEOUT);
        assert!(closed.load(Ordering::Relaxed));
    }

    #[test]
    fn test_stop_detaches_thread_stuck_in_read() {
        let (release_tx, release_rx) = crossbeam_channel::unbounded::<()>();
        let camera = HungCamera {
            release: release_rx,
        };
        let mut worker = CameraWorker::spawn_with(Box::new(camera), CameraDevice::default());
        assert!(matches!(
            worker.events.recv_timeout(Duration::from_secs(5)),
            Ok(CameraEvent::Opened(_))
        ));

        let started = Instant::now();
        worker.stop_within(Duration::from_millis(100));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(worker.handle.is_none());

        drop(release_tx);
    }
}
