use crate::capture::domain::camera_device::CameraDevice;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Result of one [`FrameSource::read`].
#[derive(Debug)]
pub enum ReadOutcome {
    Frame(Frame),
    /// Nothing arrived within the source's wait budget. The device is still
    /// open; callers check for cancellation and read again.
    Pending,
    /// The stream has ended, e.g. the camera was unplugged.
    Ended,
}

/// A live source of frames, typically a camera.
pub trait FrameSource: Send {
    /// Opens the device and returns the properties of its video stream.
    fn open(&mut self, device: &CameraDevice) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Waits a bounded time for the next frame.
    fn read(&mut self) -> Result<ReadOutcome, Box<dyn std::error::Error>>;

    /// Releases the device. Safe to call more than once.
    fn close(&mut self);
}
