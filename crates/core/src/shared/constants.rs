/// Frame rate used when the camera does not report one.
pub const DEFAULT_FPS: f64 = 30.0;

/// Preview poll interval (~33 Hz).
pub const PREVIEW_INTERVAL_MS: u64 = 30;

/// Overlay clock resolution.
pub const OVERLAY_INTERVAL_SECS: u64 = 1;

pub const DEFAULT_CAMERA_INDEX: u32 = 0;

pub const RECORDING_PREFIX: &str = "recording_";
pub const RECORDING_EXTENSION: &str = "mp4";
pub const RECORDING_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Frames queued between the capture side and the encoder thread. Frames
/// submitted while the queue is full are dropped and counted.
pub const RECORDER_QUEUE_CAPACITY: usize = 64;
