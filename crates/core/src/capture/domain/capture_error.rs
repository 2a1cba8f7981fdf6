use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("input format '{0}' is not available in this ffmpeg build")]
    InputFormatUnavailable(String),
    #[error("could not open camera {device}: {source}")]
    DeviceNotFound {
        device: String,
        #[source]
        source: ffmpeg_next::Error,
    },
    #[error("camera {0} has no video stream")]
    NoVideoStream(String),
    #[error("camera is not opened")]
    NotOpened,
    #[error("failed to decode camera frame: {0}")]
    Decode(#[source] ffmpeg_next::Error),
}
