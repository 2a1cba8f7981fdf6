use crate::shared::constants::DEFAULT_FPS;

/// Stream properties of an opened camera, used to size the encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    /// Reported frame rate; 0.0 when the device does not say.
    pub fps: f64,
    pub codec: String,
    pub source: Option<String>,
}

impl VideoMetadata {
    /// Frame rate to encode at: the reported rate, or [`DEFAULT_FPS`] when
    /// the device reports nothing usable.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            DEFAULT_FPS
        }
    }
}
