/// Whole-second recording clock behind the on-screen overlay.
///
/// Advanced once per second by the caller's timer. The recording dot
/// blinks by toggling on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordingClock {
    elapsed_seconds: u64,
    show_dot: bool,
}

const DOT: char = '\u{25CF}';

impl RecordingClock {
    pub fn new() -> Self {
        Self {
            elapsed_seconds: 0,
            show_dot: true,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn tick(&mut self) {
        self.elapsed_seconds += 1;
        self.show_dot = !self.show_dot;
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn show_dot(&self) -> bool {
        self.show_dot
    }

    /// Elapsed time split into hours, minutes and seconds.
    pub fn hms(&self) -> (u64, u64, u64) {
        let e = self.elapsed_seconds;
        (e / 3600, (e % 3600) / 60, e % 60)
    }

    /// `"● Recording: HH:MM:SS"`, with the dot replaced by a space on
    /// alternate seconds so the text keeps its width.
    pub fn overlay_text(&self) -> String {
        let (h, m, s) = self.hms();
        let dot = if self.show_dot { DOT } else { ' ' };
        format!("{dot} Recording: {h:02}:{m:02}:{s:02}")
    }
}

impl Default for RecordingClock {
    fn default() -> Self {
        Self::new()
    }
}
