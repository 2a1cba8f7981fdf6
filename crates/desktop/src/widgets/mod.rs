pub mod record_button;
pub mod recording_overlay;
