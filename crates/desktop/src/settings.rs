use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use webcam_recorder_core::recording::output_naming::default_output_dir;
use webcam_recorder_core::shared::constants::DEFAULT_CAMERA_INDEX;
use webcam_recorder_core::video::infrastructure::ffmpeg_writer::{
    DEFAULT_QSCALE, MAX_QSCALE, MIN_QSCALE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    System,
    Dark,
    Light,
}

impl Appearance {
    pub const ALL: &[Appearance] = &[Appearance::System, Appearance::Dark, Appearance::Light];
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Appearance::System => write!(f, "System"),
            Appearance::Dark => write!(f, "Dark"),
            Appearance::Light => write!(f, "Light"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub camera_index: u32,
    /// `None` means the platform Movies/Videos folder.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Encoder quality in percent; mapped onto the MPEG-4 quantizer.
    #[serde(default = "default_quality")]
    pub quality: u32,
    #[serde(default = "default_appearance")]
    pub appearance: Appearance,
    #[serde(default)]
    pub high_contrast: bool,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

fn default_quality() -> u32 {
    qscale_to_quality(DEFAULT_QSCALE)
}

fn default_appearance() -> Appearance {
    Appearance::System
}

fn default_font_scale() -> f32 {
    1.0
}

/// 100% is the finest quantizer, 0% the coarsest.
pub fn quality_to_qscale(quality: u32) -> u32 {
    let span = MAX_QSCALE - MIN_QSCALE;
    MAX_QSCALE - (quality.min(100) * span + 50) / 100
}

fn qscale_to_quality(qscale: u32) -> u32 {
    let span = MAX_QSCALE - MIN_QSCALE;
    ((MAX_QSCALE - qscale.clamp(MIN_QSCALE, MAX_QSCALE)) * 100 + span / 2) / span
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            output_dir: None,
            quality: default_quality(),
            appearance: default_appearance(),
            high_contrast: false,
            font_scale: default_font_scale(),
        }
    }
}

impl Settings {
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("WebcamRecorder").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("Failed to save settings to {}: {e}", path.display());
            }
        }
    }

    /// Reads settings from `path`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    /// Directory new recordings are written to.
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(default_output_dir)
    }

    pub fn qscale(&self) -> u32 {
        quality_to_qscale(self.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            Settings::load_from(&dir.path().join("none.json")),
            Settings::default()
        );
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            camera_index: 2,
            output_dir: Some(PathBuf::from("/tmp/clips")),
            quality: 40,
            appearance: Appearance::Dark,
            high_contrast: true,
            font_scale: 1.25,
        };

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "camera_index": 1, "appearance": "light" }"#).unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.camera_index, 1);
        assert_eq!(settings.appearance, Appearance::Light);
        assert_eq!(settings.quality, default_quality());
        assert_eq!(settings.font_scale, 1.0);
        assert!(settings.output_dir.is_none());
    }

    #[test]
    fn test_quality_mapping_bounds() {
        assert_eq!(quality_to_qscale(100), MIN_QSCALE);
        assert_eq!(quality_to_qscale(0), MAX_QSCALE);
        assert_eq!(quality_to_qscale(500), MIN_QSCALE);
    }

    #[test]
    fn test_default_quality_maps_back_to_default_qscale() {
        assert_eq!(Settings::default().qscale(), DEFAULT_QSCALE);
    }

    #[test]
    fn test_explicit_output_dir_wins() {
        let settings = Settings {
            output_dir: Some(PathBuf::from("/srv/recordings")),
            ..Settings::default()
        };
        assert_eq!(
            settings.resolved_output_dir(),
            PathBuf::from("/srv/recordings")
        );
    }
}
