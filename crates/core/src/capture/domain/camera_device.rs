use std::fmt;

use crate::shared::constants::DEFAULT_CAMERA_INDEX;

/// avfoundation refuses its own default rate on many built-in cameras,
/// so a rate is always requested there.
const AVFOUNDATION_DEFAULT_FRAMERATE: u32 = 30;

/// Identifies a camera and the capture mode to request from it.
///
/// Maps onto a libavdevice input: the input format name (`v4l2`,
/// `avfoundation`, `dshow`, `vfwcap`), a device URL and a set of
/// format options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CameraDevice {
    pub index: u32,
    /// DirectShow device name. Only used on Windows.
    pub name: Option<String>,
    pub framerate: Option<u32>,
    pub video_size: Option<(u32, u32)>,
}

impl CameraDevice {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            name: None,
            framerate: None,
            video_size: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_framerate(mut self, framerate: u32) -> Self {
        self.framerate = Some(framerate);
        self
    }

    pub fn with_video_size(mut self, width: u32, height: u32) -> Self {
        self.video_size = Some((width, height));
        self
    }

    pub fn input_format(&self) -> &'static str {
        platform_input_format(self.name.is_some())
    }

    pub fn url(&self) -> String {
        device_url(self.input_format(), self.index, self.name.as_deref())
    }

    /// Options handed to the input format when the device is opened.
    pub fn options(&self) -> Vec<(&'static str, String)> {
        let mut options = Vec::new();
        let framerate = match (self.framerate, self.input_format()) {
            (Some(rate), _) => Some(rate),
            (None, "avfoundation") => Some(AVFOUNDATION_DEFAULT_FRAMERATE),
            (None, _) => None,
        };
        if let Some(rate) = framerate {
            options.push(("framerate", rate.to_string()));
        }
        if let Some((w, h)) = self.video_size {
            options.push(("video_size", format!("{w}x{h}")));
        }
        options
    }
}

impl Default for CameraDevice {
    fn default() -> Self {
        Self::new(DEFAULT_CAMERA_INDEX)
    }
}

impl fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.input_format(), self.url())
    }
}

/// Parses `WIDTHxHEIGHT`, as accepted by `--video-size`.
pub fn parse_video_size(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let w: u32 = w.trim().parse().ok()?;
    let h: u32 = h.trim().parse().ok()?;
    if w == 0 || h == 0 {
        return None;
    }
    Some((w, h))
}

fn platform_input_format(has_name: bool) -> &'static str {
    if cfg!(target_os = "macos") {
        "avfoundation"
    } else if cfg!(target_os = "windows") {
        if has_name {
            "dshow"
        } else {
            "vfwcap"
        }
    } else {
        "v4l2"
    }
}

fn device_url(format: &str, index: u32, name: Option<&str>) -> String {
    match (format, name) {
        ("v4l2", _) => format!("/dev/video{index}"),
        ("dshow", Some(name)) => format!("video={name}"),
        _ => index.to_string(),
    }
}
