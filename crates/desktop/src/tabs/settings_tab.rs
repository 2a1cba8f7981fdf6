use std::fmt;

use iced::widget::{button, column, pick_list, row, slider, text, Space};
use iced::{Alignment, Element};

use crate::app::{scaled, Message};
use crate::settings::Settings;

/// Highest camera index offered in the picker.
const MAX_CAMERA_INDEX: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CameraChoice(u32);

impl fmt::Display for CameraChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Camera {}", self.0)
    }
}

pub fn view<'a>(settings: &Settings, recording: bool) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let size = scaled(13.0, fs);
    let current = CameraChoice(settings.camera_index);

    let camera_picker: Element<'a, Message> = if recording {
        text(format!("{current} (stop recording to change)"))
            .size(size)
            .into()
    } else {
        let choices: Vec<CameraChoice> = (0..=MAX_CAMERA_INDEX).map(CameraChoice).collect();
        pick_list(choices, Some(current), |c| Message::CameraIndexChanged(c.0))
            .text_size(size)
            .into()
    };

    let output_dir = settings.resolved_output_dir();

    column![
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![text("Device").size(size), camera_picker]
            .spacing(12)
            .align_y(Alignment::Center),
        Space::new().height(20),
        text("Recordings").size(scaled(16.0, fs)),
        Space::new().height(8),
        text(output_dir.display().to_string()).size(size),
        Space::new().height(8),
        row![
            button(text("Change...").size(size))
                .on_press(Message::SelectOutputDir)
                .padding([6, 14]),
            button(text("Open Folder").size(size))
                .on_press(Message::OpenOutputDir)
                .style(button::secondary)
                .padding([6, 14]),
        ]
        .spacing(8),
        Space::new().height(20),
        text("Quality").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            slider(0..=100, settings.quality, Message::QualityChanged),
            text(format!("{}%", settings.quality)).size(size),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
        text("Higher quality gives larger files. Applies to the next recording.")
            .size(scaled(11.0, fs)),
    ]
    .spacing(0)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_choice_label() {
        assert_eq!(CameraChoice(3).to_string(), "Camera 3");
    }
}
