use iced::widget::{column, text, Space};
use iced::Element;

use crate::app::{scaled, Message};

pub fn view(fs: f32) -> Element<'static, Message> {
    let version = env!("CARGO_PKG_VERSION");

    column![
        text("Open Source Webcam Recorder").size(scaled(22.0, fs)),
        Space::new().height(4),
        text(format!("Version {version}")).size(scaled(13.0, fs)),
        Space::new().height(12),
        text(
            "Previews your camera and records it to an MP4 file. \
             Recordings stay on this computer."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(12),
        text(format!("Released under the {} license.", env!("CARGO_PKG_LICENSE")))
            .size(scaled(13.0, fs)),
    ]
    .spacing(0)
    .into()
}
