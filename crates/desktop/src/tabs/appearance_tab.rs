use iced::widget::{checkbox, column, radio, row, slider, text, Column, Space};
use iced::{Alignment, Element};

use crate::app::{scaled, Message};
use crate::settings::{Appearance, Settings};

const FONT_SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.8..=1.5;

pub fn view<'a>(settings: &Settings) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let size = scaled(13.0, fs);

    let modes = Appearance::ALL.iter().fold(Column::new().spacing(6), |col, &mode| {
        col.push(
            radio(
                mode.to_string(),
                mode,
                Some(settings.appearance),
                Message::AppearanceChanged,
            )
            .text_size(size),
        )
    });

    column![
        text("Theme").size(scaled(16.0, fs)),
        Space::new().height(8),
        modes,
        Space::new().height(12),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(size),
        Space::new().height(20),
        text("Text size").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            slider(FONT_SCALE_RANGE, settings.font_scale, Message::FontScaleChanged).step(0.05),
            text(format!("{:.0}%", settings.font_scale * 100.0)).size(size),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    ]
    .spacing(0)
    .into()
}
