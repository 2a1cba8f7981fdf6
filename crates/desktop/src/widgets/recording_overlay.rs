use iced::border::Border;
use iced::font::Weight;
use iced::widget::{container, text};
use iced::{Color, Element, Font, Padding, Theme};

const BADGE_ALPHA: f32 = 0.5;
const BADGE_PADDING: f32 = 4.0;
const BADGE_RADIUS: f32 = 4.0;
const INSET: f32 = 10.0;
const RECORDING_RED: Color = Color::from_rgb(1.0, 0.0, 0.0);

/// Elapsed-time badge pinned to the top-left corner of the preview.
pub fn recording_overlay<'a, Message: 'a>(label: String, size: f32) -> Element<'a, Message> {
    let badge = container(
        text(label)
            .size(size)
            .color(RECORDING_RED)
            .font(Font {
                weight: Weight::Bold,
                ..Font::DEFAULT
            }),
    )
    .padding(BADGE_PADDING)
    .style(|_: &Theme| container::Style {
        background: Some(
            Color {
                a: BADGE_ALPHA,
                ..Color::BLACK
            }
            .into(),
        ),
        border: Border {
            radius: BADGE_RADIUS.into(),
            ..Border::default()
        },
        ..container::Style::default()
    });

    container(badge)
        .padding(Padding {
            top: INSET,
            left: INSET,
            ..Padding::ZERO
        })
        .into()
}
