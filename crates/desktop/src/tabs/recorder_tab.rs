use iced::widget::{button, column, container, image, row, stack, text, Space};
use iced::{Alignment, Color, ContentFit, Element, Length, Theme};

use crate::app::{scaled, App, CameraState, Message, Status};
use crate::theme::muted_color;
use crate::widgets::record_button::{record_button, Tone};
use crate::widgets::recording_overlay::recording_overlay;

pub fn view<'a>(app: &'a App, theme: &Theme) -> Element<'a, Message> {
    let fs = app.settings.font_scale;

    column![
        preview_area(app, fs),
        Space::new().height(12),
        controls(app, fs),
        Space::new().height(8),
        status_line(&app.status, fs, muted_color(theme)),
    ]
    .spacing(0)
    .height(Length::Fill)
    .into()
}

fn preview_area<'a>(app: &'a App, fs: f32) -> Element<'a, Message> {
    let content: Element<'a, Message> = match (&app.preview, &app.camera) {
        (_, CameraState::Unavailable(_)) => placeholder("Camera not found.", fs),
        (_, CameraState::Ended) => placeholder("Camera disconnected.", fs),
        (Some(handle), _) => {
            let picture = image(handle.clone())
                .content_fit(ContentFit::Contain)
                .width(Length::Fill)
                .height(Length::Fill);
            match app.session.overlay_text() {
                Some(label) => stack![picture, recording_overlay(label, scaled(16.0, fs))].into(),
                None => picture.into(),
            }
        }
        (None, _) => placeholder("Initializing...", fs),
    };

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .style(|_: &Theme| container::Style {
            background: Some(Color::BLACK.into()),
            ..container::Style::default()
        })
        .into()
}

fn placeholder<'a>(label: &'a str, fs: f32) -> Element<'a, Message> {
    container(text(label).size(scaled(16.0, fs)).color(Color::WHITE))
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn controls<'a>(app: &'a App, fs: f32) -> Element<'a, Message> {
    let recording = app.session.is_recording();
    let camera_live = matches!(app.camera, CameraState::Live(_));
    let size = scaled(14.0, fs);

    let start = record_button(
        move || text("Start Recording").size(size).into(),
        (!recording && camera_live).then_some(Message::StartRecording),
        Tone::Primary,
        app.start_hovered,
        Message::StartHovered,
        [10, 24],
    );
    let stop = record_button(
        move || text("Stop Recording").size(size).into(),
        recording.then_some(Message::StopRecording),
        Tone::Danger,
        app.stop_hovered,
        Message::StopHovered,
        [10, 24],
    );

    container(row![start, stop].spacing(12))
        .center_x(Length::Fill)
        .into()
}

fn status_line<'a>(status: &'a Status, fs: f32, muted: Color) -> Element<'a, Message> {
    let size = scaled(13.0, fs);
    match status {
        Status::None => Space::new().height(size).into(),
        Status::Saved(path) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            container(
                row![
                    text(format!("Saved as {name}")).size(size).color(muted),
                    button(text("Show in Folder").size(size))
                        .on_press(Message::ShowInFolder)
                        .style(button::text),
                ]
                .spacing(8)
                .align_y(Alignment::Center),
            )
            .center_x(Length::Fill)
            .into()
        }
        Status::Failed(reason) => container(
            text(reason.as_str())
                .size(size)
                .style(text::danger),
        )
        .center_x(Length::Fill)
        .into(),
    }
}
