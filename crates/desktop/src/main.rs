mod app;
mod platform;
mod settings;
mod tabs;
mod theme;
mod widgets;
mod workers;

use app::App;

const ICON_SIZE: u32 = 64;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("Open Source Webcam Recorder")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(800.0, 600.0),
            icon: load_icon(),
            exit_on_close_request: false,
            ..Default::default()
        })
        .run()
}

/// Red record dot on a transparent background.
fn load_icon() -> Option<iced::window::Icon> {
    let center = (ICON_SIZE as f32 - 1.0) / 2.0;
    let radius = ICON_SIZE as f32 * 0.4;
    let img = image::RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        if dx * dx + dy * dy <= radius * radius {
            image::Rgba([0xe5, 0x39, 0x35, 0xff])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    iced::window::icon::from_rgba(img.into_raw(), ICON_SIZE, ICON_SIZE).ok()
}
