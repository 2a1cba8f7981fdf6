use iced::color;
use iced::theme::Palette;
use iced::{Color, Theme};

use crate::platform;
use crate::settings::Appearance;

/// Resolve the iced Theme from appearance + high_contrast settings.
pub fn resolve_theme(appearance: Appearance, high_contrast: bool) -> Theme {
    let is_dark = match appearance {
        Appearance::Dark => true,
        Appearance::Light => false,
        Appearance::System => platform::is_dark_mode(),
    };

    let palette = match (is_dark, high_contrast) {
        (true, false) => dark_palette(),
        (false, false) => light_palette(),
        (true, true) => high_contrast_dark_palette(),
        (false, true) => high_contrast_light_palette(),
    };

    Theme::custom("Webcam Recorder", palette)
}

/// Secondary text, e.g. the saved-file status line.
pub fn muted_color(theme: &Theme) -> Color {
    let text = theme.palette().text;
    Color { a: 0.7, ..text }
}

fn dark_palette() -> Palette {
    Palette {
        background: color!(0x18, 0x19, 0x1b),
        text: color!(0xd6, 0xd6, 0xd8),
        primary: color!(0x4c, 0x8d, 0xe8),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xcc, 0x00),
        danger: color!(0xe5, 0x39, 0x35),
    }
}

fn light_palette() -> Palette {
    Palette {
        background: color!(0xf2, 0xf2, 0xf4),
        text: color!(0x20, 0x21, 0x24),
        primary: color!(0x26, 0x6e, 0xe0),
        success: color!(0x34, 0xc7, 0x59),
        warning: color!(0xff, 0x9f, 0x0a),
        danger: color!(0xd3, 0x2f, 0x2f),
    }
}

fn high_contrast_dark_palette() -> Palette {
    Palette {
        background: color!(0x00, 0x00, 0x00),
        text: color!(0xff, 0xff, 0xff),
        primary: color!(0x6c, 0xb4, 0xff),
        success: color!(0x30, 0xd1, 0x58),
        warning: color!(0xff, 0xd6, 0x0a),
        danger: color!(0xff, 0x45, 0x3a),
    }
}

fn high_contrast_light_palette() -> Palette {
    Palette {
        background: color!(0xff, 0xff, 0xff),
        text: color!(0x00, 0x00, 0x00),
        primary: color!(0x00, 0x50, 0xd0),
        success: color!(0x24, 0x8a, 0x3d),
        warning: color!(0xb2, 0x5c, 0x00),
        danger: color!(0xd7, 0x00, 0x15),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_pick_matching_background() {
        let dark = resolve_theme(Appearance::Dark, false);
        let light = resolve_theme(Appearance::Light, false);
        assert_eq!(dark.palette().background, dark_palette().background);
        assert_eq!(light.palette().background, light_palette().background);
    }

    #[test]
    fn test_high_contrast_uses_pure_black_and_white() {
        let dark = resolve_theme(Appearance::Dark, true);
        let light = resolve_theme(Appearance::Light, true);
        assert_eq!(dark.palette().background, Color::BLACK);
        assert_eq!(light.palette().background, Color::WHITE);
    }

    #[test]
    fn test_muted_color_is_translucent_text() {
        let theme = resolve_theme(Appearance::Light, false);
        let muted = muted_color(&theme);
        assert_eq!(muted.r, theme.palette().text.r);
        assert!(muted.a < 1.0);
    }
}
