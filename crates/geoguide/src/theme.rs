#![forbid(unsafe_code)]

//! Palette and named styles.

use crossterm::style::Color;

use crate::frame::{Attrs, Style};

pub const BG: Color = Color::Rgb { r: 0x0f, g: 0x17, b: 0x2a };
pub const SURFACE: Color = Color::Rgb { r: 0x1e, g: 0x29, b: 0x3b };
pub const TEXT: Color = Color::Rgb { r: 0xe2, g: 0xe8, b: 0xf0 };
pub const MUTED: Color = Color::Rgb { r: 0x94, g: 0xa3, b: 0xb8 };
pub const ACCENT: Color = Color::Rgb { r: 0xf9, g: 0x73, b: 0x16 };
pub const LINK: Color = Color::Rgb { r: 0x38, g: 0xbd, b: 0xf8 };
pub const OCEAN: Color = Color::Rgb { r: 0x0c, g: 0x4a, b: 0x6e };

/// Accent color for a payload color token. Unknown tokens get [`ACCENT`].
#[must_use]
pub fn tone(token: &str) -> Color {
    match token {
        "red" => Color::Rgb { r: 0xef, g: 0x44, b: 0x44 },
        "rose" => Color::Rgb { r: 0xf4, g: 0x3f, b: 0x5e },
        "orange" => Color::Rgb { r: 0xf9, g: 0x73, b: 0x16 },
        "yellow" => Color::Rgb { r: 0xea, g: 0xb3, b: 0x08 },
        "green" => Color::Rgb { r: 0x22, g: 0xc5, b: 0x5e },
        "teal" => Color::Rgb { r: 0x14, g: 0xb8, b: 0xa6 },
        "cyan" => Color::Rgb { r: 0x06, g: 0xb6, b: 0xd4 },
        "sky" => Color::Rgb { r: 0x0e, g: 0xa5, b: 0xe9 },
        "blue" => Color::Rgb { r: 0x3b, g: 0x82, b: 0xf6 },
        "indigo" => Color::Rgb { r: 0x63, g: 0x66, b: 0xf1 },
        "purple" => Color::Rgb { r: 0xa8, g: 0x55, b: 0xf7 },
        _ => ACCENT,
    }
}

#[must_use]
pub fn base() -> Style {
    Style::new().fg(TEXT).bg(BG)
}

#[must_use]
pub fn muted() -> Style {
    Style::new().fg(MUTED)
}

#[must_use]
pub fn heading() -> Style {
    Style::new().fg(TEXT).bold()
}

#[must_use]
pub fn section_number() -> Style {
    Style::new().fg(ACCENT).bold()
}

#[must_use]
pub fn affordance() -> Style {
    Style::new().fg(LINK).attrs(Attrs::UNDERLINE)
}

#[must_use]
pub fn focused() -> Style {
    Style::new().attrs(Attrs::REVERSE)
}

#[must_use]
pub fn panel() -> Style {
    Style::new().fg(TEXT).bg(SURFACE)
}

#[must_use]
pub fn nav_active() -> Style {
    Style::new().fg(BG).bg(ACCENT).bold()
}

/// Style of a detail row at `opacity` in [0.0, 1.0].
///
/// Terminals cannot blend, so a fading row is dimmed until it is mostly
/// visible.
#[must_use]
pub fn fade(style: Style, opacity: f32) -> Style {
    if opacity < 0.6 {
        style.dim()
    } else {
        style
    }
}
