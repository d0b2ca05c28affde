#![forbid(unsafe_code)]

//! Screen layout and the views drawn into it.
//!
//! Views are plain functions over a [`Buffer`]. Each view that accepts
//! clicks also exposes the geometry helper the model uses for hit testing,
//! so drawing and hit testing can never disagree.

pub mod body;
pub mod chrome;
pub mod map;
pub mod nav;
pub mod overlay;

use geoguide_core::geometry::Rect;

use crate::frame::{Buffer, Style};

/// Width of the contents sidebar, borders included.
pub const SIDEBAR_WIDTH: u16 = 34;

/// Regions of the screen for one terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub screen: Rect,
    pub header: Rect,
    pub footer: Rect,
    /// Document text, scrollbar excluded.
    pub doc: Rect,
    pub scrollbar: Rect,
    /// Docked contents panel.
    pub sidebar: Option<Rect>,
    /// Floating contents panel for narrow terminals.
    pub nav_overlay: Option<Rect>,
    /// Whether the terminal is wide enough to dock the panel.
    pub docked: bool,
}

impl ScreenLayout {
    #[must_use]
    pub fn compute(width: u16, height: u16, sidebar_breakpoint: u16, nav_open: bool) -> Self {
        let screen = Rect::from_size(width, height);
        let header = Rect::new(0, 0, width, height.min(1));
        let footer_h = u16::from(height >= 3);
        let footer = Rect::new(0, height.saturating_sub(footer_h), width, footer_h);
        let middle = Rect::new(
            0,
            header.height,
            width,
            height.saturating_sub(header.height + footer_h),
        );
        let docked = width >= sidebar_breakpoint;

        let (body, sidebar) = if docked && nav_open {
            let (left, right) = middle.split_right(SIDEBAR_WIDTH.min(width / 2));
            (left, Some(right))
        } else {
            (middle, None)
        };
        let nav_overlay = (!docked && nav_open).then(|| {
            let w = SIDEBAR_WIDTH.min(width);
            Rect::new(width - w, middle.y, w, middle.height)
        });
        let (doc, scrollbar) = body.split_right(1);
        Self {
            screen,
            header,
            footer,
            doc,
            scrollbar,
            sidebar,
            nav_overlay,
            docked,
        }
    }

    /// Rows available for the document.
    #[must_use]
    pub fn viewport_height(&self) -> u16 {
        self.doc.height
    }

    /// Panel rectangle in either layout.
    #[must_use]
    pub fn nav_rect(&self) -> Option<Rect> {
        self.sidebar.or(self.nav_overlay)
    }
}

/// Draw a single-line box around `rect`, with `title` in the top border.
pub fn draw_box(buf: &mut Buffer, rect: Rect, style: Style, title: Option<&str>) {
    if rect.width < 2 || rect.height < 2 {
        return;
    }
    buf.fill(rect, style);
    let right = rect.right() - 1;
    let bottom = rect.bottom() - 1;
    for x in rect.x + 1..right {
        buf.put_str(x, rect.y, "─", style, x + 1);
        buf.put_str(x, bottom, "─", style, x + 1);
    }
    for y in rect.y + 1..bottom {
        buf.put_str(rect.x, y, "│", style, rect.x + 1);
        buf.put_str(right, y, "│", style, right + 1);
    }
    buf.put_str(rect.x, rect.y, "┌", style, rect.x + 1);
    buf.put_str(right, rect.y, "┐", style, right + 1);
    buf.put_str(rect.x, bottom, "└", style, rect.x + 1);
    buf.put_str(right, bottom, "┘", style, right + 1);
    if let Some(title) = title {
        let end = buf.put_str(rect.x + 2, rect.y, " ", style, right);
        let end = buf.put_str(end, rect.y, title, style.bold(), right.saturating_sub(1));
        buf.put_str(end, rect.y, " ", style, right);
    }
}

/// Truncate `text` to `width` columns, ending in `…` when cut.
#[must_use]
pub fn ellipsize(text: &str, width: u16) -> String {
    use unicode_segmentation::UnicodeSegmentation;
    use unicode_width::UnicodeWidthStr;

    let width = usize::from(width);
    if text.width() <= width {
        return text.to_owned();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = g.width();
        if used + w > width - 1 {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push('…');
    out
}
