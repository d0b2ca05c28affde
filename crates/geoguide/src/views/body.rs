#![forbid(unsafe_code)]

//! Scrolled document body and scrollbar.
//!
//! The body shows rows `scroll..scroll + area.height` of the [`Document`].
//! The map section reserves a block of blank rows; the map itself is drawn
//! into its own buffer and copied over whatever part of that block is on
//! screen, so a half-scrolled map is clipped rather than squashed.

use geoguide_core::geometry::Rect;

use crate::document::{Document, MARGIN, MAP_HEIGHT};
use crate::frame::{Buffer, Style};
use crate::theme;

/// Document row under screen row `y`.
#[must_use]
pub fn doc_row(area: Rect, scroll: u32, y: u16) -> Option<u32> {
    (y >= area.y && y < area.bottom()).then(|| scroll + u32::from(y - area.y))
}

/// Draw the visible rows. `focus` is the disclosure cell whose header is
/// highlighted.
pub fn draw_body(buf: &mut Buffer, area: Rect, doc: &Document, scroll: u32, focus: Option<usize>) {
    buf.fill(area, theme::base());
    let focus_row = focus.and_then(|i| doc.cell_span(i)).map(|span| span.offset);

    for dy in 0..area.height {
        let row = scroll + u32::from(dy);
        let Some(line) = doc.line(row) else { break };
        let y = area.y + dy;
        let mut x = area.x + line.indent;
        for segment in &line.segments {
            x = buf.put_str(x, y, &segment.text, segment.style, area.right());
        }
        if focus_row == Some(row) {
            let start = area.x + line.indent;
            buf.set_style(
                Rect::new(start, y, x.saturating_sub(start), 1),
                theme::focused(),
            );
        }
    }
}

/// Size of the map canvas for a body of `area`.
#[must_use]
pub fn map_size(area: Rect) -> (u16, u16) {
    (area.width.saturating_sub(MARGIN * 2), MAP_HEIGHT)
}

/// Map-local cell under screen `(x, y)`, if the map is there.
#[must_use]
pub fn map_local(area: Rect, doc: &Document, scroll: u32, x: u16, y: u16) -> Option<(u16, u16)> {
    let block = doc.map_block()?;
    let row = doc_row(area, scroll, y)?;
    let (width, _) = map_size(area);
    let left = area.x + MARGIN;
    if row < block.top || row >= block.top + u32::from(block.height) {
        return None;
    }
    if x < left || x >= left + width {
        return None;
    }
    let local_y = u16::try_from(row - block.top).ok()?;
    Some((x - left, local_y))
}

/// Copy the on-screen part of `canvas` into the map block.
pub fn blit_map(buf: &mut Buffer, area: Rect, doc: &Document, scroll: u32, canvas: &Buffer) {
    let Some(block) = doc.map_block() else { return };
    let bottom = block.top + u32::from(block.height);
    let view_bottom = scroll + u32::from(area.height);
    let first = block.top.max(scroll);
    let last = bottom.min(view_bottom);
    if first >= last {
        return;
    }
    let (Ok(src_y), Ok(dst_dy), Ok(rows)) = (
        u16::try_from(first - block.top),
        u16::try_from(first - scroll),
        u16::try_from(last - first),
    ) else {
        return;
    };
    buf.blit(canvas, src_y, rows, area.x + MARGIN, area.y + dst_dy);
}

/// Draw a one-column scrollbar.
pub fn draw_scrollbar(buf: &mut Buffer, rect: Rect, scroll: u32, total: u32) {
    if rect.is_empty() {
        return;
    }
    let track = Style::new().fg(theme::SURFACE).bg(theme::BG);
    for y in rect.y..rect.bottom() {
        buf.put_str(rect.x, y, "│", track, rect.right());
    }
    let view = u32::from(rect.height);
    if total <= view {
        return;
    }
    let thumb = (view * view / total).max(1);
    let max_scroll = total - view;
    let travel = view - thumb;
    let top = u64::from(scroll.min(max_scroll)) * u64::from(travel) / u64::from(max_scroll);
    let top = u16::try_from(top).unwrap_or(0);
    let thumb = u16::try_from(thumb).unwrap_or(1);
    let style = Style::new().fg(theme::MUTED).bg(theme::BG);
    for y in rect.y + top..(rect.y + top + thumb).min(rect.bottom()) {
        buf.put_str(rect.x, y, "┃", style, rect.right());
    }
}
