#![forbid(unsafe_code)]

//! Contents panel.
//!
//! The panel lists one row per section. The active section's row is drawn
//! highlighted and, when the keyboard cursor is shown, its row carries a `›`
//! marker. When the list is taller than the panel it scrolls to keep the
//! cursor row (or else the active row) visible.

use geoguide_core::geometry::Rect;
use geoguide_core::navigation::NavEntry;

use crate::frame::Buffer;
use crate::theme;

use super::{draw_box, ellipsize};

/// Column width reserved for section numbers.
const NUMBER_WIDTH: u16 = 5;

/// Rows of the panel that hold entries.
#[must_use]
pub fn list_area(panel: Rect) -> Rect {
    panel.inset(1)
}

/// Index of the first entry drawn when `keep` must stay visible.
#[must_use]
pub fn first_visible(len: usize, rows: u16, keep: Option<usize>) -> usize {
    let rows = usize::from(rows);
    if rows == 0 || len <= rows {
        return 0;
    }
    let keep = keep.unwrap_or(0).min(len - 1);
    (keep + 1).saturating_sub(rows).min(len - rows)
}

/// Row the list keeps visible: the cursor, or else the active entry.
#[must_use]
pub fn pinned_row(entries: &[NavEntry], cursor: Option<usize>) -> Option<usize> {
    cursor.or_else(|| entries.iter().position(|e| e.active))
}

/// Entry under screen row `y`, if any.
#[must_use]
pub fn entry_at(panel: Rect, len: usize, keep: Option<usize>, x: u16, y: u16) -> Option<usize> {
    let list = list_area(panel);
    if !list.contains(x, y) {
        return None;
    }
    let index = first_visible(len, list.height, keep) + usize::from(y - list.y);
    (index < len).then_some(index)
}

/// Draw the panel into `panel`.
///
/// `cursor` is the keyboard cursor row, shown only while the panel has
/// keyboard focus.
pub fn draw_nav(buf: &mut Buffer, panel: Rect, entries: &[NavEntry], cursor: Option<usize>) {
    draw_box(buf, panel, theme::panel(), Some("CONTENTS"));
    let list = list_area(panel);
    if list.is_empty() {
        return;
    }
    let keep = pinned_row(entries, cursor);
    let start = first_visible(entries.len(), list.height, keep);

    for (row, (index, entry)) in entries.iter().enumerate().skip(start).enumerate() {
        let Ok(row) = u16::try_from(row) else { break };
        if row >= list.height {
            break;
        }
        let y = list.y + row;
        let base = if entry.active {
            theme::nav_active()
        } else {
            theme::panel()
        };
        buf.fill(Rect::new(list.x, y, list.width, 1), base);

        let marker = if cursor == Some(index) { "›" } else { " " };
        let x = buf.put_str(list.x, y, marker, base.fg(theme::LINK).bold(), list.right());
        let number_style = if entry.active {
            base
        } else {
            theme::section_number().bg(theme::SURFACE)
        };
        buf.put_str(x + 1, y, &entry.number, number_style, list.right());
        let label_x = x + 1 + NUMBER_WIDTH;
        let room = list.right().saturating_sub(label_x);
        buf.put_str(label_x, y, &ellipsize(&entry.label, room), base, list.right());
    }
}
