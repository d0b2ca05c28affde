#![forbid(unsafe_code)]

//! Header and footer bars.

use geoguide_core::geometry::Rect;
use geoguide_core::section::Section;

use crate::frame::{Buffer, Style};
use crate::theme;

use super::ellipsize;

const TOGGLE_LABEL: &str = "[≡ Contents]";
const FOOTER_HINTS: &str = " q quit  ↑↓ scroll  [ ] sections  Tab focus  Enter open  t contents";

/// Where the contents toggle sits in `header`.
#[must_use]
pub fn toggle_rect(header: Rect) -> Rect {
    let width = 12u16.min(header.width);
    Rect::new(header.right() - width, header.y, width, header.height.min(1))
}

/// Title on the left, active section in the middle, toggle on the right.
pub fn draw_header(buf: &mut Buffer, area: Rect, title: &str, active: Option<&Section>, nav_open: bool) {
    if area.is_empty() {
        return;
    }
    let bar = theme::panel();
    buf.fill(area, bar);
    let toggle = toggle_rect(area);
    let limit = toggle.x.saturating_sub(1);

    let mut x = buf.put_str(area.x + 1, area.y, title, bar.fg(theme::ACCENT).bold(), limit);
    if let Some(section) = active {
        x = buf.put_str(x, area.y, "  ·  ", bar.fg(theme::MUTED), limit);
        x = buf.put_str(x, area.y, &section.number, theme::section_number().bg(theme::SURFACE), limit);
        let room = limit.saturating_sub(x + 1);
        buf.put_str(x + 1, area.y, &ellipsize(&section.label, room), bar, limit);
    }

    let toggle_style = if nav_open {
        bar.fg(theme::LINK).bold()
    } else {
        bar.fg(theme::LINK)
    };
    buf.put_str(toggle.x, toggle.y, TOGGLE_LABEL, toggle_style, toggle.right());
}

/// Key hints on the left, scroll percentage on the right.
pub fn draw_footer(buf: &mut Buffer, area: Rect, scroll: u32, max_scroll: u32) {
    if area.is_empty() {
        return;
    }
    let bar = Style::new().fg(theme::MUTED).bg(theme::SURFACE);
    buf.fill(area, bar);
    let percent = if max_scroll == 0 {
        100
    } else {
        u64::from(scroll.min(max_scroll)) * 100 / u64::from(max_scroll)
    };
    let label = format!("{percent:>3}% ");
    let label_x = area.right().saturating_sub(u16::try_from(label.len()).unwrap_or(0));
    buf.put_str(area.x, area.y, FOOTER_HINTS, bar, label_x.saturating_sub(1));
    buf.put_str(label_x, area.y, &label, bar.bold(), area.right());
}

#[cfg(test)]
mod tests {
    use super::*;
    use geoguide_core::section::SectionId;

    fn section() -> Section {
        Section {
            id: SectionId::new("costs"),
            number: "5.2".into(),
            label: "Costs".into(),
            order: 12,
        }
    }

    #[test]
    fn header_shows_title_active_section_and_toggle() {
        let mut buf = Buffer::new(60, 1);
        let area = buf.area();
        draw_header(&mut buf, area, "Geothermal", Some(&section()), false);
        let row = buf.row_text(0);
        assert!(row.starts_with(" Geothermal  ·  5.2 Costs"));
        assert!(row.ends_with(TOGGLE_LABEL));
        assert_eq!(buf.find_text("[≡"), Some((toggle_rect(buf.area()).x, 0)));
    }

    #[test]
    fn narrow_header_keeps_toggle() {
        let mut buf = Buffer::new(24, 1);
        let area = buf.area();
        draw_header(&mut buf, area, "Geothermal energy guide", Some(&section()), true);
        assert!(buf.row_text(0).ends_with(TOGGLE_LABEL));
    }

    #[test]
    fn footer_reports_scroll_percent() {
        let mut buf = Buffer::new(80, 1);
        let area = buf.area();
        draw_footer(&mut buf, area, 50, 200);
        assert!(buf.row_text(0).trim_end().ends_with("25%"));
        let area = buf.area();
        draw_footer(&mut buf, area, 0, 0);
        assert!(buf.row_text(0).trim_end().ends_with("100%"));
    }
}
