#![forbid(unsafe_code)]

//! World map canvas with city markers and the hover tooltip.

use geoguide_core::geometry::Rect;
use geoguide_core::map::{CityMap, Projection};

use crate::frame::{Buffer, Style};
use crate::theme;

const MARKER: &str = "●";
const MARKER_HOT: &str = "◉";

/// Draw the whole map into `canvas`.
///
/// `focus` is the marker index selected with the keyboard; it is drawn like
/// a hovered marker.
pub fn draw_map(canvas: &mut Buffer, map: &CityMap, focus: Option<usize>) {
    let area = canvas.area();
    let ocean = Style::new().fg(theme::LINK).bg(theme::OCEAN);
    canvas.fill(area, ocean);
    draw_graticule(canvas, area, ocean.dim());

    let markers = map.markers(area);
    let hovered = map.hovered();
    for (index, (city, (x, y))) in markers.iter().enumerate() {
        let hot = hovered == Some(city.name.as_str()) || focus == Some(index);
        let glyph = if hot { MARKER_HOT } else { MARKER };
        let style = ocean.fg(theme::tone(&city.color)).bold();
        canvas.put_str(*x, *y, glyph, style, x + 1);
    }

    if let Some(tip) = map.tooltip()
        && let Some((_, (x, y))) = markers.iter().find(|(c, _)| c.name == tip.name)
    {
        draw_tooltip(canvas, area, *x, *y, &format!("{}, {}", tip.name, tip.country));
    }
}

fn draw_graticule(canvas: &mut Buffer, area: Rect, style: Style) {
    let projection = Projection::default();
    for lat in [-30.0, 0.0, 30.0, 60.0] {
        for step in 0..=72 {
            let lon = -180.0 + f64::from(step) * 5.0;
            if let Some((x, y)) = projection.project(lon, lat, area) {
                canvas.put_str(x, y, "·", style, x + 1);
            }
        }
    }
    for lon in [-120.0, -60.0, 0.0, 60.0, 120.0] {
        let Some((x, _)) = projection.project(lon, 0.0, area) else {
            continue;
        };
        for y in area.y..area.bottom() {
            canvas.put_str(x, y, "┊", style, x + 1);
        }
    }
}

/// Tooltip box one row above the marker, or below it on the top row,
/// shifted left as needed to stay inside `area`.
fn draw_tooltip(canvas: &mut Buffer, area: Rect, x: u16, y: u16, text: &str) {
    let label = format!(" {text} ");
    let width = u16::try_from(unicode_width::UnicodeWidthStr::width(label.as_str()))
        .unwrap_or(u16::MAX)
        .min(area.width);
    let ty = if y > area.y { y - 1 } else { y + 1 };
    let tx = x.min(area.right().saturating_sub(width)).max(area.x);
    let style = Style::new().fg(theme::BG).bg(theme::TEXT).bold();
    canvas.put_str(tx, ty, &label, style, tx + width);
}
