#![forbid(unsafe_code)]

//! City detail overlay.
//!
//! A modal card over a dimmed backdrop. Clicking the backdrop or the `[x]`
//! control closes it; clicks inside the card are swallowed.

use geoguide_core::geometry::Rect;
use geoguide_core::map::City;

use crate::document::wrap;
use crate::frame::{Attrs, Buffer, Style};
use crate::theme;

use super::draw_box;

const CARD_WIDTH: u16 = 56;
const CARD_HEIGHT: u16 = 18;
const LABEL_WIDTH: u16 = 10;

/// The card's rectangle on `screen`.
#[must_use]
pub fn card_rect(screen: Rect) -> Rect {
    screen.centered(
        CARD_WIDTH.min(screen.width.saturating_sub(4)),
        CARD_HEIGHT.min(screen.height.saturating_sub(2)),
    )
}

/// The close control inside `card`.
#[must_use]
pub fn close_rect(card: Rect) -> Rect {
    Rect::new(card.right().saturating_sub(5), card.y, 3.min(card.width), card.height.min(1))
}

/// Draw `city`'s card over whatever is already in `buf`.
pub fn draw_city_card(buf: &mut Buffer, screen: Rect, city: &City) {
    buf.set_style(screen, Style::new().attrs(Attrs::DIM));
    let card = card_rect(screen);
    let style = theme::panel();
    draw_box(buf, card, style, Some(&city.name));
    let close = close_rect(card);
    buf.put_str(close.x, close.y, "[x]", style.fg(theme::LINK).bold(), close.right());

    let inner = card.inset(1);
    if inner.width < 3 || inner.height == 0 {
        return;
    }
    let left = inner.x + 1;
    let right = inner.right().saturating_sub(1);
    let tone = style.fg(theme::tone(&city.color)).bold();
    let mut rows: Vec<Vec<(String, Style)>> = Vec::new();

    rows.push(vec![(city.country.clone(), style.fg(theme::MUTED))]);
    rows.push(Vec::new());
    for (label, value) in city.facts() {
        rows.push(vec![
            (format!("{label:<width$}", width = usize::from(LABEL_WIDTH)), style.fg(theme::MUTED)),
            (value.to_owned(), tone),
        ]);
    }
    rows.push(Vec::new());
    for line in wrap(&city.details, right.saturating_sub(left)) {
        rows.push(vec![(line, style)]);
    }
    rows.push(Vec::new());
    rows.push(vec![
        ("CO₂ saved ".to_owned(), style.fg(theme::MUTED)),
        (city.co2_saved.clone(), style.fg(theme::tone("green")).bold()),
    ]);

    let footer_y = inner.bottom() - 1;
    for (dy, row) in (0u16..).zip(rows) {
        let y = inner.y + dy;
        if y >= footer_y {
            break;
        }
        let mut x = left;
        for (text, seg_style) in row {
            x = buf.put_str(x, y, &text, seg_style, right);
        }
    }
    buf.put_str(left, footer_y, "Press Esc to close", style.fg(theme::MUTED).italic(), right);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reykjavik() -> City {
        City {
            name: "Reykjavik".into(),
            country: "Iceland".into(),
            lon: -21.9,
            lat: 64.1,
            capacity: "2,000 MW thermal".into(),
            population: "230,000 people".into(),
            details: "Nearly every building in the capital is heated by geothermal water piped from nearby fields.".into(),
            year_established: "1930".into(),
            growth: "Stable, near full coverage".into(),
            co2_saved: "4 million tons per year".into(),
            color: "blue".into(),
        }
    }

    #[test]
    fn card_is_centered_and_bounded() {
        let card = card_rect(Rect::from_size(120, 40));
        assert_eq!(card, Rect::new(32, 11, 56, 18));
        let small = card_rect(Rect::from_size(30, 10));
        assert_eq!(small.width, 26);
        assert_eq!(small.height, 8);
    }

    #[test]
    fn card_shows_facts_and_close_control() {
        let screen = Rect::from_size(80, 24);
        let mut buf = Buffer::new(80, 24);
        draw_city_card(&mut buf, screen, &reykjavik());
        assert!(buf.contains_text("Reykjavik"));
        assert!(buf.contains_text("Iceland"));
        assert!(buf.contains_text("2,000 MW thermal"));
        assert!(buf.contains_text("4 million tons per year"));
        assert!(buf.contains_text("Press Esc to close"));
        let close = close_rect(card_rect(screen));
        assert_eq!(buf.find_text("[x]"), Some((close.x, close.y)));
    }

    #[test]
    fn backdrop_is_dimmed() {
        let screen = Rect::from_size(80, 24);
        let mut buf = Buffer::new(80, 24);
        draw_city_card(&mut buf, screen, &reykjavik());
        assert!(buf.get(0, 0).unwrap().style.attrs.contains(Attrs::DIM));
    }
}
