#![forbid(unsafe_code)]

//! Cell grid that views draw into.
//!
//! A [`Buffer`] is a row-major grid of [`Cell`]s. Text is written grapheme by
//! grapheme; a double-width grapheme occupies its cell plus a
//! [`Glyph::Continuation`] cell to its right, and writes that would split a
//! wide grapheme at the clip edge are padded with a space instead.

use bitflags::bitflags;
use crossterm::style::Color;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use geoguide_core::geometry::Rect;

bitflags! {
    /// Text attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attrs: u8 {
        const BOLD      = 0b0000_0001;
        const DIM       = 0b0000_0010;
        const ITALIC    = 0b0000_0100;
        const UNDERLINE = 0b0000_1000;
        const REVERSE   = 0b0001_0000;
    }
}

/// Foreground, background, and attributes of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attrs,
}

impl Style {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            attrs: Attrs::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    #[must_use]
    pub const fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = self.attrs.union(attrs);
        self
    }

    #[must_use]
    pub const fn bold(self) -> Self {
        self.attrs(Attrs::BOLD)
    }

    #[must_use]
    pub const fn dim(self) -> Self {
        self.attrs(Attrs::DIM)
    }

    #[must_use]
    pub const fn italic(self) -> Self {
        self.attrs(Attrs::ITALIC)
    }

    /// `self` drawn over `base`: unset colors fall through, attributes merge.
    #[must_use]
    pub fn over(self, base: Style) -> Style {
        Style {
            fg: self.fg.or(base.fg),
            bg: self.bg.or(base.bg),
            attrs: self.attrs | base.attrs,
        }
    }
}

/// What a cell displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Glyph {
    Char(char),
    /// A multi-codepoint grapheme cluster.
    Cluster(Box<str>),
    /// Right half of the wide grapheme to the left.
    Continuation,
}

impl Default for Glyph {
    fn default() -> Self {
        Self::Char(' ')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub glyph: Glyph,
    pub style: Style,
}

/// Row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    /// A blank buffer.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whole-buffer rectangle.
    #[must_use]
    pub const fn area(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| usize::from(y) * usize::from(self.width) + usize::from(x))
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Cells of row `y`. Empty when out of range.
    #[must_use]
    pub fn row(&self, y: u16) -> &[Cell] {
        if y >= self.height {
            return &[];
        }
        let start = usize::from(y) * usize::from(self.width);
        &self.cells[start..start + usize::from(self.width)]
    }

    /// Fill `rect` (clipped to the buffer) with blanks in `style`.
    pub fn fill(&mut self, rect: Rect, style: Style) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                if let Some(cell) = self.get_mut(x, y) {
                    *cell = Cell {
                        glyph: Glyph::Char(' '),
                        style,
                    };
                }
            }
        }
    }

    /// Restyle `rect` without touching glyphs.
    pub fn set_style(&mut self, rect: Rect, style: Style) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y..bottom {
            for x in rect.x..right {
                if let Some(cell) = self.get_mut(x, y) {
                    cell.style = style.over(cell.style);
                }
            }
        }
    }

    /// Write `text` at `(x, y)` stopping before column `max_x`.
    ///
    /// Control characters are skipped. Returns the column after the last
    /// written cell.
    pub fn put_str(&mut self, x: u16, y: u16, text: &str, style: Style, max_x: u16) -> u16 {
        let max_x = max_x.min(self.width);
        if y >= self.height {
            return x;
        }
        let mut col = x;
        for grapheme in text.graphemes(true) {
            if grapheme.chars().any(char::is_control) {
                continue;
            }
            let width = grapheme.width();
            if width == 0 {
                continue;
            }
            let width = u16::try_from(width).unwrap_or(2).min(2);
            if col + width > max_x {
                if col < max_x {
                    self.put_glyph(col, y, Glyph::Char(' '), style);
                    col += 1;
                }
                break;
            }
            let mut chars = grapheme.chars();
            let glyph = match (chars.next(), chars.next()) {
                (Some(c), None) => Glyph::Char(c),
                _ => Glyph::Cluster(grapheme.into()),
            };
            self.put_glyph(col, y, glyph, style);
            if width == 2 {
                self.put_glyph(col + 1, y, Glyph::Continuation, style);
            }
            col += width;
        }
        col
    }

    fn put_glyph(&mut self, x: u16, y: u16, glyph: Glyph, style: Style) {
        if let Some(cell) = self.get_mut(x, y) {
            cell.glyph = glyph;
            cell.style = style.over(Style {
                fg: None,
                bg: cell.style.bg,
                attrs: Attrs::empty(),
            });
        }
    }

    /// Copy `rows` rows of `src` starting at `src_y` to `(dst_x, dst_y)`.
    ///
    /// Anything falling outside either buffer is skipped.
    pub fn blit(&mut self, src: &Buffer, src_y: u16, rows: u16, dst_x: u16, dst_y: u16) {
        for dy in 0..rows {
            let (Some(sy), Some(ty)) = (src_y.checked_add(dy), dst_y.checked_add(dy)) else {
                break;
            };
            for (sx, cell) in (0u16..).zip(src.row(sy)) {
                let Some(tx) = dst_x.checked_add(sx) else {
                    break;
                };
                if let Some(target) = self.get_mut(tx, ty) {
                    *target = cell.clone();
                }
            }
        }
    }

    /// Plain text of row `y`, continuation cells omitted.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .iter()
            .filter_map(|cell| match &cell.glyph {
                Glyph::Char(c) => Some(c.to_string()),
                Glyph::Cluster(s) => Some(s.to_string()),
                Glyph::Continuation => None,
            })
            .collect()
    }

    /// Whether any row contains `needle`.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        (0..self.height).any(|y| self.row_text(y).contains(needle))
    }

    /// First `(x, y)` where `needle` starts, in cell columns.
    #[must_use]
    pub fn find_text(&self, needle: &str) -> Option<(u16, u16)> {
        (0..self.height).find_map(|y| {
            let text = self.row_text(y);
            let byte = text.find(needle)?;
            let x = u16::try_from(text[..byte].width()).ok()?;
            Some((x, y))
        })
    }
}
