#![forbid(unsafe_code)]

//! Diffing presenter.
//!
//! Keeps the last presented [`Buffer`] and emits only the cells that changed,
//! tracking cursor position and the active style so escape sequences are
//! written only when they differ. A frame is wrapped in a synchronized
//! update and flushed once.

use std::io::{self, BufWriter, Write};

use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};

use crate::frame::{Attrs, Buffer, Cell, Glyph, Style};

const BUFFER_CAPACITY: usize = 64 * 1024;

#[derive(Debug)]
pub struct Presenter<W: Write> {
    out: BufWriter<W>,
    previous: Option<Buffer>,
    style: Option<Style>,
    cursor: Option<(u16, u16)>,
}

impl<W: Write> Presenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::with_capacity(BUFFER_CAPACITY, out),
            previous: None,
            style: None,
            cursor: None,
        }
    }

    /// Forget the last frame so the next one is drawn in full.
    pub fn invalidate(&mut self) {
        self.previous = None;
        self.style = None;
        self.cursor = None;
    }

    /// Draw `next`. Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn present(&mut self, next: &Buffer) -> io::Result<usize> {
        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == next.width() && p.height() == next.height());
        queue!(self.out, terminal::BeginSynchronizedUpdate)?;
        if previous.is_none() {
            queue!(self.out, SetAttribute(Attribute::Reset), terminal::Clear(terminal::ClearType::All))?;
            self.style = None;
            self.cursor = None;
        }

        let mut written = 0;
        for y in 0..next.height() {
            let row = next.row(y);
            let old = previous.as_ref().map(|p| p.row(y));
            for (x, cell) in (0u16..).zip(row) {
                if old.is_some_and(|old| old[usize::from(x)] == *cell) {
                    continue;
                }
                if matches!(cell.glyph, Glyph::Continuation) {
                    continue;
                }
                self.emit(x, y, cell)?;
                written += 1;
            }
        }

        queue!(self.out, SetAttribute(Attribute::Reset), terminal::EndSynchronizedUpdate)?;
        self.style = None;
        self.out.flush()?;
        self.previous = Some(next.clone());
        Ok(written)
    }

    fn emit(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.out, cursor::MoveTo(x, y))?;
        }
        if self.style != Some(cell.style) {
            self.apply_style(cell.style)?;
        }
        let width = match &cell.glyph {
            Glyph::Char(c) => {
                queue!(self.out, Print(*c))?;
                unicode_width::UnicodeWidthChar::width(*c).unwrap_or(1)
            }
            Glyph::Cluster(s) => {
                queue!(self.out, Print(&**s))?;
                unicode_width::UnicodeWidthStr::width(&**s)
            }
            Glyph::Continuation => 0,
        };
        let width = u16::try_from(width).unwrap_or(1);
        self.cursor = Some((x.saturating_add(width), y));
        Ok(())
    }

    fn apply_style(&mut self, style: Style) -> io::Result<()> {
        queue!(
            self.out,
            SetAttribute(Attribute::Reset),
            SetForegroundColor(style.fg.unwrap_or(Color::Reset)),
            SetBackgroundColor(style.bg.unwrap_or(Color::Reset))
        )?;
        for (flag, attribute) in [
            (Attrs::BOLD, Attribute::Bold),
            (Attrs::DIM, Attribute::Dim),
            (Attrs::ITALIC, Attribute::Italic),
            (Attrs::UNDERLINE, Attribute::Underlined),
            (Attrs::REVERSE, Attribute::Reverse),
        ] {
            if style.attrs.contains(flag) {
                queue!(self.out, SetAttribute(attribute))?;
            }
        }
        self.style = Some(style);
        Ok(())
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        self.out.get_ref()
    }
}
