#![forbid(unsafe_code)]

//! Document layout.
//!
//! [`Document::layout`] flows the guide into a column of styled rows at a
//! given width. Rows are the document's unit of length: scroll positions,
//! anchor spans, and the tracker's reference offset are all counted in rows.
//!
//! Each section contributes one contiguous anchor span, from its rule line to
//! the row before the next section, so the spans tile the document below the
//! hero. Disclosure cells contribute a header, an always-visible summary, an
//! affordance row, and a detail region whose height follows the cell's
//! reveal transition. The layout therefore has to be rebuilt whenever a cell
//! animates or the width changes; it is cheap enough to do per frame.
//!
//! Blank rows are appended after the last section so that every anchor can
//! be scrolled up to the reference line.

use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use geoguide_content::{ContentItem, Guide, GroupMode, SectionContent, disclosure_key};
use geoguide_core::disclosure::{DisclosureCell, DisclosureKey, DisclosureMode, DisclosureSet};
use geoguide_core::geometry::Span;
use geoguide_core::section::SectionId;
use geoguide_core::tracker::AnchorLookup;

use crate::frame::{Attrs, Style};
use crate::theme;

/// Rows reserved for the world map.
pub const MAP_HEIGHT: u16 = 18;

/// Columns left blank on each side of the text.
pub const MARGIN: u16 = 2;

/// A run of uniformly styled text.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
}

impl Segment {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// What a click on a row acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The disclosure cell with this index in [`Document::cell_key`] order.
    Cell(usize),
    /// The hero's call to action.
    HeroAction,
}

/// One laid-out row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    /// Columns from the left edge of the document area.
    pub indent: u16,
    pub segments: Vec<Segment>,
    pub target: Option<Target>,
}

impl Line {
    fn blank() -> Self {
        Self::default()
    }

    fn text(indent: u16, text: impl Into<String>, style: Style) -> Self {
        Self {
            indent,
            segments: vec![Segment::new(text, style)],
            target: None,
        }
    }

    fn targeting(mut self, target: Option<Target>) -> Self {
        self.target = target;
        self
    }

    /// Concatenated text of the row.
    #[must_use]
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Rows reserved for the map inside the map section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBlock {
    pub top: u32,
    pub height: u16,
}

/// Layout inputs besides the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutParams {
    /// Width of the document area in columns.
    pub width: u16,
    /// Height of the document viewport in rows.
    pub viewport_height: u16,
    /// Reference offset shared by the tracker and navigation.
    pub reference_offset: u32,
}

/// The guide flowed into rows.
#[derive(Debug, Clone, Default)]
pub struct Document {
    width: u16,
    lines: Vec<Line>,
    anchors: HashMap<SectionId, Span>,
    cells: Vec<DisclosureKey>,
    cell_index: HashMap<DisclosureKey, usize>,
    cell_spans: Vec<Span>,
    map: Option<MapBlock>,
    content_height: u32,
}

impl AnchorLookup for Document {
    fn anchor(&self, id: &SectionId) -> Option<Span> {
        self.anchors.get(id).copied()
    }
}

impl Document {
    /// Lay out `guide` with the current state of `cells`.
    #[must_use]
    pub fn layout(guide: &Guide, cells: &DisclosureSet, params: LayoutParams) -> Self {
        let mut builder = Builder {
            width: params.width.saturating_sub(MARGIN * 2).max(8),
            doc: Document {
                width: params.width,
                ..Document::default()
            },
        };
        builder.hero(guide);
        for section in &guide.sections {
            let top = builder.row();
            builder.section(guide, section, cells);
            let span = Span::new(top, builder.row() - top);
            builder.doc.anchors.insert(SectionId::new(&section.id), span);
        }

        let mut doc = builder.doc;
        doc.content_height = doc.height();
        let last_top = guide
            .sections
            .last()
            .and_then(|s| doc.anchors.get(s.id.as_str()))
            .map_or(0, |span| span.offset);
        let needed = last_top
            .saturating_sub(params.reference_offset)
            .saturating_add(u32::from(params.viewport_height));
        while doc.height() < needed {
            doc.lines.push(Line::blank());
        }
        doc
    }

    /// Width the document was laid out for.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Total rows including bottom padding.
    #[must_use]
    pub fn height(&self) -> u32 {
        u32::try_from(self.lines.len()).unwrap_or(u32::MAX)
    }

    /// Rows of actual content, excluding bottom padding.
    #[must_use]
    pub fn content_height(&self) -> u32 {
        self.content_height
    }

    /// Largest useful scroll position for a viewport of `viewport_height`.
    #[must_use]
    pub fn max_scroll(&self, viewport_height: u16) -> u32 {
        self.height().saturating_sub(u32::from(viewport_height))
    }

    #[must_use]
    pub fn line(&self, row: u32) -> Option<&Line> {
        self.lines.get(usize::try_from(row).ok()?)
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Click target of `row`.
    #[must_use]
    pub fn target_at(&self, row: u32) -> Option<Target> {
        self.line(row).and_then(|l| l.target)
    }

    /// Key of the cell with index `index`.
    #[must_use]
    pub fn cell_key(&self, index: usize) -> Option<&DisclosureKey> {
        self.cells.get(index)
    }

    /// Index of the cell with `key`.
    #[must_use]
    pub fn cell_position(&self, key: &DisclosureKey) -> Option<usize> {
        self.cell_index.get(key).copied()
    }

    /// Number of disclosure cells laid out.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Rows occupied by cell `index`, header to detail.
    #[must_use]
    pub fn cell_span(&self, index: usize) -> Option<Span> {
        self.cell_spans.get(index).copied()
    }

    /// Where the map sits, if the guide has a map section.
    #[must_use]
    pub fn map_block(&self) -> Option<MapBlock> {
        self.map
    }

    /// Anchor spans of every section.
    #[must_use]
    pub fn anchors(&self) -> &HashMap<SectionId, Span> {
        &self.anchors
    }
}

struct Builder {
    /// Wrap width, margins excluded.
    width: u16,
    doc: Document,
}

impl Builder {
    fn row(&self) -> u32 {
        self.doc.height()
    }

    fn push(&mut self, line: Line) {
        self.doc.lines.push(line);
    }

    fn blank(&mut self) {
        self.push(Line::blank());
    }

    fn wrapped(&mut self, indent: u16, text: &str, style: Style, target: Option<Target>) {
        let width = self.width.saturating_sub(indent).max(4);
        for row in wrap(text, width) {
            self.push(Line::text(MARGIN + indent, row, style).targeting(target));
        }
    }

    /// First row prefixed with `bullet`, continuation rows aligned after it.
    fn bulleted(&mut self, indent: u16, bullet: &str, text: &str, style: Style, target: Option<Target>) {
        let hang = u16::try_from(bullet.width()).unwrap_or(2);
        let width = self.width.saturating_sub(indent + hang).max(4);
        for (i, row) in wrap(text, width).into_iter().enumerate() {
            let line = if i == 0 {
                Line {
                    indent: MARGIN + indent,
                    segments: vec![
                        Segment::new(bullet, style.fg(theme::ACCENT)),
                        Segment::new(row, style),
                    ],
                    target,
                }
            } else {
                Line::text(MARGIN + indent + hang, row, style).targeting(target)
            };
            self.push(line);
        }
    }

    fn hero(&mut self, guide: &Guide) {
        let hero = &guide.hero;
        self.blank();
        self.wrapped(0, &hero.title.to_uppercase(), theme::section_number(), None);
        self.wrapped(0, &hero.subtitle, theme::heading(), None);
        self.blank();
        self.wrapped(0, &hero.tagline, theme::muted().italic(), None);
        self.blank();
        self.push(
            Line::text(
                MARGIN,
                format!("[ {} ↓ ]", hero.call_to_action),
                theme::affordance().bold(),
            )
            .targeting(Some(Target::HeroAction)),
        );
        self.blank();
    }

    fn section(&mut self, guide: &Guide, section: &SectionContent, cells: &DisclosureSet) {
        let rule = "─".repeat(usize::from(self.width));
        self.push(Line::text(MARGIN, rule, theme::muted()));
        self.push(Line {
            indent: MARGIN,
            segments: vec![
                Segment::new(format!("{}  ", section.number), theme::section_number()),
                Segment::new(section.label.to_uppercase(), theme::muted().bold()),
            ],
            target: None,
        });
        self.blank();
        self.wrapped(0, &section.heading, theme::heading(), None);
        if let Some(lead) = &section.lead {
            self.wrapped(0, lead, theme::muted().italic(), None);
        }
        self.blank();

        if !section.questions.is_empty() {
            self.push(Line::text(MARGIN, "Key questions", theme::muted().bold()));
            for q in &section.questions {
                self.bulleted(2, "? ", q, theme::muted(), None);
            }
            self.blank();
        }

        for paragraph in &section.paragraphs {
            self.wrapped(0, paragraph, Style::new(), None);
            self.blank();
        }

        if section.id == guide.map.section {
            self.wrapped(0, &guide.map.hint, theme::muted().italic(), None);
            self.blank();
            let top = self.row();
            for _ in 0..MAP_HEIGHT {
                self.blank();
            }
            self.doc.map = Some(MapBlock {
                top,
                height: MAP_HEIGHT,
            });
            self.blank();
            self.wrapped(0, &guide.map.footer, theme::muted(), None);
            self.blank();
        }

        for group in &section.groups {
            if let Some(title) = &group.title {
                self.push(Line::text(MARGIN, title.clone(), theme::heading().attrs(Attrs::UNDERLINE)));
                self.blank();
            }
            for item in &group.items {
                match group.mode {
                    GroupMode::Static => self.static_item(item),
                    GroupMode::Click | GroupMode::Hover => {
                        let key = disclosure_key(&section.id, &group.id, &item.id);
                        if let Some(cell) = cells.get(&key) {
                            self.cell(key, cell, item);
                        } else {
                            self.static_item(item);
                        }
                    }
                }
            }
        }

        for paragraph in &section.closing {
            self.wrapped(0, paragraph, theme::muted(), None);
            self.blank();
        }
    }

    fn static_item(&mut self, item: &ContentItem) {
        let tone = item.color.as_deref().map_or(theme::ACCENT, theme::tone);
        self.bulleted(0, "■ ", &item.title, theme::heading().fg(tone), None);
        if let Some(description) = &item.description {
            self.wrapped(2, description, Style::new(), None);
        }
        for line in detail_lines(item) {
            self.detail_line(&line, Style::new(), None);
        }
        self.blank();
    }

    fn cell(&mut self, key: DisclosureKey, cell: &DisclosureCell, item: &ContentItem) {
        let index = self.doc.cells.len();
        let target = Some(Target::Cell(index));
        let top = self.row();
        let open = cell.is_open();
        let tone = item.color.as_deref().map_or(theme::ACCENT, theme::tone);

        let marker = match (cell.mode(), open) {
            (DisclosureMode::Click, false) => "▸ ",
            (DisclosureMode::Click, true) => "▾ ",
            (DisclosureMode::Hover, false) => "◇ ",
            (DisclosureMode::Hover, true) => "◆ ",
        };
        let mut header = Line {
            indent: MARGIN,
            segments: vec![
                Segment::new(marker, Style::new().fg(tone)),
                Segment::new(item.title.clone(), theme::heading().fg(tone)),
            ],
            target,
        };
        if let Some(badge) = &item.badge {
            header
                .segments
                .push(Segment::new(format!("  [{badge}]"), theme::muted()));
        }
        self.push(header);
        if let Some(description) = &item.description {
            self.wrapped(2, description, theme::muted(), target);
        }

        let label = cell.affordance_label();
        if !label.is_empty() {
            self.push(Line::text(MARGIN + 2, label.to_owned(), theme::affordance()).targeting(target));
        }

        let detail = detail_lines(item);
        let mut rows = Vec::new();
        for line in &detail {
            let hang = if line.bullet.is_empty() { 0 } else { 2 };
            let width = self.width.saturating_sub(2 + hang).max(4);
            let wrapped = wrap(&line.text, width);
            for (i, text) in wrapped.into_iter().enumerate() {
                let bullet = if i == 0 { line.bullet } else { "" };
                rows.push((bullet, hang, text));
            }
        }
        let full = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        let shown = usize::from(cell.detail_height(full));
        let style = theme::fade(Style::new(), cell.detail_opacity());
        for (bullet, hang, text) in rows.into_iter().take(shown) {
            let indent = if bullet.is_empty() { MARGIN + 2 + hang } else { MARGIN + 2 };
            let mut segments = Vec::with_capacity(2);
            if !bullet.is_empty() {
                segments.push(Segment::new(bullet, style.fg(tone)));
            }
            segments.push(Segment::new(text, style));
            self.push(Line {
                indent,
                segments,
                target,
            });
        }
        self.blank();

        self.doc.cell_spans.push(Span::new(top, self.row() - top - 1));
        self.doc.cell_index.insert(key.clone(), index);
        self.doc.cells.push(key);
    }

    fn detail_line(&mut self, line: &DetailLine, style: Style, target: Option<Target>) {
        if line.bullet.is_empty() {
            self.wrapped(2, &line.text, style, target);
        } else {
            self.bulleted(2, line.bullet, &line.text, style, target);
        }
    }
}

/// One logical row of an item's detail before wrapping.
struct DetailLine {
    bullet: &'static str,
    text: String,
}

fn detail_lines(item: &ContentItem) -> Vec<DetailLine> {
    let mut out = Vec::new();
    if let Some(note) = &item.note {
        for paragraph in note.split('\n').filter(|p| !p.trim().is_empty()) {
            out.push(DetailLine {
                bullet: "",
                text: paragraph.trim().to_owned(),
            });
        }
    }
    for (bullet, list) in [("• ", &item.details), ("+ ", &item.pros), ("− ", &item.cons)] {
        out.extend(list.iter().map(|text| DetailLine {
            bullet,
            text: text.clone(),
        }));
    }
    if let Some(image) = &item.image {
        out.push(DetailLine {
            bullet: "",
            text: format!("[figure: {image}]"),
        });
    }
    out
}

/// Greedy word wrap to `width` columns.
///
/// Runs of whitespace collapse to one space. Words wider than `width` are
/// split between graphemes. Empty input yields no rows.
#[must_use]
pub fn wrap(text: &str, width: u16) -> Vec<String> {
    let width = usize::from(width.max(1));
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for word in text.split_whitespace() {
        let word_width = word.width();
        let gap = usize::from(current_width > 0);
        if current_width + gap + word_width <= width {
            if gap == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += gap + word_width;
            continue;
        }
        if current_width > 0 {
            rows.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }
        for grapheme in word.graphemes(true) {
            let g = grapheme.width();
            if current_width + g > width && current_width > 0 {
                rows.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push_str(grapheme);
            current_width += g;
        }
    }
    if current_width > 0 {
        rows.push(current);
    }
    rows
}
