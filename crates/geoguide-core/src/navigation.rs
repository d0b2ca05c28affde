#![forbid(unsafe_code)]

//! The navigation panel (table of contents).
//!
//! The panel renders the shared [`SectionRegistry`] as a list of entries,
//! marks the entry equal to the tracker's active section, and turns a
//! selection into a [`ScrollCommand`]. It never writes the active section
//! itself: the highlight moves only when the resulting scroll reaches the
//! tracker.
//!
//! The scroll target for section `X` is `anchor(X).offset - offset`, where
//! `offset` is the same value the tracker adds to the scroll position. At
//! the target the tracker's reference line therefore lands exactly on the
//! section's top edge, so selecting an entry and then recomputing yields
//! that entry again.

use crate::geometry::Span;
use crate::section::{SectionId, SectionRegistry};
use crate::tracker::AnchorLookup;

/// One rendered table-of-contents row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Section id the row navigates to.
    pub id: SectionId,
    /// Chapter number, e.g. `"2.1"`.
    pub number: String,
    /// Section label.
    pub label: String,
    /// Whether this row matches the active section.
    pub active: bool,
}

/// How the document should move to a scroll target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Animate through intermediate positions.
    #[default]
    Smooth,
    /// Jump straight to the target.
    Instant,
}

/// A request to scroll the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollCommand {
    /// Section being navigated to.
    pub section: SectionId,
    /// Scroll offset to reach.
    pub target: u32,
    /// Animation behavior.
    pub behavior: ScrollBehavior,
}

impl ScrollCommand {
    /// The same command, jumping instead of animating.
    #[must_use]
    pub fn instant(self) -> Self {
        Self {
            behavior: ScrollBehavior::Instant,
            ..self
        }
    }
}

/// Scroll offset that puts `span`'s top edge on the reference line.
#[inline]
#[must_use]
pub const fn scroll_target(span: Span, offset: u32) -> u32 {
    span.offset.saturating_sub(offset)
}

/// Table-of-contents state: open flag, keyboard cursor, and selection.
#[derive(Debug, Clone)]
pub struct NavigationPanel {
    registry: SectionRegistry,
    offset: u32,
    open: bool,
    close_on_select: bool,
    cursor: usize,
}

impl NavigationPanel {
    /// A panel over `registry` using `offset` for scroll targets.
    ///
    /// The panel starts open.
    #[must_use]
    pub fn new(registry: SectionRegistry, offset: u32) -> Self {
        Self {
            registry,
            offset,
            open: true,
            close_on_select: false,
            cursor: 0,
        }
    }

    /// Rows in registry order, with `active` marking at most one of them.
    #[must_use]
    pub fn entries(&self, active: Option<&SectionId>) -> Vec<NavEntry> {
        self.registry
            .iter()
            .map(|section| NavEntry {
                id: section.id.clone(),
                number: section.number.clone(),
                label: section.label.clone(),
                active: active == Some(&section.id),
            })
            .collect()
    }

    /// Turn a selection into a smooth scroll command.
    ///
    /// Returns `None` when `id` is not registered or its anchor is not part
    /// of the rendered document. When the panel closes on select (overlay
    /// layout) a successful selection also closes it.
    pub fn select<L: AnchorLookup + ?Sized>(
        &mut self,
        id: &str,
        lookup: &L,
    ) -> Option<ScrollCommand> {
        let Some(position) = self.registry.position(id) else {
            crate::debug!(section = id, "navigation to unregistered section ignored");
            return None;
        };
        let section = &self.registry.as_slice()[position];
        let Some(span) = lookup.anchor(&section.id) else {
            crate::debug!(section = id, "navigation to unmounted anchor ignored");
            return None;
        };
        let command = ScrollCommand {
            section: section.id.clone(),
            target: scroll_target(span, self.offset),
            behavior: ScrollBehavior::Smooth,
        };
        self.cursor = position;
        if self.close_on_select {
            self.open = false;
        }
        crate::debug!(section = id, target = command.target, "navigation selected");
        Some(command)
    }

    /// Select the entry under the keyboard cursor.
    pub fn select_cursor<L: AnchorLookup + ?Sized>(&mut self, lookup: &L) -> Option<ScrollCommand> {
        let id = self.cursor_id()?.clone();
        self.select(id.as_str(), lookup)
    }

    /// Whether the panel is visible.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Show or hide the panel.
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Flip visibility. Returns the new state.
    pub fn toggle_open(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the panel after each successful selection (overlay layout).
    pub fn set_close_on_select(&mut self, close: bool) {
        self.close_on_select = close;
    }

    /// Whether selections close the panel.
    #[must_use]
    pub fn closes_on_select(&self) -> bool {
        self.close_on_select
    }

    /// Move the keyboard cursor down one row, stopping at the last.
    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.registry.len() {
            self.cursor += 1;
        }
    }

    /// Move the keyboard cursor up one row, stopping at the first.
    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Place the cursor on `id`. Unknown ids leave it unchanged.
    pub fn set_cursor(&mut self, id: &str) {
        if let Some(position) = self.registry.position(id) {
            self.cursor = position;
        }
    }

    /// Row index of the keyboard cursor.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Section id under the keyboard cursor.
    #[must_use]
    pub fn cursor_id(&self) -> Option<&SectionId> {
        self.registry.as_slice().get(self.cursor).map(|s| &s.id)
    }

    /// Offset subtracted from anchor tops.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The registry this panel renders.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }
}
