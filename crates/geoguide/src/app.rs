#![forbid(unsafe_code)]

//! Guide application model.
//!
//! [`GuideModel`] owns every piece of interactive state and wires the core
//! state machines to terminal input:
//!
//! - scroll position changes (wheel, keys, smooth-scroll ticks) are fed to
//!   the [`ScrollTracker`], whose observable drives the contents highlight;
//! - contents selections become [`ScrollTween`]s toward the section's
//!   scroll target, retargeted whenever the document reflows mid-flight;
//! - clicks and pointer motion over disclosure cells drive their
//!   [`DisclosureSet`] entries, and reveal ticks re-flow the document;
//! - pointer motion and clicks over the map drive the [`CityMap`].
//!
//! The last pointer position is remembered, and hover is re-evaluated
//! whenever the document moves under it, so scrolling by keyboard leaves
//! hover state matching what is actually under the pointer.
//!
//! Hit testing is done against the same geometry the views draw with, so
//! the model can be driven headlessly by the
//! [`ProgramSimulator`](crate::simulator::ProgramSimulator).

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use geoguide_content::{ContentError, Guide};
use geoguide_core::disclosure::{DisclosureKey, DisclosureSet};
use geoguide_core::geometry::{Rect, Span};
use geoguide_core::map::CityMap;
use geoguide_core::navigation::{NavigationPanel, ScrollBehavior, ScrollCommand, scroll_target};
use geoguide_core::observable::Subscription;
use geoguide_core::section::SectionId;
use geoguide_core::tracker::{AnchorLookup, ScrollTracker};
use geoguide_core::transition::{SCROLL_DURATION, ScrollTween};

use crate::cli::Opts;
use crate::document::{Document, LayoutParams, Target};
use crate::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use crate::frame::Buffer;
use crate::program::{Cmd, Model};
use crate::theme;
use crate::views::{ScreenLayout, body, chrome, map, nav, overlay};

/// Settings the model reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideConfig {
    /// Rows below the top of the viewport where the reference line sits.
    pub reference_offset: u32,
    /// Minimum width for the docked sidebar.
    pub sidebar_breakpoint: u16,
    /// Interval between animation ticks.
    pub tick: Duration,
    /// Section to show first.
    pub start_section: Option<String>,
    /// Whether the terminal reports mouse events.
    pub mouse: bool,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            reference_offset: 4,
            sidebar_breakpoint: 100,
            tick: Duration::from_millis(16),
            start_section: None,
            mouse: true,
        }
    }
}

impl From<&Opts> for GuideConfig {
    fn from(opts: &Opts) -> Self {
        Self {
            reference_offset: opts.reference_offset,
            sidebar_breakpoint: opts.sidebar_breakpoint,
            tick: Duration::from_millis(opts.tick_ms),
            start_section: opts.section.clone(),
            mouse: opts.mouse,
        }
    }
}

/// Messages handled by [`GuideModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum GuideMsg {
    /// Key or mouse input.
    Input(Event),
    /// Terminal resized.
    Resize { width: u16, height: u16 },
    /// Animation tick.
    Tick,
    /// Smooth-scroll to a section.
    NavigateTo(String),
    /// Show or hide the contents panel.
    ToggleNav,
    Quit,
}

impl From<Event> for GuideMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Resize { width, height } => Self::Resize { width, height },
            Event::Tick => Self::Tick,
            other => Self::Input(other),
        }
    }
}

/// Keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Disclosure cell, by document order.
    Cell(usize),
    /// Map marker, by city order.
    Marker(usize),
}

/// What lies under a screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    CityClose,
    CityCard,
    CityBackdrop,
    NavToggle,
    NavEntry(usize),
    NavPanel,
    NavBackdrop,
    Marker(usize),
    Doc(Target),
    Nothing,
}

/// A smooth scroll toward a section's anchor.
#[derive(Debug, Clone)]
struct PendingScroll {
    section: SectionId,
    tween: ScrollTween,
}

/// The geothermal guide.
pub struct GuideModel {
    guide: Guide,
    config: GuideConfig,
    cells: DisclosureSet,
    map: CityMap,
    tracker: ScrollTracker,
    nav: NavigationPanel,
    doc: Document,
    layout: ScreenLayout,
    size: (u16, u16),
    docked: Option<bool>,
    scroll: u32,
    pending: Option<PendingScroll>,
    focus: Option<Focus>,
    pointer: Option<(u16, u16)>,
    pointer_cell: Option<DisclosureKey>,
    highlight: Rc<RefCell<Option<SectionId>>>,
    _active_sub: Subscription,
}

impl std::fmt::Debug for GuideModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuideModel")
            .field("size", &self.size)
            .field("scroll", &self.scroll)
            .field("active", &self.tracker.active())
            .field("focus", &self.focus)
            .field("nav_open", &self.nav.is_open())
            .finish_non_exhaustive()
    }
}

impl GuideModel {
    /// Build the model over `guide`.
    ///
    /// # Errors
    ///
    /// Returns a [`ContentError`] if the section list or the interactive
    /// items are invalid.
    pub fn new(guide: Guide, config: GuideConfig) -> Result<Self, ContentError> {
        let registry = guide.registry()?;
        let cells = guide.disclosures()?;
        let map = guide.city_map();
        let tracker = ScrollTracker::new(registry.clone(), config.reference_offset);
        let nav = NavigationPanel::new(registry, config.reference_offset);

        let highlight = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&highlight);
        let active_sub = tracker.subscribe(move |active: &Option<SectionId>| {
            sink.borrow_mut().clone_from(active);
        });

        let mut model = Self {
            guide,
            config,
            cells,
            map,
            tracker,
            nav,
            doc: Document::default(),
            layout: ScreenLayout::compute(0, 0, 0, false),
            size: (80, 24),
            docked: None,
            scroll: 0,
            pending: None,
            focus: None,
            pointer: None,
            pointer_cell: None,
            highlight,
            _active_sub: active_sub,
        };
        model.relayout();
        Ok(model)
    }

    // -- accessors ---------------------------------------------------------

    /// Current scroll position in rows.
    #[must_use]
    pub fn scroll(&self) -> u32 {
        self.scroll
    }

    /// Section currently under the reference line.
    #[must_use]
    pub fn active_section(&self) -> Option<SectionId> {
        self.tracker.active()
    }

    /// Section the contents panel highlights.
    #[must_use]
    pub fn highlighted(&self) -> Option<SectionId> {
        self.highlight.borrow().clone()
    }

    #[must_use]
    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    #[must_use]
    pub fn nav(&self) -> &NavigationPanel {
        &self.nav
    }

    #[must_use]
    pub fn cells(&self) -> &DisclosureSet {
        &self.cells
    }

    #[must_use]
    pub fn city_map(&self) -> &CityMap {
        &self.map
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.doc
    }

    #[must_use]
    pub fn layout(&self) -> &ScreenLayout {
        &self.layout
    }

    #[must_use]
    pub fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Whether a smooth scroll is in flight.
    #[must_use]
    pub fn is_scrolling(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether anything is animating and needs ticks.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.pending.is_some() || self.cells.is_animating()
    }

    #[must_use]
    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    /// Screen position of the marker of `name`, when the map is on screen.
    #[must_use]
    pub fn marker_position(&self, name: &str) -> Option<(u16, u16)> {
        let block = self.doc.map_block()?;
        let (lx, ly) = self
            .map
            .markers(self.map_area())
            .into_iter()
            .find(|(c, _)| c.name == name)
            .map(|(_, p)| p)?;
        let row = block.top + u32::from(ly);
        let visible = row >= self.scroll && row < self.scroll + u32::from(self.layout.doc.height);
        if !visible {
            return None;
        }
        let dy = u16::try_from(row - self.scroll).ok()?;
        Some((self.layout.doc.x + crate::document::MARGIN + lx, self.layout.doc.y + dy))
    }

    /// Screen row of the header of the cell `key`, when on screen.
    #[must_use]
    pub fn cell_header_row(&self, key: &DisclosureKey) -> Option<u16> {
        let span = self.doc.cell_span(self.doc.cell_position(key)?)?;
        if span.offset < self.scroll || span.offset >= self.scroll + u32::from(self.layout.doc.height) {
            return None;
        }
        let dy = u16::try_from(span.offset - self.scroll).ok()?;
        Some(self.layout.doc.y + dy)
    }

    // -- layout and scrolling ----------------------------------------------

    fn map_area(&self) -> Rect {
        let (width, height) = body::map_size(self.layout.doc);
        Rect::from_size(width, height)
    }

    fn viewport_height(&self) -> u16 {
        self.layout.viewport_height()
    }

    fn max_scroll(&self) -> u32 {
        self.doc.max_scroll(self.viewport_height())
    }

    fn compute_layout(&self) -> ScreenLayout {
        let (width, height) = self.size;
        ScreenLayout::compute(width, height, self.config.sidebar_breakpoint, self.nav.is_open())
    }

    /// Recompute screen regions and re-flow the document.
    fn relayout(&mut self) {
        let mut layout = self.compute_layout();
        if self.docked != Some(layout.docked) {
            self.docked = Some(layout.docked);
            self.nav.set_close_on_select(!layout.docked);
            self.nav.set_open(layout.docked);
            layout = self.compute_layout();
            tracing::debug!(docked = layout.docked, "contents panel layout switched");
        }
        self.layout = layout;
        self.doc = Document::layout(
            &self.guide,
            &self.cells,
            LayoutParams {
                width: layout.doc.width,
                viewport_height: layout.viewport_height(),
                reference_offset: self.config.reference_offset,
            },
        );
        self.scroll = self.scroll.min(self.max_scroll());
        self.tracker.on_scroll(self.scroll, &self.doc);
        self.retarget_scroll();
        self.refresh_hover();
    }

    /// Jump to `position`, clamped, and report it to the tracker.
    fn scroll_to(&mut self, position: u32) {
        let position = position.min(self.max_scroll());
        if position == self.scroll {
            return;
        }
        self.scroll = position;
        self.tracker.on_scroll(self.scroll, &self.doc);
        self.refresh_hover();
    }

    /// Instant scroll by `lines`; cancels any smooth scroll.
    fn scroll_by(&mut self, lines: i64) {
        self.pending = None;
        let target = (i64::from(self.scroll) + lines).clamp(0, i64::from(u32::MAX));
        self.scroll_to(u32::try_from(target).unwrap_or(0));
    }

    fn page(&self) -> i64 {
        i64::from(self.viewport_height().saturating_sub(2).max(1))
    }

    fn start_scroll(&mut self, command: &ScrollCommand) {
        let target = command.target.min(self.max_scroll());
        match command.behavior {
            ScrollBehavior::Smooth => {
                self.pending = Some(PendingScroll {
                    section: command.section.clone(),
                    tween: ScrollTween::new(self.scroll, target, SCROLL_DURATION),
                });
            }
            ScrollBehavior::Instant => {
                self.pending = None;
                self.scroll_to(target);
            }
        }
    }

    /// Current scroll target of `section`, clamped to the document.
    fn section_target(&self, section: &SectionId) -> Option<u32> {
        let span = self.doc.anchor(section)?;
        Some(scroll_target(span, self.nav.offset()).min(self.max_scroll()))
    }

    /// Point an in-flight smooth scroll at its section's re-measured anchor.
    fn retarget_scroll(&mut self) {
        let Some(section) = self.pending.as_ref().map(|p| p.section.clone()) else {
            return;
        };
        let target = self.section_target(&section);
        if let (Some(target), Some(pending)) = (target, self.pending.as_mut())
            && target != pending.tween.target()
        {
            tracing::debug!(section = %section, target, "smooth scroll retargeted");
            pending.tween.retarget(target);
        }
    }

    /// Scroll just enough to show `span`.
    fn reveal_span(&mut self, span: Span) {
        let view = u32::from(self.viewport_height());
        if span.offset < self.scroll {
            self.pending = None;
            self.scroll_to(span.offset);
        } else if span.end() > self.scroll + view {
            self.pending = None;
            let bottom = span.end().saturating_sub(view);
            self.scroll_to(bottom.min(span.offset));
        }
    }

    // -- navigation --------------------------------------------------------

    fn navigate(&mut self, id: &str) {
        let was_open = self.nav.is_open();
        let Some(command) = self.nav.select(id, &self.doc) else {
            return;
        };
        tracing::info!(section = id, target = command.target, "navigating");
        self.start_scroll(&command);
        if was_open != self.nav.is_open() {
            self.relayout();
        }
    }

    fn step_section(&mut self, forward: bool) {
        let registry = self.nav.registry();
        let next = match self.tracker.active() {
            Some(active) if forward => registry.next_after(active.as_str()),
            Some(active) => registry.prev_before(active.as_str()).or_else(|| registry.first()),
            None => registry.first(),
        };
        if let Some(section) = next.map(|s| s.id.clone()) {
            self.navigate(section.as_str());
        }
    }

    fn toggle_nav(&mut self) {
        let open = self.nav.toggle_open();
        if open
            && let Some(active) = self.tracker.active()
        {
            self.nav.set_cursor(active.as_str());
        }
        tracing::debug!(open, "contents panel toggled");
        self.relayout();
    }

    fn nav_overlay_open(&self) -> bool {
        self.layout.nav_overlay.is_some()
    }

    // -- focus -------------------------------------------------------------

    fn focus_targets(&self) -> usize {
        self.doc.cell_count() + self.map.cities().len()
    }

    fn focus_index(&self, focus: Focus) -> usize {
        match focus {
            Focus::Cell(i) => i,
            Focus::Marker(i) => self.doc.cell_count() + i,
        }
    }

    fn focus_at(&self, index: usize) -> Option<Focus> {
        let cells = self.doc.cell_count();
        if index < cells {
            Some(Focus::Cell(index))
        } else if index < self.focus_targets() {
            Some(Focus::Marker(index - cells))
        } else {
            None
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let total = self.focus_targets();
        if total == 0 {
            return;
        }
        let next = match self.focus.map(|f| self.focus_index(f)) {
            None if forward => 0,
            None => total - 1,
            Some(i) if forward => (i + 1) % total,
            Some(i) => (i + total - 1) % total,
        };
        self.set_focus(self.focus_at(next));
    }

    /// Move focus. Focus on a hover cell or marker counts as hover.
    fn set_focus(&mut self, focus: Option<Focus>) {
        if self.focus == focus {
            return;
        }
        match self.focus {
            Some(Focus::Cell(i)) => {
                if let Some(key) = self.doc.cell_key(i).cloned()
                    && self.pointer_cell.as_ref() != Some(&key)
                {
                    self.cells.pointer_leave(&key);
                }
            }
            Some(Focus::Marker(_)) => self.map.pointer_leave(),
            None => {}
        }
        self.focus = focus;
        match focus {
            Some(Focus::Cell(i)) => {
                if let Some(key) = self.doc.cell_key(i).cloned() {
                    self.cells.pointer_enter(&key);
                }
                if let Some(span) = self.doc.cell_span(i) {
                    self.reveal_span(span);
                }
            }
            Some(Focus::Marker(i)) => {
                if let Some(name) = self.map.cities().get(i).map(|c| c.name.clone()) {
                    self.map.pointer_enter(&name);
                }
                if let Some(block) = self.doc.map_block() {
                    self.reveal_span(Span::new(block.top, u32::from(block.height)));
                }
            }
            None => {}
        }
        tracing::trace!(focus = ?self.focus, "focus moved");
    }

    fn activate_focus(&mut self) -> bool {
        match self.focus {
            Some(Focus::Cell(i)) => {
                if let Some(key) = self.doc.cell_key(i).cloned() {
                    self.toggle_cell(&key);
                }
                true
            }
            Some(Focus::Marker(i)) => {
                if let Some(name) = self.map.cities().get(i).map(|c| c.name.clone()) {
                    self.map.select(&name);
                }
                true
            }
            None => false,
        }
    }

    fn toggle_cell(&mut self, key: &DisclosureKey) {
        if self.cells.toggle(key) {
            self.relayout();
        }
    }

    // -- input -------------------------------------------------------------

    fn hit(&self, x: u16, y: u16) -> Hit {
        if self.map.selected().is_some() {
            let card = overlay::card_rect(self.layout.screen);
            return if overlay::close_rect(card).contains(x, y) {
                Hit::CityClose
            } else if card.contains(x, y) {
                Hit::CityCard
            } else {
                Hit::CityBackdrop
            };
        }
        if chrome::toggle_rect(self.layout.header).contains(x, y) {
            return Hit::NavToggle;
        }
        if let Some(panel) = self.layout.nav_rect() {
            if panel.contains(x, y) {
                let entries = self.nav.entries(self.highlight.borrow().as_ref());
                let keep = nav::pinned_row(&entries, self.nav_cursor());
                return nav::entry_at(panel, entries.len(), keep, x, y)
                    .map_or(Hit::NavPanel, Hit::NavEntry);
            }
            if self.nav_overlay_open() {
                return Hit::NavBackdrop;
            }
        }
        let doc = self.layout.doc;
        if let Some((lx, ly)) = body::map_local(doc, &self.doc, self.scroll, x, y) {
            return self
                .map
                .hit_test(self.map_area(), lx, ly)
                .and_then(|city| self.map.cities().iter().position(|c| c.name == city.name))
                .map_or(Hit::Nothing, Hit::Marker);
        }
        if doc.contains(x, y)
            && let Some(target) = body::doc_row(doc, self.scroll, y).and_then(|row| self.doc.target_at(row))
        {
            return Hit::Doc(target);
        }
        Hit::Nothing
    }

    fn nav_cursor(&self) -> Option<usize> {
        self.nav_overlay_open().then(|| self.nav.cursor())
    }

    fn on_pointer_move(&mut self, x: u16, y: u16) {
        self.pointer = Some((x, y));
        self.update_hover(x, y);
    }

    /// Re-run hover for the remembered pointer after the document moved.
    fn refresh_hover(&mut self) {
        if let Some((x, y)) = self.pointer {
            self.update_hover(x, y);
        }
    }

    fn update_hover(&mut self, x: u16, y: u16) {
        let hit = self.hit(x, y);
        let cell = match hit {
            Hit::Doc(Target::Cell(i)) => self.doc.cell_key(i).cloned(),
            _ => None,
        };
        if cell != self.pointer_cell {
            let focused = match self.focus {
                Some(Focus::Cell(i)) => self.doc.cell_key(i).cloned(),
                _ => None,
            };
            if let Some(old) = self.pointer_cell.take()
                && focused.as_ref() != Some(&old)
            {
                self.cells.pointer_leave(&old);
            }
            if let Some(new) = &cell {
                self.cells.pointer_enter(new);
            }
            self.pointer_cell = cell;
        }

        match hit {
            Hit::Marker(i) => {
                if let Some(name) = self.map.cities().get(i).map(|c| c.name.clone()) {
                    self.map.pointer_enter(&name);
                }
            }
            _ if self.map.hovered().is_some() && !matches!(self.focus, Some(Focus::Marker(_))) => {
                self.map.pointer_leave();
            }
            _ => {}
        }
    }

    fn on_click(&mut self, x: u16, y: u16) -> Cmd<GuideMsg> {
        match self.hit(x, y) {
            Hit::CityClose | Hit::CityBackdrop => {
                self.map.dismiss();
            }
            Hit::CityCard | Hit::NavPanel | Hit::Nothing => {}
            Hit::NavToggle => return Cmd::msg(GuideMsg::ToggleNav),
            Hit::NavEntry(index) => {
                if let Some(id) = self.nav.registry().as_slice().get(index).map(|s| s.id.to_string()) {
                    return Cmd::msg(GuideMsg::NavigateTo(id));
                }
            }
            Hit::NavBackdrop => {
                self.nav.set_open(false);
                self.relayout();
            }
            Hit::Marker(index) => {
                if let Some(name) = self.map.cities().get(index).map(|c| c.name.clone()) {
                    self.map.select(&name);
                }
            }
            Hit::Doc(Target::Cell(index)) => {
                if let Some(key) = self.doc.cell_key(index).cloned() {
                    self.toggle_cell(&key);
                }
            }
            Hit::Doc(Target::HeroAction) => {
                return Cmd::msg(GuideMsg::NavigateTo(self.guide.hero.target.clone()));
            }
        }
        Cmd::none()
    }

    fn on_key(&mut self, key: KeyEvent) -> Cmd<GuideMsg> {
        if key.kind == KeyEventKind::Release {
            return Cmd::none();
        }
        if key.ctrl() && key.code == KeyCode::Char('c') {
            return Cmd::msg(GuideMsg::Quit);
        }
        if self.map.selected().is_some() {
            if matches!(key.code, KeyCode::Escape | KeyCode::Enter) || key.is_char('q') {
                self.map.dismiss();
            }
            return Cmd::none();
        }
        let overlay = self.nav_overlay_open();
        match key.code {
            KeyCode::Char('q') if key.is_char('q') => return Cmd::msg(GuideMsg::Quit),
            KeyCode::Char('t') if key.is_char('t') => return Cmd::msg(GuideMsg::ToggleNav),
            KeyCode::Char('m') if key.is_char('m') => {
                self.config.mouse = !self.config.mouse;
                tracing::debug!(enabled = self.config.mouse, "mouse capture toggled");
                return Cmd::SetMouseCapture(self.config.mouse);
            }
            KeyCode::Char(']') => self.step_section(true),
            KeyCode::Char('[') => self.step_section(false),
            KeyCode::Escape => {
                if overlay {
                    self.nav.set_open(false);
                    self.relayout();
                } else {
                    self.set_focus(None);
                }
            }
            KeyCode::Up if overlay => self.nav.cursor_up(),
            KeyCode::Down if overlay => self.nav.cursor_down(),
            KeyCode::Enter if overlay => {
                if let Some(id) = self.nav.cursor_id().map(ToString::to_string) {
                    return Cmd::msg(GuideMsg::NavigateTo(id));
                }
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-self.page()),
            KeyCode::PageDown => self.scroll_by(self.page()),
            KeyCode::Home => self.scroll_by(-i64::from(self.scroll)),
            KeyCode::End => self.scroll_by(i64::from(self.max_scroll())),
            KeyCode::Tab => self.cycle_focus(true),
            KeyCode::BackTab => self.cycle_focus(false),
            KeyCode::Enter => {
                self.activate_focus();
            }
            KeyCode::Char(' ') => {
                if !self.activate_focus() {
                    self.scroll_by(self.page());
                }
            }
            _ => {}
        }
        Cmd::none()
    }

    fn on_input(&mut self, event: Event) -> Cmd<GuideMsg> {
        match event {
            Event::Key(key) => self.on_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    self.on_pointer_move(mouse.x, mouse.y);
                    Cmd::none()
                }
                MouseEventKind::Down(MouseButton::Left) => self.on_click(mouse.x, mouse.y),
                MouseEventKind::ScrollDown => self.on_wheel(1, mouse.x, mouse.y),
                MouseEventKind::ScrollUp => self.on_wheel(-1, mouse.x, mouse.y),
                _ => Cmd::none(),
            },
            Event::Wheel { lines, x, y } => self.on_wheel(lines, x, y),
            Event::Focus(false) => {
                self.pointer = None;
                if let Some(key) = self.pointer_cell.take() {
                    self.cells.pointer_leave(&key);
                }
                if !matches!(self.focus, Some(Focus::Marker(_))) {
                    self.map.pointer_leave();
                }
                Cmd::none()
            }
            _ => Cmd::none(),
        }
    }

    fn on_wheel(&mut self, lines: i32, x: u16, y: u16) -> Cmd<GuideMsg> {
        if self.map.selected().is_some() {
            return Cmd::none();
        }
        if self.layout.nav_rect().is_some_and(|panel| panel.contains(x, y)) {
            return Cmd::none();
        }
        self.pointer = Some((x, y));
        self.scroll_by(i64::from(lines));
        self.update_hover(x, y);
        Cmd::none()
    }

    fn on_tick(&mut self) {
        let dt = self.config.tick;
        if self.cells.is_animating() {
            self.cells.tick(dt);
            self.relayout();
        }
        let Some(pending) = &mut self.pending else {
            return;
        };
        let position = pending.tween.tick(dt);
        let done = pending.tween.is_complete();
        self.scroll_to(position);
        if done {
            self.pending = None;
            tracing::debug!(scroll = self.scroll, "smooth scroll finished");
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        tracing::debug!(width, height, "resize");
        self.size = (width, height);
        self.relayout();
    }
}

impl Model for GuideModel {
    type Message = GuideMsg;

    fn init(&mut self) -> Cmd<Self::Message> {
        let active = self.tracker.mount(self.scroll, &self.doc);
        tracing::info!(
            sections = self.nav.registry().len(),
            cells = self.cells.len(),
            cities = self.map.cities().len(),
            active = ?active,
            "guide started"
        );
        if let Some(id) = self.config.start_section.clone() {
            match self.nav.select(&id, &self.doc) {
                Some(command) => {
                    self.start_scroll(&command.instant());
                    if self.nav.closes_on_select() {
                        self.relayout();
                    }
                }
                None => tracing::warn!(section = %id, "unknown start section"),
            }
        }
        Cmd::tick(self.config.tick)
    }

    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
        match msg {
            GuideMsg::Input(event) => return self.on_input(event),
            GuideMsg::Resize { width, height } => self.resize(width, height),
            GuideMsg::Tick => self.on_tick(),
            GuideMsg::NavigateTo(id) => self.navigate(&id),
            GuideMsg::ToggleNav => self.toggle_nav(),
            GuideMsg::Quit => return Cmd::quit(),
        }
        Cmd::none()
    }

    fn view(&self, frame: &mut Buffer) {
        let layout = &self.layout;
        frame.fill(frame.area(), theme::base());

        let focused_cell = match self.focus {
            Some(Focus::Cell(i)) => Some(i),
            _ => None,
        };
        body::draw_body(frame, layout.doc, &self.doc, self.scroll, focused_cell);
        if self.doc.map_block().is_some() {
            let (width, height) = body::map_size(layout.doc);
            let mut canvas = Buffer::new(width, height);
            let focused_marker = match self.focus {
                Some(Focus::Marker(i)) => Some(i),
                _ => None,
            };
            map::draw_map(&mut canvas, &self.map, focused_marker);
            body::blit_map(frame, layout.doc, &self.doc, self.scroll, &canvas);
        }
        body::draw_scrollbar(frame, layout.scrollbar, self.scroll, self.doc.height());

        let highlight = self.highlight.borrow();
        let section = highlight
            .as_ref()
            .and_then(|id| self.nav.registry().get(id.as_str()));
        chrome::draw_header(frame, layout.header, &self.guide.hero.title, section, self.nav.is_open());
        chrome::draw_footer(frame, layout.footer, self.scroll, self.max_scroll());

        if let Some(panel) = layout.nav_rect() {
            let entries = self.nav.entries(highlight.as_ref());
            nav::draw_nav(frame, panel, &entries, self.nav_cursor());
        }
        if let Some(city) = self.map.selected() {
            overlay::draw_city_card(frame, layout.screen, city);
        }
    }

    fn wants_tick(&self) -> bool {
        self.is_animating()
    }

    fn on_shutdown(&mut self) {
        self.tracker.teardown();
        tracing::info!(passes = self.tracker.passes(), "guide stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Modifiers, MouseEvent};
    use geoguide_core::disclosure::DisclosureMode;

    fn model(width: u16, height: u16) -> GuideModel {
        let guide = Guide::load().unwrap();
        let mut model = GuideModel::new(guide, GuideConfig::default()).unwrap();
        model.update(GuideMsg::Resize { width, height });
        model.init();
        model
    }

    fn key(code: KeyCode) -> GuideMsg {
        GuideMsg::Input(Event::Key(KeyEvent::new(code)))
    }

    #[test]
    fn layout_mode_follows_width() {
        let wide = model(120, 40);
        assert!(wide.nav().is_open());
        assert!(wide.layout().sidebar.is_some());
        assert!(!wide.nav().closes_on_select());

        let narrow = model(80, 24);
        assert!(!narrow.nav().is_open());
        assert!(narrow.nav().closes_on_select());
    }

    #[test]
    fn mount_activates_first_section_once_reached() {
        let mut m = model(120, 40);
        let first = m.nav().registry().first().unwrap().id.clone();
        let span = m.document().anchors()[&first];
        assert_eq!(m.active_section(), None);
        m.scroll_by(i64::from(span.offset));
        assert_eq!(m.active_section(), Some(first.clone()));
        assert_eq!(m.highlighted(), Some(first));
    }

    #[test]
    fn scroll_is_clamped() {
        let mut m = model(120, 40);
        m.update(key(KeyCode::End));
        let max = m.scroll();
        assert!(max > 0);
        m.update(key(KeyCode::Down));
        assert_eq!(m.scroll(), max);
        m.update(key(KeyCode::Home));
        assert_eq!(m.scroll(), 0);
        m.update(key(KeyCode::Up));
        assert_eq!(m.scroll(), 0);
    }

    #[test]
    fn ctrl_c_and_q_quit() {
        let mut m = model(80, 24);
        let cmd = m.update(GuideMsg::Input(Event::Key(
            KeyEvent::new(KeyCode::Char('c')).with_modifiers(Modifiers::CTRL),
        )));
        assert!(matches!(cmd, Cmd::Msg(GuideMsg::Quit)));
        assert!(matches!(m.update(key(KeyCode::Char('q'))), Cmd::Msg(GuideMsg::Quit)));
        assert!(matches!(m.update(GuideMsg::Quit), Cmd::Quit));
    }

    #[test]
    fn tab_focus_on_hover_cell_counts_as_hover() {
        let mut m = model(120, 40);
        let hover = (0..m.document().cell_count())
            .find(|&i| {
                let key = m.document().cell_key(i).unwrap();
                m.cells().get(key).unwrap().mode() == DisclosureMode::Hover
            })
            .unwrap();
        for _ in 0..=hover {
            m.update(key(KeyCode::Tab));
        }
        assert_eq!(m.focus(), Some(Focus::Cell(hover)));
        let key_id = m.document().cell_key(hover).unwrap().clone();
        assert!(m.cells().get(&key_id).unwrap().is_open());

        m.update(key(KeyCode::Escape));
        assert_eq!(m.focus(), None);
        assert!(!m.cells().get(&key_id).unwrap().is_open());
    }

    #[test]
    fn backtab_wraps_to_last_marker() {
        let mut m = model(120, 40);
        m.update(key(KeyCode::BackTab));
        let last = m.city_map().cities().len() - 1;
        assert_eq!(m.focus(), Some(Focus::Marker(last)));
        let name = m.city_map().cities()[last].name.clone();
        assert_eq!(m.city_map().hovered(), Some(name.as_str()));
        m.update(key(KeyCode::Enter));
        assert_eq!(m.city_map().selected().map(|c| c.name.as_str()), Some(name.as_str()));
        m.update(key(KeyCode::Escape));
        assert!(m.city_map().selected().is_none());
    }

    #[test]
    fn wheel_over_sidebar_does_not_scroll() {
        let mut m = model(120, 40);
        let panel = m.layout().sidebar.unwrap();
        m.update(GuideMsg::Input(Event::Wheel {
            lines: 5,
            x: panel.x + 2,
            y: panel.y + 2,
        }));
        assert_eq!(m.scroll(), 0);
        m.update(GuideMsg::Input(Event::Wheel { lines: 5, x: 3, y: 3 }));
        assert_eq!(m.scroll(), 5);
        m.update(GuideMsg::Input(Event::Mouse(MouseEvent::new(MouseEventKind::ScrollUp, 3, 3))));
        assert_eq!(m.scroll(), 4);
    }

    #[test]
    fn ticks_are_wanted_only_while_animating() {
        let mut m = model(120, 40);
        assert!(!m.wants_tick());
        m.update(GuideMsg::NavigateTo("costs".into()));
        assert!(m.wants_tick());
        for _ in 0..40 {
            m.update(GuideMsg::Tick);
        }
        assert!(!m.wants_tick());

        m.update(key(KeyCode::Tab));
        m.update(key(KeyCode::Enter));
        assert!(m.wants_tick());
    }

    #[test]
    fn start_section_jumps_without_animating() {
        let guide = Guide::load().unwrap();
        let config = GuideConfig {
            start_section: Some("costs".into()),
            ..GuideConfig::default()
        };
        let mut m = GuideModel::new(guide, config).unwrap();
        m.update(GuideMsg::Resize { width: 120, height: 40 });
        m.init();
        assert!(!m.is_scrolling());
        assert_eq!(m.active_section(), Some(SectionId::new("costs")));
    }

    #[test]
    fn m_toggles_mouse_capture() {
        let mut m = model(80, 24);
        assert!(matches!(m.update(key(KeyCode::Char('m'))), Cmd::SetMouseCapture(false)));
        assert!(matches!(m.update(key(KeyCode::Char('m'))), Cmd::SetMouseCapture(true)));
    }

    #[test]
    fn shutdown_tears_down_tracker() {
        let mut m = model(80, 24);
        assert_eq!(m.active_section(), None);
        m.on_shutdown();
        m.update(key(KeyCode::PageDown));
        m.update(key(KeyCode::PageDown));
        assert!(m.scroll() > 0);
        assert_eq!(m.active_section(), None);
        assert_eq!(
            m.tracker().phase(),
            geoguide_core::tracker::TrackerPhase::TornDown
        );
    }
}
