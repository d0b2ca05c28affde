#![forbid(unsafe_code)]

//! Disclosure cells: expandable cards, accordion rows, and hover panels.
//!
//! Every expandable unit in the guide is one [`DisclosureCell`], a small
//! state machine with a persistent `expanded` flag (click mode) or a
//! transient `hovered` flag (hover mode) and a [`Reveal`] that animates the
//! detail region. Cells are stored in a [`DisclosureSet`] keyed by
//! [`DisclosureKey`]; the set refuses duplicate keys, so two unrelated cells
//! can never alias the same state.
//!
//! # Invariants
//!
//! 1. `toggle(toggle(s)) == s` for click cells.
//! 2. Operations addressed to one key never touch another key's cell.
//! 3. The governing flag is `expanded` for click cells and `hovered` for
//!    hover cells; the other flag never opens the detail region.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::section::SectionId;
use crate::transition::{REVEAL_DURATION, Reveal};

/// How a cell is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisclosureMode {
    /// Click flips a persistent expanded flag.
    Click,
    /// The detail region is visible while the pointer is over the cell.
    Hover,
}

/// Persistent click state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisclosureState {
    /// Detail hidden.
    #[default]
    Collapsed,
    /// Detail shown.
    Expanded,
}

impl DisclosureState {
    /// The opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    /// Whether the state is [`Expanded`](Self::Expanded).
    #[must_use]
    pub const fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }
}

/// Stable identity of a cell: its section plus an item id unique within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisclosureKey {
    /// Containing section.
    pub section: SectionId,
    /// Item id, unique within the section.
    pub item: String,
}

impl DisclosureKey {
    /// Create a key.
    pub fn new(section: impl Into<SectionId>, item: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            item: item.into(),
        }
    }
}

impl fmt::Display for DisclosureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.section, self.item)
    }
}

/// Expand/collapse affordance labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affordance {
    /// Shown while closed.
    pub expand: String,
    /// Shown while open.
    pub collapse: String,
}

impl Default for Affordance {
    fn default() -> Self {
        Self {
            expand: "Click for details".into(),
            collapse: "Show less".into(),
        }
    }
}

/// One expandable unit.
#[derive(Debug, Clone)]
pub struct DisclosureCell {
    key: DisclosureKey,
    mode: DisclosureMode,
    state: DisclosureState,
    hovered: bool,
    reveal: Reveal,
    affordance: Affordance,
}

impl DisclosureCell {
    /// A collapsed, unhovered cell.
    #[must_use]
    pub fn new(key: DisclosureKey, mode: DisclosureMode) -> Self {
        Self {
            key,
            mode,
            state: DisclosureState::Collapsed,
            hovered: false,
            reveal: Reveal::new(REVEAL_DURATION),
            affordance: Affordance::default(),
        }
    }

    /// Override the affordance labels (builder).
    #[must_use]
    pub fn with_affordance(mut self, affordance: Affordance) -> Self {
        self.affordance = affordance;
        self
    }

    /// Override the reveal transition (builder).
    #[must_use]
    pub fn with_reveal(mut self, reveal: Reveal) -> Self {
        self.reveal = reveal;
        self
    }

    /// Handle a click.
    ///
    /// Flips the expanded flag of a click cell and returns `true`. Hover
    /// cells ignore clicks and return `false`.
    pub fn toggle(&mut self) -> bool {
        if self.mode != DisclosureMode::Click {
            return false;
        }
        self.state = self.state.toggled();
        self.reveal.set_open(self.state.is_expanded());
        crate::debug!(cell = %self.key, expanded = self.state.is_expanded(), "disclosure toggled");
        true
    }

    /// Pointer entered the cell.
    pub fn pointer_enter(&mut self) {
        self.set_hovered(true);
    }

    /// Pointer left the cell.
    pub fn pointer_leave(&mut self) {
        self.set_hovered(false);
    }

    fn set_hovered(&mut self, hovered: bool) {
        if self.hovered == hovered {
            return;
        }
        self.hovered = hovered;
        if self.mode == DisclosureMode::Hover {
            self.reveal.set_open(hovered);
        }
    }

    /// Advance the reveal transition.
    pub fn tick(&mut self, dt: Duration) {
        self.reveal.tick(dt);
    }

    /// Whether the governing flag is set.
    #[must_use]
    pub fn is_open(&self) -> bool {
        match self.mode {
            DisclosureMode::Click => self.state.is_expanded(),
            DisclosureMode::Hover => self.hovered,
        }
    }

    /// Whether a reveal transition is still running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        !self.reveal.is_settled()
    }

    /// Label of the affordance matching the current state.
    #[must_use]
    pub fn affordance_label(&self) -> &str {
        if self.is_open() {
            &self.affordance.collapse
        } else {
            &self.affordance.expand
        }
    }

    /// Rendered height of a detail region whose full height is `full`.
    #[must_use]
    pub fn detail_height(&self, full: u16) -> u16 {
        self.reveal.height(full)
    }

    /// Rendered opacity of the detail region.
    #[must_use]
    pub fn detail_opacity(&self) -> f32 {
        self.reveal.opacity()
    }

    /// The cell's key.
    #[must_use]
    pub fn key(&self) -> &DisclosureKey {
        &self.key
    }

    /// Interaction mode.
    #[must_use]
    pub fn mode(&self) -> DisclosureMode {
        self.mode
    }

    /// Persistent click state.
    #[must_use]
    pub fn state(&self) -> DisclosureState {
        self.state
    }

    /// Transient hover flag.
    #[must_use]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

/// Errors raised by [`DisclosureSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisclosureError {
    /// A cell with this key already exists.
    DuplicateKey(DisclosureKey),
}

impl fmt::Display for DisclosureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey(key) => write!(f, "duplicate disclosure key: {key}"),
        }
    }
}

impl std::error::Error for DisclosureError {}

/// Keyed collection of independent cells.
#[derive(Debug, Clone, Default)]
pub struct DisclosureSet {
    cells: Vec<DisclosureCell>,
    index: HashMap<DisclosureKey, usize>,
}

impl DisclosureSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cell.
    ///
    /// # Errors
    ///
    /// Returns [`DisclosureError::DuplicateKey`] if the key is taken.
    pub fn insert(&mut self, cell: DisclosureCell) -> Result<(), DisclosureError> {
        if self.index.contains_key(cell.key()) {
            return Err(DisclosureError::DuplicateKey(cell.key().clone()));
        }
        self.index.insert(cell.key().clone(), self.cells.len());
        self.cells.push(cell);
        Ok(())
    }

    /// Look up a cell.
    #[must_use]
    pub fn get(&self, key: &DisclosureKey) -> Option<&DisclosureCell> {
        self.index.get(key).map(|&i| &self.cells[i])
    }

    /// Look up a cell mutably.
    pub fn get_mut(&mut self, key: &DisclosureKey) -> Option<&mut DisclosureCell> {
        match self.index.get(key) {
            Some(&i) => self.cells.get_mut(i),
            None => None,
        }
    }

    /// Toggle the cell at `key`. Unknown keys and hover cells return `false`.
    pub fn toggle(&mut self, key: &DisclosureKey) -> bool {
        self.get_mut(key).is_some_and(DisclosureCell::toggle)
    }

    /// Pointer entered the cell at `key`.
    pub fn pointer_enter(&mut self, key: &DisclosureKey) {
        if let Some(cell) = self.get_mut(key) {
            cell.pointer_enter();
        }
    }

    /// Pointer left the cell at `key`.
    pub fn pointer_leave(&mut self, key: &DisclosureKey) {
        if let Some(cell) = self.get_mut(key) {
            cell.pointer_leave();
        }
    }

    /// Advance every reveal. Returns `true` while any cell is animating.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut animating = false;
        for cell in &mut self.cells {
            cell.tick(dt);
            animating |= cell.is_animating();
        }
        animating
    }

    /// Whether any cell is mid-transition.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.cells.iter().any(DisclosureCell::is_animating)
    }

    /// Iterate cells in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DisclosureCell> {
        self.cells.iter()
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(item: &str) -> DisclosureKey {
        DisclosureKey::new("costs", item)
    }

    #[test]
    fn toggle_is_an_involution() {
        let mut cell = DisclosureCell::new(key("utility"), DisclosureMode::Click);
        let before = cell.state();
        cell.toggle();
        cell.toggle();
        assert_eq!(cell.state(), before);
    }

    #[test]
    fn click_reveal_heights() {
        let mut cell = DisclosureCell::new(key("utility"), DisclosureMode::Click);
        assert_eq!(cell.detail_height(6), 0);
        assert!(cell.toggle());
        cell.tick(REVEAL_DURATION);
        assert!(cell.is_open());
        assert!(cell.detail_height(6) > 0);
        assert!(cell.toggle());
        cell.tick(REVEAL_DURATION);
        assert!(!cell.is_open());
        assert_eq!(cell.detail_height(6), 0);
    }

    #[test]
    fn affordance_swaps_with_state() {
        let mut cell = DisclosureCell::new(key("hvac"), DisclosureMode::Click).with_affordance(
            Affordance {
                expand: "Learn About Heat Pumps".into(),
                collapse: "Hide Details".into(),
            },
        );
        assert_eq!(cell.affordance_label(), "Learn About Heat Pumps");
        cell.toggle();
        assert_eq!(cell.affordance_label(), "Hide Details");
    }

    #[test]
    fn hover_cell_ignores_clicks() {
        let mut cell = DisclosureCell::new(key("geology"), DisclosureMode::Hover);
        assert!(!cell.toggle());
        assert!(!cell.is_open());
        cell.pointer_enter();
        assert!(cell.is_open());
        cell.pointer_leave();
        assert!(!cell.is_open());
        assert_eq!(cell.state(), DisclosureState::Collapsed);
    }

    #[test]
    fn click_cell_ignores_hover() {
        let mut cell = DisclosureCell::new(key("utility"), DisclosureMode::Click);
        cell.pointer_enter();
        assert!(cell.is_hovered());
        assert!(!cell.is_open());
        cell.tick(REVEAL_DURATION);
        assert_eq!(cell.detail_height(4), 0);
    }

    #[test]
    fn set_rejects_duplicate_keys() {
        let mut set = DisclosureSet::new();
        set.insert(DisclosureCell::new(key("a"), DisclosureMode::Click))
            .unwrap();
        let err = set
            .insert(DisclosureCell::new(key("a"), DisclosureMode::Hover))
            .unwrap_err();
        assert_eq!(err.to_string(), "duplicate disclosure key: costs/a");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn same_item_id_in_different_sections_is_distinct() {
        let mut set = DisclosureSet::new();
        set.insert(DisclosureCell::new(
            DisclosureKey::new("benefits", "community"),
            DisclosureMode::Click,
        ))
        .unwrap();
        set.insert(DisclosureCell::new(
            DisclosureKey::new("community-opportunities", "community"),
            DisclosureMode::Click,
        ))
        .unwrap();
        set.toggle(&DisclosureKey::new("benefits", "community"));
        assert!(
            !set.get(&DisclosureKey::new("community-opportunities", "community"))
                .unwrap()
                .is_open()
        );
    }

    #[test]
    fn toggling_one_cell_leaves_siblings_alone() {
        let mut set = DisclosureSet::new();
        for item in ["a", "b", "c"] {
            set.insert(DisclosureCell::new(key(item), DisclosureMode::Click))
                .unwrap();
        }
        set.toggle(&key("b"));
        assert!(!set.get(&key("a")).unwrap().is_open());
        assert!(set.get(&key("b")).unwrap().is_open());
        assert!(!set.get(&key("c")).unwrap().is_open());
        // Opening a second cell does not close the first.
        set.toggle(&key("c"));
        assert!(set.get(&key("b")).unwrap().is_open());
    }

    #[test]
    fn set_tick_reports_animation() {
        let mut set = DisclosureSet::new();
        set.insert(DisclosureCell::new(key("a"), DisclosureMode::Click))
            .unwrap();
        assert!(!set.is_animating());
        set.toggle(&key("a"));
        assert!(set.tick(Duration::from_millis(10)));
        assert!(!set.tick(REVEAL_DURATION));
    }

    #[test]
    fn unknown_key_is_ignored() {
        let mut set = DisclosureSet::new();
        assert!(!set.toggle(&key("nope")));
        set.pointer_enter(&key("nope"));
        assert!(set.is_empty());
    }
}
