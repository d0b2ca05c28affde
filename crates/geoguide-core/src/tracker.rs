#![forbid(unsafe_code)]

//! Scroll-position tracking.
//!
//! The tracker answers one question on every scroll event: which registered
//! section currently sits under the reference line?
//!
//! # Algorithm
//!
//! 1. `reference = scroll + reference_offset` (the offset compensates for a
//!    fixed header covering the top of the viewport).
//! 2. Walk the registry in order and ask the [`AnchorLookup`] for each
//!    section's live span. Missing anchors are skipped for this pass.
//! 3. The first section whose span contains `reference` wins.
//! 4. If nothing matches, the previously active section is kept.
//!
//! Steps 1–3 are the pure function [`resolve_active`]; [`ScrollTracker`] adds
//! step 4, the mount/teardown lifecycle, and publication through an
//! [`Observable`].

use std::collections::HashMap;

use crate::geometry::Span;
use crate::observable::{Observable, Subscription};
use crate::section::{Section, SectionId, SectionRegistry};

/// Reference-line offset used when none is configured.
pub const DEFAULT_REFERENCE_OFFSET: u32 = 200;

/// Live geometry of rendered section anchors.
///
/// Implementations return `None` for anchors that are not currently part of
/// the rendered document.
pub trait AnchorLookup {
    /// Current span of the anchor named by `id`.
    fn anchor(&self, id: &SectionId) -> Option<Span>;
}

impl<F> AnchorLookup for F
where
    F: Fn(&SectionId) -> Option<Span>,
{
    fn anchor(&self, id: &SectionId) -> Option<Span> {
        self(id)
    }
}

impl AnchorLookup for HashMap<SectionId, Span> {
    fn anchor(&self, id: &SectionId) -> Option<Span> {
        self.get(id).copied()
    }
}

/// Resolve the section under the reference line.
///
/// Returns the first section in registry order whose anchor span contains
/// `scroll + reference_offset`, or `None` when no mounted anchor does.
pub fn resolve_active<'r, L>(
    registry: &'r SectionRegistry,
    scroll: u32,
    reference_offset: u32,
    lookup: &L,
) -> Option<&'r Section>
where
    L: AnchorLookup + ?Sized,
{
    let reference = scroll.saturating_add(reference_offset);
    registry.iter().find(|section| {
        lookup
            .anchor(&section.id)
            .is_some_and(|span| span.contains(reference))
    })
}

/// Lifecycle of the tracker's scroll listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Constructed; not yet listening.
    Idle,
    /// Mounted; scroll events are processed.
    Listening,
    /// Torn down; scroll events are ignored.
    TornDown,
}

/// Owns the active-section state and recomputes it on scroll.
#[derive(Debug)]
pub struct ScrollTracker {
    registry: SectionRegistry,
    reference_offset: u32,
    active: Observable<Option<SectionId>>,
    phase: TrackerPhase,
    passes: u64,
}

impl ScrollTracker {
    /// Create a tracker over `registry` with the given reference offset.
    ///
    /// The active section starts unset.
    #[must_use]
    pub fn new(registry: SectionRegistry, reference_offset: u32) -> Self {
        Self {
            registry,
            reference_offset,
            active: Observable::new(None),
            phase: TrackerPhase::Idle,
            passes: 0,
        }
    }

    /// Create a tracker with [`DEFAULT_REFERENCE_OFFSET`].
    #[must_use]
    pub fn with_default_offset(registry: SectionRegistry) -> Self {
        Self::new(registry, DEFAULT_REFERENCE_OFFSET)
    }

    /// Start listening and run the initial measurement.
    ///
    /// Returns the active section after the measurement.
    pub fn mount<L: AnchorLookup + ?Sized>(
        &mut self,
        scroll: u32,
        lookup: &L,
    ) -> Option<SectionId> {
        if self.phase == TrackerPhase::TornDown {
            crate::warn!("scroll tracker mounted after teardown; ignoring");
            return self.active();
        }
        self.phase = TrackerPhase::Listening;
        crate::debug!(scroll, sections = self.registry.len(), "scroll tracker mounted");
        self.recompute(scroll, lookup);
        self.active()
    }

    /// Handle one scroll event.
    ///
    /// Returns `true` when the active section changed. Events arriving
    /// before [`mount`](Self::mount) or after [`teardown`](Self::teardown)
    /// are ignored.
    pub fn on_scroll<L: AnchorLookup + ?Sized>(&mut self, scroll: u32, lookup: &L) -> bool {
        if self.phase != TrackerPhase::Listening {
            return false;
        }
        self.recompute(scroll, lookup)
    }

    /// Stop listening. Subsequent scroll events are ignored.
    pub fn teardown(&mut self) {
        if self.phase != TrackerPhase::TornDown {
            crate::debug!(passes = self.passes, "scroll tracker torn down");
        }
        self.phase = TrackerPhase::TornDown;
    }

    fn recompute<L: AnchorLookup + ?Sized>(&mut self, scroll: u32, lookup: &L) -> bool {
        self.passes += 1;
        let Some(section) = resolve_active(&self.registry, scroll, self.reference_offset, lookup)
        else {
            crate::trace!(scroll, "no section under reference line; keeping previous");
            return false;
        };
        let changed = self.active.set(Some(section.id.clone()));
        if changed {
            crate::debug!(section = %section.id, scroll, "active section changed");
        }
        changed
    }

    /// The currently active section, or `None` before the first match.
    #[must_use]
    pub fn active(&self) -> Option<SectionId> {
        self.active.get()
    }

    /// Read-only handle on the active-section observable.
    #[must_use]
    pub fn observable(&self) -> Observable<Option<SectionId>> {
        self.active.clone()
    }

    /// Subscribe to active-section changes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&Option<SectionId>) + 'static) -> Subscription {
        self.active.subscribe(callback)
    }

    /// Lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    /// Reference offset added to the scroll position.
    #[must_use]
    pub fn reference_offset(&self) -> u32 {
        self.reference_offset
    }

    /// The registry this tracker walks.
    #[must_use]
    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    /// Number of recomputation passes since construction.
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn two_sections() -> (SectionRegistry, HashMap<SectionId, Span>) {
        let registry = SectionRegistry::new([
            ("intro", "1.1", "Introduction"),
            ("heating", "1.2", "Heating"),
        ])
        .unwrap();
        let mut anchors = HashMap::new();
        anchors.insert(SectionId::new("intro"), Span::new(0, 500));
        anchors.insert(SectionId::new("heating"), Span::new(500, 800));
        (registry, anchors)
    }

    #[test]
    fn concrete_scenario_from_offsets() {
        let (registry, anchors) = two_sections();
        let mut tracker = ScrollTracker::new(registry, 200);
        tracker.mount(150, &anchors);
        assert_eq!(tracker.active().unwrap().as_str(), "intro");

        tracker.on_scroll(450, &anchors);
        assert_eq!(tracker.active().unwrap().as_str(), "heating");

        tracker.on_scroll(0, &anchors);
        assert_eq!(tracker.active().unwrap().as_str(), "intro");
    }

    #[test]
    fn unset_until_first_match() {
        let (registry, anchors) = two_sections();
        let mut tracker = ScrollTracker::new(registry, 200);
        assert!(tracker.active().is_none());
        // reference 200 + 5000 lies below every section
        tracker.mount(5_000, &anchors);
        assert!(tracker.active().is_none());
    }

    #[test]
    fn no_match_retains_previous() {
        let (registry, anchors) = two_sections();
        let mut tracker = ScrollTracker::new(registry, 200);
        tracker.mount(450, &anchors);
        assert_eq!(tracker.active().unwrap().as_str(), "heating");
        assert!(!tracker.on_scroll(10_000, &anchors));
        assert_eq!(tracker.active().unwrap().as_str(), "heating");
    }

    #[test]
    fn missing_anchor_is_skipped() {
        let (registry, mut anchors) = two_sections();
        anchors.remove("intro");
        let found = resolve_active(&registry, 0, 200, &anchors);
        assert!(found.is_none());
        let found = resolve_active(&registry, 400, 200, &anchors);
        assert_eq!(found.unwrap().id.as_str(), "heating");
    }

    #[test]
    fn earliest_registry_entry_wins_on_overlap() {
        let registry = SectionRegistry::new([("a", "1", "A"), ("b", "2", "B")]).unwrap();
        let lookup = |id: &SectionId| match id.as_str() {
            "a" => Some(Span::new(100, 300)),
            "b" => Some(Span::new(0, 1000)),
            _ => None,
        };
        let found = resolve_active(&registry, 0, 200, &lookup);
        assert_eq!(found.unwrap().id.as_str(), "a");
    }

    #[test]
    fn events_before_mount_and_after_teardown_ignored() {
        let (registry, anchors) = two_sections();
        let mut tracker = ScrollTracker::new(registry, 200);
        assert!(!tracker.on_scroll(450, &anchors));
        assert!(tracker.active().is_none());
        assert_eq!(tracker.passes(), 0);

        tracker.mount(0, &anchors);
        tracker.teardown();
        assert_eq!(tracker.phase(), TrackerPhase::TornDown);
        assert!(!tracker.on_scroll(450, &anchors));
        assert_eq!(tracker.active().unwrap().as_str(), "intro");
    }

    #[test]
    fn subscribers_notified_once_per_change() {
        let (registry, anchors) = two_sections();
        let mut tracker = ScrollTracker::new(registry, 200);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let _sub = tracker.subscribe(move |id| {
            sink.borrow_mut()
                .push(id.as_ref().map(|s| s.as_str().to_owned()));
        });
        tracker.mount(0, &anchors);
        tracker.on_scroll(10, &anchors);
        tracker.on_scroll(20, &anchors);
        tracker.on_scroll(600, &anchors);
        assert_eq!(
            *log.borrow(),
            vec![Some("intro".to_string()), Some("heating".to_string())]
        );
    }

    #[test]
    fn reference_saturates_at_u32_max() {
        let registry = SectionRegistry::new([("tail", "9", "Tail")]).unwrap();
        let lookup = |_: &SectionId| Some(Span::new(u32::MAX - 10, 10));
        let found = resolve_active(&registry, u32::MAX - 5, 200, &lookup);
        // reference saturates at u32::MAX which is outside [MAX-10, MAX)
        assert!(found.is_none());
    }
}
