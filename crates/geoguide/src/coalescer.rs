#![forbid(unsafe_code)]

//! Input coalescing.
//!
//! A trackpad flick produces dozens of wheel events and a pointer sweep
//! dozens of motion events. Dispatching each one would re-run the scroll
//! tracker and hover hit tests for positions nobody sees. [`EventCoalescer`]
//! holds back:
//!
//! - pointer motion (latest position wins);
//! - vertical wheel events (summed into one [`Event::Wheel`] with the net
//!   line count, positioned at the last event).
//!
//! Everything else passes straight through. The loop calls
//! [`flush`](EventCoalescer::flush) before dispatching a pass-through event
//! and once more when the input queue is drained, so ordering relative to
//! clicks and keys is preserved.
//!
//! ```
//! use geoguide::coalescer::EventCoalescer;
//! use geoguide::event::{Event, MouseEvent, MouseEventKind};
//!
//! let mut c = EventCoalescer::new();
//! for _ in 0..3 {
//!     assert!(c.push(Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 5, 5))).is_none());
//! }
//! assert!(c.push(Event::Mouse(MouseEvent::new(MouseEventKind::ScrollUp, 5, 6))).is_none());
//! assert_eq!(c.flush(), vec![Event::Wheel { lines: 2, x: 5, y: 6 }]);
//! ```

use crate::event::{Event, MouseEvent, MouseEventKind};

/// Lines scrolled per wheel notch.
pub const LINES_PER_NOTCH: i32 = 3;

#[derive(Debug, Clone, Default)]
pub struct EventCoalescer {
    pending_move: Option<MouseEvent>,
    pending_wheel: Option<WheelState>,
    lines_per_notch: i32,
}

#[derive(Debug, Clone, Copy)]
struct WheelState {
    notches: i32,
    x: u16,
    y: u16,
}

impl EventCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines_per_notch: 1,
            ..Self::default()
        }
    }

    /// Scale each wheel notch to `lines` (builder).
    #[must_use]
    pub fn with_lines_per_notch(mut self, lines: i32) -> Self {
        self.lines_per_notch = lines.max(1);
        self
    }

    /// Offer an event.
    ///
    /// Returns `None` if the event was absorbed, otherwise the event itself.
    /// The caller must [`flush`](Self::flush) before handling a returned
    /// event.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        let Event::Mouse(mouse) = &event else {
            return Some(event);
        };
        match mouse.kind {
            MouseEventKind::Moved => {
                self.pending_move = Some(*mouse);
                None
            }
            MouseEventKind::ScrollUp => {
                self.accumulate(-1, mouse);
                None
            }
            MouseEventKind::ScrollDown => {
                self.accumulate(1, mouse);
                None
            }
            _ => Some(event),
        }
    }

    fn accumulate(&mut self, notch: i32, mouse: &MouseEvent) {
        let notches = self.pending_wheel.map_or(0, |w| w.notches);
        self.pending_wheel = Some(WheelState {
            notches: notches.saturating_add(notch),
            x: mouse.x,
            y: mouse.y,
        });
    }

    /// Drain pending events: the wheel batch first, then the pointer move.
    ///
    /// A batch whose notches cancel out is dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut out = Vec::with_capacity(2);
        if let Some(wheel) = self.pending_wheel.take()
            && wheel.notches != 0
        {
            out.push(Event::Wheel {
                lines: wheel.notches.saturating_mul(self.lines_per_notch),
                x: wheel.x,
                y: wheel.y,
            });
        }
        if let Some(mouse) = self.pending_move.take() {
            out.push(Event::Mouse(mouse));
        }
        out
    }

    /// Whether anything is held back.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_move.is_some() || self.pending_wheel.is_some()
    }
}
