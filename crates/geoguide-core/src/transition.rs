#![forbid(unsafe_code)]

//! Tick-driven transitions.
//!
//! Two primitives cover every animated effect in the guide:
//!
//! - [`Reveal`]: a retargetable 0.0–1.0 progress used for detail-region
//!   height and opacity.
//! - [`ScrollTween`]: an integer interpolation from one scroll offset to
//!   another, used for smooth scrolling.
//!
//! Both track elapsed time as [`Duration`] so accumulation has no
//! floating-point drift, and both land exactly on their target once the
//! duration has elapsed.

use std::time::Duration;

/// Default duration of open/close transitions.
pub const REVEAL_DURATION: Duration = Duration::from_millis(300);

/// Default duration of a smooth scroll.
pub const SCROLL_DURATION: Duration = Duration::from_millis(350);

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Quadratic ease-in-out (slow start and end).
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

fn nonzero(duration: Duration) -> Duration {
    if duration.is_zero() {
        Duration::from_nanos(1)
    } else {
        duration
    }
}

/// Retargetable open/close progress.
///
/// `value()` is 0.0 when fully closed and 1.0 when fully open. Retargeting
/// mid-flight starts the new leg from the current value, so a quick
/// open-close-open never jumps.
#[derive(Debug, Clone, Copy)]
pub struct Reveal {
    from: f32,
    target: f32,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Reveal {
    /// A closed reveal with the given leg duration.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        let duration = nonzero(duration);
        Self {
            from: 0.0,
            target: 0.0,
            elapsed: duration,
            duration,
            easing: ease_out,
        }
    }

    /// Start moving towards open (`true`) or closed (`false`).
    pub fn set_open(&mut self, open: bool) {
        let target = if open { 1.0 } else { 0.0 };
        if (self.target - target).abs() < f32::EPSILON {
            return;
        }
        self.from = self.value();
        self.target = target;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    /// Whether the current leg has finished.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Whether the reveal is heading towards open.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.target > 0.5
    }

    /// Current progress in [0.0, 1.0].
    #[must_use]
    pub fn value(&self) -> f32 {
        if self.is_settled() {
            return self.target;
        }
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        let eased = (self.easing)(t);
        (self.from + (self.target - self.from) * eased).clamp(0.0, 1.0)
    }

    /// Rendered height of a region whose full height is `full` rows.
    ///
    /// Zero exactly when the reveal is fully closed; `full` exactly when
    /// fully open.
    #[must_use]
    pub fn height(&self, full: u16) -> u16 {
        let v = self.value();
        if v <= 0.0 {
            0
        } else {
            ((f32::from(full) * v).ceil() as u16).min(full)
        }
    }

    /// Rendered opacity in [0.0, 1.0].
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.value()
    }
}

impl Default for Reveal {
    fn default() -> Self {
        Self::new(REVEAL_DURATION)
    }
}

/// Interpolates a scroll offset from `from` to `to`.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTween {
    from: u32,
    to: u32,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl ScrollTween {
    /// Create a tween over `duration` with ease-in-out.
    #[must_use]
    pub fn new(from: u32, to: u32, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration: nonzero(duration),
            easing: ease_in_out,
        }
    }

    /// Head for `to` instead, starting a fresh leg from the current
    /// position. A tween already heading there is left alone.
    pub fn retarget(&mut self, to: u32) {
        if to == self.to {
            return;
        }
        self.from = self.position();
        self.to = to;
        self.elapsed = Duration::ZERO;
    }

    /// Advance by `dt` and return the new position.
    pub fn tick(&mut self, dt: Duration) -> u32 {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.position()
    }

    /// Whether the tween has reached its target.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Current interpolated position. Equals `to` once complete.
    #[must_use]
    pub fn position(&self) -> u32 {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()) as f32;
        let eased = f64::from((self.easing)(t));
        let from = f64::from(self.from);
        let to = f64::from(self.to);
        (from + (to - from) * eased).round().clamp(0.0, f64::from(u32::MAX)) as u32
    }

    /// Destination offset.
    #[must_use]
    pub fn target(&self) -> u32 {
        self.to
    }
}
