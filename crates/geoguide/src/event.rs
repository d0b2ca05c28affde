#![forbid(unsafe_code)]

//! Terminal input events as seen by the guide.
//!
//! These mirror crossterm's events closely but are owned by this crate so the
//! model and its tests never touch crossterm directly. The mapping from
//! crossterm lives in [`crate::session`].

use bitflags::bitflags;

/// One input event delivered to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Pointer motion, button, or raw wheel event.
    Mouse(MouseEvent),
    /// Net vertical wheel motion after coalescing.
    ///
    /// Never produced by the terminal mapping; the
    /// [`EventCoalescer`](crate::coalescer::EventCoalescer) folds runs of
    /// wheel events into one of these. Positive `lines` scroll down.
    Wheel { lines: i32, x: u16, y: u16 },
    /// The terminal was resized.
    Resize { width: u16, height: u16 },
    /// Bracketed paste. The guide has no text inputs and ignores it.
    Paste(String),
    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),
    /// Periodic tick driving transitions.
    Tick,
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// A plain press of `code`.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Attach modifiers (builder).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the event kind (builder).
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this is the character `c` with no Ctrl or Alt held.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        self.code == KeyCode::Char(c) && !self.modifiers.intersects(Modifiers::CTRL | Modifiers::ALT)
    }

    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Keys the guide distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Backspace,
    Tab,
    /// Shift+Tab.
    BackTab,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// Function key (F1-F24).
    F(u8),
    /// Anything else the terminal reports.
    Other,
}

/// Press, repeat, or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    #[default]
    Press,
    Repeat,
    Release,
}

bitflags! {
    /// Modifier keys held during an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A pointer event at a screen cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Column, 0-indexed.
    pub x: u16,
    /// Row, 0-indexed.
    pub y: u16,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self {
            kind,
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers (builder).
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    /// Motion with no button held.
    Moved,
    ScrollUp,
    ScrollDown,
    ScrollLeft,
    ScrollRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_char_ignores_shift_only() {
        let key = KeyEvent::new(KeyCode::Char('Q')).with_modifiers(Modifiers::SHIFT);
        assert!(key.is_char('Q'));
        assert!(key.shift());
        let ctrl = KeyEvent::new(KeyCode::Char('q')).with_modifiers(Modifiers::CTRL);
        assert!(!ctrl.is_char('q'));
        assert!(ctrl.ctrl());
    }

    #[test]
    fn mouse_builder_keeps_position() {
        let ev = MouseEvent::new(MouseEventKind::Moved, 7, 3).with_modifiers(Modifiers::ALT);
        assert_eq!(ev.position(), (7, 3));
        assert_eq!(ev.modifiers, Modifiers::ALT);
    }
}
