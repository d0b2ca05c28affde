#![forbid(unsafe_code)]

//! Terminal lifecycle guard.
//!
//! [`TerminalSession`] puts the terminal into raw mode on the alternate
//! screen with mouse capture, and restores it when dropped. Restoration also
//! runs from a panic hook and, on Unix, from a signal thread handling SIGINT
//! and SIGTERM, so an interrupted guide never leaves the shell in raw mode.
//!
//! Cleanup order is the reverse of setup: mouse capture off, focus events
//! off, cursor shown, alternate screen left, raw mode disabled, flush.

use std::io::{self, Write};
use std::sync::OnceLock;
use std::time::Duration;

use crossterm::event as ct;
#[cfg(unix)]
use signal_hook::consts::signal::{SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};

/// Which terminal features to switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub alternate_screen: bool,
    pub mouse_capture: bool,
    pub focus_events: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            alternate_screen: true,
            mouse_capture: true,
            focus_events: false,
        }
    }
}

/// RAII owner of the terminal's raw-mode state.
#[derive(Debug)]
pub struct TerminalSession {
    options: SessionOptions,
    mouse_enabled: bool,
    alternate_screen_enabled: bool,
    focus_enabled: bool,
    cleaned_up: bool,
    #[cfg(unix)]
    _signals: SignalGuard,
}

impl TerminalSession {
    /// Enter raw mode and enable the requested features.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the terminal rejects raw mode or
    /// the signal handler cannot be registered. Anything already enabled is
    /// rolled back when the partially built session drops.
    pub fn new(options: SessionOptions) -> io::Result<Self> {
        install_panic_hook();
        #[cfg(unix)]
        let signals = SignalGuard::new()?;

        crossterm::terminal::enable_raw_mode()?;
        tracing::debug!(?options, "terminal raw mode enabled");

        let mut session = Self {
            options,
            mouse_enabled: false,
            alternate_screen_enabled: false,
            focus_enabled: false,
            cleaned_up: false,
            #[cfg(unix)]
            _signals: signals,
        };

        let mut stdout = io::stdout();
        if options.alternate_screen {
            crossterm::execute!(
                stdout,
                crossterm::terminal::EnterAlternateScreen,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
            )?;
            session.alternate_screen_enabled = true;
        }
        crossterm::execute!(stdout, crossterm::cursor::Hide)?;
        if options.mouse_capture {
            crossterm::execute!(stdout, ct::EnableMouseCapture)?;
            session.mouse_enabled = true;
        }
        if options.focus_events {
            crossterm::execute!(stdout, ct::EnableFocusChange)?;
            session.focus_enabled = true;
        }
        Ok(session)
    }

    /// Current terminal size as `(columns, rows)`.
    ///
    /// # Errors
    ///
    /// Propagates the size query failure.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        crossterm::terminal::size()
    }

    /// Wait up to `timeout` for input.
    ///
    /// # Errors
    ///
    /// Propagates the poll failure.
    pub fn poll_event(&self, timeout: Duration) -> io::Result<bool> {
        ct::poll(timeout)
    }

    /// Read one event. Returns `None` for events the guide does not model.
    ///
    /// # Errors
    ///
    /// Propagates the read failure.
    pub fn read_event(&self) -> io::Result<Option<Event>> {
        Ok(map_crossterm_event(ct::read()?))
    }

    /// Switch mouse capture at runtime.
    ///
    /// # Errors
    ///
    /// Propagates the write failure.
    pub fn set_mouse_capture(&mut self, enabled: bool) -> io::Result<()> {
        if enabled == self.mouse_enabled {
            return Ok(());
        }
        let mut stdout = io::stdout();
        if enabled {
            crossterm::execute!(stdout, ct::EnableMouseCapture)?;
        } else {
            crossterm::execute!(stdout, ct::DisableMouseCapture)?;
        }
        self.mouse_enabled = enabled;
        tracing::debug!(enabled, "mouse capture switched");
        Ok(())
    }

    #[must_use]
    pub fn mouse_capture_enabled(&self) -> bool {
        self.mouse_enabled
    }

    #[must_use]
    pub fn options(&self) -> SessionOptions {
        self.options
    }

    fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;
        let mut stdout = io::stdout();
        if self.mouse_enabled {
            let _ = crossterm::execute!(stdout, ct::DisableMouseCapture);
            self.mouse_enabled = false;
        }
        if self.focus_enabled {
            let _ = crossterm::execute!(stdout, ct::DisableFocusChange);
            self.focus_enabled = false;
        }
        let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
        if self.alternate_screen_enabled {
            let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
            self.alternate_screen_enabled = false;
        }
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = stdout.flush();
        tracing::debug!("terminal restored");
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

fn install_panic_hook() {
    static HOOK: OnceLock<()> = OnceLock::new();
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            best_effort_cleanup();
            previous(info);
        }));
    });
}

fn best_effort_cleanup() {
    let mut stdout = io::stdout();
    let _ = crossterm::execute!(stdout, ct::DisableMouseCapture);
    let _ = crossterm::execute!(stdout, ct::DisableFocusChange);
    let _ = crossterm::execute!(stdout, crossterm::cursor::Show);
    let _ = crossterm::execute!(stdout, crossterm::terminal::LeaveAlternateScreen);
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

#[cfg(unix)]
#[derive(Debug)]
struct SignalGuard {
    handle: signal_hook::iterator::Handle,
    thread: Option<std::thread::JoinHandle<()>>,
}

#[cfg(unix)]
impl SignalGuard {
    fn new() -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(io::Error::other)?;
        let handle = signals.handle();
        let thread = std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::warn!(signal, "termination signal received, restoring terminal");
                best_effort_cleanup();
                std::process::exit(128 + signal);
            }
        });
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

#[cfg(unix)]
impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

pub(crate) fn map_crossterm_event(event: ct::Event) -> Option<Event> {
    match event {
        ct::Event::Key(key) => map_key_event(key).map(Event::Key),
        ct::Event::Mouse(mouse) => Some(Event::Mouse(map_mouse_event(mouse))),
        ct::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        ct::Event::Paste(text) => Some(Event::Paste(text)),
        ct::Event::FocusGained => Some(Event::Focus(true)),
        ct::Event::FocusLost => Some(Event::Focus(false)),
    }
}

fn map_key_event(event: ct::KeyEvent) -> Option<KeyEvent> {
    let kind = match event.kind {
        ct::KeyEventKind::Press => KeyEventKind::Press,
        ct::KeyEventKind::Repeat => KeyEventKind::Repeat,
        // Releases only arrive with the kitty protocol, which is never
        // requested; drop them so a key never acts twice.
        ct::KeyEventKind::Release => return None,
    };
    Some(KeyEvent {
        code: map_key_code(event.code),
        modifiers: map_modifiers(event.modifiers),
        kind,
    })
}

fn map_key_code(code: ct::KeyCode) -> KeyCode {
    match code {
        ct::KeyCode::Char(c) => KeyCode::Char(c),
        ct::KeyCode::Enter => KeyCode::Enter,
        ct::KeyCode::Esc => KeyCode::Escape,
        ct::KeyCode::Backspace => KeyCode::Backspace,
        ct::KeyCode::Tab => KeyCode::Tab,
        ct::KeyCode::BackTab => KeyCode::BackTab,
        ct::KeyCode::Home => KeyCode::Home,
        ct::KeyCode::End => KeyCode::End,
        ct::KeyCode::PageUp => KeyCode::PageUp,
        ct::KeyCode::PageDown => KeyCode::PageDown,
        ct::KeyCode::Up => KeyCode::Up,
        ct::KeyCode::Down => KeyCode::Down,
        ct::KeyCode::Left => KeyCode::Left,
        ct::KeyCode::Right => KeyCode::Right,
        ct::KeyCode::F(n) => KeyCode::F(n),
        _ => KeyCode::Other,
    }
}

fn map_modifiers(modifiers: ct::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(ct::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(ct::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(ct::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(ct::KeyModifiers::SUPER) {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

fn map_mouse_event(event: ct::MouseEvent) -> MouseEvent {
    let kind = match event.kind {
        ct::MouseEventKind::Down(button) => MouseEventKind::Down(map_mouse_button(button)),
        ct::MouseEventKind::Up(button) => MouseEventKind::Up(map_mouse_button(button)),
        ct::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_mouse_button(button)),
        ct::MouseEventKind::Moved => MouseEventKind::Moved,
        ct::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        ct::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        ct::MouseEventKind::ScrollLeft => MouseEventKind::ScrollLeft,
        ct::MouseEventKind::ScrollRight => MouseEventKind::ScrollRight,
    };
    MouseEvent::new(kind, event.column, event.row).with_modifiers(map_modifiers(event.modifiers))
}

fn map_mouse_button(button: ct::MouseButton) -> MouseButton {
    match button {
        ct::MouseButton::Left => MouseButton::Left,
        ct::MouseButton::Right => MouseButton::Right,
        ct::MouseButton::Middle => MouseButton::Middle,
    }
}
