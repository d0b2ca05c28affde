#![forbid(unsafe_code)]

//! Elm-style runtime.
//!
//! A [`Model`] owns all state, turns messages into state changes in
//! [`update`](Model::update), and draws itself in [`view`](Model::view).
//! Side effects are returned as [`Cmd`] values and carried out by the
//! [`Program`] loop (or by the
//! [`ProgramSimulator`](crate::simulator::ProgramSimulator) in tests).
//!
//! The loop is single-threaded:
//!
//! 1. wait for input until the next tick is due;
//! 2. drain every queued event through the [`EventCoalescer`] and dispatch;
//! 3. deliver [`Event::Tick`] when the tick interval has elapsed and the
//!    model [wants ticks](Model::wants_tick);
//! 4. render the model and present the changed cells, if anything was
//!    dispatched since the last frame.

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crate::coalescer::{EventCoalescer, LINES_PER_NOTCH};
use crate::event::Event;
use crate::frame::Buffer;
use crate::presenter::Presenter;
use crate::session::{SessionOptions, TerminalSession};

/// Poll interval when no tick is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Application state and behavior.
pub trait Model: Sized {
    /// Messages driving [`update`](Self::update). Terminal events convert
    /// into messages.
    type Message: From<Event> + Send + 'static;

    /// Called once after the first resize, before the first render.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Apply one message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the current state.
    fn view(&self, frame: &mut Buffer);

    /// Whether scheduled ticks should be delivered right now. A model with
    /// nothing in motion returns `false` and the loop sleeps until input.
    fn wants_tick(&self) -> bool {
        true
    }

    /// Called once when the program stops.
    fn on_shutdown(&mut self) {}
}

/// How long to wait for input before the next tick is due.
fn poll_timeout(tick_rate: Option<Duration>, since_tick: Duration, ticking: bool) -> Duration {
    match tick_rate {
        Some(rate) if ticking => rate.saturating_sub(since_tick),
        _ => IDLE_POLL,
    }
}

/// A side effect requested by the model.
pub enum Cmd<M> {
    None,
    Quit,
    /// Run each command in order.
    Batch(Vec<Cmd<M>>),
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Deliver [`Event::Tick`] at this interval from now on.
    Tick(Duration),
    /// Switch mouse capture.
    SetMouseCapture(bool),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Tick(d) => f.debug_tuple("Tick").field(d).finish(),
            Self::SetMouseCapture(b) => write!(f, "SetMouseCapture({b})"),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    #[inline]
    pub fn tick(interval: Duration) -> Self {
        Self::Tick(interval)
    }

    /// Combine commands, collapsing empty and single-element batches.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    #[inline]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Stable name for logging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Quit => "Quit",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::Tick(_) => "Tick",
            Self::SetMouseCapture(_) => "SetMouseCapture",
        }
    }
}

/// Runtime settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramConfig {
    pub session: SessionOptions,
    /// Lines scrolled per wheel notch.
    pub lines_per_notch: i32,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            session: SessionOptions::default(),
            lines_per_notch: LINES_PER_NOTCH,
        }
    }
}

/// Runs a [`Model`] against the real terminal.
pub struct Program<M: Model> {
    model: M,
    session: TerminalSession,
    presenter: Presenter<Stdout>,
    coalescer: EventCoalescer,
    size: (u16, u16),
    running: bool,
    tick_rate: Option<Duration>,
    last_tick: Instant,
    dirty: bool,
    frames: u64,
}

impl<M: Model> Program<M> {
    /// Take over the terminal.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the terminal session cannot be set up.
    pub fn with_config(model: M, config: ProgramConfig) -> io::Result<Self> {
        let session = TerminalSession::new(config.session)?;
        let size = session.size()?;
        Ok(Self {
            model,
            session,
            presenter: Presenter::new(io::stdout()),
            coalescer: EventCoalescer::new().with_lines_per_notch(config.lines_per_notch),
            size,
            running: true,
            tick_rate: None,
            last_tick: Instant::now(),
            dirty: true,
            frames: 0,
        })
    }

    /// Run until the model quits.
    ///
    /// # Errors
    ///
    /// Returns the first terminal I/O error.
    pub fn run(&mut self) -> io::Result<()> {
        let result = self.run_event_loop();
        self.model.on_shutdown();
        tracing::info!(frames = self.frames, "program stopped");
        result
    }

    fn run_event_loop(&mut self) -> io::Result<()> {
        let (width, height) = self.size;
        self.dispatch(Event::Resize { width, height })?;
        let cmd = {
            let _span = tracing::info_span!("geoguide.program.init").entered();
            self.model.init()
        };
        self.execute_cmd(cmd)?;
        self.render()?;

        while self.running {
            let timeout = self.timeout();
            if self.session.poll_event(timeout)? {
                loop {
                    if let Some(event) = self.session.read_event()? {
                        self.push_event(event)?;
                    }
                    if !self.running || !self.session.poll_event(Duration::ZERO)? {
                        break;
                    }
                }
                for event in self.coalescer.flush() {
                    self.dispatch(event)?;
                }
            }
            if self.running && self.should_tick() {
                self.dispatch(Event::Tick)?;
            }
            if self.running && self.dirty {
                self.render()?;
            }
        }
        Ok(())
    }

    fn timeout(&self) -> Duration {
        poll_timeout(self.tick_rate, self.last_tick.elapsed(), self.model.wants_tick())
    }

    /// Check if we should send a tick. While the model is idle the tick
    /// clock is held at now, so the first tick after input starts an
    /// animation arrives one full interval later.
    fn should_tick(&mut self) -> bool {
        let Some(rate) = self.tick_rate else {
            return false;
        };
        if !self.model.wants_tick() {
            self.last_tick = Instant::now();
            return false;
        }
        if self.last_tick.elapsed() >= rate {
            self.last_tick = Instant::now();
            return true;
        }
        false
    }

    fn push_event(&mut self, event: Event) -> io::Result<()> {
        if let Some(event) = self.coalescer.push(event) {
            for pending in self.coalescer.flush() {
                self.dispatch(pending)?;
            }
            self.dispatch(event)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, event: Event) -> io::Result<()> {
        if !self.running {
            return Ok(());
        }
        if let Event::Resize { width, height } = event {
            self.size = (width, height);
            self.presenter.invalidate();
        }
        self.dirty = true;
        let cmd = self.model.update(M::Message::from(event));
        self.execute_cmd(cmd)
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) -> io::Result<()> {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => {
                tracing::debug!("quit requested");
                self.running = false;
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute_cmd(cmd)?;
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Msg(m) => {
                let cmd = self.model.update(m);
                self.execute_cmd(cmd)?;
            }
            Cmd::Tick(rate) => {
                self.tick_rate = Some(rate);
                self.last_tick = Instant::now();
            }
            Cmd::SetMouseCapture(enabled) => self.session.set_mouse_capture(enabled)?,
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        let (width, height) = self.size;
        let mut frame = Buffer::new(width, height);
        self.model.view(&mut frame);
        let written = self.presenter.present(&frame)?;
        self.dirty = false;
        self.frames += 1;
        if written > 0 {
            tracing::trace!(frame = self.frames, cells = written, "frame presented");
        }
        Ok(())
    }

    /// The model.
    pub fn model(&self) -> &M {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_collapses() {
        let none: Cmd<()> = Cmd::batch(vec![Cmd::none(), Cmd::none()]);
        assert!(none.is_none());
        let single: Cmd<()> = Cmd::batch(vec![Cmd::none(), Cmd::quit()]);
        assert_eq!(single.type_name(), "Quit");
        let many: Cmd<()> = Cmd::batch(vec![Cmd::quit(), Cmd::tick(Duration::from_millis(16))]);
        assert_eq!(many.type_name(), "Batch");
    }

    #[test]
    fn idle_model_polls_slowly() {
        let rate = Duration::from_millis(16);
        assert_eq!(poll_timeout(Some(rate), Duration::from_millis(4), true), Duration::from_millis(12));
        assert_eq!(poll_timeout(Some(rate), Duration::from_millis(40), true), Duration::ZERO);
        assert_eq!(poll_timeout(Some(rate), Duration::from_millis(4), false), IDLE_POLL);
        assert_eq!(poll_timeout(None, Duration::ZERO, true), IDLE_POLL);
    }

    #[test]
    fn debug_format() {
        let cmd: Cmd<u8> = Cmd::batch(vec![Cmd::msg(3), Cmd::SetMouseCapture(false)]);
        assert_eq!(format!("{cmd:?}"), "Batch([Msg(3), SetMouseCapture(false)])");
    }
}
