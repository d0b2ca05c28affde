#![forbid(unsafe_code)]

//! Deterministic program simulator for testing.
//!
//! `ProgramSimulator` runs a [`Model`] without a terminal. Events are
//! injected by hand, ticks are delivered on demand, and frames are captured
//! into [`Buffer`]s for assertions.
//!
//! ```ignore
//! let mut sim = ProgramSimulator::new(model);
//! sim.inject_event(Event::Resize { width: 120, height: 40 });
//! sim.init();
//! sim.advance_ticks(30);
//! assert!(sim.capture_frame(120, 40).contains_text("Reykjavik"));
//! ```

use std::time::Duration;

use crate::coalescer::EventCoalescer;
use crate::event::Event;
use crate::frame::Buffer;
use crate::program::{Cmd, Model};

/// Record of an executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CmdRecord {
    None,
    Quit,
    Msg,
    Batch(usize),
    Tick(Duration),
    MouseCapture(bool),
}

pub struct ProgramSimulator<M: Model> {
    model: M,
    frames: Vec<Buffer>,
    command_log: Vec<CmdRecord>,
    running: bool,
    tick_rate: Option<Duration>,
    coalescer: EventCoalescer,
}

impl<M: Model> ProgramSimulator<M> {
    /// Wrap `model`. Call [`init`](Self::init) before injecting input.
    pub fn new(model: M) -> Self {
        Self {
            model,
            frames: Vec::new(),
            command_log: Vec::new(),
            running: true,
            tick_rate: None,
            coalescer: EventCoalescer::new(),
        }
    }

    /// Use `coalescer` for [`inject_coalesced`](Self::inject_coalesced).
    pub fn with_coalescer(mut self, coalescer: EventCoalescer) -> Self {
        self.coalescer = coalescer;
        self
    }

    pub fn init(&mut self) {
        let cmd = self.model.init();
        self.execute_cmd(cmd);
    }

    /// Dispatch each event as-is.
    pub fn inject_events(&mut self, events: &[Event]) {
        for event in events {
            if !self.running {
                break;
            }
            let cmd = self.model.update(M::Message::from(event.clone()));
            self.execute_cmd(cmd);
        }
    }

    pub fn inject_event(&mut self, event: Event) {
        self.inject_events(&[event]);
    }

    /// Dispatch `events` as one input burst, coalesced the way the
    /// [`Program`](crate::program::Program) loop does.
    pub fn inject_coalesced(&mut self, events: &[Event]) {
        let mut ready = Vec::new();
        for event in events {
            if let Some(event) = self.coalescer.push(event.clone()) {
                ready.extend(self.coalescer.flush());
                ready.push(event);
            }
        }
        ready.extend(self.coalescer.flush());
        self.inject_events(&ready);
    }

    /// Deliver `n` ticks.
    pub fn advance_ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.inject_event(Event::Tick);
        }
    }

    pub fn send(&mut self, msg: M::Message) {
        if !self.running {
            return;
        }
        let cmd = self.model.update(msg);
        self.execute_cmd(cmd);
    }

    /// Render into a fresh `width` x `height` buffer and keep it.
    pub fn capture_frame(&mut self, width: u16, height: u16) -> &Buffer {
        let mut frame = Buffer::new(width, height);
        self.model.view(&mut frame);
        self.frames.push(frame);
        &self.frames[self.frames.len() - 1]
    }

    pub fn frames(&self) -> &[Buffer] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Buffer> {
        self.frames.last()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// `false` after a [`Cmd::Quit`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick_rate(&self) -> Option<Duration> {
        self.tick_rate
    }

    pub fn command_log(&self) -> &[CmdRecord] {
        &self.command_log
    }

    fn execute_cmd(&mut self, cmd: Cmd<M::Message>) {
        match cmd {
            Cmd::None => self.command_log.push(CmdRecord::None),
            Cmd::Quit => {
                self.command_log.push(CmdRecord::Quit);
                if self.running {
                    self.running = false;
                    self.model.on_shutdown();
                }
            }
            Cmd::Msg(m) => {
                self.command_log.push(CmdRecord::Msg);
                let cmd = self.model.update(m);
                self.execute_cmd(cmd);
            }
            Cmd::Batch(cmds) => {
                self.command_log.push(CmdRecord::Batch(cmds.len()));
                for c in cmds {
                    self.execute_cmd(c);
                    if !self.running {
                        break;
                    }
                }
            }
            Cmd::Tick(rate) => {
                self.tick_rate = Some(rate);
                self.command_log.push(CmdRecord::Tick(rate));
            }
            Cmd::SetMouseCapture(enabled) => {
                self.command_log.push(CmdRecord::MouseCapture(enabled));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};

    #[derive(Default)]
    struct Counter {
        value: i32,
        moves: usize,
        wheel: i32,
        ticks: usize,
        shut_down: bool,
    }

    #[derive(Debug)]
    enum CounterMsg {
        Increment,
        Quit,
        Move,
        Wheel(i32),
        Tick,
        Other,
    }

    impl From<Event> for CounterMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Key(k) if k.code == KeyCode::Char('+') => CounterMsg::Increment,
                Event::Key(k) if k.code == KeyCode::Char('q') => CounterMsg::Quit,
                Event::Mouse(m) if m.kind == MouseEventKind::Moved => CounterMsg::Move,
                Event::Wheel { lines, .. } => CounterMsg::Wheel(lines),
                Event::Tick => CounterMsg::Tick,
                _ => CounterMsg::Other,
            }
        }
    }

    impl Model for Counter {
        type Message = CounterMsg;

        fn init(&mut self) -> Cmd<Self::Message> {
            Cmd::tick(Duration::from_millis(16))
        }

        fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message> {
            match msg {
                CounterMsg::Increment => self.value += 1,
                CounterMsg::Quit => return Cmd::quit(),
                CounterMsg::Move => self.moves += 1,
                CounterMsg::Wheel(lines) => self.wheel += lines,
                CounterMsg::Tick => self.ticks += 1,
                CounterMsg::Other => {}
            }
            Cmd::none()
        }

        fn view(&self, frame: &mut Buffer) {
            let text = format!("value={}", self.value);
            frame.put_str(0, 0, &text, crate::frame::Style::new(), frame.width());
        }

        fn on_shutdown(&mut self) {
            self.shut_down = true;
        }
    }

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c)))
    }

    #[test]
    fn init_records_tick_rate() {
        let mut sim = ProgramSimulator::new(Counter::default());
        sim.init();
        assert_eq!(sim.tick_rate(), Some(Duration::from_millis(16)));
        sim.advance_ticks(3);
        assert_eq!(sim.model().ticks, 3);
    }

    #[test]
    fn events_update_and_frames_capture() {
        let mut sim = ProgramSimulator::new(Counter::default());
        sim.init();
        sim.inject_events(&[key('+'), key('+')]);
        assert!(sim.capture_frame(20, 2).contains_text("value=2"));
        assert_eq!(sim.frames().len(), 1);
    }

    #[test]
    fn quit_stops_and_shuts_down() {
        let mut sim = ProgramSimulator::new(Counter::default());
        sim.inject_events(&[key('q'), key('+')]);
        assert!(!sim.is_running());
        assert!(sim.model().shut_down);
        assert_eq!(sim.model().value, 0);
        assert!(sim.command_log().contains(&CmdRecord::Quit));
    }

    #[test]
    fn coalesced_burst_dispatches_once() {
        let mut sim = ProgramSimulator::new(Counter::default());
        let mut burst = Vec::new();
        for i in 0..10 {
            burst.push(Event::Mouse(MouseEvent::new(MouseEventKind::Moved, i, 0)));
            burst.push(Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, i, 0)));
        }
        sim.inject_coalesced(&burst);
        assert_eq!(sim.model().moves, 1);
        assert_eq!(sim.model().wheel, 10);
    }
}
