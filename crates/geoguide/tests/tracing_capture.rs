#![forbid(unsafe_code)]

//! Structured log events emitted while driving the guide.
//!
//! A capturing layer records every event's message and fields so the tests
//! can assert on what the tracker and the app report, without a log file.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use geoguide::app::{GuideConfig, GuideModel, GuideMsg};
use geoguide::event::Event;
use geoguide::simulator::ProgramSimulator;
use geoguide_content::Guide;
use geoguide_core::section::SectionId;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
struct CapturedEvent {
    target: String,
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct EventCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            target: event.metadata().target().to_string(),
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

/// Run `f` with a capturing subscriber installed and return what it logged.
fn with_captured_events<F>(f: F) -> Vec<CapturedEvent>
where
    F: FnOnce(),
{
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = EventCapture {
        events: Arc::clone(&events),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

fn running_guide() -> ProgramSimulator<GuideModel> {
    let guide = Guide::load().expect("payload loads");
    let model = GuideModel::new(guide, GuideConfig::default()).expect("model builds");
    let mut sim = ProgramSimulator::new(model);
    sim.inject_event(Event::Resize {
        width: 120,
        height: 40,
    });
    sim.init();
    sim
}

#[test]
fn navigation_logs_the_active_section_change() {
    let events = with_captured_events(|| {
        let mut sim = running_guide();
        sim.send(GuideMsg::NavigateTo("benefits".into()));
        sim.advance_ticks(40);
        assert_eq!(sim.model().active_section().as_ref().map(SectionId::as_str), Some("benefits"));
    });

    let changes: Vec<_> = events
        .iter()
        .filter(|e| e.message() == "active section changed")
        .collect();
    assert!(!changes.is_empty(), "no active section change was logged");
    let last = changes.last().unwrap();
    assert_eq!(last.fields.get("section").map(String::as_str), Some("benefits"));
    assert!(last.target.starts_with("geoguide_core"));

    let navigating = events
        .iter()
        .find(|e| e.message() == "navigating")
        .expect("navigation is logged");
    assert_eq!(navigating.level, tracing::Level::INFO);
    assert_eq!(navigating.fields.get("section").map(String::as_str), Some("benefits"));
}

#[test]
fn tracker_mount_and_teardown_are_logged() {
    let events = with_captured_events(|| {
        let mut sim = running_guide();
        sim.send(GuideMsg::Quit);
        assert!(!sim.is_running());
    });

    let messages: Vec<_> = events.iter().map(CapturedEvent::message).collect();
    assert!(messages.contains(&"scroll tracker mounted"));
    assert!(messages.contains(&"scroll tracker torn down"));
    let mounted = messages.iter().position(|m| *m == "scroll tracker mounted");
    let torn = messages.iter().position(|m| *m == "scroll tracker torn down");
    assert!(mounted < torn);
}

#[test]
fn unknown_navigation_target_is_ignored_and_logged() {
    let events = with_captured_events(|| {
        let mut sim = running_guide();
        let before = sim.model().scroll();
        sim.send(GuideMsg::NavigateTo("no-such-section".into()));
        sim.advance_ticks(5);
        assert_eq!(sim.model().scroll(), before);
    });

    assert!(
        events
            .iter()
            .any(|e| e.message() == "navigation to unregistered section ignored")
    );
    assert!(!events.iter().any(|e| e.message() == "navigating"));
}
