#![forbid(unsafe_code)]

//! End-to-end scenarios driven through the program simulator.

use geoguide::app::{GuideConfig, GuideModel, GuideMsg};
use geoguide::event::{Event, KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use geoguide::simulator::ProgramSimulator;
use geoguide::views::{chrome, nav, overlay};
use geoguide_content::{Guide, disclosure_key};
use geoguide_core::section::SectionId;

const WIDE: (u16, u16) = (120, 40);
const NARROW: (u16, u16) = (80, 24);

fn simulator((width, height): (u16, u16)) -> ProgramSimulator<GuideModel> {
    let guide = Guide::load().expect("payload loads");
    let model = GuideModel::new(guide, GuideConfig::default()).expect("model builds");
    let mut sim = ProgramSimulator::new(model);
    sim.inject_event(Event::Resize { width, height });
    sim.init();
    sim
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code))
}

fn click(x: u16, y: u16) -> Event {
    Event::Mouse(MouseEvent::new(MouseEventKind::Down(MouseButton::Left), x, y))
}

fn hover(x: u16, y: u16) -> Event {
    Event::Mouse(MouseEvent::new(MouseEventKind::Moved, x, y))
}

/// Scroll so that document row `row` is at the top of the viewport, with
/// the wheel over the scrollbar so no cell is hovered.
fn scroll_row_to_top(sim: &mut ProgramSimulator<GuideModel>, row: u32) {
    let bar = sim.model().layout().scrollbar;
    let lines = i64::from(row) - i64::from(sim.model().scroll());
    sim.inject_event(Event::Wheel {
        lines: i32::try_from(lines).unwrap(),
        x: bar.x,
        y: bar.y,
    });
}

/// Tick until nothing is animating.
fn settle(sim: &mut ProgramSimulator<GuideModel>) {
    for _ in 0..200 {
        if !sim.model().is_animating() {
            break;
        }
        sim.advance_ticks(1);
    }
    assert!(!sim.model().is_animating());
}

#[test]
fn hovering_reykjavik_shows_tooltip_and_click_opens_overlay() {
    let mut sim = simulator(WIDE);
    let block = sim.model().document().map_block().expect("guide has a map");
    scroll_row_to_top(&mut sim, block.top);
    let (x, y) = sim
        .model()
        .marker_position("Reykjavik")
        .expect("marker on screen");

    sim.inject_event(hover(x, y));
    assert_eq!(sim.model().city_map().hovered(), Some("Reykjavik"));
    assert!(sim.capture_frame(WIDE.0, WIDE.1).contains_text("Reykjavik, Iceland"));

    sim.inject_event(hover(1, 1));
    assert_eq!(sim.model().city_map().hovered(), None);
    assert!(!sim.capture_frame(WIDE.0, WIDE.1).contains_text("Reykjavik, Iceland"));

    sim.inject_event(click(x, y));
    let selected = sim.model().city_map().selected().expect("overlay open");
    assert_eq!(selected.name, "Reykjavik");
    let frame = sim.capture_frame(WIDE.0, WIDE.1);
    assert!(frame.contains_text("2,000 MW thermal"));
    assert!(frame.contains_text("230,000 residents"));
    assert!(frame.contains_text("1.2M tons/year"));
}

#[test]
fn city_overlay_closes_three_ways() {
    let mut sim = simulator(WIDE);
    let block = sim.model().document().map_block().unwrap();
    scroll_row_to_top(&mut sim, block.top);
    let (x, y) = sim.model().marker_position("Reykjavik").unwrap();
    let card = overlay::card_rect(sim.model().layout().screen);

    sim.inject_event(click(x, y));
    sim.inject_event(click(card.x + 2, card.y + 3));
    assert!(sim.model().city_map().selected().is_some(), "card clicks are swallowed");
    sim.inject_event(click(0, card.y));
    assert!(sim.model().city_map().selected().is_none(), "backdrop closes");

    sim.inject_event(click(x, y));
    let close = overlay::close_rect(card);
    sim.inject_event(click(close.x + 1, close.y));
    assert!(sim.model().city_map().selected().is_none(), "close control closes");

    sim.inject_event(click(x, y));
    let scroll = sim.model().scroll();
    sim.inject_event(Event::Wheel { lines: 3, x: 1, y: 1 });
    assert_eq!(sim.model().scroll(), scroll, "document is inert behind the overlay");
    sim.inject_event(key(KeyCode::Escape));
    assert!(sim.model().city_map().selected().is_none(), "Escape closes");
}

#[test]
fn click_cell_reveals_detail_over_ticks() {
    let mut sim = simulator(WIDE);
    let key_id = disclosure_key("individual-heating", "hvac", "heat-pumps");
    let index = sim.model().document().cell_position(&key_id).unwrap();
    let collapsed = sim.model().document().cell_span(index).unwrap();
    scroll_row_to_top(&mut sim, collapsed.offset);
    let y = sim.model().cell_header_row(&key_id).expect("header on screen");
    let x = sim.model().layout().doc.x + 4;

    assert!(sim.capture_frame(WIDE.0, WIDE.1).contains_text("Learn About Heat Pumps"));
    sim.inject_event(click(x, y));
    assert!(sim.model().cells().get(&key_id).unwrap().is_open());

    let mut heights = Vec::new();
    for _ in 0..30 {
        sim.advance_ticks(1);
        heights.push(sim.model().document().cell_span(index).unwrap().height);
    }
    let full = *heights.last().unwrap();
    assert!(full > collapsed.height + 3);
    assert!(heights.windows(2).all(|w| w[0] <= w[1]), "reveal never shrinks: {heights:?}");
    assert!(
        heights.iter().any(|&h| h > collapsed.height && h < full),
        "reveal passes through intermediate heights: {heights:?}"
    );
    assert!(!sim.model().cells().is_animating());
    assert!(sim.capture_frame(WIDE.0, WIDE.1).contains_text("Hide Details"));

    let y = sim.model().cell_header_row(&key_id).unwrap();
    sim.inject_event(click(x, y));
    sim.advance_ticks(30);
    assert_eq!(sim.model().document().cell_span(index).unwrap(), collapsed);
    assert!(sim.capture_frame(WIDE.0, WIDE.1).contains_text("Learn About Heat Pumps"));
}

#[test]
fn hover_cell_follows_pointer_and_ignores_clicks() {
    let mut sim = simulator(WIDE);
    let key_id = disclosure_key("introduction", "concepts", "temperature");
    let index = sim.model().document().cell_position(&key_id).unwrap();
    let span = sim.model().document().cell_span(index).unwrap();
    scroll_row_to_top(&mut sim, span.offset);
    let y = sim.model().cell_header_row(&key_id).unwrap();
    let x = sim.model().layout().doc.x + 4;

    sim.inject_event(click(x, y));
    assert!(!sim.model().cells().get(&key_id).unwrap().is_open());

    sim.inject_event(hover(x, y));
    assert!(sim.model().cells().get(&key_id).unwrap().is_open());
    sim.advance_ticks(30);
    assert!(sim.model().document().cell_span(index).unwrap().height > span.height);

    sim.inject_event(hover(x, sim.model().layout().footer.y));
    assert!(!sim.model().cells().get(&key_id).unwrap().is_open());
    sim.advance_ticks(30);
    assert_eq!(sim.model().document().cell_span(index).unwrap(), span);
}

#[test]
fn hover_cell_closes_when_keyboard_scrolls_it_away() {
    let mut sim = simulator(WIDE);
    let key_id = disclosure_key("introduction", "concepts", "temperature");
    let index = sim.model().document().cell_position(&key_id).unwrap();
    let span = sim.model().document().cell_span(index).unwrap();
    scroll_row_to_top(&mut sim, span.offset);
    let y = sim.model().cell_header_row(&key_id).unwrap();
    let x = sim.model().layout().doc.x + 4;

    sim.inject_event(hover(x, y));
    settle(&mut sim);
    assert!(sim.model().cells().get(&key_id).unwrap().is_open());

    sim.inject_events(&[key(KeyCode::PageDown), key(KeyCode::PageDown)]);
    settle(&mut sim);
    assert_eq!(sim.model().cell_header_row(&key_id), None);
    assert!(!sim.model().cells().get(&key_id).unwrap().is_open());
    assert_eq!(sim.model().document().cell_span(index).unwrap(), span);
}

#[test]
fn resize_mid_scroll_still_lands_on_the_section() {
    let mut sim = simulator(WIDE);
    sim.send(GuideMsg::NavigateTo("costs".into()));
    sim.advance_ticks(3);
    assert!(sim.model().is_scrolling());
    sim.inject_event(Event::Resize {
        width: 60,
        height: 30,
    });
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("costs")));
}

#[test]
fn navigating_while_a_cell_opens_lands_on_the_section() {
    let mut sim = simulator(WIDE);
    let key_id = disclosure_key("individual-heating", "hvac", "heat-pumps");
    let index = sim.model().document().cell_position(&key_id).unwrap();
    let collapsed = sim.model().document().cell_span(index).unwrap();
    scroll_row_to_top(&mut sim, collapsed.offset);
    let y = sim.model().cell_header_row(&key_id).unwrap();
    sim.inject_event(click(sim.model().layout().doc.x + 4, y));
    assert!(sim.model().cells().is_animating());

    sim.send(GuideMsg::NavigateTo("costs".into()));
    settle(&mut sim);
    assert!(sim.model().document().cell_span(index).unwrap().height > collapsed.height);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("costs")));
}

#[test]
fn every_contents_entry_round_trips_through_the_tracker() {
    let mut sim = simulator(WIDE);
    let ids: Vec<SectionId> = sim
        .model()
        .nav()
        .registry()
        .iter()
        .map(|s| s.id.clone())
        .collect();
    for id in ids.iter().rev().chain(ids.iter()) {
        sim.send(GuideMsg::NavigateTo(id.to_string()));
        settle(&mut sim);
        assert_eq!(sim.model().active_section().as_ref(), Some(id));
        assert_eq!(sim.model().highlighted().as_ref(), Some(id));
    }
}

#[test]
fn smooth_scroll_reports_intermediate_positions() {
    let mut sim = simulator(WIDE);
    let passes = sim.model().tracker().passes();
    sim.send(GuideMsg::NavigateTo("costs".into()));
    assert!(sim.model().is_scrolling());
    let mut positions = Vec::new();
    while sim.model().is_scrolling() {
        sim.advance_ticks(1);
        positions.push(sim.model().scroll());
    }
    assert!(positions.len() > 5);
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
    assert!(sim.model().tracker().passes() > passes + 5);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("costs")));
}

#[test]
fn clicking_a_sidebar_entry_navigates() {
    let mut sim = simulator(WIDE);
    let panel = sim.model().layout().sidebar.expect("docked sidebar");
    let position = sim.model().nav().registry().position("benefits").unwrap();
    let y = nav::list_area(panel).y + u16::try_from(position).unwrap();
    let frame = sim.capture_frame(WIDE.0, WIDE.1);
    assert!(frame.row_text(y).contains("Benefits"));
    sim.inject_event(click(panel.x + 4, y));
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("benefits")));
    assert!(sim.model().nav().is_open(), "docked panel stays open");
}

#[test]
fn hero_call_to_action_goes_to_introduction() {
    let mut sim = simulator(WIDE);
    let frame = sim.capture_frame(WIDE.0, WIDE.1);
    let (x, y) = frame.find_text("Start Learning").expect("call to action drawn");
    sim.inject_event(click(x, y));
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("introduction")));
}

#[test]
fn narrow_contents_overlay_toggles_and_closes_on_select() {
    let mut sim = simulator(NARROW);
    assert!(!sim.model().nav().is_open());
    assert!(!sim.capture_frame(NARROW.0, NARROW.1).contains_text("CONTENTS"));

    let toggle = chrome::toggle_rect(sim.model().layout().header);
    sim.inject_event(click(toggle.x + 1, toggle.y));
    assert!(sim.model().nav().is_open());
    assert!(sim.capture_frame(NARROW.0, NARROW.1).contains_text("CONTENTS"));

    sim.inject_event(click(1, 5));
    assert!(!sim.model().nav().is_open(), "backdrop click closes the overlay");

    sim.inject_event(key(KeyCode::Char('t')));
    assert!(sim.model().nav().is_open());
    sim.inject_event(key(KeyCode::Escape));
    assert!(!sim.model().nav().is_open());

    sim.inject_event(key(KeyCode::Char('t')));
    sim.inject_events(&[key(KeyCode::Down), key(KeyCode::Down), key(KeyCode::Enter)]);
    assert!(!sim.model().nav().is_open(), "selection closes the overlay");
    settle(&mut sim);
    assert_eq!(
        sim.model().active_section(),
        Some(SectionId::new("district-heating"))
    );
}

#[test]
fn bracket_keys_step_through_sections() {
    let mut sim = simulator(WIDE);
    sim.inject_event(key(KeyCode::Char(']')));
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("introduction")));
    sim.inject_event(key(KeyCode::Char(']')));
    settle(&mut sim);
    assert_eq!(
        sim.model().active_section(),
        Some(SectionId::new("individual-heating"))
    );
    sim.inject_event(key(KeyCode::Char('[')));
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("introduction")));
}

#[test]
fn wheel_burst_runs_the_tracker_once() {
    let mut sim = simulator(WIDE);
    let passes = sim.model().tracker().passes();
    let burst: Vec<Event> = (0..10)
        .map(|_| Event::Mouse(MouseEvent::new(MouseEventKind::ScrollDown, 5, 5)))
        .collect();
    sim.inject_coalesced(&burst);
    assert_eq!(sim.model().scroll(), 10);
    assert_eq!(sim.model().tracker().passes(), passes + 1);
}

#[test]
fn resize_keeps_the_active_section() {
    let mut sim = simulator(WIDE);
    sim.send(GuideMsg::NavigateTo("benefits".into()));
    settle(&mut sim);
    sim.inject_event(Event::Resize {
        width: NARROW.0,
        height: NARROW.1,
    });
    assert!(!sim.model().nav().is_open());
    assert!(sim.model().scroll() <= sim.model().document().max_scroll(sim.model().layout().viewport_height()));
    sim.send(GuideMsg::NavigateTo("benefits".into()));
    settle(&mut sim);
    assert_eq!(sim.model().active_section(), Some(SectionId::new("benefits")));
}

#[test]
fn start_section_opens_there() {
    let guide = Guide::load().unwrap();
    let config = GuideConfig {
        start_section: Some("homeowner-faqs".into()),
        ..GuideConfig::default()
    };
    let mut sim = ProgramSimulator::new(GuideModel::new(guide, config).unwrap());
    sim.inject_event(Event::Resize {
        width: WIDE.0,
        height: WIDE.1,
    });
    sim.init();
    assert_eq!(
        sim.model().active_section(),
        Some(SectionId::new("homeowner-faqs"))
    );
    let frame = sim.capture_frame(WIDE.0, WIDE.1);
    assert!(frame.row_text(0).contains("3.5"));
}

#[test]
fn quitting_tears_the_tracker_down() {
    let mut sim = simulator(NARROW);
    sim.inject_event(key(KeyCode::Char('q')));
    assert!(!sim.is_running());
    assert_eq!(
        sim.model().tracker().phase(),
        geoguide_core::tracker::TrackerPhase::TornDown
    );
}
