#![forbid(unsafe_code)]

//! End-to-end scenarios for the overflow tag filter, checked against the
//! rendered buffer text.

use tagflow_core::event::{Event, KeyCode};
use tagflow_core::geometry::Rect;
use tagflow_labels::{LabelPair, LabelSelectorLinks, LabelSet, LinkContext};
use tagflow_render::frame::Frame;
use tagflow_widgets::tag_overflow::SEARCH_PLACEHOLDER;
use tagflow_widgets::{
    Disclosure, StatefulWidget, TagOverflow, TagOverflowAction, TagOverflowConfig,
    TagOverflowState,
};

const WIDTH: u16 = 80;
const HEIGHT: u16 = 24;

fn numbered(n: usize) -> LabelSet {
    (1..=n)
        .map(|i| (format!("tag{i}"), format!("value{i}")))
        .collect()
}

fn render(state: &mut TagOverflowState) -> Frame {
    let mut frame = Frame::new(WIDTH, HEIGHT);
    TagOverflow::new().render(Rect::new(0, 0, WIDTH, HEIGHT), &mut frame, state);
    frame
}

fn screen(frame: &Frame) -> String {
    frame.buffer.to_text()
}

fn type_text(state: &mut TagOverflowState, text: &str) -> Option<TagOverflowAction> {
    let mut last = None;
    for c in text.chars() {
        last = state.handle_event(&Event::key(KeyCode::Char(c)));
    }
    last
}

#[test]
fn scenario_a_partition_and_inline_row() {
    let mut state = TagOverflowState::new(numbered(10));
    let view = state.partition();
    let keys = |pairs: &[LabelPair]| pairs.iter().map(|p| p.key.clone()).collect::<Vec<_>>();
    assert_eq!(keys(view.visible), ["tag1", "tag2"]);
    assert_eq!(keys(view.overflow), ["tag3", "tag4", "tag5", "tag6", "tag7"]);
    assert_eq!(keys(view.remaining), ["tag8", "tag9", "tag10"]);
    assert_eq!(view.hidden_count, 8);

    let frame = render(&mut state);
    let row = frame.buffer.row_text(0);
    assert!(row.contains("tag1: value1"));
    assert!(row.contains("tag2: value2"));
    assert!(row.contains("+8"));
    assert!(!row.contains("tag3"));
    assert_eq!(frame.buffer.row_text(1).trim(), "");
}

#[test]
fn scenario_b_overflow_then_modal() {
    let mut state = TagOverflowState::new(numbered(10));
    render(&mut state);
    assert!(state.toggle_overflow());

    let popover = screen(&render(&mut state));
    for i in 3..=7 {
        assert!(popover.contains(&format!("tag{i}: value{i}")), "missing tag{i}");
    }
    assert!(popover.contains("+3"));
    assert!(!popover.contains("tag8"));

    assert!(state.open_modal());
    assert_eq!(state.search_query(), "");
    let modal = screen(&render(&mut state));
    assert!(modal.contains("All Tags"));
    assert!(modal.contains(SEARCH_PLACEHOLDER));
    assert!(modal.contains("tag1: value1"));
    assert!(modal.contains("tag10: value10"));
}

#[test]
fn scenario_c_search_narrows_to_one_tag() {
    let mut state = TagOverflowState::new(numbered(10));
    state.toggle_overflow();
    state.open_modal();
    assert_eq!(
        type_text(&mut state, "tag3"),
        Some(TagOverflowAction::QueryChanged("tag3".into()))
    );

    let filtered = state.filtered_view();
    assert_eq!(filtered.as_slice(), [LabelPair::new("tag3", "value3")]);

    let frame = render(&mut state);
    let text = screen(&frame);
    assert!(text.contains("tag3: value3"));
    assert!(!text.contains("tag10"));
    assert!(!text.contains(SEARCH_PLACEHOLDER));
    assert!(frame.cursor_position.is_some());
}

#[test]
fn scenario_c_search_is_case_insensitive() {
    let mut state = TagOverflowState::new(numbered(10));
    state.set_search_query("TAG3");
    let upper = state.filtered_view();
    state.set_search_query("tag3");
    assert_eq!(upper, state.filtered_view());
}

#[test]
fn scenario_d_empty_labels_render_nothing() {
    let mut state = TagOverflowState::new(LabelSet::new());
    let frame = render(&mut state);
    assert_eq!(screen(&frame).trim(), "");
    assert!(!state.toggle_overflow());
    assert!(!state.open_modal());
    assert_eq!(state.handle_event(&Event::click(0, 0)), None);
    assert_eq!(state.handle_event(&Event::key(KeyCode::Enter)), None);
}

#[test]
fn scenario_e_exactly_max_visible() {
    let mut state = TagOverflowState::new(numbered(2));
    let frame = render(&mut state);
    let row = frame.buffer.row_text(0);
    assert!(row.contains("tag1: value1"));
    assert!(row.contains("tag2: value2"));
    assert!(!row.contains('+'));
    assert_eq!(state.hidden_count(), 0);
    assert!(!state.toggle_overflow());
}

#[test]
fn modal_list_scrolls_with_selection() {
    let mut state = TagOverflowState::new(numbered(40));
    state.toggle_overflow();
    state.open_modal();
    for _ in 0..30 {
        state.handle_event(&Event::key(KeyCode::Down));
    }
    let frame = render(&mut state);
    assert_eq!(state.selected().map(|p| p.key.as_str()), Some("tag31"));
    let modal = frame.buffer.text_in(Rect::new(0, 0, WIDTH, HEIGHT).centered(60, 16));
    assert!(modal.contains("tag31: value31"));
    assert!(modal.contains("tag20: value20"));
    assert!(!modal.contains("tag19: value19"));
}

#[test]
fn no_match_message_in_modal() {
    let mut state = TagOverflowState::new(numbered(10));
    state.toggle_overflow();
    state.open_modal();
    type_text(&mut state, "zzz");
    let text = screen(&render(&mut state));
    assert!(text.contains("No matching tags"));
    assert_eq!(state.handle_event(&Event::key(KeyCode::Enter)), None);
}

#[test]
fn narrow_area_keeps_button_visible() {
    let mut state = TagOverflowState::new(numbered(10));
    let mut frame = Frame::new(16, 4);
    TagOverflow::new().render(Rect::new(0, 0, 16, 4), &mut frame, &mut state);
    let row = frame.buffer.row_text(0);
    assert!(row.trim_end().ends_with("+8"));
}

#[test]
fn zero_sized_area_draws_nothing_and_clears_hits() {
    let mut state = TagOverflowState::new(numbered(10));
    render(&mut state);
    let mut frame = Frame::new(0, 0);
    TagOverflow::new().render(Rect::new(0, 0, 0, 0), &mut frame, &mut state);
    assert_eq!(state.hit_test(0, 0), None);
}

#[test]
fn rendered_tags_carry_resolved_links() {
    let mut state = TagOverflowState::new(LabelSet::from_pairs(vec![
        LabelPair::new("app", "web server"),
        LabelPair::new("tekton.dev/pipeline", "build"),
    ]))
    .with_link_resolver(LabelSelectorLinks::default())
    .with_link_context(LinkContext::new().with_namespace("ci"));

    let frame = render(&mut state);
    let id = frame.buffer.get(1, 0).unwrap().attrs.link_id();
    assert_eq!(
        frame.links.get(id),
        Some("/namespaces/ci/pipelineruns?labelSelector=app%3Dweb%20server")
    );
    assert_eq!(frame.links.len(), 2);
    assert!(
        frame
            .links
            .urls()
            .iter()
            .any(|u| u.ends_with("labelSelector=tekton.dev%2Fpipeline%3Dbuild"))
    );
}

#[test]
fn mouse_walkthrough_reaches_modal() {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut state = TagOverflowState::with_config(
        numbered(10),
        TagOverflowConfig::new().close_overflow_on_tag_click(true),
    )
    .on_tag_click(move |k, _| sink.borrow_mut().push(k.to_owned()));

    let frame = render(&mut state);
    let row = frame.buffer.row_text(0);
    let plus = row.find("+8").unwrap() as u16;
    assert_eq!(
        state.handle_event(&Event::click(plus, 0)),
        Some(TagOverflowAction::OverflowToggled(true))
    );

    let frame = render(&mut state);
    let (more_y, more_x) = (0..HEIGHT)
        .find_map(|y| {
            let line = frame.buffer.row_text(y);
            line.find("+3").map(|x| (y, line[..x].chars().count() as u16))
        })
        .unwrap();
    assert_eq!(
        state.handle_event(&Event::click(more_x, more_y)),
        Some(TagOverflowAction::ModalOpened)
    );
    assert_eq!(state.disclosure(), Disclosure::ModalOpen);

    render(&mut state);
    assert_eq!(
        state.handle_event(&Event::click(0, HEIGHT - 1)),
        Some(TagOverflowAction::ModalClosed)
    );

    render(&mut state);
    let action = state.handle_event(&Event::click(2, 0));
    assert!(matches!(action, Some(TagOverflowAction::Activated { .. })));
    assert_eq!(*seen.borrow(), ["tag1"]);
}
