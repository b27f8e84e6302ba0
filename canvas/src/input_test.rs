#![allow(clippy::float_cmp)]

use super::*;

#[test]
fn modifiers_default_none_held() {
    let m = Modifiers::default();
    assert!(!m.shift && !m.ctrl && !m.alt && !m.meta);
}

#[test]
fn key_new_keeps_browser_name() {
    assert_eq!(Key::new("ArrowLeft"), Key("ArrowLeft".to_owned()));
}

#[test]
fn ui_state_defaults() {
    let ui = UiState::default();
    assert_eq!(ui.selected_element_id, None);
    assert_eq!(ui.selected_page_index, 0);
    assert!(ui.show_grid);
    assert!(ui.show_rulers);
    assert_eq!(ui.pending_delete, None);
}

#[test]
fn input_state_default_is_idle() {
    assert_eq!(InputState::default(), InputState::Idle);
    assert_eq!(InputState::Idle.active_id(), None);
}

#[test]
fn dragging_active_id() {
    let state = InputState::Dragging { id: "logo".into(), offset: Point::new(1.0, 2.0), orig_x: 0.0, orig_y: 0.0 };
    assert_eq!(state.active_id(), Some("logo"));
}

#[test]
fn resizing_active_id() {
    let state = InputState::Resizing {
        id: "qr_code".into(),
        anchor: ResizeAnchor::Se,
        start_screen: Point::new(0.0, 0.0),
        orig: Rect::new(0.0, 0.0, 80.0, 80.0),
        orig_size: (Some(80.0), Some(80.0)),
        aspect: 1.0,
    };
    assert_eq!(state.active_id(), Some("qr_code"));
}
