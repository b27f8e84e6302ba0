#![allow(clippy::float_cmp)]

use super::*;
use crate::doc::{CardElement, ElementContent, ElementKind};

fn shape(id: &str, x: f64, y: f64, w: f64, h: f64) -> CardElement {
    CardElement::new(id, ElementContent::default_for(ElementKind::Shape), x, y).sized(w, h)
}

fn page_with(elements: Vec<CardElement>) -> CardPage {
    CardPage { elements, ..CardPage::new("front") }
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// --- ResizeAnchor ---

#[test]
fn anchor_edges() {
    assert!(ResizeAnchor::Nw.moves_left() && ResizeAnchor::Nw.moves_top());
    assert!(ResizeAnchor::Se.moves_right() && ResizeAnchor::Se.moves_bottom());
    assert!(!ResizeAnchor::N.moves_left() && !ResizeAnchor::N.moves_right());
    assert!(!ResizeAnchor::E.moves_top() && !ResizeAnchor::E.moves_bottom());
    assert!(ResizeAnchor::N.is_vertical_edge());
    assert!(ResizeAnchor::S.is_vertical_edge());
    assert!(!ResizeAnchor::E.is_vertical_edge());
}

#[test]
fn eight_distinct_anchors() {
    let r = Rect::new(0.0, 0.0, 100.0, 50.0);
    let positions: Vec<Point> = ResizeAnchor::ALL.iter().map(|a| a.position(&r)).collect();
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn anchor_positions() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(ResizeAnchor::Nw.position(&r), pt(10.0, 20.0));
    assert_eq!(ResizeAnchor::N.position(&r), pt(60.0, 20.0));
    assert_eq!(ResizeAnchor::E.position(&r), pt(110.0, 45.0));
    assert_eq!(ResizeAnchor::Se.position(&r), pt(110.0, 70.0));
    assert_eq!(ResizeAnchor::Sw.position(&r), pt(10.0, 70.0));
}

#[test]
fn anchor_cursors() {
    assert_eq!(ResizeAnchor::N.cursor(), "ns-resize");
    assert_eq!(ResizeAnchor::W.cursor(), "ew-resize");
    assert_eq!(ResizeAnchor::Ne.cursor(), "nesw-resize");
    assert_eq!(ResizeAnchor::Se.cursor(), "nwse-resize");
}

// --- hit_test ---

#[test]
fn miss_on_empty_page() {
    let page = page_with(Vec::new());
    assert_eq!(hit_test(pt(5.0, 5.0), &page, &Camera::default(), None), None);
}

#[test]
fn body_hit() {
    let page = page_with(vec![shape("a", 10.0, 10.0, 50.0, 50.0)]);
    let hit = hit_test(pt(30.0, 30.0), &page, &Camera::default(), None);
    assert_eq!(hit, Some(Hit { element_id: "a".into(), part: HitPart::Body }));
}

#[test]
fn topmost_element_wins() {
    let page = page_with(vec![shape("bottom", 0.0, 0.0, 100.0, 100.0), shape("top", 20.0, 20.0, 40.0, 40.0)]);
    let hit = hit_test(pt(30.0, 30.0), &page, &Camera::default(), None);
    assert_eq!(hit.map(|h| h.element_id), Some("top".to_owned()));
    let hit = hit_test(pt(90.0, 90.0), &page, &Camera::default(), None);
    assert_eq!(hit.map(|h| h.element_id), Some("bottom".to_owned()));
}

#[test]
fn handles_only_for_selected_element() {
    let page = page_with(vec![shape("a", 10.0, 10.0, 50.0, 50.0)]);
    let cam = Camera::default();
    let unselected = hit_test(pt(60.0, 60.0), &page, &cam, None);
    assert_eq!(unselected.map(|h| h.part), Some(HitPart::Body));
    let selected = hit_test(pt(60.0, 60.0), &page, &cam, Some("a"));
    assert_eq!(selected.map(|h| h.part), Some(HitPart::ResizeHandle(ResizeAnchor::Se)));
}

#[test]
fn handle_hit_just_outside_body() {
    let page = page_with(vec![shape("a", 10.0, 10.0, 50.0, 50.0)]);
    let hit = hit_test(pt(6.0, 6.0), &page, &Camera::default(), Some("a"));
    assert_eq!(hit.map(|h| h.part), Some(HitPart::ResizeHandle(ResizeAnchor::Nw)));
}

#[test]
fn handle_slop_shrinks_with_zoom() {
    let page = page_with(vec![shape("a", 10.0, 10.0, 50.0, 50.0)]);
    let zoomed = Camera { zoom: 3.0, ..Camera::default() };
    // 5 units off the corner is 15 screen pixels at 3x: outside the 6px slop.
    let hit = hit_test(pt(5.0, 5.0), &page, &zoomed, Some("a"));
    assert_eq!(hit, None);
    let hit = hit_test(pt(5.0, 5.0), &page, &Camera::default(), Some("a"));
    assert_eq!(hit.map(|h| h.part), Some(HitPart::ResizeHandle(ResizeAnchor::Nw)));
}

#[test]
fn unsized_text_uses_estimated_bounds() {
    let text = CardElement::new("t", ElementContent::default_for(ElementKind::Text), 0.0, 0.0);
    let (w, h) = text.resolved_size();
    let page = page_with(vec![text]);
    assert!(hit_test(pt(w - 1.0, h - 1.0), &page, &Camera::default(), None).is_some());
    assert!(hit_test(pt(w + 5.0, h + 5.0), &page, &Camera::default(), None).is_none());
}

#[test]
fn stale_selection_is_ignored() {
    let page = page_with(vec![shape("a", 10.0, 10.0, 50.0, 50.0)]);
    let hit = hit_test(pt(30.0, 30.0), &page, &Camera::default(), Some("gone"));
    assert_eq!(hit.map(|h| h.part), Some(HitPart::Body));
}
