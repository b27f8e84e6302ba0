#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_equality() {
    assert_eq!(Point::new(1.0, 2.0), Point::new(1.0, 2.0));
    assert_ne!(Point::new(1.0, 2.0), Point::new(1.0, 3.0));
}

// --- Rect ---

#[test]
fn rect_edges_and_center() {
    let r = Rect::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(r.right(), 110.0);
    assert_eq!(r.bottom(), 70.0);
    assert!(point_approx_eq(r.center(), Point::new(60.0, 45.0)));
}

#[test]
fn rect_contains_is_inclusive() {
    let r = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(r.contains(Point::new(0.0, 0.0)));
    assert!(r.contains(Point::new(10.0, 10.0)));
    assert!(r.contains(Point::new(5.0, 5.0)));
    assert!(!r.contains(Point::new(10.1, 5.0)));
    assert!(!r.contains(Point::new(5.0, -0.1)));
}

#[test]
fn rect_scaled_scales_origin_and_size() {
    let r = Rect::new(10.0, 20.0, 30.0, 40.0).scaled(2.0);
    assert_eq!(r, Rect::new(20.0, 40.0, 60.0, 80.0));
}

// --- Camera defaults ---

#[test]
fn default_camera_is_identity() {
    let cam = Camera::default();
    assert_eq!(cam.pan_x, 0.0);
    assert_eq!(cam.pan_y, 0.0);
    assert_eq!(cam.zoom, 1.0);
}

// --- Coordinate conversions ---

#[test]
fn screen_to_world_identity() {
    let cam = Camera::default();
    let p = Point::new(42.0, 17.0);
    assert!(point_approx_eq(cam.screen_to_world(p), p));
}

#[test]
fn screen_to_world_with_pan_and_zoom() {
    let cam = Camera { pan_x: 20.0, pan_y: 30.0, zoom: 2.0 };
    let w = cam.screen_to_world(Point::new(120.0, 70.0));
    assert!(point_approx_eq(w, Point::new(50.0, 20.0)));
}

#[test]
fn world_to_screen_inverts_screen_to_world() {
    let cam = Camera { pan_x: 16.0, pan_y: 16.0, zoom: 1.44 };
    let world = Point::new(123.0, 45.0);
    let back = cam.screen_to_world(cam.world_to_screen(world));
    assert!(point_approx_eq(back, world));
}

#[test]
fn screen_dist_to_world_divides_by_zoom() {
    let cam = Camera { zoom: 2.0, ..Camera::default() };
    assert_eq!(cam.screen_dist_to_world(10.0), 5.0);
    let cam = Camera { zoom: 0.5, ..Camera::default() };
    assert_eq!(cam.screen_dist_to_world(10.0), 20.0);
}

// --- Zoom stepping ---

#[test]
fn zoom_in_multiplies_by_step() {
    let mut cam = Camera::default();
    cam.zoom_in();
    assert!(approx_eq(cam.zoom, 1.2));
    cam.zoom_in();
    assert!(approx_eq(cam.zoom, 1.44));
}

#[test]
fn zoom_out_divides_by_step() {
    let mut cam = Camera::default();
    cam.zoom_out();
    assert!(approx_eq(cam.zoom, 1.0 / 1.2));
}

#[test]
fn zoom_in_caps_at_max() {
    let mut cam = Camera::default();
    for _ in 0..50 {
        cam.zoom_in();
    }
    assert_eq!(cam.zoom, ZOOM_MAX);
}

#[test]
fn zoom_out_floors_at_min() {
    let mut cam = Camera::default();
    for _ in 0..50 {
        cam.zoom_out();
    }
    assert_eq!(cam.zoom, ZOOM_MIN);
}

#[test]
fn zoom_always_within_bounds() {
    let mut cam = Camera::default();
    for i in 0..40 {
        if i % 3 == 0 { cam.zoom_out() } else { cam.zoom_in() }
        assert!((ZOOM_MIN..=ZOOM_MAX).contains(&cam.zoom));
    }
}

#[test]
fn zoom_reset_returns_to_one() {
    let mut cam = Camera::default();
    cam.zoom_in();
    cam.zoom_in();
    cam.zoom_reset();
    assert_eq!(cam.zoom, 1.0);
}

#[test]
fn set_zoom_clamps() {
    let mut cam = Camera::default();
    cam.set_zoom(10.0);
    assert_eq!(cam.zoom, ZOOM_MAX);
    cam.set_zoom(0.01);
    assert_eq!(cam.zoom, ZOOM_MIN);
    cam.set_zoom(1.5);
    assert_eq!(cam.zoom, 1.5);
}

#[test]
fn set_zoom_ignores_non_finite() {
    let mut cam = Camera::default();
    cam.set_zoom(f64::NAN);
    assert_eq!(cam.zoom, 1.0);
    cam.set_zoom(f64::INFINITY);
    assert_eq!(cam.zoom, 1.0);
}
