#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use std::cell::Cell;

use super::*;

fn bare_rect(left: f64, top: f64, width: f64, height: f64) -> SceneObject {
    SceneObject { stroke_width: 0.0, ..SceneObject::rect(left, top, width, height) }
}

fn refreshed(mut obj: SceneObject) -> SceneObject {
    obj.coords = obj.calc_coords(None, &Matrix::IDENTITY, false);
    obj
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn cache_reuses_matching_key() {
    let cache = MatrixCache::default();
    let calls = Cell::new(0);
    let key = TransformKey(vec![1, 2, 3]);
    let compute = || {
        calls.set(calls.get() + 1);
        Matrix::translate(1.0, 1.0)
    };
    assert_eq!(cache.get_or_compute(key.clone(), compute), Matrix::translate(1.0, 1.0));
    assert_eq!(cache.get_or_compute(key.clone(), compute), Matrix::translate(1.0, 1.0));
    assert_eq!(calls.get(), 1);
    assert_eq!(cache.key(), Some(key));
}

#[test]
fn cache_recomputes_on_new_key() {
    let cache = MatrixCache::default();
    let calls = Cell::new(0);
    let compute = || {
        calls.set(calls.get() + 1);
        Matrix::IDENTITY
    };
    cache.get_or_compute(TransformKey(vec![1]), compute);
    cache.get_or_compute(TransformKey(vec![2]), compute);
    assert_eq!(calls.get(), 2);
    cache.invalidate();
    assert!(cache.key().is_none());
}

#[test]
fn chain_key_separates_ancestry() {
    let a = TransformKey(vec![1, 2]);
    let b = TransformKey(vec![3]);
    assert_ne!(TransformKey::chain(&[a.clone(), b.clone()]), TransformKey::chain(&[b.clone(), a.clone()]));
    assert_ne!(TransformKey::chain(&[a.clone()]), TransformKey::chain(&[a, b]));
}

#[test]
fn own_matrix_follows_property_writes() {
    let mut obj = bare_rect(0.0, 0.0, 10.0, 10.0);
    let before = obj.own_matrix();
    assert_eq!((before.e, before.f), (5.0, 5.0));
    obj.left = 100.0;
    let after = obj.own_matrix();
    assert_eq!((after.e, after.f), (105.0, 5.0));
    obj.angle = 90.0;
    assert_ne!(obj.own_matrix(), after);
}

#[test]
fn transform_key_tracks_flags() {
    let obj = SceneObject::default();
    let flipped = SceneObject { flip_x: true, ..obj.clone() };
    assert_ne!(obj.transform_key(), flipped.transform_key());
    let moved_origin = SceneObject { origin_x: crate::object::OriginX::Center, ..obj.clone() };
    assert_ne!(obj.transform_key(), moved_origin.transform_key());
}

// =============================================================================
// Corner sets
// =============================================================================

#[test]
fn a_coords_include_scale() {
    let obj = SceneObject { scale_x: 2.0, ..bare_rect(0.0, 0.0, 10.0, 10.0) };
    let c = obj.calc_a_coords(None);
    assert_eq!(c.tl, pt(0.0, 0.0));
    assert_eq!(c.tr, pt(20.0, 0.0));
    assert_eq!(c.br, pt(20.0, 10.0));
    assert_eq!(c.bl, pt(0.0, 10.0));
}

#[test]
fn a_coords_rotate_about_origin() {
    let obj = SceneObject { angle: 90.0, ..bare_rect(0.0, 0.0, 10.0, 10.0) };
    let c = obj.calc_a_coords(None);
    assert_eq!(c.tl, pt(0.0, 0.0));
    assert_eq!(c.tr, pt(0.0, 10.0));
    assert_eq!(c.br, pt(-10.0, 10.0));
}

#[test]
fn a_coords_in_parent_plane() {
    let parent = Matrix::translate(100.0, 50.0);
    let obj = bare_rect(0.0, 0.0, 10.0, 10.0);
    let c = obj.calc_a_coords(Some(&parent));
    assert_eq!(c.tl, pt(100.0, 50.0));
    assert_eq!(c.br, pt(110.0, 60.0));
}

#[test]
fn line_coords_are_padded() {
    let obj = SceneObject { padding: 5.0, ..bare_rect(0.0, 0.0, 10.0, 10.0) };
    let c = obj.calc_line_coords(None, &Matrix::IDENTITY);
    assert_eq!(c.tl, pt(-5.0, -5.0));
    assert_eq!(c.tr, pt(15.0, -5.0));
    assert_eq!(c.br, pt(15.0, 15.0));
    assert_eq!(c.bl, pt(-5.0, 15.0));
}

#[test]
fn line_coords_follow_viewport() {
    let obj = bare_rect(0.0, 0.0, 10.0, 10.0);
    let c = obj.calc_line_coords(None, &Matrix::new(2.0, 0.0, 0.0, 2.0, 5.0, 0.0));
    assert_eq!(c.tl, pt(5.0, 0.0));
    assert_eq!(c.br, pt(25.0, 20.0));
}

#[test]
fn total_angle_accumulates_parent_rotation() {
    let parent = Matrix::rotate(30.0, Point::zero());
    let obj = SceneObject { angle: 15.0, ..bare_rect(0.0, 0.0, 10.0, 10.0) };
    assert!((obj.total_angle(Some(&parent)) - 45.0).abs() < 1e-9);
    assert_eq!(obj.total_angle(None), 15.0);
}

#[test]
fn control_positions_sit_on_the_box() {
    let obj = refreshed(bare_rect(0.0, 0.0, 100.0, 100.0));
    let o = &obj.coords().o_coords;
    assert_eq!(o["br"].position, pt(100.0, 100.0));
    assert_eq!(o["ml"].position, pt(0.0, 50.0));
    assert_eq!(o["mtr"].position, pt(50.0, -40.0));
    assert_eq!(o["br"].corner.tl, pt(93.5, 93.5));
    assert_eq!(o["br"].corner.br, pt(106.5, 106.5));
    assert_eq!(o["br"].touch_corner.tl, pt(88.0, 88.0));
}

#[test]
fn control_positions_ignore_zoom_for_offsets() {
    let obj = bare_rect(0.0, 0.0, 100.0, 100.0);
    let o = obj.calc_o_coords(None, &Matrix::scale(2.0, 2.0));
    assert_eq!(o["br"].position, pt(200.0, 200.0));
    // The rotation handle offset stays in screen pixels.
    assert_eq!(o["mtr"].position, pt(100.0, -40.0));
}

#[test]
fn skip_controls_leaves_o_coords_empty() {
    let obj = bare_rect(0.0, 0.0, 10.0, 10.0);
    assert!(obj.calc_coords(None, &Matrix::IDENTITY, true).o_coords.is_empty());
}

// =============================================================================
// Queries
// =============================================================================

#[test]
fn contains_point_uses_cached_corners() {
    let obj = refreshed(bare_rect(0.0, 0.0, 10.0, 10.0));
    assert!(obj.contains_point(pt(5.0, 5.0), true));
    assert!(!obj.contains_point(pt(15.0, 5.0), false));
}

#[test]
fn stale_coords_until_refresh() {
    let mut obj = refreshed(bare_rect(0.0, 0.0, 10.0, 10.0));
    obj.left = 100.0;
    assert!(obj.contains_point(pt(5.0, 5.0), true));
    let obj = refreshed(obj);
    assert!(!obj.contains_point(pt(5.0, 5.0), true));
    assert!(obj.contains_point(pt(105.0, 5.0), true));
}

#[test]
fn bounding_rect_of_rotated_square() {
    let obj = refreshed(SceneObject {
        angle: 45.0,
        origin_x: crate::object::OriginX::Center,
        origin_y: crate::object::OriginY::Center,
        ..bare_rect(0.0, 0.0, 10.0, 10.0)
    });
    let r = obj.bounding_rect(true);
    let half_diag = 50.0f64.sqrt();
    assert!((r.width - 2.0 * half_diag).abs() < 1e-9);
    assert!((r.left + half_diag).abs() < 1e-9);
}

#[test]
fn rect_intersection_excludes_containment() {
    let obj = refreshed(bare_rect(10.0, 10.0, 10.0, 10.0));
    assert!(obj.intersects_with_rect(pt(0.0, 0.0), pt(15.0, 15.0), true));
    assert!(!obj.intersects_with_rect(pt(0.0, 0.0), pt(100.0, 100.0), true));
    assert!(obj.is_contained_within_rect(pt(0.0, 0.0), pt(100.0, 100.0), true));
    assert!(!obj.is_contained_within_rect(pt(0.0, 0.0), pt(15.0, 15.0), true));
}

#[test]
fn object_intersection_includes_containment() {
    let outer = refreshed(bare_rect(0.0, 0.0, 100.0, 100.0));
    let inner = refreshed(bare_rect(10.0, 10.0, 10.0, 10.0));
    let far = refreshed(bare_rect(500.0, 500.0, 10.0, 10.0));
    assert!(outer.intersects_with_object(&inner, true));
    assert!(inner.intersects_with_object(&outer, true));
    assert!(inner.is_contained_within_object(&outer, true));
    assert!(!outer.intersects_with_object(&far, true));
}

#[test]
fn on_screen_checks() {
    let obj = refreshed(bare_rect(0.0, 0.0, 100.0, 100.0));
    assert!(obj.is_on_screen(pt(-50.0, -50.0), pt(50.0, 50.0)));
    assert!(obj.is_partially_on_screen(pt(-50.0, -50.0), pt(50.0, 50.0)));
    // Viewport entirely inside the object.
    assert!(obj.is_on_screen(pt(40.0, 40.0), pt(60.0, 60.0)));
    assert!(obj.is_partially_on_screen(pt(40.0, 40.0), pt(60.0, 60.0)));
    // Object entirely inside the viewport.
    assert!(obj.is_on_screen(pt(-10.0, -10.0), pt(200.0, 200.0)));
    assert!(!obj.is_partially_on_screen(pt(-10.0, -10.0), pt(200.0, 200.0)));
    assert!(!obj.is_on_screen(pt(300.0, 300.0), pt(400.0, 400.0)));
}
