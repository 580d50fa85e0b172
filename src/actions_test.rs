#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::consts::MIN_SCALE;
use crate::input::ActionName;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn point_approx_eq(a: Point, b: Point) -> bool {
    approx_eq(a.x, b.x) && approx_eq(a.y, b.y)
}

fn env(config: &CanvasConfig, modifiers: Modifiers) -> HandlerEnv<'_> {
    HandlerEnv { modifiers, config, zoom: 1.0 }
}

fn square() -> SceneObject {
    SceneObject { stroke_width: 0.0, ..SceneObject::rect(0.0, 0.0, 100.0, 100.0) }
}

fn session(
    obj: &SceneObject,
    corner: &str,
    action: ActionName,
    origin: (OriginX, OriginY),
    start: Point,
) -> TransformSession {
    let corner = if corner.is_empty() { None } else { Some(corner.to_string()) };
    TransformSession::new(obj, corner, action, origin, start, Modifiers::default())
}

const SHIFT: Modifiers = Modifiers { shift: true, ctrl: false, alt: false, meta: false };

// =============================================================
// Points
// =============================================================

#[test]
fn normalize_point_undoes_rotation() {
    let rect = SceneObject { stroke_width: 0.0, ..SceneObject::rect(0.0, 0.0, 100.0, 50.0) };
    let obj = SceneObject { angle: 90.0, ..rect };
    let corner = obj.position_by_origin(OriginX::Right, OriginY::Bottom);
    let local = normalize_point(&obj, corner, OriginX::Left, OriginY::Top);
    assert!(point_approx_eq(local, Point::new(100.0, 50.0)));
}

#[test]
fn local_point_strips_padding_outside_band() {
    let config = CanvasConfig::default();
    let obj = SceneObject { padding: 10.0, ..square() };
    let s = session(&obj, "", ActionName::Drag, (OriginX::Center, OriginY::Center), Point::zero());
    let e = env(&config, Modifiers::default());
    let local = get_local_point(&e, &s, &obj, OriginX::Center, OriginY::Center, Point::new(100.0, 55.0));
    assert_eq!(local, Point::new(40.0, 5.0));
    let local = get_local_point(&e, &s, &obj, OriginX::Center, OriginY::Center, Point::new(0.0, 50.0));
    assert_eq!(local, Point::new(-40.0, 0.0));
}

#[test]
fn local_point_subtracts_control_offset() {
    let config = CanvasConfig::default();
    let obj = square();
    let s = session(&obj, "mtr", ActionName::Rotate, (OriginX::Center, OriginY::Center), Point::zero());
    let e = env(&config, Modifiers::default());
    let local = get_local_point(&e, &s, &obj, OriginX::Center, OriginY::Center, Point::new(50.0, -40.0));
    assert_eq!(local, Point::new(0.0, -50.0));
}

#[test]
fn fixed_anchor_pins_origin_point() {
    let mut obj = square();
    let mut s = session(&obj, "br", ActionName::Scale, (OriginX::Left, OriginY::Top), Point::new(100.0, 100.0));
    with_fixed_anchor(&mut s, &mut obj, |_, obj| {
        obj.angle = 45.0;
        true
    });
    assert!(point_approx_eq(obj.position_by_origin(OriginX::Left, OriginY::Top), Point::zero()));
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_keeps_pointer_offset() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject::rect(10.0, 10.0, 50.0, 50.0);
    let mut s = session(&obj, "", ActionName::Drag, (OriginX::Left, OriginY::Top), Point::new(20.0, 20.0));
    assert!(drag_handler(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(50.0, 70.0)));
    assert_eq!((obj.left, obj.top), (40.0, 60.0));
    assert_eq!(s.events.len(), 1);
    assert_eq!(s.events[0].kind, TransformEventKind::Moving);
}

#[test]
fn drag_honors_axis_locks() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject { lock_movement_y: true, ..SceneObject::rect(0.0, 0.0, 50.0, 50.0) };
    let mut s = session(&obj, "", ActionName::Drag, (OriginX::Left, OriginY::Top), Point::zero());
    assert!(drag_handler(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(5.0, 5.0)));
    assert_eq!((obj.left, obj.top), (5.0, 0.0));
}

#[test]
fn drag_without_movement_reports_nothing() {
    let config = CanvasConfig::default();
    let mut obj =
        SceneObject { lock_movement_x: true, lock_movement_y: true, ..SceneObject::rect(0.0, 0.0, 50.0, 50.0) };
    let mut s = session(&obj, "", ActionName::Drag, (OriginX::Left, OriginY::Top), Point::zero());
    assert!(!drag_handler(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(5.0, 5.0)));
    assert!(s.events.is_empty());
}

// =============================================================
// Rotate
// =============================================================

fn rotate_to(obj: &mut SceneObject, degrees: f64) -> bool {
    let config = CanvasConfig::default();
    let start = Point::new(50.0, -40.0);
    let mut s = session(obj, "mtr", ActionName::Rotate, (OriginX::Center, OriginY::Center), start);
    let pointer = start.rotate(degrees.to_radians(), Point::new(50.0, 50.0));
    rotation_with_snapping(&env(&config, Modifiers::default()), &mut s, obj, pointer)
}

#[test]
fn rotation_follows_pointer_around_center() {
    let mut obj = square();
    assert!(rotate_to(&mut obj, 30.0));
    assert!((obj.angle - 30.0).abs() < 1e-9);
    assert!(point_approx_eq(obj.relative_center_point(), Point::new(50.0, 50.0)));
}

#[test]
fn rotation_snaps_within_threshold() {
    let mut obj = SceneObject { snap_angle: Some(15.0), snap_threshold: Some(5.0), ..square() };
    rotate_to(&mut obj, 13.0);
    assert_eq!(obj.angle, 15.0);

    let mut obj = SceneObject { snap_angle: Some(15.0), snap_threshold: Some(5.0), ..square() };
    rotate_to(&mut obj, 8.0);
    assert!((obj.angle - 8.0).abs() < 1e-9);
}

#[test]
fn default_threshold_snaps_down() {
    let mut obj = SceneObject { snap_angle: Some(45.0), ..square() };
    rotate_to(&mut obj, 40.0);
    assert_eq!(obj.angle, 0.0);
    let mut obj = SceneObject { snap_angle: Some(45.0), ..square() };
    rotate_to(&mut obj, 50.0);
    assert_eq!(obj.angle, 45.0);
}

#[test]
fn negative_rotation_wraps_into_range() {
    let mut obj = square();
    rotate_to(&mut obj, -30.0);
    assert!((obj.angle - 330.0).abs() < 1e-9);
}

#[test]
fn locked_rotation_does_nothing() {
    let mut obj = SceneObject { lock_rotation: true, ..square() };
    assert!(!rotate_to(&mut obj, 30.0));
    assert_eq!(obj.angle, 0.0);
}

// =============================================================
// Scale
// =============================================================

fn br_session(obj: &SceneObject) -> TransformSession {
    session(obj, "br", ActionName::Scale, (OriginX::Left, OriginY::Top), Point::new(100.0, 100.0))
}

#[test]
fn corner_scales_proportionally_from_opposite_corner() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = br_session(&obj);
    assert!(scaling_equally(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(200.0, 200.0)));
    assert!(approx_eq(obj.scale_x, 2.0));
    assert!(approx_eq(obj.scale_y, 2.0));
    assert!(point_approx_eq(Point::new(obj.left, obj.top), Point::zero()));
    assert_eq!(s.events[0].kind, TransformEventKind::Scaling);
}

#[test]
fn proportional_scaling_uses_combined_distance() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = br_session(&obj);
    scaling_equally(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(200.0, 100.0));
    assert!(approx_eq(obj.scale_x, 1.5));
    assert!(approx_eq(obj.scale_y, 1.5));
}

#[test]
fn uni_scale_key_frees_aspect_ratio() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = br_session(&obj);
    scaling_equally(&env(&config, SHIFT), &mut s, &mut obj, Point::new(200.0, 150.0));
    assert!(approx_eq(obj.scale_x, 2.0));
    assert!(approx_eq(obj.scale_y, 1.5));
}

#[test]
fn side_handle_scales_one_axis() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = session(&obj, "mr", ActionName::ScaleX, (OriginX::Left, OriginY::Top), Point::new(100.0, 50.0));
    assert!(scaling_x_or_skewing_y(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(150.0, 80.0)));
    assert!(approx_eq(obj.scale_x, 1.5));
    assert_eq!(obj.scale_y, 1.0);
    assert_eq!((obj.left, obj.top), (0.0, 0.0));
}

#[test]
fn centered_scaling_doubles_and_keeps_center() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = session(&obj, "br", ActionName::Scale, (OriginX::Center, OriginY::Center), Point::new(100.0, 100.0));
    scaling_equally(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(150.0, 150.0));
    assert!(approx_eq(obj.scale_x, 2.0));
    assert!(point_approx_eq(obj.relative_center_point(), Point::new(50.0, 50.0)));
}

#[test]
fn dragging_past_anchor_flips() {
    let config = CanvasConfig::default();
    let mut obj = square();
    let mut s = br_session(&obj);
    scaling_equally(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(-50.0, -50.0));
    assert!(obj.flip_x && obj.flip_y);
    assert!(approx_eq(obj.scale_x, 0.5));
    assert_eq!((s.origin_x, s.origin_y), (OriginX::Right, OriginY::Bottom));
    assert!(point_approx_eq(obj.position_by_origin(OriginX::Right, OriginY::Bottom), Point::zero()));
    assert!(point_approx_eq(obj.relative_center_point(), Point::new(-25.0, -25.0)));
}

#[test]
fn lock_scaling_flip_clamps_instead() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject { lock_scaling_flip: true, ..square() };
    let mut s = br_session(&obj);
    scaling_equally(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(-50.0, -50.0));
    assert!(!obj.flip_x && !obj.flip_y);
    assert_eq!(obj.scale_x, MIN_SCALE);
    assert_eq!(obj.scale_y, MIN_SCALE);
    assert_eq!((s.origin_x, s.origin_y), (OriginX::Left, OriginY::Top));
    assert!(point_approx_eq(Point::new(obj.left, obj.top), Point::zero()));
}

#[test]
fn locked_axis_forbids_side_scaling() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject { lock_scaling_x: true, ..square() };
    let mut s = session(&obj, "mr", ActionName::ScaleX, (OriginX::Left, OriginY::Top), Point::new(100.0, 50.0));
    assert!(!scaling_x(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(150.0, 50.0)));
    assert_eq!(obj.scale_x, 1.0);
    assert!(s.events.is_empty());
}

#[test]
fn forbidden_scaling_rules() {
    let obj = square();
    assert!(!scaling_is_forbidden(&obj, ScaleBy::Both, true));

    let both = SceneObject { lock_scaling_x: true, lock_scaling_y: true, ..square() };
    assert!(scaling_is_forbidden(&both, ScaleBy::Y, false));

    let one = SceneObject { lock_scaling_x: true, ..square() };
    assert!(scaling_is_forbidden(&one, ScaleBy::Both, true));
    assert!(!scaling_is_forbidden(&one, ScaleBy::Both, false));
    assert!(scaling_is_forbidden(&one, ScaleBy::X, false));
    assert!(!scaling_is_forbidden(&one, ScaleBy::Y, false));

    let flat = SceneObject { width: 0.0, ..square() };
    assert!(scaling_is_forbidden(&flat, ScaleBy::X, false));
    assert!(!scaling_is_forbidden(&flat, ScaleBy::Y, false));

    let uni = SceneObject { lock_uni_scaling: true, ..square() };
    assert!(scaling_is_forbidden(&uni, ScaleBy::X, true));
}

#[test]
fn proportional_toggle() {
    let mut config = CanvasConfig::default();
    let obj = square();
    assert!(scale_is_proportional(&env(&config, Modifiers::default()), &obj));
    assert!(!scale_is_proportional(&env(&config, SHIFT), &obj));
    config.uniform_scaling = false;
    assert!(!scale_is_proportional(&env(&config, Modifiers::default()), &obj));
    assert!(scale_is_proportional(&env(&config, SHIFT), &obj));
    let uni = SceneObject { lock_uni_scaling: true, ..square() };
    assert!(scale_is_proportional(&env(&config, Modifiers::default()), &uni));
}

// =============================================================
// Skew
// =============================================================

fn skew_rect() -> SceneObject {
    SceneObject { stroke_width: 0.0, ..SceneObject::rect(0.0, 0.0, 100.0, 50.0) }
}

#[test]
fn bottom_handle_skews_with_top_edge_fixed() {
    let config = CanvasConfig::default();
    let mut obj = skew_rect();
    let mut s = session(&obj, "mb", ActionName::SkewX, (OriginX::Left, OriginY::Top), Point::new(50.0, 50.0));
    assert!(scaling_y_or_skewing_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(70.0, 50.0)));
    assert!((obj.skew_x - 0.4f64.atan().to_degrees()).abs() < 1e-9);
    assert_eq!(obj.scale_y, 1.0);
    let m = obj.own_matrix();
    assert!(point_approx_eq(Point::new(-50.0, -25.0).transform(&m, false), Point::new(0.0, 0.0)));
    assert!(point_approx_eq(Point::new(-50.0, 25.0).transform(&m, false), Point::new(20.0, 50.0)));
    assert_eq!(s.events[0].kind, TransformEventKind::Skewing);
}

#[test]
fn side_handle_skews_vertically() {
    let config = CanvasConfig::default();
    let mut obj = skew_rect();
    let mut s = session(&obj, "mr", ActionName::SkewY, (OriginX::Left, OriginY::Top), Point::new(100.0, 25.0));
    assert!(scaling_x_or_skewing_y(&env(&config, SHIFT), &mut s, &mut obj, Point::new(100.0, 45.0)));
    assert!((obj.skew_y - 0.2f64.atan().to_degrees()).abs() < 1e-9);
    let m = obj.own_matrix();
    // Left edge stays where it was.
    assert!(point_approx_eq(Point::new(-50.0, -25.0).transform(&m, false), Point::new(0.0, 0.0)));
    assert!(point_approx_eq(Point::new(-50.0, 25.0).transform(&m, false), Point::new(0.0, 50.0)));
}

#[test]
fn tiny_skew_snaps_to_zero() {
    let config = CanvasConfig::default();
    let mut obj = skew_rect();
    let mut s = session(&obj, "mb", ActionName::SkewX, (OriginX::Left, OriginY::Top), Point::new(50.0, 50.0));
    assert!(!skew_handler_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(51.0, 50.0)));
    assert_eq!(obj.skew_x, 0.0);
    assert!(s.events.is_empty());
}

#[test]
fn skew_stops_at_zero_when_reversing() {
    let config = CanvasConfig::default();
    let mut obj = skew_rect();
    let mut s = session(&obj, "mb", ActionName::SkewX, (OriginX::Left, OriginY::Top), Point::new(50.0, 50.0));
    skew_handler_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(70.0, 50.0));
    assert!(obj.skew_x > 0.0);
    skew_handler_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(20.0, 50.0));
    assert_eq!(obj.skew_x, 0.0);
    // The pause lasts one event.
    skew_handler_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(10.0, 50.0));
    assert!(obj.skew_x < 0.0);
}

#[test]
fn skew_y_under_skew_x_keeps_width() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject { skew_x: 20.0, ..skew_rect() };
    let width = obj.transformed_dimensions(&DimensionOverrides::default()).x;
    let start = obj.position_by_origin(OriginX::Right, OriginY::Center);
    let mut s = session(&obj, "mr", ActionName::SkewY, (OriginX::Left, OriginY::Top), start);
    assert!(skew_handler_y(&env(&config, SHIFT), &mut s, &mut obj, start + Point::new(0.0, 20.0)));
    assert!(obj.skew_y > 0.0);
    assert!(approx_eq(obj.transformed_dimensions(&DimensionOverrides::default()).x, width));
    assert!((obj.scale_x - 0.94199).abs() < 1e-4, "scale_x = {}", obj.scale_x);

    let mut plain = skew_rect();
    let start = plain.position_by_origin(OriginX::Right, OriginY::Center);
    let mut s = session(&plain, "mr", ActionName::SkewY, (OriginX::Left, OriginY::Top), start);
    assert!(skew_handler_y(&env(&config, SHIFT), &mut s, &mut plain, start + Point::new(0.0, 20.0)));
    assert_eq!(plain.scale_x, 1.0);
}

#[test]
fn locked_skew_does_nothing() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject { lock_skewing_x: true, ..skew_rect() };
    let mut s = session(&obj, "mb", ActionName::SkewX, (OriginX::Left, OriginY::Top), Point::new(50.0, 50.0));
    assert!(!skew_handler_x(&env(&config, SHIFT), &mut s, &mut obj, Point::new(80.0, 50.0)));
    assert_eq!(obj.skew_x, 0.0);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn change_width_follows_pointer() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject::textbox(0.0, 0.0, 100.0, 20.0);
    let mut s = session(&obj, "mr", ActionName::Resizing, (OriginX::Left, OriginY::Top), Point::new(101.0, 10.0));
    assert!(change_width(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(150.0, 10.0)));
    assert_eq!(obj.width, 149.0);
    assert_eq!(obj.scale_x, 1.0);
    assert_eq!((obj.left, obj.top), (0.0, 0.0));
    assert_eq!(s.events[0].kind, TransformEventKind::Resizing);
}

#[test]
fn change_width_respects_min_width() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject::textbox(0.0, 0.0, 100.0, 20.0);
    let mut s = session(&obj, "mr", ActionName::Resizing, (OriginX::Left, OriginY::Top), Point::new(101.0, 10.0));
    change_width(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(5.0, 10.0));
    assert_eq!(obj.width, 20.0);
}

#[test]
fn change_width_ignores_wrong_side() {
    let config = CanvasConfig::default();
    let mut obj = SceneObject::textbox(0.0, 0.0, 100.0, 20.0);
    let mut s = session(&obj, "mr", ActionName::Resizing, (OriginX::Left, OriginY::Top), Point::new(101.0, 10.0));
    assert!(!change_width(&env(&config, Modifiers::default()), &mut s, &mut obj, Point::new(-10.0, 10.0)));
    assert_eq!(obj.width, 100.0);
}
