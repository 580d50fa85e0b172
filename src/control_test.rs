#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;
use crate::config::CanvasConfig;
use crate::input::Modifiers;

fn env(config: &CanvasConfig, modifiers: Modifiers) -> HandlerEnv<'_> {
    HandlerEnv { modifiers, config, zoom: 1.0 }
}

fn refreshed(mut obj: SceneObject) -> SceneObject {
    obj.coords = obj.calc_coords(None, &Matrix::IDENTITY, false);
    obj
}

// =============================================================
// Control sets
// =============================================================

#[test]
fn default_set_order_and_keys() {
    let set = create_object_default_controls();
    let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["ml", "mr", "mb", "mt", "tl", "tr", "bl", "br", "mtr"]);
}

#[test]
fn rotation_control_shape() {
    let set = create_object_default_controls();
    let mtr = set.get("mtr").unwrap();
    assert_eq!((mtr.x, mtr.y, mtr.offset_y), (0.0, -0.5, -40.0));
    assert!(mtr.with_connection);
    assert_eq!(mtr.action_name, ActionName::Rotate);
    assert_eq!(mtr.cursor_style, "crosshair");
}

#[test]
fn textbox_set_resizes_from_sides() {
    let set = create_textbox_controls();
    let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["ml", "mr", "mb", "mt", "tl", "tr", "bl", "br", "mtr"]);
    assert_eq!(set.get("ml").unwrap().action_name, ActionName::Resizing);
    assert_eq!(set.get("mr").unwrap().action_name, ActionName::Resizing);
    assert_eq!(set.get("mb").unwrap().action_name, ActionName::Scale);
}

#[test]
fn for_kind_picks_set() {
    let text = ControlSet::for_kind(&ObjectKind::Textbox { min_width: 10.0 });
    assert_eq!(text.get("mr").unwrap().action_name, ActionName::Resizing);
    let group = ControlSet::for_kind(&ObjectKind::Group);
    assert_ne!(group.get("mr").unwrap().action_name, ActionName::Resizing);
}

#[test]
fn insert_replaces_in_place_and_remove() {
    let mut set = create_object_default_controls();
    set.insert("ml", Control { visible: false, ..Control::at(-0.5, 0.0) });
    assert_eq!(set.iter().next().map(|(k, c)| (k, c.visible)), Some(("ml", false)));
    set.insert("extra", Control::at(0.25, 0.25));
    assert_eq!(set.len(), 10);
    assert!(set.remove("extra").is_some());
    assert!(set.remove("extra").is_none());
    assert_eq!(set.len(), 9);
}

// =============================================================
// Geometry
// =============================================================

#[test]
fn corner_coords_use_control_sizes() {
    let control = Control { size_x: Some(20.0), size_y: Some(10.0), ..Control::at(0.5, 0.5) };
    let c = control.calc_corner_coords(0.0, 13.0, Point::new(100.0, 100.0), false);
    assert_eq!(c.tl, Point::new(90.0, 95.0));
    assert_eq!(c.br, Point::new(110.0, 105.0));
    let touch = control.calc_corner_coords(0.0, 24.0, Point::new(100.0, 100.0), true);
    assert_eq!(touch.tl, Point::new(88.0, 88.0));
}

#[test]
fn corner_coords_rotate_with_object() {
    let control = Control::at(0.5, 0.5);
    let c = control.calc_corner_coords(90.0, 10.0, Point::zero(), false);
    assert_eq!(c.tl, Point::new(5.0, -5.0));
}

#[test]
fn corner_coords_add_control_angle() {
    let control = Control { angle: 45.0, ..Control::at(0.5, 0.5) };
    let c = control.calc_corner_coords(45.0, 10.0, Point::zero(), false);
    assert_eq!(c.tl, Point::new(5.0, -5.0));
}

#[test]
fn should_activate_requires_active_and_visible() {
    let mut obj = refreshed(SceneObject { stroke_width: 0.0, ..SceneObject::rect(0.0, 0.0, 100.0, 100.0) });
    let control = obj.controls.get("br").unwrap().clone();
    let corners = obj.coords().o_coords["br"].corner;
    let pointer = Point::new(101.0, 99.0);
    assert!(control.should_activate("br", &obj, true, pointer, &corners));
    assert!(!control.should_activate("br", &obj, false, pointer, &corners));
    assert!(!control.should_activate("br", &obj, true, Point::new(150.0, 150.0), &corners));
    obj.set_control_visible("br", false);
    assert!(!control.should_activate("br", &obj, true, pointer, &corners));
}

#[test]
fn custom_position_handler() {
    fn pinned(_dim: Point, _m: &Matrix, _obj: &SceneObject, _c: &Control) -> Point {
        Point::new(7.0, 7.0)
    }
    let control = Control { position_handler: pinned, ..Control::default() };
    let obj = SceneObject::default();
    assert_eq!(control.position(Point::new(10.0, 10.0), &Matrix::IDENTITY, &obj), Point::new(7.0, 7.0));
}

// =============================================================
// Cursors
// =============================================================

#[test]
fn corner_quadrants() {
    let obj = refreshed(SceneObject::rect(0.0, 0.0, 10.0, 10.0));
    assert_eq!(find_corner_quadrant(&obj, &Control::at(0.5, 0.0)), 0);
    assert_eq!(find_corner_quadrant(&obj, &Control::at(0.5, 0.5)), 1);
    assert_eq!(find_corner_quadrant(&obj, &Control::at(0.0, 0.5)), 2);
    assert_eq!(find_corner_quadrant(&obj, &Control::at(-0.5, -0.5)), 5);
    assert_eq!(find_corner_quadrant(&obj, &Control::at(0.5, -0.5)), 7);
}

#[test]
fn quadrant_follows_rotation() {
    let obj = refreshed(SceneObject { angle: 90.0, ..SceneObject::rect(0.0, 0.0, 10.0, 10.0) });
    assert_eq!(find_corner_quadrant(&obj, &Control::at(0.5, 0.0)), 2);
}

#[test]
fn scale_cursors() {
    let config = CanvasConfig::default();
    let obj = refreshed(SceneObject::rect(0.0, 0.0, 10.0, 10.0));
    let e = env(&config, Modifiers::default());
    assert_eq!(obj.controls.get("br").unwrap().cursor_style(&e, &obj), "se-resize");
    assert_eq!(obj.controls.get("tl").unwrap().cursor_style(&e, &obj), "nw-resize");
    assert_eq!(obj.controls.get("mr").unwrap().cursor_style(&e, &obj), "e-resize");
    assert_eq!(obj.controls.get("mt").unwrap().cursor_style(&e, &obj), "n-resize");
}

#[test]
fn skew_cursors_with_alt_action_key() {
    let config = CanvasConfig::default();
    let obj = refreshed(SceneObject::rect(0.0, 0.0, 10.0, 10.0));
    let e = env(&config, Modifiers { shift: true, ..Modifiers::default() });
    assert_eq!(obj.controls.get("mr").unwrap().cursor_style(&e, &obj), "ns-resize");
    assert_eq!(obj.controls.get("mb").unwrap().cursor_style(&e, &obj), "ew-resize");
}

#[test]
fn locked_cursors() {
    let config = CanvasConfig::default();
    let e = env(&config, Modifiers::default());
    let obj = refreshed(SceneObject { lock_scaling_x: true, ..SceneObject::rect(0.0, 0.0, 10.0, 10.0) });
    assert_eq!(obj.controls.get("mr").unwrap().cursor_style(&e, &obj), NOT_ALLOWED_CURSOR);
    assert_eq!(obj.controls.get("br").unwrap().cursor_style(&e, &obj), NOT_ALLOWED_CURSOR);
    assert_eq!(obj.controls.get("mb").unwrap().cursor_style(&e, &obj), "s-resize");

    let obj = refreshed(SceneObject { lock_rotation: true, ..SceneObject::rect(0.0, 0.0, 10.0, 10.0) });
    assert_eq!(obj.controls.get("mtr").unwrap().cursor_style(&e, &obj), NOT_ALLOWED_CURSOR);

    let alt = env(&config, Modifiers { shift: true, ..Modifiers::default() });
    let obj = refreshed(SceneObject { lock_skewing_y: true, ..SceneObject::rect(0.0, 0.0, 10.0, 10.0) });
    assert_eq!(obj.controls.get("mr").unwrap().cursor_style(&alt, &obj), NOT_ALLOWED_CURSOR);
    assert_eq!(obj.controls.get("mb").unwrap().cursor_style(&alt, &obj), "ew-resize");
}

#[test]
fn rotation_cursor_default() {
    let config = CanvasConfig::default();
    let obj = refreshed(SceneObject::rect(0.0, 0.0, 10.0, 10.0));
    assert_eq!(obj.controls.get("mtr").unwrap().cursor_style(&env(&config, Modifiers::default()), &obj), "crosshair");
}

// =============================================================
// Action names
// =============================================================

#[test]
fn side_action_names_depend_on_alt_key() {
    let config = CanvasConfig::default();
    let obj = SceneObject::rect(0.0, 0.0, 10.0, 10.0);
    let plain = env(&config, Modifiers::default());
    let alt = env(&config, Modifiers { shift: true, ..Modifiers::default() });
    let mr = obj.controls.get("mr").unwrap();
    let mt = obj.controls.get("mt").unwrap();
    assert_eq!(mr.action_name(&plain, &obj), ActionName::ScaleX);
    assert_eq!(mr.action_name(&alt, &obj), ActionName::SkewY);
    assert_eq!(mt.action_name(&plain, &obj), ActionName::ScaleY);
    assert_eq!(mt.action_name(&alt, &obj), ActionName::SkewX);
    assert_eq!(obj.controls.get("br").unwrap().action_name(&alt, &obj), ActionName::Scale);
}

#[test]
fn scale_axis_from_position() {
    assert_eq!(scale_axis(&Control::at(0.5, 0.0)), ScaleBy::X);
    assert_eq!(scale_axis(&Control::at(0.0, -0.5)), ScaleBy::Y);
    assert_eq!(scale_axis(&Control::at(0.5, 0.5)), ScaleBy::Both);
}
