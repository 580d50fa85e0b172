//! Action handlers: what a pointer move does to the object being transformed.
//!
//! Every public handler has the [`ActionHandler`](crate::control::ActionHandler)
//! signature. Each receives the pointer in the target's parent plane, mutates
//! the target, and returns whether anything changed. Handlers that change
//! the target also push a [`TransformEvent`] onto the session.
//!
//! Most handlers keep one point of the object pinned while they work: the
//! session origin is read before the change and the object is moved back so
//! that point has not moved (see [`with_fixed_anchor`]).

#[cfg(test)]
#[path = "actions_test.rs"]
mod actions_test;

use crate::config::CanvasConfig;
use crate::consts::SKEW_SNAP_PX;
use crate::input::{Modifiers, TransformEvent, TransformEventKind, TransformSession, is_key_pressed};
use crate::object::{DimensionOverrides, ObjectKind, OriginX, OriginY, SceneObject};
use crate::point::Point;

/// Canvas-level state a handler may consult.
#[derive(Debug, Clone, Copy)]
pub struct HandlerEnv<'a> {
    /// Modifiers held during the current event.
    pub modifiers: Modifiers,
    pub config: &'a CanvasConfig,
    /// Viewport zoom, for thresholds given in screen pixels.
    pub zoom: f64,
}

impl HandlerEnv<'_> {
    /// Whether the alternate-action key (skew instead of scale) is held.
    #[must_use]
    pub fn is_alt_action(&self) -> bool {
        is_key_pressed(self.config.alt_action_key, self.modifiers)
    }

    /// Whether the key that toggles proportional scaling is held.
    #[must_use]
    pub fn is_uni_scale_toggled(&self) -> bool {
        is_key_pressed(self.config.uni_scale_key, self.modifiers)
    }

    /// Whether the key that toggles centered transforms is held.
    #[must_use]
    pub fn is_centered_toggled(&self) -> bool {
        is_key_pressed(self.config.centered_key, self.modifiers)
    }
}

/// Axis restriction for scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleBy {
    Both,
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

// =============================================================
// Wrappers and helpers
// =============================================================

/// Run `action` and record a `kind` event if it changed the target.
fn fire_event(
    kind: TransformEventKind,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
    action: impl FnOnce(&mut TransformSession, &mut SceneObject) -> bool,
) -> bool {
    let performed = action(session, obj);
    if performed {
        session.events.push(TransformEvent { kind, target: obj.id, pointer });
    }
    performed
}

/// Run `action`, then move the object so the point at the session origin
/// is where it was before. The origin is read again afterwards because
/// scaling past the anchor inverts it.
pub fn with_fixed_anchor(
    session: &mut TransformSession,
    obj: &mut SceneObject,
    action: impl FnOnce(&mut TransformSession, &mut SceneObject) -> bool,
) -> bool {
    let constraint = obj.position_by_origin(session.origin_x, session.origin_y);
    let performed = action(session, obj);
    obj.set_position_by_origin(constraint, session.origin_x, session.origin_y);
    performed
}

/// Like [`with_fixed_anchor`] with an explicit origin that does not change.
fn anchored_at(
    obj: &mut SceneObject,
    origin_x: OriginX,
    origin_y: OriginY,
    action: impl FnOnce(&mut SceneObject) -> bool,
) -> bool {
    let constraint = obj.position_by_origin(origin_x, origin_y);
    let performed = action(obj);
    obj.set_position_by_origin(constraint, origin_x, origin_y);
    performed
}

/// `pointer` relative to the `origin_x, origin_y` point of `obj`, in the
/// object's unrotated frame.
#[must_use]
pub fn normalize_point(obj: &SceneObject, pointer: Point, origin_x: OriginX, origin_y: OriginY) -> Point {
    let center = obj.relative_center_point();
    let origin = obj.translate_to_given_origin(center, OriginX::Center, OriginY::Center, origin_x, origin_y);
    let p = if obj.angle == 0.0 { pointer } else { pointer.rotate(-obj.angle.to_radians(), center) };
    p - origin
}

/// [`normalize_point`] with the object's padding removed and the grabbed
/// control's offset subtracted.
#[must_use]
pub fn get_local_point(
    env: &HandlerEnv<'_>,
    session: &TransformSession,
    obj: &SceneObject,
    origin_x: OriginX,
    origin_y: OriginY,
    pointer: Point,
) -> Point {
    let padding = obj.padding / env.zoom;
    let mut local = normalize_point(obj, pointer, origin_x, origin_y);
    if padding > 0.0 {
        local.x = strip_padding(local.x, padding);
        local.y = strip_padding(local.y, padding);
    }
    if let Some(control) = session.corner.as_deref().and_then(|key| obj.controls.get(key)) {
        local.x -= control.offset_x;
        local.y -= control.offset_y;
    }
    local
}

fn strip_padding(value: f64, padding: f64) -> f64 {
    if value >= padding {
        value - padding
    } else if value <= -padding {
        value + padding
    } else {
        value
    }
}

/// Whether scaling without an axis restriction keeps the aspect ratio:
/// `uniform_scaling`, inverted while the uni-scale key is held.
#[must_use]
pub fn scale_is_proportional(env: &HandlerEnv<'_>, obj: &SceneObject) -> bool {
    obj.lock_uni_scaling || (env.config.uniform_scaling != env.is_uni_scale_toggled())
}

/// Whether locks or a degenerate size rule out scaling `by`.
#[must_use]
pub fn scaling_is_forbidden(obj: &SceneObject, by: ScaleBy, proportional: bool) -> bool {
    let (lock_x, lock_y) = (obj.lock_scaling_x, obj.lock_scaling_y);
    if lock_x && lock_y {
        return true;
    }
    if by == ScaleBy::Both && (lock_x || lock_y) && proportional {
        return true;
    }
    if (lock_x && by == ScaleBy::X) || (lock_y && by == ScaleBy::Y) {
        return true;
    }
    if obj.lock_uni_scaling && by != ScaleBy::Both {
        return true;
    }
    let no_stroke = obj.stroke_width == 0.0;
    (obj.width == 0.0 && no_stroke && by != ScaleBy::Y) || (obj.height == 0.0 && no_stroke && by != ScaleBy::X)
}

fn sign_or(value: f64, fallback: f64) -> f64 {
    if value != 0.0 {
        value.signum()
    } else if fallback != 0.0 {
        fallback.signum()
    } else {
        1.0
    }
}

fn flip_factor(flipped: bool) -> f64 {
    if flipped { -1.0 } else { 1.0 }
}

// =============================================================
// Drag
// =============================================================

/// Move the object so it keeps its offset from the pointer, per-axis locks
/// permitting.
pub fn drag_handler(
    _env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Moving, session, obj, pointer, |session, obj| {
        let new_left = pointer.x - session.offset_x;
        let new_top = pointer.y - session.offset_y;
        let move_x = !obj.lock_movement_x && obj.left != new_left;
        let move_y = !obj.lock_movement_y && obj.top != new_top;
        if move_x {
            obj.left = new_left;
        }
        if move_y {
            obj.top = new_top;
        }
        move_x || move_y
    })
}

// =============================================================
// Rotate
// =============================================================

fn rotate_object_with_snapping(session: &TransformSession, obj: &mut SceneObject, pointer: Point) -> bool {
    if obj.lock_rotation {
        return false;
    }
    let pivot = obj.translate_to_origin_point(obj.relative_center_point(), session.origin_x, session.origin_y);
    let last_angle = (session.ey - pivot.y).atan2(session.ex - pivot.x);
    let cur_angle = (pointer.y - pivot.y).atan2(pointer.x - pivot.x);
    let mut angle = (cur_angle - last_angle + session.theta).to_degrees();

    if let Some(snap) = obj.snap_angle.filter(|s| *s > 0.0) {
        let threshold = obj.snap_threshold.filter(|t| *t > 0.0).unwrap_or(snap);
        let lower = (angle / snap).floor() * snap;
        let upper = (angle / snap).ceil() * snap;
        if (angle - lower).abs() < threshold {
            angle = lower;
        } else if (angle - upper).abs() < threshold {
            angle = upper;
        }
    }

    if angle < 0.0 {
        angle += 360.0;
    }
    angle %= 360.0;

    let changed = obj.angle != angle;
    obj.angle = angle;
    changed
}

/// Rotate around the session origin, following the pointer's sweep since
/// pointer-down and snapping to `snap_angle` steps when set.
pub fn rotation_with_snapping(
    _env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Rotating, session, obj, pointer, |session, obj| {
        with_fixed_anchor(session, obj, |session, obj| rotate_object_with_snapping(session, obj, pointer))
    })
}

// =============================================================
// Scale
// =============================================================

#[allow(clippy::similar_names)]
fn scale_object(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
    by: ScaleBy,
) -> bool {
    let proportional = scale_is_proportional(env, obj);
    if scaling_is_forbidden(obj, by, proportional) {
        return false;
    }

    let local = get_local_point(env, session, obj, session.origin_x, session.origin_y, pointer);
    let sign_x = if by == ScaleBy::Y { 1.0 } else { sign_or(local.x, session.sign_x) };
    let sign_y = if by == ScaleBy::X { 1.0 } else { sign_or(local.y, session.sign_y) };
    if session.sign_x == 0.0 {
        session.sign_x = sign_x;
    }
    if session.sign_y == 0.0 {
        session.sign_y = sign_y;
    }

    let dim = obj.transformed_dimensions(&DimensionOverrides::default());
    let (mut scale_x, mut scale_y) = if proportional && by == ScaleBy::Both {
        let original = &session.original;
        let distance = local.x.abs() + local.y.abs();
        let original_distance = (dim.x * original.scale_x / obj.scale_x).abs()
            + (dim.y * original.scale_y / obj.scale_y).abs();
        let ratio = distance / original_distance;
        (original.scale_x * ratio, original.scale_y * ratio)
    } else {
        ((local.x * obj.scale_x / dim.x).abs(), (local.y * obj.scale_y / dim.y).abs())
    };

    if session.is_centered() {
        scale_x *= 2.0;
        scale_y *= 2.0;
    }

    let flipped_x = by != ScaleBy::Y && session.sign_x != sign_x;
    let flipped_y = by != ScaleBy::X && session.sign_y != sign_y;
    if obj.lock_scaling_flip {
        // Crossing the anchor pins the axis at its smallest scale.
        if flipped_x {
            scale_x = obj.constrain_scale(0.0);
        }
        if flipped_y {
            scale_y = obj.constrain_scale(0.0);
        }
    } else {
        if flipped_x {
            session.origin_x = session.origin_x.inverted();
            scale_x = -scale_x;
            session.sign_x = sign_x;
        }
        if flipped_y {
            session.origin_y = session.origin_y.inverted();
            scale_y = -scale_y;
            session.sign_y = sign_y;
        }
    }

    let before = (obj.scale_x, obj.scale_y, obj.flip_x, obj.flip_y);
    match by {
        ScaleBy::Both => {
            if !obj.lock_scaling_x {
                obj.set_scale_x(scale_x);
            }
            if !obj.lock_scaling_y {
                obj.set_scale_y(scale_y);
            }
        }
        ScaleBy::X => obj.set_scale_x(scale_x),
        ScaleBy::Y => obj.set_scale_y(scale_y),
    }
    before != (obj.scale_x, obj.scale_y, obj.flip_x, obj.flip_y)
}

fn scaling(
    by: ScaleBy,
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Scaling, session, obj, pointer, |session, obj| {
        with_fixed_anchor(session, obj, |session, obj| scale_object(env, session, obj, pointer, by))
    })
}

/// Corner handles: scale both axes, proportionally unless toggled off.
pub fn scaling_equally(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    scaling(ScaleBy::Both, env, session, obj, pointer)
}

pub fn scaling_x(env: &HandlerEnv<'_>, session: &mut TransformSession, obj: &mut SceneObject, pointer: Point) -> bool {
    scaling(ScaleBy::X, env, session, obj, pointer)
}

pub fn scaling_y(env: &HandlerEnv<'_>, session: &mut TransformSession, obj: &mut SceneObject, pointer: Point) -> bool {
    scaling(ScaleBy::Y, env, session, obj, pointer)
}

/// Left/right handles: skew along the edge with the alternate-action key,
/// scale horizontally otherwise.
pub fn scaling_x_or_skewing_y(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    if env.is_alt_action() { skew_handler_y(env, session, obj, pointer) } else { scaling_x(env, session, obj, pointer) }
}

/// Top/bottom handles: skew along the edge with the alternate-action key,
/// scale vertically otherwise.
pub fn scaling_y_or_skewing_x(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    if env.is_alt_action() { skew_handler_x(env, session, obj, pointer) } else { scaling_y(env, session, obj, pointer) }
}

// =============================================================
// Skew
// =============================================================

/// Shear the object so the dragged edge follows the pointer while the
/// opposite edge stays put.
///
/// The shear is accumulated as a tangent from the skew at pointer-down, so
/// the result depends only on the total pointer travel. A shear that would
/// move the dragged edge by less than [`SKEW_SNAP_PX`] snaps to zero. A move
/// that would carry the skew across zero pauses at zero for that event; the
/// next event continues from there.
fn skew_object(
    axis: Axis,
    env: &HandlerEnv<'_>,
    session: &TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    let (locked, own_flip, counter_flip, counter_offset, start, before) = match axis {
        Axis::X => (
            obj.lock_skewing_x,
            obj.flip_x,
            obj.flip_y,
            session.origin_y.offset(),
            session.original.skew_x,
            obj.skew_x,
        ),
        Axis::Y => (
            obj.lock_skewing_y,
            obj.flip_y,
            obj.flip_x,
            session.origin_x.offset(),
            session.original.skew_y,
            obj.skew_y,
        ),
    };
    if locked {
        return false;
    }

    // Which side of the center the dragged edge is on, across the skew axis.
    let edge = if counter_offset != 0.0 {
        -counter_offset.signum()
    } else {
        let local = get_local_point(env, session, obj, OriginX::Center, OriginY::Center, pointer);
        sign_or(if axis == Axis::X { local.y } else { local.x }, 0.0)
    };
    let side = edge * flip_factor(own_flip) * flip_factor(counter_flip);

    let travel = (pointer - Point::new(session.ex, session.ey)).rotate(-obj.angle.to_radians(), Point::zero());
    let (delta, scale) = match axis {
        Axis::X => (travel.x, obj.scale_x),
        Axis::Y => (travel.y, obj.scale_y),
    };
    let unit = DimensionOverrides { scale_x: Some(1.0), scale_y: Some(1.0), ..DimensionOverrides::default() };
    let counter_size = match axis {
        Axis::X => obj.transformed_dimensions(&unit).y,
        Axis::Y => obj.transformed_dimensions(&DimensionOverrides { skew_x: Some(0.0), ..unit }).x,
    };

    let mut shearing = start.to_radians().tan() + side * (delta / scale) / counter_size.max(1.0);
    if (shearing * counter_size * scale * env.zoom).abs() < SKEW_SNAP_PX {
        shearing = 0.0;
    }
    if before != 0.0 && shearing != 0.0 && before.signum() != shearing.signum() {
        shearing = 0.0;
    }

    let direction = sign_or(shearing, before);
    let leading = direction * side > 0.0;
    let (origin_x, origin_y) = match axis {
        Axis::X => (
            if leading { OriginX::Left } else { OriginX::Right },
            if edge > 0.0 { OriginY::Top } else { OriginY::Bottom },
        ),
        Axis::Y => (
            if edge > 0.0 { OriginX::Left } else { OriginX::Right },
            if leading { OriginY::Top } else { OriginY::Bottom },
        ),
    };

    let skew = shearing.atan().to_degrees();
    anchored_at(obj, origin_x, origin_y, |obj| {
        match axis {
            Axis::X => obj.skew_x = skew,
            Axis::Y => obj.skew_y = skew,
        }
        let changed = before != skew;
        if changed && axis == Axis::Y && obj.skew_x != 0.0 {
            // Keep the visible width when skew_y changes under an existing skew_x.
            let width_before = obj.transformed_dimensions(&DimensionOverrides {
                skew_y: Some(before),
                ..DimensionOverrides::default()
            });
            let width_after = obj.transformed_dimensions(&DimensionOverrides::default());
            if width_after.x != 0.0 {
                let factor = width_before.x / width_after.x;
                if factor != 1.0 {
                    obj.set_scale_x(obj.scale_x * factor);
                }
            }
        }
        changed
    })
}

pub fn skew_handler_x(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Skewing, session, obj, pointer, |session, obj| {
        skew_object(Axis::X, env, session, obj, pointer)
    })
}

pub fn skew_handler_y(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Skewing, session, obj, pointer, |session, obj| {
        skew_object(Axis::Y, env, session, obj, pointer)
    })
}

// =============================================================
// Resize
// =============================================================

/// Text box side handles: change `width` instead of scaling. Ignored while
/// the pointer is on the anchored side of the origin.
pub fn change_width(
    env: &HandlerEnv<'_>,
    session: &mut TransformSession,
    obj: &mut SceneObject,
    pointer: Point,
) -> bool {
    fire_event(TransformEventKind::Resizing, session, obj, pointer, |session, obj| {
        with_fixed_anchor(session, obj, |session, obj| {
            let local = get_local_point(env, session, obj, session.origin_x, session.origin_y, pointer);
            let allowed = match session.origin_x {
                OriginX::Center => true,
                OriginX::Right => local.x < 0.0,
                OriginX::Left => local.x > 0.0,
            };
            if !allowed {
                return false;
            }
            let stroke = obj.stroke_width / if obj.stroke_uniform { obj.scale_x } else { 1.0 };
            let multiplier = if session.is_centered() { 2.0 } else { 1.0 };
            let min_width = match obj.kind {
                ObjectKind::Textbox { min_width } => min_width.max(1.0),
                _ => 1.0,
            };
            let old_width = obj.width;
            obj.width = ((local.x * multiplier / obj.scale_x).abs() - stroke).max(min_width);
            old_width != obj.width
        })
    })
}
