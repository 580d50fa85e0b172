//! Controls: the handles drawn around an active object.
//!
//! A [`Control`] is plain data plus a handful of function-pointer hooks. The
//! hooks decide where the handle sits, what a drag on it does, which cursor it
//! shows and which action name it reports. Swapping a hook is how callers
//! customize a control; the default sets below wire in the stock handlers from
//! [`crate::actions`].
//!
//! Handle positions are expressed as fractions of the object's box (`x` and
//! `y` in `-0.5..=0.5`) plus a screen-pixel offset, so they track the object
//! through any transform.

#[cfg(test)]
#[path = "control_test.rs"]
mod control_test;

use crate::actions::{
    HandlerEnv, ScaleBy, change_width, rotation_with_snapping, scale_is_proportional, scaling_equally,
    scaling_is_forbidden, scaling_x_or_skewing_y, scaling_y_or_skewing_x,
};
use crate::consts::{DEFAULT_CONTROL_CURSOR, NOT_ALLOWED_CURSOR, ROTATE_CONTROL_OFFSET_PX};
use crate::coords::Corners;
use crate::input::{ActionName, TransformSession};
use crate::intersection::Intersection;
use crate::matrix::Matrix;
use crate::object::{CornerStyle, ObjectKind, SceneObject};
use crate::point::Point;
use crate::render::{self, ControlStyle, DrawContext};

// =============================================================
// Hooks
// =============================================================

/// Where a control sits in the viewport, given the object's current
/// dimensions and the matrix from box space to viewport.
pub type PositionHandler = fn(dim: Point, final_matrix: &Matrix, object: &SceneObject, control: &Control) -> Point;

/// Apply one pointer move to `object`. `pointer` is in the object's parent
/// plane. Returns whether anything changed.
pub type ActionHandler =
    fn(env: &HandlerEnv<'_>, session: &mut TransformSession, object: &mut SceneObject, pointer: Point) -> bool;

/// CSS cursor to show while hovering the control.
pub type CursorStyleHandler = fn(env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> String;

/// Action a drag on the control will perform under the current modifiers.
pub type ActionNameHandler = fn(env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> ActionName;

// =============================================================
// Control
// =============================================================

#[derive(Debug, Clone)]
pub struct Control {
    /// Horizontal position as a fraction of the box width, `-0.5..=0.5`.
    pub x: f64,
    /// Vertical position as a fraction of the box height, `-0.5..=0.5`.
    pub y: f64,
    /// Screen-pixel offset applied after the fractional position.
    pub offset_x: f64,
    pub offset_y: f64,
    /// Hit box size; `None` uses the object's `corner_size`.
    pub size_x: Option<f64>,
    pub size_y: Option<f64>,
    /// Touch hit box size; `None` uses the object's `touch_corner_size`.
    pub touch_size_x: Option<f64>,
    pub touch_size_y: Option<f64>,
    pub cursor_style: String,
    pub action_name: ActionName,
    /// Default visibility, overridable per object.
    pub visible: bool,
    /// Draw a line from the box edge to the handle.
    pub with_connection: bool,
    /// Extra rotation of the handle in degrees, on top of the object's.
    pub angle: f64,
    pub position_handler: PositionHandler,
    pub action_handler: Option<ActionHandler>,
    pub cursor_style_handler: CursorStyleHandler,
    pub action_name_handler: ActionNameHandler,
    pub mouse_down_handler: Option<ActionHandler>,
    pub mouse_up_handler: Option<ActionHandler>,
}

impl Default for Control {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            size_x: None,
            size_y: None,
            touch_size_x: None,
            touch_size_y: None,
            cursor_style: DEFAULT_CONTROL_CURSOR.to_string(),
            action_name: ActionName::Scale,
            visible: true,
            with_connection: false,
            angle: 0.0,
            position_handler: default_position,
            action_handler: None,
            cursor_style_handler: default_cursor_style,
            action_name_handler: default_action_name,
            mouse_down_handler: None,
            mouse_up_handler: None,
        }
    }
}

fn default_position(dim: Point, final_matrix: &Matrix, _object: &SceneObject, control: &Control) -> Point {
    let local = Point::new(control.x * dim.x + control.offset_x, control.y * dim.y + control.offset_y);
    local.transform(final_matrix, false)
}

fn default_cursor_style(_env: &HandlerEnv<'_>, control: &Control, _object: &SceneObject) -> String {
    control.cursor_style.clone()
}

fn default_action_name(_env: &HandlerEnv<'_>, control: &Control, _object: &SceneObject) -> ActionName {
    control.action_name
}

impl Control {
    /// A control at the fractional box position `x, y` with default hooks.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, ..Self::default() }
    }

    /// Viewport position of the handle.
    #[must_use]
    pub fn position(&self, dim: Point, final_matrix: &Matrix, object: &SceneObject) -> Point {
        (self.position_handler)(dim, final_matrix, object, self)
    }

    #[must_use]
    pub fn cursor_style(&self, env: &HandlerEnv<'_>, object: &SceneObject) -> String {
        (self.cursor_style_handler)(env, self, object)
    }

    #[must_use]
    pub fn action_name(&self, env: &HandlerEnv<'_>, object: &SceneObject) -> ActionName {
        (self.action_name_handler)(env, self, object)
    }

    /// Visibility for `key` on `object`: the object's override if set, else
    /// the control's default.
    #[must_use]
    pub fn visibility(&self, object: &SceneObject, key: &str) -> bool {
        object.controls_visibility.get(key).copied().unwrap_or(self.visible)
    }

    /// Hit box around `position`, rotated by `angle` degrees. Square unless
    /// the control sets its own sizes.
    #[must_use]
    pub fn calc_corner_coords(&self, angle: f64, corner_size: f64, position: Point, is_touch: bool) -> Corners {
        let (sx, sy) = if is_touch { (self.touch_size_x, self.touch_size_y) } else { (self.size_x, self.size_y) };
        let t = Matrix::multiply_all(&[
            Matrix::translate(position.x, position.y),
            Matrix::rotate(angle + self.angle, Point::zero()),
            Matrix::scale(sx.unwrap_or(corner_size), sy.unwrap_or(corner_size)),
        ]);
        Corners::unit_box(&t)
    }

    /// Whether a pointer at `pointer` (viewport plane) grabs this control.
    /// Only the active object's visible controls can be grabbed.
    #[must_use]
    pub fn should_activate(
        &self,
        key: &str,
        object: &SceneObject,
        is_active: bool,
        pointer: Point,
        corners: &Corners,
    ) -> bool {
        is_active && object.is_control_visible(key) && Intersection::is_point_in_polygon(pointer, &corners.to_polygon())
    }

    /// Draw the handle centered at `left, top` in the object's corner style,
    /// with any field of `style_override` taking precedence.
    ///
    /// # Errors
    ///
    /// Propagates any failure from the drawing context.
    pub fn render<C: DrawContext>(
        &self,
        ctx: &mut C,
        left: f64,
        top: f64,
        style_override: &ControlStyle,
        object: &SceneObject,
    ) -> Result<(), C::Error> {
        match style_override.corner_style.unwrap_or(object.corner_style) {
            CornerStyle::Circle => render::render_circle_control(ctx, left, top, self, object, style_override),
            CornerStyle::Rect => render::render_square_control(ctx, left, top, self, object, style_override),
        }
    }
}

// =============================================================
// Control sets
// =============================================================

/// Ordered map of control key to control. Iteration follows insertion
/// order; hit-testing walks it backwards so later controls win.
#[derive(Debug, Clone, Default)]
pub struct ControlSet(Vec<(String, Control)>);

impl ControlSet {
    /// Stock controls for an object of `kind`.
    #[must_use]
    pub fn for_kind(kind: &ObjectKind) -> Self {
        match kind {
            ObjectKind::Textbox { .. } => create_textbox_controls(),
            _ => create_object_default_controls(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Control> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Control> {
        self.0.iter_mut().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    /// Insert or replace. A replaced control keeps its slot in the order.
    pub fn insert(&mut self, key: impl Into<String>, control: Control) {
        let key = key.into();
        match self.get_mut(&key) {
            Some(existing) => *existing = control,
            None => self.0.push((key, control)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Control> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &Control)> {
        self.0.iter().map(|(k, c)| (k.as_str(), c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn side_control(x: f64, y: f64) -> Control {
    let handler: ActionHandler = if x == 0.0 { scaling_y_or_skewing_x } else { scaling_x_or_skewing_y };
    Control {
        cursor_style_handler: scale_skew_cursor_style_handler,
        action_name_handler: scale_or_skew_action_name,
        action_handler: Some(handler),
        ..Control::at(x, y)
    }
}

fn corner_control(x: f64, y: f64) -> Control {
    Control {
        cursor_style_handler: scale_cursor_style_handler,
        action_handler: Some(scaling_equally),
        ..Control::at(x, y)
    }
}

/// Eight scale/skew handles plus the rotation handle above the top edge.
#[must_use]
pub fn create_object_default_controls() -> ControlSet {
    let mut set = ControlSet::default();
    set.insert("ml", side_control(-0.5, 0.0));
    set.insert("mr", side_control(0.5, 0.0));
    set.insert("mb", side_control(0.0, 0.5));
    set.insert("mt", side_control(0.0, -0.5));
    set.insert("tl", corner_control(-0.5, -0.5));
    set.insert("tr", corner_control(0.5, -0.5));
    set.insert("bl", corner_control(-0.5, 0.5));
    set.insert("br", corner_control(0.5, 0.5));
    set.insert(
        "mtr",
        Control {
            offset_y: ROTATE_CONTROL_OFFSET_PX,
            action_handler: Some(rotation_with_snapping),
            cursor_style_handler: rotation_style_handler,
            action_name: ActionName::Rotate,
            with_connection: true,
            ..Control::at(0.0, -0.5)
        },
    );
    set
}

/// Side handles that change width instead of scaling.
#[must_use]
pub fn create_resize_controls() -> ControlSet {
    let resize = |x: f64| Control {
        action_handler: Some(change_width),
        cursor_style_handler: scale_skew_cursor_style_handler,
        action_name: ActionName::Resizing,
        ..Control::at(x, 0.0)
    };
    let mut set = ControlSet::default();
    set.insert("mr", resize(0.5));
    set.insert("ml", resize(-0.5));
    set
}

/// Default controls with the side handles swapped for width resizing.
#[must_use]
pub fn create_textbox_controls() -> ControlSet {
    let mut set = create_object_default_controls();
    for (key, control) in create_resize_controls().0 {
        set.insert(key, control);
    }
    set
}

// =============================================================
// Cursors and action names
// =============================================================

const SCALE_CURSORS: [&str; 9] = ["e", "se", "s", "sw", "w", "nw", "n", "ne", "e"];
const SKEW_CURSORS: [&str; 4] = ["ns", "nesw", "ew", "nwse"];

/// Which of the eight compass directions the control points in, accounting
/// for the object's on-screen rotation. `0` is east, counting clockwise in
/// 45° steps; `8` wraps back to east.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn find_corner_quadrant(object: &SceneObject, control: &Control) -> usize {
    let angle = object.coords().total_angle + control.y.atan2(control.x).to_degrees() + 360.0;
    (angle.rem_euclid(360.0) / 45.0).round() as usize
}

/// Axis a control scales along: `x` for left/right sides, `y` for top/bottom,
/// both for corners.
#[must_use]
pub fn scale_axis(control: &Control) -> ScaleBy {
    if control.x != 0.0 && control.y == 0.0 {
        ScaleBy::X
    } else if control.x == 0.0 && control.y != 0.0 {
        ScaleBy::Y
    } else {
        ScaleBy::Both
    }
}

#[must_use]
pub fn scale_cursor_style_handler(env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> String {
    let proportional = scale_is_proportional(env, object);
    if scaling_is_forbidden(object, scale_axis(control), proportional) {
        return NOT_ALLOWED_CURSOR.to_string();
    }
    let n = find_corner_quadrant(object, control);
    format!("{}-resize", SCALE_CURSORS[n.min(SCALE_CURSORS.len() - 1)])
}

#[must_use]
pub fn skew_cursor_style_handler(_env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> String {
    if (control.x != 0.0 && object.lock_skewing_y) || (control.y != 0.0 && object.lock_skewing_x) {
        return NOT_ALLOWED_CURSOR.to_string();
    }
    let n = find_corner_quadrant(object, control) % SKEW_CURSORS.len();
    format!("{}-resize", SKEW_CURSORS[n])
}

/// Skew cursor while the alternate-action key is held, scale cursor otherwise.
#[must_use]
pub fn scale_skew_cursor_style_handler(env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> String {
    if env.is_alt_action() {
        skew_cursor_style_handler(env, control, object)
    } else {
        scale_cursor_style_handler(env, control, object)
    }
}

#[must_use]
pub fn rotation_style_handler(_env: &HandlerEnv<'_>, control: &Control, object: &SceneObject) -> String {
    if object.lock_rotation { NOT_ALLOWED_CURSOR.to_string() } else { control.cursor_style.clone() }
}

/// Side handles skew along the edge while the alternate-action key is held
/// and scale across it otherwise.
#[must_use]
pub fn scale_or_skew_action_name(env: &HandlerEnv<'_>, control: &Control, _object: &SceneObject) -> ActionName {
    let alt = env.is_alt_action();
    if control.x == 0.0 {
        if alt { ActionName::SkewX } else { ActionName::ScaleY }
    } else if control.y == 0.0 {
        if alt { ActionName::SkewY } else { ActionName::ScaleX }
    } else {
        ActionName::Scale
    }
}
