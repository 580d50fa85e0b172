//! Scene objects: transform properties, origin geometry and dimensions.
//!
//! A `SceneObject` is positioned in its parent's plane by `left`/`top`,
//! interpreted through `origin_x`/`origin_y`. Scale, skew, flips and rotation
//! are applied around the object's center. Everything in this module works in
//! the parent plane; anything that needs the ancestor chain (cumulative
//! matrices, total angle, scene-plane corners) lives in `coords` and `scene`.

#[cfg(test)]
#[path = "object_test.rs"]
mod object_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{CORNER_SIZE_PX, MIN_SCALE, TOUCH_CORNER_SIZE_PX};
use crate::control::ControlSet;
use crate::coords::{MatrixCache, ObjectCoords};
use crate::matrix::{Matrix, TransformOptions, size_after_transform};
use crate::point::Point;

/// Unique identifier for a scene object.
pub type ObjectId = Uuid;

// ── Origins ─────────────────────────────────────────────────────

/// Horizontal reference point of an object's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginX {
    #[default]
    Left,
    Center,
    Right,
}

impl OriginX {
    /// Offset from the center as a fraction of the width: `-0.5`, `0` or `0.5`.
    #[must_use]
    pub fn offset(self) -> f64 {
        match self {
            Self::Left => -0.5,
            Self::Center => 0.0,
            Self::Right => 0.5,
        }
    }

    /// Mirror across the center. `Center` stays put.
    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Center => Self::Center,
            Self::Right => Self::Left,
        }
    }
}

/// Vertical reference point of an object's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OriginY {
    #[default]
    Top,
    Center,
    Bottom,
}

impl OriginY {
    /// Offset from the center as a fraction of the height: `-0.5`, `0` or `0.5`.
    #[must_use]
    pub fn offset(self) -> f64 {
        match self {
            Self::Top => -0.5,
            Self::Center => 0.0,
            Self::Bottom => 0.5,
        }
    }

    #[must_use]
    pub fn inverted(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Center => Self::Center,
            Self::Bottom => Self::Top,
        }
    }
}

// ── Kinds ───────────────────────────────────────────────────────

/// What an object is. Geometry is identical across kinds; the kind picks the
/// default control set and a few kind-specific limits.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectKind {
    #[default]
    Rect,
    Ellipse,
    Image,
    /// Wrapping text box. Resized horizontally instead of scaled.
    Textbox {
        #[serde(rename = "minWidth")]
        min_width: f64,
    },
    /// Container whose children are positioned in its plane.
    Group,
}

/// Shape used to draw control handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CornerStyle {
    #[default]
    Rect,
    Circle,
}

// ── Object ──────────────────────────────────────────────────────

/// A transformable node of the scene tree.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneObject {
    pub id: ObjectId,
    pub kind: ObjectKind,

    // Transform
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Horizontal skew in degrees.
    pub skew_x: f64,
    /// Vertical skew in degrees.
    pub skew_y: f64,
    /// Clockwise rotation in degrees around the center.
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub origin_x: OriginX,
    pub origin_y: OriginY,
    pub stroke_width: f64,
    /// Keep the stroke a constant width regardless of scale.
    pub stroke_uniform: bool,
    /// Screen-space gap between the object and its borders/controls.
    pub padding: f64,

    // Interaction
    pub visible: bool,
    pub selectable: bool,
    pub evented: bool,
    pub has_controls: bool,
    pub has_borders: bool,
    pub per_pixel_target_find: bool,
    pub centered_scaling: bool,
    pub centered_rotation: bool,
    pub hover_cursor: Option<String>,
    pub move_cursor: Option<String>,

    // Locks
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
    pub lock_rotation: bool,
    pub lock_scaling_x: bool,
    pub lock_scaling_y: bool,
    pub lock_skewing_x: bool,
    pub lock_skewing_y: bool,
    pub lock_scaling_flip: bool,
    /// Only allow scaling that keeps the aspect ratio.
    pub lock_uni_scaling: bool,
    /// Smallest allowed absolute scale. `0` means only exact zero is rejected.
    pub min_scale_limit: f64,
    /// Rotation snaps to multiples of this many degrees.
    pub snap_angle: Option<f64>,
    /// Snap distance in degrees. Defaults to `snap_angle`.
    pub snap_threshold: Option<f64>,

    // Control appearance
    pub corner_size: f64,
    pub touch_corner_size: f64,
    pub transparent_corners: bool,
    pub corner_color: String,
    pub corner_stroke_color: String,
    pub corner_style: CornerStyle,
    pub border_color: String,
    /// Per-object overrides of control visibility, by control key.
    pub controls_visibility: BTreeMap<String, bool>,

    // Tree
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,

    #[serde(skip)]
    pub controls: ControlSet,
    #[serde(skip)]
    pub(crate) coords: ObjectCoords,
    #[serde(skip)]
    pub(crate) own_matrix_cache: MatrixCache,
    #[serde(skip)]
    pub(crate) matrix_cache: MatrixCache,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self::new(ObjectKind::Rect)
    }
}

/// Optional replacements for the inputs of
/// [`SceneObject::transformed_dimensions`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DimensionOverrides {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub skew_x: Option<f64>,
    pub skew_y: Option<f64>,
    pub stroke_width: Option<f64>,
}

impl SceneObject {
    /// A fresh object of `kind` with a random id, default properties and the
    /// kind's default controls.
    #[must_use]
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            angle: 0.0,
            flip_x: false,
            flip_y: false,
            origin_x: OriginX::Left,
            origin_y: OriginY::Top,
            stroke_width: 1.0,
            stroke_uniform: false,
            padding: 0.0,
            visible: true,
            selectable: true,
            evented: true,
            has_controls: true,
            has_borders: true,
            per_pixel_target_find: false,
            centered_scaling: false,
            centered_rotation: true,
            hover_cursor: None,
            move_cursor: None,
            lock_movement_x: false,
            lock_movement_y: false,
            lock_rotation: false,
            lock_scaling_x: false,
            lock_scaling_y: false,
            lock_skewing_x: false,
            lock_skewing_y: false,
            lock_scaling_flip: false,
            lock_uni_scaling: false,
            min_scale_limit: 0.0,
            snap_angle: None,
            snap_threshold: None,
            corner_size: CORNER_SIZE_PX,
            touch_corner_size: TOUCH_CORNER_SIZE_PX,
            transparent_corners: true,
            corner_color: "rgb(178,204,255)".into(),
            corner_stroke_color: String::new(),
            corner_style: CornerStyle::Rect,
            border_color: "rgb(178,204,255)".into(),
            controls_visibility: BTreeMap::new(),
            parent: None,
            children: Vec::new(),
            controls: ControlSet::for_kind(&kind),
            coords: ObjectCoords::default(),
            own_matrix_cache: MatrixCache::default(),
            matrix_cache: MatrixCache::default(),
        }
    }

    /// Rectangle at `left, top` (top-left origin).
    #[must_use]
    pub fn rect(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, ..Self::new(ObjectKind::Rect) }
    }

    /// Text box at `left, top` with the default 20-unit minimum width.
    #[must_use]
    pub fn textbox(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, ..Self::new(ObjectKind::Textbox { min_width: 20.0 }) }
    }

    /// Empty group. Use `Scene::add_to_group` to populate it.
    #[must_use]
    pub fn group(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, ..Self::new(ObjectKind::Group) }
    }

    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self.kind, ObjectKind::Group)
    }

    // ── Scale setters ───────────────────────────────────────────

    /// Clamp a scale away from zero. Values under `min_scale_limit` in
    /// magnitude snap to the limit (keeping their sign); an exact zero becomes
    /// [`MIN_SCALE`].
    #[must_use]
    pub fn constrain_scale(&self, value: f64) -> f64 {
        if value.abs() < self.min_scale_limit {
            if value < 0.0 { -self.min_scale_limit } else { self.min_scale_limit }
        } else if value == 0.0 {
            MIN_SCALE
        } else {
            value
        }
    }

    /// Set `scale_x` through [`constrain_scale`](Self::constrain_scale). A
    /// negative value toggles `flip_x` and stores the magnitude.
    pub fn set_scale_x(&mut self, value: f64) {
        let value = self.constrain_scale(value);
        if value < 0.0 {
            self.flip_x = !self.flip_x;
            self.scale_x = -value;
        } else {
            self.scale_x = value;
        }
    }

    /// Vertical counterpart of [`set_scale_x`](Self::set_scale_x).
    pub fn set_scale_y(&mut self, value: f64) {
        let value = self.constrain_scale(value);
        if value < 0.0 {
            self.flip_y = !self.flip_y;
            self.scale_y = -value;
        } else {
            self.scale_y = value;
        }
    }

    /// Set both scales to `value`.
    pub fn scale_uniform(&mut self, value: f64) {
        self.set_scale_x(value);
        self.set_scale_y(value);
    }

    // ── Dimensions ──────────────────────────────────────────────

    /// Width and height plus stroke, before any scaling.
    #[must_use]
    pub fn non_transformed_dimensions(&self) -> Point {
        Point::new(self.width, self.height).scalar_add(self.stroke_width)
    }

    /// Size of the object's box in its parent plane, ignoring rotation.
    ///
    /// Stroke inflates the box before scaling, or after it when
    /// `stroke_uniform` is set. With any skew the result is the axis-aligned
    /// bounding box of the skewed box.
    #[must_use]
    pub fn transformed_dimensions(&self, overrides: &DimensionOverrides) -> Point {
        let width = overrides.width.unwrap_or(self.width);
        let height = overrides.height.unwrap_or(self.height);
        let scale_x = overrides.scale_x.unwrap_or(self.scale_x);
        let scale_y = overrides.scale_y.unwrap_or(self.scale_y);
        let skew_x = overrides.skew_x.unwrap_or(self.skew_x);
        let skew_y = overrides.skew_y.unwrap_or(self.skew_y);
        let stroke = overrides.stroke_width.unwrap_or(self.stroke_width);

        let (pre, post) = if self.stroke_uniform { (0.0, stroke) } else { (stroke, 0.0) };
        let dim_x = width + pre;
        let dim_y = height + pre;

        let size = if skew_x == 0.0 && skew_y == 0.0 {
            Point::new(dim_x * scale_x, dim_y * scale_y)
        } else {
            size_after_transform(
                dim_x,
                dim_y,
                &TransformOptions { scale_x, scale_y, skew_x, skew_y, ..TransformOptions::default() },
            )
        };
        size.scalar_add(post)
    }

    #[must_use]
    pub fn scaled_width(&self) -> f64 {
        self.transformed_dimensions(&DimensionOverrides::default()).x
    }

    #[must_use]
    pub fn scaled_height(&self) -> f64 {
        self.transformed_dimensions(&DimensionOverrides::default()).y
    }

    // ── Origins ─────────────────────────────────────────────────

    /// Move `point` from one origin of the unrotated box to another.
    #[must_use]
    pub fn translate_to_given_origin(
        &self,
        point: Point,
        from_x: OriginX,
        from_y: OriginY,
        to_x: OriginX,
        to_y: OriginY,
    ) -> Point {
        let offset_x = to_x.offset() - from_x.offset();
        let offset_y = to_y.offset() - from_y.offset();
        if offset_x == 0.0 && offset_y == 0.0 {
            return point;
        }
        let dim = self.transformed_dimensions(&DimensionOverrides::default());
        Point::new(point.x + offset_x * dim.x, point.y + offset_y * dim.y)
    }

    /// Center of the box whose `(origin_x, origin_y)` point sits at `point`,
    /// taking rotation into account.
    #[must_use]
    pub fn translate_to_center_point(&self, point: Point, origin_x: OriginX, origin_y: OriginY) -> Point {
        if origin_x == OriginX::Center && origin_y == OriginY::Center {
            return point;
        }
        let p = self.translate_to_given_origin(point, origin_x, origin_y, OriginX::Center, OriginY::Center);
        if self.angle == 0.0 { p } else { p.rotate(self.angle.to_radians(), point) }
    }

    /// Where the `(origin_x, origin_y)` point lands for a box centered at
    /// `center`, taking rotation into account.
    #[must_use]
    pub fn translate_to_origin_point(&self, center: Point, origin_x: OriginX, origin_y: OriginY) -> Point {
        let p = self.translate_to_given_origin(center, OriginX::Center, OriginY::Center, origin_x, origin_y);
        if self.angle == 0.0 { p } else { p.rotate(self.angle.to_radians(), center) }
    }

    /// Center in the parent plane.
    #[must_use]
    pub fn relative_center_point(&self) -> Point {
        self.translate_to_center_point(Point::new(self.left, self.top), self.origin_x, self.origin_y)
    }

    /// Position of the given origin point in the parent plane.
    #[must_use]
    pub fn position_by_origin(&self, origin_x: OriginX, origin_y: OriginY) -> Point {
        self.translate_to_origin_point(self.relative_center_point(), origin_x, origin_y)
    }

    /// Move the object so that its `(origin_x, origin_y)` point sits at `pos`.
    pub fn set_position_by_origin(&mut self, pos: Point, origin_x: OriginX, origin_y: OriginY) {
        let center = self.translate_to_center_point(pos, origin_x, origin_y);
        let position = self.translate_to_origin_point(center, self.origin_x, self.origin_y);
        self.left = position.x;
        self.top = position.y;
    }

    /// Overwrite angle, scale, skew and position from an affine matrix
    /// expressed in the parent plane. Flips are reset and re-derived from the
    /// sign of the decomposed scale.
    pub fn apply_transform_matrix(&mut self, matrix: &Matrix) {
        let d = matrix.decompose();
        self.flip_x = false;
        self.flip_y = false;
        self.angle = d.angle;
        self.skew_x = d.skew_x;
        self.skew_y = d.skew_y;
        self.set_scale_x(d.scale_x);
        self.set_scale_y(d.scale_y);
        self.set_position_by_origin(Point::new(d.translate_x, d.translate_y), OriginX::Center, OriginY::Center);
    }

    /// Options for [`Matrix::compose`] reproducing this object's own transform.
    #[must_use]
    pub fn transform_options(&self) -> TransformOptions {
        let center = self.relative_center_point();
        TransformOptions {
            angle: self.angle,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            skew_x: self.skew_x,
            skew_y: self.skew_y,
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            translate_x: center.x,
            translate_y: center.y,
        }
    }

    /// Whether the control `key` should be shown, honoring per-object
    /// overrides before the control's own default.
    #[must_use]
    pub fn is_control_visible(&self, key: &str) -> bool {
        self.controls.get(key).is_some_and(|control| control.visibility(self, key))
    }

    /// Override visibility of a single control.
    pub fn set_control_visible(&mut self, key: &str, visible: bool) {
        self.controls_visibility.insert(key.to_string(), visible);
    }
}
