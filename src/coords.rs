//! Per-object coordinate cache and matrix memoization.
//!
//! Three corner sets are kept per object, refreshed together by
//! `Scene::set_coords`:
//!
//! | Set | Plane | Used for |
//! |-----|-------|----------|
//! | `a_coords` | scene | marquee/intersection queries, on-screen tests |
//! | `line_coords` | viewport, padded | pointer hit-testing |
//! | `o_coords` | viewport | control positions and hit boxes |
//!
//! Matrices are memoized behind a [`TransformKey`] rebuilt on every read, so a
//! property write is never answered with a stale matrix.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::intersection::{Intersection, IntersectionStatus};
use crate::matrix::{BoundingRect, Matrix, cos, sin};
use crate::object::{DimensionOverrides, SceneObject};
use crate::point::Point;

/// Bumped whenever the list of properties feeding [`SceneObject::transform_key`]
/// changes.
const KEY_VERSION: u64 = 1;

// ── Memoization ─────────────────────────────────────────────────

/// Fingerprint of every property that feeds a matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformKey(Vec<u64>);

impl TransformKey {
    /// Key for a cumulative matrix: chain length, then each key from the root
    /// ancestor down to the object itself.
    #[must_use]
    pub fn chain(keys: &[TransformKey]) -> Self {
        let mut parts = Vec::with_capacity(1 + keys.iter().map(|k| k.0.len()).sum::<usize>());
        parts.push(keys.len() as u64);
        for key in keys {
            parts.extend_from_slice(&key.0);
        }
        Self(parts)
    }
}

/// Single-slot matrix cache keyed by a [`TransformKey`].
#[derive(Debug, Clone, Default)]
pub struct MatrixCache {
    slot: RefCell<Option<(TransformKey, Matrix)>>,
}

impl MatrixCache {
    /// Return the cached matrix if `key` matches, else compute, store and
    /// return a fresh one. `compute` runs with no borrow held.
    pub fn get_or_compute(&self, key: TransformKey, compute: impl FnOnce() -> Matrix) -> Matrix {
        if let Some((cached_key, value)) = self.slot.borrow().as_ref() {
            if *cached_key == key {
                return *value;
            }
        }
        let value = compute();
        *self.slot.borrow_mut() = Some((key, value));
        value
    }

    pub fn invalidate(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// The stored key, if any.
    #[must_use]
    pub fn key(&self) -> Option<TransformKey> {
        self.slot.borrow().as_ref().map(|(k, _)| k.clone())
    }
}

// ── Coordinate sets ─────────────────────────────────────────────

/// Four corners of a possibly rotated or skewed box, always in this winding.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Corners {
    pub tl: Point,
    pub tr: Point,
    pub br: Point,
    pub bl: Point,
}

impl Corners {
    /// The corners as a closed polygon `tl, tr, br, bl`.
    #[must_use]
    pub fn to_polygon(&self) -> [Point; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }

    #[must_use]
    pub fn map(self, f: impl Fn(Point) -> Point) -> Self {
        Self { tl: f(self.tl), tr: f(self.tr), br: f(self.br), bl: f(self.bl) }
    }

    /// Corners of the unit-centered box `(±0.5, ±0.5)` pushed through `matrix`.
    #[must_use]
    pub fn unit_box(matrix: &Matrix) -> Self {
        Self {
            tl: Point::new(-0.5, -0.5),
            tr: Point::new(0.5, -0.5),
            br: Point::new(0.5, 0.5),
            bl: Point::new(-0.5, 0.5),
        }
        .map(|p| p.transform(matrix, false))
    }
}

/// Screen position and hit boxes of one control.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ControlCoords {
    pub position: Point,
    pub corner: Corners,
    pub touch_corner: Corners,
}

/// Snapshot of an object's coordinates as of the last `set_coords`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObjectCoords {
    pub a_coords: Corners,
    pub line_coords: Corners,
    pub o_coords: BTreeMap<String, ControlCoords>,
    /// Rotation in the scene plane when the coords were computed.
    pub total_angle: f64,
}

// ── Calculations ────────────────────────────────────────────────

impl SceneObject {
    /// Fingerprint of the properties feeding [`own_matrix`](Self::own_matrix).
    #[must_use]
    pub fn transform_key(&self) -> TransformKey {
        let flags = u64::from(self.flip_x) | (u64::from(self.flip_y) << 1) | (u64::from(self.stroke_uniform) << 2);
        TransformKey(vec![
            KEY_VERSION,
            self.left.to_bits(),
            self.top.to_bits(),
            self.width.to_bits(),
            self.height.to_bits(),
            self.scale_x.to_bits(),
            self.scale_y.to_bits(),
            self.skew_x.to_bits(),
            self.skew_y.to_bits(),
            self.angle.to_bits(),
            self.stroke_width.to_bits(),
            self.origin_x as u64,
            self.origin_y as u64,
            flags,
        ])
    }

    /// Transform from this object's plane into its parent's plane.
    #[must_use]
    pub fn own_matrix(&self) -> Matrix {
        self.own_matrix_cache.get_or_compute(self.transform_key(), || Matrix::compose(&self.transform_options()))
    }

    /// Drop both memoized matrices.
    pub fn invalidate_matrices(&self) {
        self.own_matrix_cache.invalidate();
        self.matrix_cache.invalidate();
    }

    /// Rotation in the scene plane. `parent` is the parent's cumulative matrix.
    #[must_use]
    pub fn total_angle(&self, parent: Option<&Matrix>) -> f64 {
        match parent {
            Some(p) => p.multiply(&self.own_matrix()).decompose().angle,
            None => self.angle,
        }
    }

    /// Center in the scene plane.
    #[must_use]
    pub fn center_point(&self, parent: Option<&Matrix>) -> Point {
        let center = self.relative_center_point();
        match parent {
            Some(p) => center.transform(p, false),
            None => center,
        }
    }

    /// Scene-plane corners of the transformed box: rotation and translation
    /// only, since scale and skew are already in the dimensions.
    #[must_use]
    pub fn calc_a_coords(&self, parent: Option<&Matrix>) -> Corners {
        let center = self.relative_center_point();
        let mut m = Matrix::translate(center.x, center.y).multiply(&Matrix::rotate(self.angle, Point::zero()));
        if let Some(p) = parent {
            m = p.multiply(&m);
        }
        let dim = self.transformed_dimensions(&DimensionOverrides::default());
        let (w, h) = (dim.x / 2.0, dim.y / 2.0);
        Corners {
            tl: Point::new(-w, -h),
            tr: Point::new(w, -h),
            br: Point::new(w, h),
            bl: Point::new(-w, h),
        }
        .map(|p| p.transform(&m, false))
    }

    /// Viewport-plane corners, pushed outward by `padding` along the box's
    /// own rotated axes.
    #[must_use]
    pub fn calc_line_coords(&self, parent: Option<&Matrix>, viewport: &Matrix) -> Corners {
        let a = self.calc_a_coords(parent);
        let mut c = a.map(|p| p.transform(viewport, false));
        if self.padding != 0.0 {
            let radians = self.total_angle(parent).to_radians();
            let cos_p = cos(radians) * self.padding;
            let sin_p = sin(radians) * self.padding;
            let sum = cos_p + sin_p;
            let diff = cos_p - sin_p;
            c.tl += Point::new(-diff, -sum);
            c.tr += Point::new(sum, -diff);
            c.bl += Point::new(-sum, diff);
            c.br += Point::new(diff, sum);
        }
        c
    }

    /// On-screen size of the box, padding included. Nested objects use the
    /// scale and skew of their cumulative matrix.
    #[must_use]
    pub fn current_dimensions(&self, parent: Option<&Matrix>, viewport: &Matrix) -> Point {
        let overrides = match parent {
            Some(p) => {
                let d = p.multiply(&self.own_matrix()).decompose();
                DimensionOverrides {
                    scale_x: Some(d.scale_x.abs()),
                    scale_y: Some(d.scale_y.abs()),
                    skew_x: Some(d.skew_x),
                    skew_y: Some(d.skew_y),
                    ..DimensionOverrides::default()
                }
            }
            None => DimensionOverrides::default(),
        };
        self.transformed_dimensions(&overrides)
            .transform(viewport, true)
            .scalar_add(2.0 * self.padding)
    }

    /// Viewport-plane position and hit boxes of every control.
    #[must_use]
    pub fn calc_o_coords(&self, parent: Option<&Matrix>, viewport: &Matrix) -> BTreeMap<String, ControlCoords> {
        let center = self.center_point(parent);
        let total_angle = self.total_angle(parent);
        let flip_turn = if parent.is_some() && self.flip_x { 180.0 } else { 0.0 };
        let final_matrix = Matrix::multiply_all(&[
            *viewport,
            Matrix::translate(center.x, center.y),
            Matrix::rotate(total_angle - flip_turn, Point::zero()),
            Matrix::scale(1.0 / viewport.a, 1.0 / viewport.d),
        ]);

        let dim = self.current_dimensions(parent, viewport);

        self.controls
            .iter()
            .map(|(key, control)| {
                let position = control.position(dim, &final_matrix, self);
                let coords = ControlCoords {
                    position,
                    corner: control.calc_corner_coords(total_angle, self.corner_size, position, false),
                    touch_corner: control.calc_corner_coords(total_angle, self.touch_corner_size, position, true),
                };
                (key.to_string(), coords)
            })
            .collect()
    }

    /// Recompute every coordinate set. `o_coords` is left empty when
    /// `skip_controls` is set.
    #[must_use]
    pub fn calc_coords(&self, parent: Option<&Matrix>, viewport: &Matrix, skip_controls: bool) -> ObjectCoords {
        ObjectCoords {
            a_coords: self.calc_a_coords(parent),
            line_coords: self.calc_line_coords(parent, viewport),
            o_coords: if skip_controls { BTreeMap::new() } else { self.calc_o_coords(parent, viewport) },
            total_angle: self.total_angle(parent),
        }
    }

    /// Coordinates as of the last `Scene::set_coords`. Stale after any
    /// geometry change until refreshed.
    #[must_use]
    pub fn coords(&self) -> &ObjectCoords {
        &self.coords
    }

    // ── Queries on cached coords ────────────────────────────────

    /// Cached corners: scene plane when `absolute`, viewport plane otherwise.
    #[must_use]
    pub fn corner_polygon(&self, absolute: bool) -> [Point; 4] {
        if absolute { self.coords.a_coords.to_polygon() } else { self.coords.line_coords.to_polygon() }
    }

    #[must_use]
    pub fn contains_point(&self, point: Point, absolute: bool) -> bool {
        Intersection::is_point_in_polygon(point, &self.corner_polygon(absolute))
    }

    /// Axis-aligned box around the cached corners.
    #[must_use]
    pub fn bounding_rect(&self, absolute: bool) -> BoundingRect {
        BoundingRect::from_points(&self.corner_polygon(absolute))
    }

    /// Whether the edges cross the rectangle spanned by `tl` and `br`.
    /// Full containment either way is not an intersection.
    #[must_use]
    pub fn intersects_with_rect(&self, tl: Point, br: Point, absolute: bool) -> bool {
        Intersection::polygon_rectangle(&self.corner_polygon(absolute), tl, br).status
            == IntersectionStatus::Intersection
    }

    /// Whether the two objects overlap at all, including full containment.
    #[must_use]
    pub fn intersects_with_object(&self, other: &SceneObject, absolute: bool) -> bool {
        let status =
            Intersection::polygon_polygon(&self.corner_polygon(absolute), &other.corner_polygon(absolute)).status;
        matches!(status, IntersectionStatus::Intersection | IntersectionStatus::Coincident)
            || other.is_contained_within_object(self, absolute)
            || self.is_contained_within_object(other, absolute)
    }

    /// Whether every corner lies inside `other`.
    #[must_use]
    pub fn is_contained_within_object(&self, other: &SceneObject, absolute: bool) -> bool {
        self.corner_polygon(absolute).iter().all(|p| other.contains_point(*p, absolute))
    }

    #[must_use]
    pub fn is_contained_within_rect(&self, tl: Point, br: Point, absolute: bool) -> bool {
        let r = self.bounding_rect(absolute);
        r.left >= tl.x && r.left + r.width <= br.x && r.top >= tl.y && r.top + r.height <= br.y
    }

    /// Whether any part of the object is inside the visible scene rectangle
    /// `tl`–`br`.
    #[must_use]
    pub fn is_on_screen(&self, tl: Point, br: Point) -> bool {
        let points = self.corner_polygon(true);
        if points.iter().any(|p| p.x <= br.x && p.x >= tl.x && p.y <= br.y && p.y >= tl.y) {
            return true;
        }
        if self.intersects_with_rect(tl, br, true) {
            return true;
        }
        self.contains_point(tl.mid_point_from(br), true)
    }

    /// Whether the object is visible but not entirely inside `tl`–`br`.
    #[must_use]
    pub fn is_partially_on_screen(&self, tl: Point, br: Point) -> bool {
        if self.intersects_with_rect(tl, br, true) {
            return true;
        }
        let all_outside = self
            .corner_polygon(true)
            .iter()
            .all(|p| (p.x >= br.x || p.x <= tl.x) && (p.y >= br.y || p.y <= tl.y));
        all_outside && self.contains_point(tl.mid_point_from(br), true)
    }
}
