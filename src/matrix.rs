//! 2×3 affine matrices.
//!
//! A `Matrix { a, b, c, d, e, f }` stands for
//!
//! ```text
//! [ a  c  e ]
//! [ b  d  f ]
//! [ 0  0  1 ]
//! ```
//!
//! and `m.multiply(&n)` means "apply `n`, then `m`". Angles passed to the
//! builders are in degrees; the free [`cos`]/[`sin`] helpers take radians.

#[cfg(test)]
#[path = "matrix_test.rs"]
mod matrix_test;

use serde::{Deserialize, Serialize};

use crate::consts::HALF_PI;
use crate::point::Point;

/// Cosine that is exactly `-1`, `0` or `1` at multiples of π/2.
#[must_use]
pub fn cos(radians: f64) -> f64 {
    match quarter_turns(radians) {
        Some(0) => 1.0,
        Some(1 | 3) => 0.0,
        Some(_) => -1.0,
        None => radians.cos(),
    }
}

/// Sine that is exactly `-1`, `0` or `1` at multiples of π/2.
#[must_use]
pub fn sin(radians: f64) -> f64 {
    match quarter_turns(radians) {
        Some(0 | 2) => 0.0,
        Some(1) => 1.0,
        Some(_) => -1.0,
        None => radians.sin(),
    }
}

/// Number of whole quarter turns in `radians` modulo 4, if it is a whole number.
fn quarter_turns(radians: f64) -> Option<u8> {
    let slice = radians / HALF_PI;
    if !slice.is_finite() || slice.fract() != 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(slice.rem_euclid(4.0) as u8)
}

/// Affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 6]", into = "[f64; 6]")]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 6]> for Matrix {
    fn from(v: [f64; 6]) -> Self {
        Self { a: v[0], b: v[1], c: v[2], d: v[3], e: v[4], f: v[5] }
    }
}

impl From<Matrix> for [f64; 6] {
    fn from(m: Matrix) -> Self {
        [m.a, m.b, m.c, m.d, m.e, m.f]
    }
}

/// Inputs to [`Matrix::compose`] and [`Matrix::dimensions`].
///
/// Angles are in degrees. `Default` is the identity transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOptions {
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            angle: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            flip_x: false,
            flip_y: false,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

/// Result of [`Matrix::decompose`]. Angles in degrees.
///
/// `skew_y` is always `0.0`: any vertical skew is folded into `angle` and
/// `skew_x`. This is exact for matrices built by [`Matrix::compose`] and lossy
/// for arbitrary external matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decomposed {
    pub angle: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub skew_x: f64,
    pub skew_y: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl From<Decomposed> for TransformOptions {
    fn from(d: Decomposed) -> Self {
        Self {
            angle: d.angle,
            scale_x: d.scale_x,
            scale_y: d.scale_y,
            skew_x: d.skew_x,
            skew_y: d.skew_y,
            flip_x: false,
            flip_y: false,
            translate_x: d.translate_x,
            translate_y: d.translate_y,
        }
    }
}

impl Matrix {
    pub const IDENTITY: Self = Self { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    #[must_use]
    pub fn to_array(self) -> [f64; 6] {
        self.into()
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    // ── Builders ────────────────────────────────────────────────

    #[must_use]
    pub fn translate(x: f64, y: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Rotation by `angle` degrees around `pivot`.
    #[must_use]
    pub fn rotate(angle: f64, pivot: Point) -> Self {
        let radians = angle.to_radians();
        let (c, s) = (cos(radians), sin(radians));
        Self::new(c, s, -s, c, pivot.x - (c * pivot.x - s * pivot.y), pivot.y - (s * pivot.x + c * pivot.y))
    }

    #[must_use]
    pub fn scale(x: f64, y: f64) -> Self {
        Self::new(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    #[must_use]
    pub fn skew_x(angle: f64) -> Self {
        Self::new(1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0)
    }

    #[must_use]
    pub fn skew_y(angle: f64) -> Self {
        Self::new(1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
    }

    /// Linear part of an object transform: scale (with flips), then skew X,
    /// then skew Y. Angle and translation in `options` are ignored.
    #[must_use]
    pub fn dimensions(options: &TransformOptions) -> Self {
        let sx = if options.flip_x { -options.scale_x } else { options.scale_x };
        let sy = if options.flip_y { -options.scale_y } else { options.scale_y };
        let mut m = Self::scale(sx, sy);
        if options.skew_x != 0.0 {
            m = m.multiply_linear(&Self::skew_x(options.skew_x));
        }
        if options.skew_y != 0.0 {
            m = m.multiply_linear(&Self::skew_y(options.skew_y));
        }
        m
    }

    /// Full object transform: translate ∘ rotate ∘ scale ∘ skewX ∘ skewY.
    #[must_use]
    pub fn compose(options: &TransformOptions) -> Self {
        let mut m = Self::translate(options.translate_x, options.translate_y);
        if options.angle != 0.0 {
            m = m.multiply(&Self::rotate(options.angle, Point::zero()));
        }
        let dims = Self::dimensions(options);
        if !dims.is_identity() {
            m = m.multiply(&dims);
        }
        m
    }

    // ── Algebra ─────────────────────────────────────────────────

    /// `self ∘ other`: apply `other`, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        Self::new(
            self.a * other.a + self.c * other.b,
            self.b * other.a + self.d * other.b,
            self.a * other.c + self.c * other.d,
            self.b * other.c + self.d * other.d,
            self.a * other.e + self.c * other.f + self.e,
            self.b * other.e + self.d * other.f + self.f,
        )
    }

    /// Like [`multiply`](Self::multiply) but the result has no translation.
    #[must_use]
    pub fn multiply_linear(&self, other: &Self) -> Self {
        let mut m = self.multiply(other);
        m.e = 0.0;
        m.f = 0.0;
        m
    }

    /// Compose a list right to left: `[m0, m1, m2]` is `m0 ∘ m1 ∘ m2`.
    /// An empty list is the identity.
    #[must_use]
    pub fn multiply_all(matrices: &[Self]) -> Self {
        matrices.iter().rev().fold(Self::IDENTITY, |product, m| m.multiply(&product))
    }

    #[must_use]
    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Inverse transform.
    ///
    /// The determinant is not checked: a singular matrix (for example one
    /// with a zero scale) yields NaN or infinite entries. Use
    /// [`try_invert`](Self::try_invert) when the input may be singular.
    #[must_use]
    pub fn invert(&self) -> Self {
        let k = 1.0 / self.determinant();
        let mut r = Self::new(k * self.d, -k * self.b, -k * self.c, k * self.a, 0.0, 0.0);
        let t = Point::new(self.e, self.f).transform(&r, true);
        r.e = -t.x;
        r.f = -t.y;
        r
    }

    /// Inverse transform, or `None` when the matrix is singular.
    #[must_use]
    pub fn try_invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        Some(self.invert())
    }

    /// Split into angle, scale, horizontal skew and translation.
    ///
    /// `skew_y` is always 0. Matrices built by [`compose`](Self::compose)
    /// round-trip exactly; a matrix with an independent vertical skew comes
    /// back as the equivalent angle and `skew_x`.
    #[must_use]
    pub fn decompose(&self) -> Decomposed {
        let denom = self.a * self.a + self.b * self.b;
        let scale_x = denom.sqrt();
        Decomposed {
            angle: self.b.atan2(self.a).to_degrees(),
            scale_x,
            scale_y: (self.a * self.d - self.c * self.b) / scale_x,
            skew_x: (self.a * self.c + self.b * self.d).atan2(denom).to_degrees(),
            skew_y: 0.0,
            translate_x: self.e,
            translate_y: self.f,
        }
    }

    // ── Planes ──────────────────────────────────────────────────

    /// Matrix taking coordinates expressed in plane `from` into plane `to`.
    #[must_use]
    pub fn plane_change(from: &Self, to: &Self) -> Self {
        to.invert().multiply(from)
    }
}

/// Move a point from plane `from` to plane `to`.
#[must_use]
pub fn send_point_to_plane(point: Point, from: &Matrix, to: &Matrix) -> Point {
    point.transform(&Matrix::plane_change(from, to), false)
}

/// Move a vector (translation ignored) from plane `from` to plane `to`.
#[must_use]
pub fn send_vector_to_plane(vector: Point, from: &Matrix, to: &Matrix) -> Point {
    vector.transform(&Matrix::plane_change(from, to), true)
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingRect {
    /// Smallest rectangle containing every point. Empty input gives a zero rect.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (lo, hi) = points.iter().fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Self { left: lo.x, top: lo.y, width: hi.x - lo.x, height: hi.y - lo.y }
    }

    #[must_use]
    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[must_use]
    pub fn bottom_right(&self) -> Point {
        Point::new(self.left + self.width, self.top + self.height)
    }
}

/// Size of the axis-aligned box around a `width × height` box centered at the
/// origin after applying the scale/flip/skew part of `options`.
#[must_use]
pub fn size_after_transform(width: f64, height: f64, options: &TransformOptions) -> Point {
    let (hx, hy) = (width / 2.0, height / 2.0);
    let m = Matrix::dimensions(options);
    let corners = [
        Point::new(-hx, -hy),
        Point::new(hx, -hy),
        Point::new(-hx, hy),
        Point::new(hx, hy),
    ]
    .map(|p| p.transform(&m, false));
    let bbox = BoundingRect::from_points(&corners);
    Point::new(bbox.width, bbox.height)
}
