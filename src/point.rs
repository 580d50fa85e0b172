//! Two-dimensional point/vector value type.
//!
//! `Point` is `Copy` and every arithmetic method returns a fresh value. The
//! only mutators are the `*Assign` operator impls and the explicitly named
//! `set_*` / `swap` methods.

#[cfg(test)]
#[path = "point_test.rs"]
mod point_test;

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::matrix::{Matrix, cos, sin};

/// A point in object, parent, scene or viewport space.
///
/// Which plane a point lives in is a property of where it came from, not of
/// the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    // ── Arithmetic ──────────────────────────────────────────────

    #[must_use]
    pub fn scalar_add(self, scalar: f64) -> Self {
        Self::new(self.x + scalar, self.y + scalar)
    }

    #[must_use]
    pub fn scalar_subtract(self, scalar: f64) -> Self {
        Self::new(self.x - scalar, self.y - scalar)
    }

    /// Component-wise product.
    #[must_use]
    pub fn multiply(self, other: Self) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    /// Component-wise quotient. Division by a zero component yields ±∞ or NaN.
    #[must_use]
    pub fn divide(self, other: Self) -> Self {
        Self::new(self.x / other.x, self.y / other.y)
    }

    #[must_use]
    pub fn scalar_multiply(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }

    #[must_use]
    pub fn scalar_divide(self, scalar: f64) -> Self {
        Self::new(self.x / scalar, self.y / scalar)
    }

    // ── Comparison ──────────────────────────────────────────────

    /// Strictly less on both axes.
    #[must_use]
    pub fn lt(self, other: Self) -> bool {
        self.x < other.x && self.y < other.y
    }

    #[must_use]
    pub fn lte(self, other: Self) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// Strictly greater on both axes.
    #[must_use]
    pub fn gt(self, other: Self) -> bool {
        self.x > other.x && self.y > other.y
    }

    #[must_use]
    pub fn gte(self, other: Self) -> bool {
        self.x >= other.x && self.y >= other.y
    }

    // ── Interpolation and distances ─────────────────────────────

    /// Linear interpolation toward `other`. `t` is clamped into `[0, 1]`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[must_use]
    pub fn distance_from(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    #[must_use]
    pub fn mid_point_from(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }

    /// Component-wise minimum.
    #[must_use]
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    // ── Mutators ────────────────────────────────────────────────

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_from_point(&mut self, other: Self) {
        self.x = other.x;
        self.y = other.y;
    }

    /// Exchange coordinates with `other` in place.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    // ── Affine ──────────────────────────────────────────────────

    /// Rotate by `radians` around `origin`.
    ///
    /// Uses the exact `cos`/`sin` helpers so quarter turns land on integer
    /// coordinates without float noise.
    #[must_use]
    pub fn rotate(self, radians: f64, origin: Self) -> Self {
        let (c, s) = (cos(radians), sin(radians));
        let v = self - origin;
        Self::new(v.x * c - v.y * s, v.x * s + v.y * c) + origin
    }

    /// Apply `matrix`. With `ignore_translation` only the linear part is used,
    /// which is the right thing for vectors and sizes.
    #[must_use]
    pub fn transform(self, matrix: &Matrix, ignore_translation: bool) -> Self {
        let x = matrix.a * self.x + matrix.c * self.y;
        let y = matrix.b * self.x + matrix.d * self.y;
        if ignore_translation {
            Self::new(x, y)
        } else {
            Self::new(x + matrix.e, y + matrix.f)
        }
    }

    /// Angle of this vector from the positive x axis, in radians.
    #[must_use]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

// ── Operators ───────────────────────────────────────────────────

impl Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scalar_multiply(rhs)
    }
}

impl Div<f64> for Point {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.scalar_divide(rhs)
    }
}

impl Neg for Point {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f64> for Point {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl DivAssign<f64> for Point {
    fn div_assign(&mut self, rhs: f64) {
        self.x /= rhs;
        self.y /= rhs;
    }
}
