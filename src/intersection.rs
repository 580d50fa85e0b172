//! Line, segment and polygon intersection tests, plus point-in-polygon.
//!
//! Everything here is exact float arithmetic with no tolerance: degenerate
//! inputs (zero-length segments, collinear edges) fall into dedicated
//! branches rather than raising errors.
//!
//! Polygons are slices of points; edge `i` runs from `points[i]` to
//! `points[(i + 1) % n]`.

#[cfg(test)]
#[path = "intersection_test.rs"]
mod intersection_test;

use crate::point::Point;

/// Outcome class of an intersection test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntersectionStatus {
    /// Nothing in common.
    #[default]
    None,
    /// One or more crossing points were found.
    Intersection,
    /// Parallel and distinct.
    Parallel,
    /// Overlapping along a common line.
    Coincident,
}

/// Result of an intersection test: a status plus the unique crossing points in
/// discovery order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Intersection {
    pub status: IntersectionStatus,
    pub points: Vec<Point>,
}

impl Intersection {
    #[must_use]
    pub fn new(status: IntersectionStatus) -> Self {
        Self { status, points: Vec::new() }
    }

    /// Whether `point` is already recorded (exact equality).
    #[must_use]
    pub fn includes(&self, point: Point) -> bool {
        self.points.iter().any(|p| *p == point)
    }

    /// Record points not already present.
    pub fn append(&mut self, points: impl IntoIterator<Item = Point>) {
        for p in points {
            if !self.includes(p) {
                self.points.push(p);
            }
        }
    }

    /// Whether `t` lies on the segment `a`–`b` (or the line through them when
    /// `infinite`).
    #[must_use]
    pub fn is_point_contained(t: Point, a: Point, b: Point, infinite: bool) -> bool {
        if a == b {
            t == a
        } else if a.x == b.x {
            a.x == t.x && (infinite || (t.y >= a.y.min(b.y) && t.y <= a.y.max(b.y)))
        } else if a.y == b.y {
            a.y == t.y && (infinite || (t.x >= a.x.min(b.x) && t.x <= a.x.max(b.x)))
        } else {
            let s = (t - a).divide(b - a);
            if infinite {
                s.x.abs() == s.y.abs()
            } else {
                s.x == s.y && (0.0..=1.0).contains(&s.x)
            }
        }
    }

    /// Intersect line/segment `a1`–`a2` with line/segment `b1`–`b2`. Each
    /// `*_infinite` flag turns that side from a segment into a line.
    #[must_use]
    pub fn line_line(a1: Point, a2: Point, b1: Point, b2: Point, a_infinite: bool, b_infinite: bool) -> Self {
        let da = a2 - a1;
        let db = b2 - b1;
        let ab = a1 - b1;
        let ua_t = db.x * ab.y - db.y * ab.x;
        let ub_t = da.x * ab.y - da.y * ab.x;
        let u_b = db.y * da.x - db.x * da.y;

        if u_b != 0.0 {
            let ua = ua_t / u_b;
            let ub = ub_t / u_b;
            let on_a = a_infinite || (0.0..=1.0).contains(&ua);
            let on_b = b_infinite || (0.0..=1.0).contains(&ub);
            if on_a && on_b {
                let mut result = Self::new(IntersectionStatus::Intersection);
                result.append([a1 + da * ua]);
                return result;
            }
            return Self::default();
        }

        if ua_t == 0.0 || ub_t == 0.0 {
            let coincide = a_infinite
                || b_infinite
                || Self::is_point_contained(a1, b1, b2, false)
                || Self::is_point_contained(a2, b1, b2, false)
                || Self::is_point_contained(b1, a1, a2, false)
                || Self::is_point_contained(b2, a1, a2, false);
            return if coincide { Self::new(IntersectionStatus::Coincident) } else { Self::default() };
        }

        Self::new(IntersectionStatus::Parallel)
    }

    /// Segment `s1`–`s2` against the infinite line through `l1`, `l2`.
    #[must_use]
    pub fn segment_line(s1: Point, s2: Point, l1: Point, l2: Point) -> Self {
        Self::line_line(s1, s2, l1, l2, false, true)
    }

    #[must_use]
    pub fn segment_segment(a1: Point, a2: Point, b1: Point, b2: Point) -> Self {
        Self::line_line(a1, a2, b1, b2, false, false)
    }

    /// Line (or segment, when `infinite` is false) against every polygon edge.
    /// Returns early with `Coincident` if the line lies along an edge.
    #[must_use]
    pub fn line_polygon(a1: Point, a2: Point, polygon: &[Point], infinite: bool) -> Self {
        let mut result = Self::default();
        for (b1, b2) in edges(polygon) {
            let inter = Self::line_line(a1, a2, b1, b2, infinite, false);
            if inter.status == IntersectionStatus::Coincident {
                return inter;
            }
            result.append(inter.points);
        }
        if !result.points.is_empty() {
            result.status = IntersectionStatus::Intersection;
        }
        result
    }

    #[must_use]
    pub fn segment_polygon(a1: Point, a2: Point, polygon: &[Point]) -> Self {
        Self::line_polygon(a1, a2, polygon, false)
    }

    /// Every edge of `first` against `second`.
    ///
    /// `Coincident` only when all edges of `first` are coincident with
    /// `second`; partial overlap reports the overlapping edges' endpoints as
    /// ordinary intersection points.
    #[must_use]
    pub fn polygon_polygon(first: &[Point], second: &[Point]) -> Self {
        let mut result = Self::default();
        let mut coincidences = 0usize;
        for (a1, a2) in edges(first) {
            let inter = Self::segment_polygon(a1, a2, second);
            if inter.status == IntersectionStatus::Coincident {
                coincidences += 1;
                result.append([a1, a2]);
            } else {
                result.append(inter.points);
            }
        }
        if coincidences > 0 && coincidences == first.len() {
            return Self::new(IntersectionStatus::Coincident);
        }
        if !result.points.is_empty() {
            result.status = IntersectionStatus::Intersection;
        }
        result
    }

    /// Polygon against the axis-aligned rectangle spanned by `r1` and `r2`
    /// (any two opposite corners).
    #[must_use]
    pub fn polygon_rectangle(polygon: &[Point], r1: Point, r2: Point) -> Self {
        let min = r1.min(r2);
        let max = r1.max(r2);
        let rect = [min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)];
        Self::polygon_polygon(polygon, &rect)
    }

    /// Even-odd ray cast toward negative x. A point exactly on an edge counts
    /// as inside.
    ///
    /// An edge is counted only when it straddles the ray half-open: one end
    /// with `y > point.y`, the other with `y <= point.y`. A vertex on the ray
    /// is then seen once, and horizontal edges never.
    #[must_use]
    pub fn is_point_in_polygon(point: Point, polygon: &[Point]) -> bool {
        let far_x = polygon.iter().fold(point.x - 1.0, |acc, p| acc.min(p.x));
        let far = Point::new(far_x, point.y);
        let mut hits = 0usize;
        for (b1, b2) in edges(polygon) {
            let inter = Self::segment_segment(b1, b2, point, far);
            if inter.includes(point) || Self::is_point_contained(point, b1, b2, false) {
                return true;
            }
            let straddles = (b1.y > point.y) != (b2.y > point.y);
            if straddles && inter.status == IntersectionStatus::Intersection {
                hits += 1;
            }
        }
        hits % 2 == 1
    }
}

/// Closed edge list of a polygon.
fn edges(polygon: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}
