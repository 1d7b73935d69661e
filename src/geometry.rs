//! Exact 2D geometry for contact tests
//!
//! The tricky part of the arena: not just "do these shapes overlap" but
//! "where along its path does a moving bounding circle *first* touch an
//! obstacle". Everything here is pure f64 math over [`glam::DVec2`] with no
//! simulation state involved.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Tolerance for degenerate-direction and tangency decisions
pub const GEOM_EPSILON: f64 = 1e-9;

/// True if `v` is numerically the null vector
#[inline]
pub fn is_null(v: DVec2) -> bool {
    v.length_squared() < GEOM_EPSILON * GEOM_EPSILON
}

/// Angle between two vectors, clamped to [0, π]
///
/// Null input yields 0 rather than NaN.
pub fn angle_between(a: DVec2, b: DVec2) -> f64 {
    let denom = a.length() * b.length();
    if denom < GEOM_EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// An infinite line given by a point on it and a direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub point: DVec2,
    pub direction: DVec2,
}

impl Line {
    /// A line through `point` along `direction`
    ///
    /// The direction must be non-null.
    pub fn new(point: DVec2, direction: DVec2) -> Result<Self> {
        if is_null(direction) {
            return Err(SimError::InvalidGeometry("line direction is null"));
        }
        Ok(Self { point, direction })
    }

    /// The line through two distinct points
    pub fn through(a: DVec2, b: DVec2) -> Result<Self> {
        Self::new(a, b - a)
    }

    /// Whether the line runs parallel to the y axis
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.direction.x.abs() < GEOM_EPSILON
    }

    /// Intersection with another line
    ///
    /// `None` when the z component of the direction cross product is zero,
    /// i.e. the lines are parallel (coincident lines included).
    pub fn intersection_with_line(&self, other: &Line) -> Option<DVec2> {
        let cross = self.direction.perp_dot(other.direction);
        if cross.abs() < GEOM_EPSILON {
            return None;
        }
        let t = (other.point - self.point).perp_dot(other.direction) / cross;
        Some(self.point + self.direction * t)
    }

    /// Intersection points with a circle: two (secant), one (tangent) or none
    ///
    /// A vertical line has no slope-intercept form and gets the direct
    /// algebraic solution; any other line is substituted into the circle
    /// equation, leaving a quadratic `(m²+1)x² + …` in x.
    pub fn intersection_with_circle(&self, circle: &Circle) -> Result<Vec<DVec2>> {
        if circle.radius <= 0.0 {
            return Err(SimError::InvalidGeometry("circle radius must be positive"));
        }
        let c = circle.center;
        let r = circle.radius;

        if self.is_vertical() {
            let x = self.point.x;
            let disc = r * r - (x - c.x) * (x - c.x);
            return Ok(if disc.abs() < GEOM_EPSILON {
                vec![DVec2::new(x, c.y)]
            } else if disc < 0.0 {
                Vec::new()
            } else {
                let root = disc.sqrt();
                vec![DVec2::new(x, c.y - root), DVec2::new(x, c.y + root)]
            });
        }

        let m = self.direction.y / self.direction.x;
        let b = self.point.y - m * self.point.x;
        let qa = m * m + 1.0;
        let qb = 2.0 * (m * b - m * c.y - c.x);
        let qc = c.x * c.x + (b - c.y) * (b - c.y) - r * r;
        let disc = qb * qb - 4.0 * qa * qc;
        Ok(if disc.abs() < GEOM_EPSILON {
            let x = -qb / (2.0 * qa);
            vec![DVec2::new(x, m * x + b)]
        } else if disc < 0.0 {
            Vec::new()
        } else {
            let root = disc.sqrt();
            let x1 = (-qb - root) / (2.0 * qa);
            let x2 = (-qb + root) / (2.0 * qa);
            vec![DVec2::new(x1, m * x1 + b), DVec2::new(x2, m * x2 + b)]
        })
    }
}

/// A circle; the bounding shape of every entity in the arena
///
/// The tangency queries treat the circle as *moving* from its center along
/// a path and answer: where is the center the instant the circle first
/// touches the obstacle without penetrating it?
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    /// A circle with a strictly positive radius
    pub fn new(center: DVec2, radius: f64) -> Result<Self> {
        if radius <= 0.0 {
            return Err(SimError::InvalidGeometry("circle radius must be positive"));
        }
        Ok(Self { center, radius })
    }

    /// First center position along `direction` at which the circle becomes
    /// tangent to the infinite vertical line `x = line_x`
    ///
    /// `None` when the path runs parallel to the line or the contact lies
    /// behind the start.
    pub fn first_tangency_vertical(&self, direction: DVec2, line_x: f64) -> Option<DVec2> {
        if direction.x.abs() < GEOM_EPSILON {
            return None;
        }
        // Tangency happens one radius short of the line, on the side the
        // path starts from.
        let side = if self.center.x < line_x { -1.0 } else { 1.0 };
        let target_x = line_x + side * self.radius;
        let t = (target_x - self.center.x) / direction.x;
        if t < -GEOM_EPSILON {
            return None;
        }
        Some(self.center + direction * t)
    }

    /// First center position along `direction` at which the circle becomes
    /// tangent to the infinite horizontal line `y = line_y`
    pub fn first_tangency_horizontal(&self, direction: DVec2, line_y: f64) -> Option<DVec2> {
        if direction.y.abs() < GEOM_EPSILON {
            return None;
        }
        let side = if self.center.y < line_y { -1.0 } else { 1.0 };
        let target_y = line_y + side * self.radius;
        let t = (target_y - self.center.y) / direction.y;
        if t < -GEOM_EPSILON {
            return None;
        }
        Some(self.center + direction * t)
    }

    /// First center position along `direction` at which the circle touches
    /// the single point `point`
    ///
    /// Quadratic in the path parameter; the smallest non-negative root is
    /// the first touch.
    pub fn first_tangency_with_point(&self, direction: DVec2, point: DVec2) -> Option<DVec2> {
        let qa = direction.length_squared();
        if qa < GEOM_EPSILON * GEOM_EPSILON {
            return None;
        }
        let f = self.center - point;
        let qb = 2.0 * f.dot(direction);
        let qc = f.length_squared() - self.radius * self.radius;
        let disc = qb * qb - 4.0 * qa * qc;
        if disc < 0.0 {
            return None;
        }
        let root = disc.sqrt();
        let t0 = (-qb - root) / (2.0 * qa);
        let t1 = (-qb + root) / (2.0 * qa);
        let t = if t0 >= -GEOM_EPSILON {
            t0
        } else if t1 >= -GEOM_EPSILON {
            t1
        } else {
            return None;
        };
        Some(self.center + direction * t)
    }

    /// First center position along `direction` at which the circle touches
    /// the finite axis-aligned segment from `a` to `b`
    ///
    /// Solved against the infinite carrier line first; when that contact
    /// slides off an end of the segment, the end point itself is the
    /// obstacle and the point-tangency solution applies.
    pub fn first_tangency_with_segment(&self, direction: DVec2, a: DVec2, b: DVec2) -> Option<DVec2> {
        if (a.x - b.x).abs() < GEOM_EPSILON {
            let (lo, hi) = if a.y <= b.y { (a.y, b.y) } else { (b.y, a.y) };
            let center = self.first_tangency_vertical(direction, a.x)?;
            // The contact point on a vertical line shares the center's y.
            if center.y < lo {
                self.first_tangency_with_point(direction, DVec2::new(a.x, lo))
            } else if center.y > hi {
                self.first_tangency_with_point(direction, DVec2::new(a.x, hi))
            } else {
                Some(center)
            }
        } else if (a.y - b.y).abs() < GEOM_EPSILON {
            let (lo, hi) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };
            let center = self.first_tangency_horizontal(direction, a.y)?;
            if center.x < lo {
                self.first_tangency_with_point(direction, DVec2::new(lo, a.y))
            } else if center.x > hi {
                self.first_tangency_with_point(direction, DVec2::new(hi, a.y))
            } else {
                Some(center)
            }
        } else {
            debug_assert!(false, "segment must be axis-aligned");
            None
        }
    }

    /// First center position along `direction` at which the circle touches
    /// the grid cell spanning `min`..`max`, approaching from outside
    ///
    /// Tests all four cell borders, discards borders being approached from
    /// inside the cell, and among the remaining candidates picks the one
    /// nearest the path's start (= reached first in time).
    pub fn first_tangency_with_cell(&self, direction: DVec2, min: DVec2, max: DVec2) -> Option<DVec2> {
        // Borders wound counterclockwise, interior on the left; a border is
        // an obstacle only when direction × border < 0 (crossed from
        // outside).
        let borders = [
            (DVec2::new(min.x, min.y), DVec2::new(max.x, min.y)),
            (DVec2::new(max.x, min.y), DVec2::new(max.x, max.y)),
            (DVec2::new(max.x, max.y), DVec2::new(min.x, max.y)),
            (DVec2::new(min.x, max.y), DVec2::new(min.x, min.y)),
        ];

        let mut best: Option<DVec2> = None;
        for (a, b) in borders {
            if direction.perp_dot(b - a) >= 0.0 {
                continue;
            }
            if let Some(candidate) = self.first_tangency_with_segment(direction, a, b) {
                let closer = best
                    .map(|p| candidate.distance_squared(self.center) < p.distance_squared(self.center))
                    .unwrap_or(true);
                if closer {
                    best = Some(candidate);
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-6;

    fn close(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_line_rejects_null_direction() {
        assert!(Line::new(DVec2::ZERO, DVec2::ZERO).is_err());
        assert!(Line::new(DVec2::ZERO, DVec2::X).is_ok());
    }

    #[test]
    fn test_line_line_intersection() {
        let a = Line::new(DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)).unwrap();
        let b = Line::new(DVec2::new(4.0, 0.0), DVec2::new(0.0, 1.0)).unwrap();
        let p = a.intersection_with_line(&b).unwrap();
        assert!(close(p, DVec2::new(4.0, 4.0)));
    }

    #[test]
    fn test_parallel_lines_do_not_intersect() {
        let a = Line::new(DVec2::new(0.0, 0.0), DVec2::new(2.0, 1.0)).unwrap();
        let b = Line::new(DVec2::new(0.0, 5.0), DVec2::new(4.0, 2.0)).unwrap();
        assert!(a.intersection_with_line(&b).is_none());
        // Coincident lines are parallel too
        assert!(a.intersection_with_line(&a).is_none());
    }

    #[test]
    fn test_line_circle_secant_tangent_miss() {
        let circle = Circle::new(DVec2::new(0.0, 0.0), 1.0).unwrap();

        // Secant through the center: two points
        let secant = Line::new(DVec2::new(-5.0, 0.0), DVec2::X).unwrap();
        let pts = secant.intersection_with_circle(&circle).unwrap();
        assert_eq!(pts.len(), 2);
        for p in &pts {
            assert!((p.length() - 1.0).abs() < EPS);
        }

        // Tangent along y = 1: one point
        let tangent = Line::new(DVec2::new(-5.0, 1.0), DVec2::X).unwrap();
        let pts = tangent.intersection_with_circle(&circle).unwrap();
        assert_eq!(pts.len(), 1);
        assert!(close(pts[0], DVec2::new(0.0, 1.0)));

        // Miss along y = 2: nothing
        let miss = Line::new(DVec2::new(-5.0, 2.0), DVec2::X).unwrap();
        assert!(miss.intersection_with_circle(&circle).unwrap().is_empty());
    }

    #[test]
    fn test_vertical_line_circle_intersection() {
        let circle = Circle::new(DVec2::new(3.0, 2.0), 2.0).unwrap();
        let vertical = Line::new(DVec2::new(3.0, -10.0), DVec2::Y).unwrap();
        let pts = vertical.intersection_with_circle(&circle).unwrap();
        assert_eq!(pts.len(), 2);
        assert!(close(pts[0], DVec2::new(3.0, 0.0)));
        assert!(close(pts[1], DVec2::new(3.0, 4.0)));

        // Tangent vertical line at x = 5
        let grazing = Line::new(DVec2::new(5.0, 0.0), DVec2::Y).unwrap();
        let pts = grazing.intersection_with_circle(&circle).unwrap();
        assert_eq!(pts.len(), 1);
        assert!(close(pts[0], DVec2::new(5.0, 2.0)));
    }

    #[test]
    fn test_intersection_rejects_degenerate_radius() {
        let line = Line::new(DVec2::ZERO, DVec2::X).unwrap();
        let flat = Circle { center: DVec2::ZERO, radius: 0.0 };
        assert!(line.intersection_with_circle(&flat).is_err());
        let negative = Circle { center: DVec2::ZERO, radius: -1.0 };
        assert!(line.intersection_with_circle(&negative).is_err());
        assert!(Circle::new(DVec2::ZERO, -1.0).is_err());
    }

    #[test]
    fn test_tangency_vertical_line() {
        let circle = Circle::new(DVec2::new(0.0, 0.0), 1.0).unwrap();
        let touch = circle.first_tangency_vertical(DVec2::X, 5.0).unwrap();
        assert!(close(touch, DVec2::new(4.0, 0.0)));

        // Moving parallel to the line: no tangency
        assert!(circle.first_tangency_vertical(DVec2::Y, 5.0).is_none());
        // Moving away from the line: contact lies behind the start
        assert!(circle.first_tangency_vertical(-DVec2::X, 5.0).is_none());
    }

    #[test]
    fn test_tangency_horizontal_line() {
        let circle = Circle::new(DVec2::new(2.0, 6.0), 0.5).unwrap();
        let touch = circle.first_tangency_horizontal(DVec2::new(0.0, -1.0), 3.0).unwrap();
        assert!(close(touch, DVec2::new(2.0, 3.5)));
    }

    #[test]
    fn test_tangency_with_point() {
        let circle = Circle::new(DVec2::new(0.0, 0.0), 1.0).unwrap();
        // Head-on: touch when the center is one radius short of the point
        let touch = circle.first_tangency_with_point(DVec2::X, DVec2::new(4.0, 0.0)).unwrap();
        assert!(close(touch, DVec2::new(3.0, 0.0)));
        // Passing too far away: never touches
        assert!(circle
            .first_tangency_with_point(DVec2::X, DVec2::new(4.0, 2.0))
            .is_none());
    }

    #[test]
    fn test_tangency_with_segment_clamps_to_endpoint() {
        let a = DVec2::new(4.0, 0.0);
        let b = DVec2::new(4.0, 3.0);

        // Straight at the middle of the segment: infinite-line solution
        let mid = Circle::new(DVec2::new(0.0, 1.5), 1.0).unwrap();
        let touch = mid.first_tangency_with_segment(DVec2::X, a, b).unwrap();
        assert!(close(touch, DVec2::new(3.0, 1.5)));

        // Grazing past the top end: falls back to point tangency against it
        let grazing = Circle::new(DVec2::new(0.0, 3.5), 1.0).unwrap();
        let touch = grazing.first_tangency_with_segment(DVec2::X, a, b).unwrap();
        assert!((touch.distance(b) - 1.0).abs() < EPS);
        assert!(touch.y > 3.0);

        // Passing far beyond the end: never touches
        let clear = Circle::new(DVec2::new(0.0, 5.0), 1.0).unwrap();
        assert!(clear.first_tangency_with_segment(DVec2::X, a, b).is_none());
    }

    #[test]
    fn test_cell_tangency_picks_nearest_border() {
        // Cell [4,5]x[0,1]; circle left of it moving right hits the left
        // border first, never the far right border.
        let circle = Circle::new(DVec2::new(0.0, 0.5), 0.25).unwrap();
        let touch = circle
            .first_tangency_with_cell(DVec2::X, DVec2::new(4.0, 0.0), DVec2::new(5.0, 1.0))
            .unwrap();
        assert!(close(touch, DVec2::new(3.75, 0.5)));
    }

    #[test]
    fn test_cell_tangency_ignores_borders_approached_from_inside() {
        // Moving up-right toward the cell's lower-left region: the top and
        // right borders would be crossed from the inside and are not
        // candidates. The left border wins.
        let circle = Circle::new(DVec2::new(3.5, -1.0), 0.25).unwrap();
        let touch = circle
            .first_tangency_with_cell(
                DVec2::new(0.2, 1.0),
                DVec2::new(4.0, 0.0),
                DVec2::new(5.0, 1.0),
            )
            .unwrap();
        assert!(close(touch, DVec2::new(3.75, 0.25)));
    }

    #[test]
    fn test_cell_tangency_corner_approach() {
        // Aimed between two borders so the infinite-line contacts slide off
        // the segment: the shared corner is the obstacle.
        let circle = Circle::new(DVec2::new(3.0, -1.0), 0.25).unwrap();
        let corner = DVec2::new(4.0, 0.0);
        let touch = circle
            .first_tangency_with_cell(
                (corner - circle.center).normalize(),
                DVec2::new(4.0, 0.0),
                DVec2::new(5.0, 1.0),
            )
            .unwrap();
        assert!((touch.distance(corner) - 0.25).abs() < EPS);
    }

    proptest! {
        #[test]
        fn prop_angle_between_is_clamped(ax in -10.0f64..10.0, ay in -10.0f64..10.0,
                                         bx in -10.0f64..10.0, by in -10.0f64..10.0) {
            let angle = angle_between(DVec2::new(ax, ay), DVec2::new(bx, by));
            prop_assert!((0.0..=std::f64::consts::PI + 1e-12).contains(&angle));
        }

        #[test]
        fn prop_vertical_tangency_center_is_one_radius_off(cy in -50.0f64..50.0,
                                                           dy in -1.0f64..1.0,
                                                           r in 0.1f64..5.0) {
            let circle = Circle::new(DVec2::new(-20.0, cy), r).unwrap();
            let dir = DVec2::new(1.0, dy);
            if let Some(touch) = circle.first_tangency_vertical(dir, 0.0) {
                prop_assert!((touch.x.abs() - r).abs() < 1e-9);
            }
        }

        #[test]
        fn prop_secant_points_lie_on_circle(px in -10.0f64..10.0, py in -10.0f64..10.0,
                                            dx in -1.0f64..1.0, dy in -1.0f64..1.0,
                                            r in 0.5f64..4.0) {
            prop_assume!(dx.abs() > 1e-3 || dy.abs() > 1e-3);
            let line = Line::new(DVec2::new(px, py), DVec2::new(dx, dy)).unwrap();
            let circle = Circle::new(DVec2::ZERO, r).unwrap();
            for p in line.intersection_with_circle(&circle).unwrap() {
                prop_assert!((p.length() - r).abs() < 1e-6);
            }
        }
    }
}
