//! Trigonometric and line-intersection primitives.
//!
//! Coordinates follow the screen convention: x grows rightward, y grows
//! downward, and rotations are measured in radians clockwise from the
//! facing-up position. All comparisons are exact floating-point equality,
//! never epsilon-tolerant; the navigation layers depend on bit-identical
//! results across repeated queries. Degenerate inputs (zero-length segments,
//! parallel or coincident lines) flow through as absent intersections or
//! non-finite coordinates that fail every later range test; they never
//! panic.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::{Point, Segment};

/// One full revolution in radians.
pub const FULL_CIRCLE: f64 = TAU;

/// Length of the auxiliary extension used to turn an origin-plus-rotation ray
/// into a second point for the half-plane tests.
const PROBE_LENGTH: f64 = 10.0;

/// Sense in which one rotation should turn to meet another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    /// Turning clockwise closes the gap fastest.
    Clockwise,
    /// Turning counter-clockwise closes the gap fastest.
    CounterClockwise,
    /// The rotations already coincide.
    Aligned,
}

impl RotationDirection {
    /// Multiplier applied to a rotational speed to turn in this direction.
    #[must_use]
    pub const fn signum(self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
            Self::Aligned => 0.0,
        }
    }
}

/// Point reached by travelling `length` units from `(x, y)` at `rotation`.
#[must_use]
pub fn extension_point(rotation: f64, x: f64, y: f64, length: f64) -> Point {
    Point::new(
        x + x_component(rotation, length),
        y + y_component(rotation, length),
    )
}

/// Horizontal distance covered by travelling `length` units at `rotation`.
///
/// Rotations of exactly 0 or π yield exactly zero, so cardinal movement never
/// accumulates trigonometric noise.
#[must_use]
pub fn x_component(rotation: f64, length: f64) -> f64 {
    if rotation == 0.0 || rotation == PI {
        return 0.0;
    }
    length * rotation.sin()
}

/// Vertical distance covered by travelling `length` units at `rotation`.
///
/// Rotations of exactly π/2 or 3π/2 yield exactly zero. The cosine is negated
/// because screen y grows downward.
#[must_use]
pub fn y_component(rotation: f64, length: f64) -> f64 {
    if rotation == FRAC_PI_2 || rotation == PI * 1.5 {
        return 0.0;
    }
    -(length * rotation.cos())
}

/// Rotation of the directed segment from `(x1, y1)` to `(x2, y2)`.
///
/// Degenerate zero-length input produces NaN, which every downstream range
/// test rejects.
#[must_use]
pub fn line_rotation(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y1 - y2;
    let length = ((dx * dx) + (dy * dy)).sqrt();
    let x_ratio = dx / length;
    let r1 = x_ratio.abs().asin();
    if dx > 0.0 {
        let r2 = FRAC_PI_2 + (FRAC_PI_2 - r1);
        if y1 > y2 {
            // Pointing up a bit.
            r1
        } else {
            r2
        }
    } else {
        let r2 = PI * 1.5 + (FRAC_PI_2 - r1);
        let r1 = PI + r1;
        if y1 < y2 {
            // Pointing down a bit.
            r1
        } else {
            r2
        }
    }
}

/// Slope and y-intercept of the line through the two points.
fn line_equation(x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64) {
    let coefficient = (y2 - y1) / (x2 - x1);
    let shift = -(coefficient * x1) + y1;
    (coefficient, shift)
}

/// Solves the line through the two points for y at the provided x.
fn solve_for_y(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    let (coefficient, shift) = line_equation(x1, y1, x2, y2);
    (coefficient * x) + shift
}

/// Intersection of the two infinite lines carrying the provided segments.
///
/// Coincident endpoints short-circuit to the shared point before any slope
/// arithmetic runs; such delicate intersections are exactly where cumulative
/// floating-point error would corrupt the solve. Vertical lines are handled
/// by substitution. Parallel distinct lines produce non-finite coordinates
/// that fail every subsequent range test.
#[must_use]
pub fn intersect_lines(first: Segment, second: Segment) -> Point {
    let (f1, f2) = (first.start(), first.end());
    let (s1, s2) = (second.start(), second.end());

    if f1 == s1 || f1 == s2 {
        return f1;
    }
    if f2 == s1 || f2 == s2 {
        return f2;
    }
    if f1.x() == f2.x() && f1.y() > f2.y() {
        // The first line points straight up.
        if s1.x() == s2.x() {
            return Point::new(f1.x(), s1.y().max(s2.y()));
        }
        return Point::new(f1.x(), solve_for_y(s1.x(), s1.y(), s2.x(), s2.y(), f1.x()));
    }
    if f1.x() == f2.x() && f1.y() < f2.y() {
        // The first line points straight down.
        if s1.x() == s2.x() {
            return Point::new(f1.x(), s1.y().min(s2.y()));
        }
        return Point::new(f1.x(), solve_for_y(s1.x(), s1.y(), s2.x(), s2.y(), f1.x()));
    }
    if s1.x() == s2.x() {
        // The second line is vertical.
        return Point::new(s1.x(), solve_for_y(f1.x(), f1.y(), f2.x(), f2.y(), s1.x()));
    }

    let (coefficient1, shift1) = line_equation(f1.x(), f1.y(), f2.x(), f2.y());
    let (coefficient2, shift2) = line_equation(s1.x(), s1.y(), s2.x(), s2.y());
    let x_intersect = (shift1 - shift2) / (coefficient2 - coefficient1);
    let y_intersect = solve_for_y(s1.x(), s1.y(), s2.x(), s2.y(), x_intersect);
    Point::new(x_intersect, y_intersect)
}

/// Intersection of two line segments, if one lies within both segments'
/// coordinate ranges on both axes.
///
/// Symmetric in its arguments and independent of each segment's endpoint
/// order.
#[must_use]
pub fn intersect_segments(first: Segment, second: Segment) -> Option<Point> {
    let point = intersect_lines(first, second);
    if within_segment_bounds(point, second) && within_segment_bounds(point, first) {
        Some(point)
    } else {
        None
    }
}

/// Intersection of the forward ray from `(origin_x, origin_y)` through
/// `(through_x, through_y)` with the provided segment.
///
/// The candidate must lie within the segment's coordinate ranges and in the
/// forward half-plane of the ray, tested per axis against the ray's direction
/// sign.
#[must_use]
pub fn intersect_ray(
    origin_x: f64,
    origin_y: f64,
    through_x: f64,
    through_y: f64,
    segment: Segment,
) -> Option<Point> {
    let origin = Point::new(origin_x, origin_y);
    let through = Point::new(through_x, through_y);
    let point = intersect_lines(Segment::new(origin, through), segment);
    if !within_segment_bounds(point, segment) {
        return None;
    }
    if behind_ray(point, origin, through) {
        return None;
    }
    Some(point)
}

/// As [`intersect_ray`], with the ray given by an origin and a rotation.
#[must_use]
pub fn intersect_ray_rotated(rotation: f64, x: f64, y: f64, segment: Segment) -> Option<Point> {
    let through = extension_point(rotation, x, y, PROBE_LENGTH);
    intersect_ray(x, y, through.x(), through.y(), segment)
}

/// Point along `segment` nearest to `(px, py)`.
///
/// Computed as the foot of the perpendicular from the query point onto the
/// segment's line; when the foot falls outside the segment, the nearer
/// endpoint is returned instead, determined by re-testing forward-half-plane
/// membership from each end.
#[must_use]
pub fn nearest_point_on_segment(px: f64, py: f64, segment: Segment) -> Point {
    let rotation = line_rotation(
        segment.start().x(),
        segment.start().y(),
        segment.end().x(),
        segment.end().y(),
    );
    let perpendicular = normalise_radians(rotation + FRAC_PI_2);
    let probe = extension_point(perpendicular, px, py, PROBE_LENGTH);
    let foot = intersect_lines(Segment::new(Point::new(px, py), probe), segment);
    if behind_ray(foot, segment.start(), segment.end()) {
        segment.start()
    } else if behind_ray(foot, segment.end(), segment.start()) {
        segment.end()
    } else {
        foot
    }
}

/// Indicates whether `x` lies between `bound1` and `bound2`, inclusive.
///
/// NaN never lies between any two values.
#[must_use]
pub fn is_between(x: f64, bound1: f64, bound2: f64) -> bool {
    if x <= bound1 && x >= bound2 {
        return true;
    }
    if x <= bound2 && x >= bound1 {
        return true;
    }
    false
}

fn within_segment_bounds(point: Point, segment: Segment) -> bool {
    is_between(point.x(), segment.start().x(), segment.end().x())
        && is_between(point.y(), segment.start().y(), segment.end().y())
}

/// Per-axis forward-half-plane test: true when `point` lies backward of the
/// ray from `origin` through `through` on either axis.
fn behind_ray(point: Point, origin: Point, through: Point) -> bool {
    if !(origin.x() >= through.x() && point.x() <= origin.x())
        && !(origin.x() <= through.x() && point.x() >= origin.x())
    {
        return true;
    }
    if !(origin.y() >= through.y() && point.y() <= origin.y())
        && !(origin.y() <= through.y() && point.y() >= origin.y())
    {
        return true;
    }
    false
}

/// Straight-line distance between `(x, y)` and `(x1, y1)`.
#[must_use]
pub fn distance(x: f64, y: f64, x1: f64, y1: f64) -> f64 {
    ((x - x1).powi(2) + (y - y1).powi(2)).sqrt()
}

/// Shortest angular distance between two rotations, at most π.
#[must_use]
pub fn rotation_distance(r1: f64, r2: f64) -> f64 {
    let d1 = (r1 - r2).abs();
    let d2 = FULL_CIRCLE - r1.max(r2) + r1.min(r2);
    d1.min(d2)
}

/// Sense in which `rotation1` should turn to meet `rotation2`.
#[must_use]
pub fn rotation_direction(rotation1: f64, rotation2: f64) -> RotationDirection {
    let mut r1 = rotation1;
    let mut r2 = rotation2;

    if r1 == r2 {
        return RotationDirection::Aligned;
    }
    if r1 > PI {
        r1 = normalise_radians(r1 - PI);
        r2 = normalise_radians(r2 - PI);
    }
    if (r2 - r1) > 0.0 && (r2 - r1) < PI {
        RotationDirection::Clockwise
    } else {
        RotationDirection::CounterClockwise
    }
}

/// Normalises a rotation into the canonical `[0, 2π)` range.
#[must_use]
pub fn normalise_radians(radians: f64) -> f64 {
    let mut radians = radians;
    while radians >= FULL_CIRCLE {
        radians -= FULL_CIRCLE;
    }
    while radians < -FULL_CIRCLE {
        radians += FULL_CIRCLE;
    }
    if radians < 0.0 {
        radians = FULL_CIRCLE + radians;
    }
    radians
}
