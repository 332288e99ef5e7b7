//! Rectangle footprint model shared by collision, visibility and navigation.

use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::{Point, Segment};

/// Axis-anchored rectangle with a position, size and rotation.
///
/// The anchor is the unrotated top-left corner. Corner and edge queries
/// expose the unrotated footprint: visibility and navigation reason about
/// axis-aligned outlines, and only the collision transform applies
/// `rotation`, about the shape's own center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: f64,
}

impl Shape {
    /// Creates a new shape; the rotation is normalised into `[0, 2π)`.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: geometry::normalise_radians(rotation),
        }
    }

    /// Horizontal coordinate of the anchor.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate of the anchor.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Width of the footprint.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height of the footprint.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Rotation in radians clockwise from facing up, within `[0, 2π)`.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Moves the anchor horizontally.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Moves the anchor vertically.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Resizes the footprint horizontally.
    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Resizes the footprint vertically.
    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    /// Replaces the rotation, normalising it into `[0, 2π)`.
    pub fn set_rotation(&mut self, rotation: f64) {
        self.rotation = geometry::normalise_radians(rotation);
    }

    /// The four corner points of the unrotated footprint.
    #[must_use]
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x, self.y + self.height),
            Point::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// The four edges of the unrotated footprint: left, right, top, bottom.
    #[must_use]
    pub fn edges(&self) -> [Segment; 4] {
        let left_x = self.x;
        let right_x = self.x + self.width;
        let top_y = self.y;
        let bottom_y = self.y + self.height;
        [
            Segment::new(Point::new(left_x, top_y), Point::new(left_x, bottom_y)),
            Segment::new(Point::new(right_x, top_y), Point::new(right_x, bottom_y)),
            Segment::new(Point::new(left_x, top_y), Point::new(right_x, top_y)),
            Segment::new(Point::new(left_x, bottom_y), Point::new(right_x, bottom_y)),
        ]
    }

    /// Geometric center of the footprint, computed as the intersection of
    /// its two diagonals.
    #[must_use]
    pub fn center(&self) -> Point {
        let falling = Segment::new(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        );
        let rising = Segment::new(
            Point::new(self.x + self.width, self.y),
            Point::new(self.x, self.y + self.height),
        );
        geometry::intersect_lines(falling, rising)
    }

    /// Pushes each provided point directly away from the shape's center by
    /// `distance`.
    #[must_use]
    pub fn push_out_points(&self, points: &[Point], distance: f64) -> Vec<Point> {
        let center = self.center();
        points
            .iter()
            .map(|point| {
                let rotation =
                    geometry::line_rotation(center.x(), center.y(), point.x(), point.y());
                geometry::extension_point(rotation, point.x(), point.y(), distance)
            })
            .collect()
    }

    /// Reports whether `(x, y)` coincides exactly with one of the corners.
    #[must_use]
    pub fn is_corner(&self, x: f64, y: f64) -> bool {
        self.corners()
            .iter()
            .any(|corner| corner.x() == x && corner.y() == y)
    }

    /// Nearest point along the shape's outline to `(x, y)`.
    #[must_use]
    pub fn nearest_surface_point(&self, x: f64, y: f64) -> Point {
        let mut nearest = None;
        let mut nearest_distance = f64::MAX;
        for edge in self.edges() {
            let candidate = geometry::nearest_point_on_segment(x, y, edge);
            let candidate_distance = geometry::distance(x, y, candidate.x(), candidate.y());
            if candidate_distance < nearest_distance {
                nearest_distance = candidate_distance;
                nearest = Some(candidate);
            }
        }
        nearest.unwrap_or_else(|| Point::new(self.x, self.y))
    }

    /// Intersections between the shape's outline and the sightline from
    /// `(x1, y1)` to `(x2, y2)`.
    ///
    /// Edges that share a terminating point with the sightline are skipped:
    /// a sightline ending at a corner must not be blocked by the two edges
    /// that meet at that corner.
    #[must_use]
    pub fn sightline_intersections(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<Point> {
        let sightline = Segment::new(Point::new(x1, y1), Point::new(x2, y2));
        let mut intersections = Vec::new();
        for edge in self.edges() {
            if edge.shares_endpoint(&sightline) {
                continue;
            }
            if let Some(point) = geometry::intersect_segments(sightline, edge) {
                intersections.push(point);
            }
        }
        intersections
    }
}

#[cfg(test)]
mod tests {
    use super::Shape;
    use crate::Point;

    fn square() -> Shape {
        Shape::new(0.0, 0.0, 10.0, 10.0, 0.0)
    }

    #[test]
    fn corners_enumerate_the_unrotated_footprint() {
        let corners = square().corners();
        assert_eq!(corners[0], Point::new(0.0, 0.0));
        assert_eq!(corners[1], Point::new(10.0, 0.0));
        assert_eq!(corners[2], Point::new(0.0, 10.0));
        assert_eq!(corners[3], Point::new(10.0, 10.0));
    }

    #[test]
    fn corners_ignore_rotation() {
        let rotated = Shape::new(0.0, 0.0, 10.0, 10.0, 1.0);
        assert_eq!(rotated.corners(), square().corners());
        assert_eq!(rotated.edges(), square().edges());
    }

    #[test]
    fn center_is_the_diagonal_intersection() {
        assert_eq!(square().center(), Point::new(5.0, 5.0));
        assert_eq!(
            Shape::new(10.0, 20.0, 4.0, 2.0, 0.0).center(),
            Point::new(12.0, 21.0)
        );
    }

    #[test]
    fn push_out_moves_corners_away_from_center() {
        let shape = square();
        let center = shape.center();
        let pushed = shape.push_out_points(&shape.corners(), 2.0);
        for (corner, moved) in shape.corners().iter().zip(&pushed) {
            let before = center.distance_to(*corner);
            let after = center.distance_to(*moved);
            assert!(
                after > before,
                "pushed corner {moved:?} did not move outward from {corner:?}"
            );
        }
    }

    #[test]
    fn is_corner_requires_exact_coordinates() {
        let shape = square();
        assert!(shape.is_corner(10.0, 10.0));
        assert!(!shape.is_corner(10.0, 10.0 + f64::EPSILON * 16.0));
    }

    #[test]
    fn nearest_surface_point_projects_onto_the_closest_edge() {
        let shape = square();
        assert_eq!(shape.nearest_surface_point(5.0, -4.0), Point::new(5.0, 0.0));
        assert_eq!(shape.nearest_surface_point(-4.0, 5.0), Point::new(0.0, 5.0));
        assert_eq!(
            shape.nearest_surface_point(13.0, 5.0),
            Point::new(10.0, 5.0)
        );
    }

    #[test]
    fn rotation_is_normalised_on_construction_and_assignment() {
        let mut shape = Shape::new(0.0, 0.0, 1.0, 1.0, -std::f64::consts::FRAC_PI_2);
        assert_eq!(shape.rotation(), std::f64::consts::PI * 1.5);

        shape.set_rotation(std::f64::consts::TAU);
        assert_eq!(shape.rotation(), 0.0);
    }

    #[test]
    fn sightline_ending_at_a_corner_is_not_blocked_by_its_own_edges() {
        let shape = square();
        // Sightline from outside the square straight to its top-left corner:
        // the left and top edges terminate at that corner and are exempt.
        let intersections = shape.sightline_intersections(-5.0, -5.0, 0.0, 0.0);
        assert!(intersections.is_empty());
    }

    #[test]
    fn sightline_through_the_interior_is_blocked() {
        let shape = square();
        let intersections = shape.sightline_intersections(-5.0, 5.0, 15.0, 5.0);
        assert_eq!(intersections.len(), 2);
    }
}
