#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight resolution between a viewer and obstacle corners.
//!
//! The resolver answers which obstacle corners a viewer can see, with each
//! corner nudged outward from its obstacle's center so navigation waypoints
//! sit just clear of the surface they belong to. Cost is quadratic in the
//! obstacle count (every obstacle's corners are tested against every
//! obstacle's edges), which is acceptable for the dozens of static obstacles
//! a scene carries.

use blackout_core::{geometry, shape::Shape, Point};

/// An obstacle considered from a viewer's perspective.
///
/// Carries the point on the obstacle's surface nearest the viewer and the
/// distance to it; queries build obstructions transiently and sort them by
/// ascending distance to fix their processing order.
#[derive(Clone, Copy, Debug)]
pub struct Obstruction<'a> {
    shape: &'a Shape,
    nearest: Point,
    distance: f64,
}

impl<'a> Obstruction<'a> {
    /// Considers `shape` as an obstruction viewed from `(origin_x, origin_y)`.
    #[must_use]
    pub fn new(shape: &'a Shape, origin_x: f64, origin_y: f64) -> Self {
        let nearest = shape.nearest_surface_point(origin_x, origin_y);
        let distance = geometry::distance(origin_x, origin_y, nearest.x(), nearest.y());
        Self {
            shape,
            nearest,
            distance,
        }
    }

    /// The obstructing shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        self.shape
    }

    /// Point on the obstruction's surface nearest the viewer.
    #[must_use]
    pub fn nearest_surface_point(&self) -> Point {
        self.nearest
    }

    /// Distance from the viewer to the nearest surface point.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }
}

/// Corner points visible from `(viewer_x, viewer_y)` across the obstacle set.
///
/// Each obstacle contributes its four corners pushed outward from the
/// obstacle's own center by `push_buffer`; a candidate survives only if its
/// sightline from the viewer crosses no edge of any obstruction, where edges
/// sharing a terminal point with the sightline are exempt: an obstacle's own
/// corner is never excluded purely by the two edges that meet at it.
#[must_use]
pub fn visible_points(
    viewer_x: f64,
    viewer_y: f64,
    obstacles: &[Shape],
    push_buffer: f64,
) -> Vec<Point> {
    let mut obstructions: Vec<Obstruction<'_>> = obstacles
        .iter()
        .map(|shape| Obstruction::new(shape, viewer_x, viewer_y))
        .collect();
    obstructions.sort_by(|first, second| first.distance.total_cmp(&second.distance));

    let mut viewable = Vec::new();
    for obstruction in &obstructions {
        let corners = obstruction.shape.corners();
        let mut candidates = obstruction.shape.push_out_points(&corners, push_buffer);
        for blocker in &obstructions {
            if candidates.is_empty() {
                break;
            }
            candidates.retain(|candidate| {
                blocker
                    .shape
                    .sightline_intersections(viewer_x, viewer_y, candidate.x(), candidate.y())
                    .is_empty()
            });
        }
        viewable.extend(candidates);
    }
    viewable
}

/// Cone of vision anchored at an origin point.
///
/// The cone is described by two periphery rotations either side of a facing
/// direction; containment handles the wrap across the zero rotation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
    origin: Point,
    left_rotation: f64,
    right_rotation: f64,
}

impl FieldOfView {
    /// Creates a cone anchored at `origin`, facing `rotation` and spanning
    /// `half_angle` radians to each side.
    #[must_use]
    pub fn new(origin: Point, rotation: f64, half_angle: f64) -> Self {
        let right_rotation = geometry::normalise_radians(rotation + half_angle);
        let left_rotation =
            geometry::normalise_radians(rotation + (geometry::FULL_CIRCLE - half_angle));
        Self {
            origin,
            left_rotation,
            right_rotation,
        }
    }

    /// Anchor point of the cone.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Reports whether the point lies within the cone.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let rotation = geometry::line_rotation(
            self.origin.x(),
            self.origin.y(),
            point.x(),
            point.y(),
        );
        if self.left_rotation < self.right_rotation {
            geometry::is_between(rotation, self.left_rotation, self.right_rotation)
        } else {
            rotation > self.left_rotation || rotation < self.right_rotation
        }
    }

    /// End points of the two periphery rays at the provided length.
    #[must_use]
    pub fn periphery(&self, length: f64) -> (Point, Point) {
        (
            geometry::extension_point(
                self.left_rotation,
                self.origin.x(),
                self.origin.y(),
                length,
            ),
            geometry::extension_point(
                self.right_rotation,
                self.origin.x(),
                self.origin.y(),
                length,
            ),
        )
    }

    /// Corner points visible from the cone's origin and lying inside the
    /// cone.
    #[must_use]
    pub fn visible_points(&self, obstacles: &[Shape], push_buffer: f64) -> Vec<Point> {
        let mut points = visible_points(
            self.origin.x(),
            self.origin.y(),
            obstacles,
            push_buffer,
        );
        points.retain(|point| self.contains(*point));
        points
    }
}
