#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Rotation-aware collision detection between rectangular bodies.
//!
//! The predicate answers yes/no only; consequences (sliding, destruction,
//! impact marking) are looked up in a [`ReactionTable`] keyed by collider
//! class pairs, so new entity kinds register behaviour without editing a
//! dispatch chain.

use std::collections::HashMap;

use blackout_core::{geometry, shape::Shape, EntityKind, Point, Segment};

/// Pairing of a struck outline edge with the point where a ray meets it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeIntersection {
    /// Edge of the shape's unrotated outline that the ray strikes first.
    pub edge: Segment,
    /// Point where the ray meets the edge.
    pub point: Point,
}

impl EdgeIntersection {
    /// Reports whether the struck edge runs vertically (constant x).
    #[must_use]
    pub fn is_vertical_edge(&self) -> bool {
        self.edge.start().x() == self.edge.end().x()
    }

    /// Reports whether the struck edge runs horizontally (constant y).
    #[must_use]
    pub fn is_horizontal_edge(&self) -> bool {
        self.edge.start().y() == self.edge.end().y()
    }
}

/// Indicates whether two shapes overlap once each is rotated about its own
/// center.
///
/// True when any transformed vertex of one shape lies inside the other's
/// transformed rectangle, or when any pair of transformed boundary edges
/// crosses. Symmetric in its arguments and free of side effects.
#[must_use]
pub fn collides_with(first: &Shape, second: &Shape) -> bool {
    let first_quad = transformed_corners(first);
    let second_quad = transformed_corners(second);

    if first_quad
        .iter()
        .any(|vertex| contains_point(second, *vertex))
    {
        return true;
    }
    if second_quad
        .iter()
        .any(|vertex| contains_point(first, *vertex))
    {
        return true;
    }

    let first_edges = quad_edges(&first_quad);
    let second_edges = quad_edges(&second_quad);
    first_edges.iter().any(|first_edge| {
        second_edges
            .iter()
            .any(|second_edge| geometry::intersect_segments(*first_edge, *second_edge).is_some())
    })
}

/// Nearest edge of `shape`'s unrotated outline struck by the forward ray
/// from `(x, y)` at `ray_rotation`, together with the strike point.
///
/// Movers classify the struck edge as vertical or horizontal to decide which
/// axis of their last move to revert when a collision blocks them.
#[must_use]
pub fn nearest_intersecting_edge(
    shape: &Shape,
    ray_rotation: f64,
    x: f64,
    y: f64,
) -> Option<EdgeIntersection> {
    let mut nearest = None;
    let mut nearest_distance = f64::MAX;
    for edge in shape.edges() {
        if let Some(point) = geometry::intersect_ray_rotated(ray_rotation, x, y, edge) {
            let strike_distance = geometry::distance(x, y, point.x(), point.y());
            if strike_distance < nearest_distance {
                nearest_distance = strike_distance;
                nearest = Some(EdgeIntersection { edge, point });
            }
        }
    }
    nearest
}

/// Every strike of the forward ray from `(x, y)` at `rotation` against the
/// shape's unrotated outline.
#[must_use]
pub fn ray_intersections(shape: &Shape, rotation: f64, x: f64, y: f64) -> Vec<Point> {
    shape
        .edges()
        .iter()
        .filter_map(|edge| geometry::intersect_ray_rotated(rotation, x, y, *edge))
        .collect()
}

/// Corners of the shape's rectangle rotated about its center, in boundary
/// path order.
fn transformed_corners(shape: &Shape) -> [Point; 4] {
    let center = shape.center();
    let (sin, cos) = shape.rotation().sin_cos();
    let rotate = |x: f64, y: f64| {
        let dx = x - center.x();
        let dy = y - center.y();
        Point::new(
            center.x() + dx * cos - dy * sin,
            center.y() + dx * sin + dy * cos,
        )
    };
    [
        rotate(shape.x(), shape.y()),
        rotate(shape.x() + shape.width(), shape.y()),
        rotate(shape.x() + shape.width(), shape.y() + shape.height()),
        rotate(shape.x(), shape.y() + shape.height()),
    ]
}

fn quad_edges(quad: &[Point; 4]) -> [Segment; 4] {
    [
        Segment::new(quad[0], quad[1]),
        Segment::new(quad[1], quad[2]),
        Segment::new(quad[2], quad[3]),
        Segment::new(quad[3], quad[0]),
    ]
}

/// Tests whether `point` lies strictly inside the shape's transformed
/// rectangle by rotating the point back into the shape's local frame.
fn contains_point(shape: &Shape, point: Point) -> bool {
    let center = shape.center();
    let (sin, cos) = shape.rotation().sin_cos();
    let dx = point.x() - center.x();
    let dy = point.y() - center.y();
    let local_x = center.x() + dx * cos + dy * sin;
    let local_y = center.y() - dx * sin + dy * cos;
    local_x > shape.x()
        && local_x < shape.x() + shape.width()
        && local_y > shape.y()
        && local_y < shape.y() + shape.height()
}

/// Collision classes the reaction table keys on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderClass {
    /// Player-controlled mover.
    Runner,
    /// Autonomous mover.
    Drifter,
    /// Hitscan beam.
    Bolt,
    /// Static obstacle.
    Barrier,
}

impl From<EntityKind> for ColliderClass {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Runner => Self::Runner,
            EntityKind::Drifter => Self::Drifter,
            EntityKind::Bolt => Self::Bolt,
        }
    }
}

/// Consequence applied when the collision predicate holds for a body pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reaction {
    /// Emit a collision event and nothing else.
    Report,
    /// Revert the mover along the axis matching the blocking edge.
    SlideAlongAxes,
    /// Queue both bodies for removal.
    DestroyBoth,
    /// Record the beam's nearest strike point on the obstacle.
    MarkImpact,
}

/// Registry mapping collider class pairs to reactions.
///
/// Lookups are symmetric: registering `(a, b)` also answers `(b, a)`.
/// Unregistered pairs fall back to [`Reaction::Report`].
#[derive(Clone, Debug, Default)]
pub struct ReactionTable {
    entries: HashMap<(ColliderClass, ColliderClass), Reaction>,
}

impl ReactionTable {
    /// Creates an empty reaction table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table mirroring the stock game rules: runners slide along
    /// barriers, bolts mark impacts on barriers, and bolts destroy drifters
    /// along with themselves.
    #[must_use]
    pub fn with_default_rules() -> Self {
        let mut table = Self::new();
        table.register(
            ColliderClass::Runner,
            ColliderClass::Barrier,
            Reaction::SlideAlongAxes,
        );
        table.register(
            ColliderClass::Bolt,
            ColliderClass::Barrier,
            Reaction::MarkImpact,
        );
        table.register(
            ColliderClass::Bolt,
            ColliderClass::Drifter,
            Reaction::DestroyBoth,
        );
        table
    }

    /// Registers the reaction for a class pair in both key orders.
    pub fn register(&mut self, first: ColliderClass, second: ColliderClass, reaction: Reaction) {
        let _ = self.entries.insert((first, second), reaction);
        let _ = self.entries.insert((second, first), reaction);
    }

    /// Reaction registered for the pair, or [`Reaction::Report`] when none is.
    #[must_use]
    pub fn reaction(&self, first: ColliderClass, second: ColliderClass) -> Reaction {
        self.entries
            .get(&(first, second))
            .copied()
            .unwrap_or(Reaction::Report)
    }
}
