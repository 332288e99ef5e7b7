#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Corner-graph construction and waypoint route planning.
//!
//! Navigation works over points with line of sight to one another: a
//! precomputed [`NavigationGraph`] spans the static obstacle corners, while a
//! [`Route`] resolves an arbitrary origin/destination pair by re-querying
//! visibility directly, since neither endpoint is a corner the graph knows.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use blackout_core::{geometry, shape::Shape, Point};
use blackout_system_visibility::visible_points;

/// Undirected visibility graph over obstacle corner points.
///
/// Built once from the full static obstacle set; edges are inserted
/// symmetrically, so membership of `b` in `neighbors(a)` always implies the
/// reverse. Arbitrary runtime points are absent by construction and answer
/// with empty neighbour sets.
#[derive(Clone, Debug, Default)]
pub struct NavigationGraph {
    adjacency: HashMap<Point, HashSet<Point>>,
}

impl NavigationGraph {
    /// Builds the graph by running the visibility resolver from every corner
    /// of every obstacle.
    #[must_use]
    pub fn build(obstacles: &[Shape], push_buffer: f64) -> Self {
        let mut graph = Self::default();
        for obstacle in obstacles {
            for corner in obstacle.corners() {
                for visible in visible_points(corner.x(), corner.y(), obstacles, push_buffer) {
                    graph.add_connection(corner, visible);
                }
            }
        }
        graph
    }

    /// Records that two points are mutually navigable by line of sight.
    pub fn add_connection(&mut self, first: Point, second: Point) {
        let _ = self.adjacency.entry(first).or_default().insert(second);
        let _ = self.adjacency.entry(second).or_default().insert(first);
    }

    /// Points directly navigable from `point`; empty when the point is
    /// unknown to the graph.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + '_ {
        self.adjacency.get(&point).into_iter().flatten().copied()
    }

    /// Number of distinct points known to the graph.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Every undirected edge exactly once, in a deterministic order suitable
    /// for debug overlays.
    #[must_use]
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges: Vec<(Point, Point)> = self
            .adjacency
            .iter()
            .flat_map(|(from, neighbors)| neighbors.iter().map(move |to| (*from, *to)))
            .filter(|(from, to)| point_order(*from, *to) != Ordering::Greater)
            .collect();
        edges.sort_by(|first, second| {
            point_order(first.0, second.0).then(point_order(first.1, second.1))
        });
        edges
    }
}

fn point_order(first: Point, second: Point) -> Ordering {
    first
        .x()
        .total_cmp(&second.x())
        .then(first.y().total_cmp(&second.y()))
}

/// Waypoint route produced for a single navigation request.
///
/// The resolved destination never changes after construction; waypoints are
/// consumed front to back as the mover advances, and the route is discarded
/// once exhausted or superseded by a new request.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    destination: Point,
    steps: VecDeque<Point>,
}

impl Route {
    /// Plans a route from `origin` toward `requested` across the obstacle
    /// set.
    ///
    /// The request first resolves to the best-ranked obstacle corner visible
    /// from the requested point; a depth-first backtracking search then
    /// threads mutually visible points from the origin to that corner. When
    /// no visible corner exists, or the search exhausts every frontier, the
    /// route is empty and the destination collapses to the origin; callers
    /// treat a zero-step route as already arrived.
    #[must_use]
    pub fn plan(origin: Point, requested: Point, obstacles: &[Shape], push_buffer: f64) -> Self {
        let mut destination_points =
            visible_points(requested.x(), requested.y(), obstacles, push_buffer);
        rank_candidates(&mut destination_points, requested, requested);

        let Some(destination) = destination_points.pop() else {
            return Self {
                destination: origin,
                steps: VecDeque::new(),
            };
        };

        match generate_steps(origin, destination, obstacles, push_buffer) {
            Some(steps) => Self { destination, steps },
            None => Self {
                destination: origin,
                steps: VecDeque::new(),
            },
        }
    }

    /// Resolved destination; stable for the route's lifetime.
    #[must_use]
    pub fn ultimate_destination(&self) -> Point {
        self.destination
    }

    /// Reports whether any waypoints remain.
    #[must_use]
    pub fn has_more_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Next waypoint without consuming it.
    #[must_use]
    pub fn current_step(&self) -> Option<Point> {
        self.steps.front().copied()
    }

    /// Removes and returns the next waypoint.
    ///
    /// The caller decides how close counts as arrived before discarding.
    pub fn discard_current_step(&mut self) -> Option<Point> {
        self.steps.pop_front()
    }

    /// Remaining waypoints in consumption order.
    pub fn waypoints(&self) -> impl Iterator<Item = Point> + '_ {
        self.steps.iter().copied()
    }
}

/// Depth-first backtracking search from `origin` to `destination`.
///
/// A stack of committed steps grows alongside a stack of ranked frontier
/// levels; an empty level discards itself together with the last committed
/// step, resuming the parent's next candidate. Every expanded point is
/// marked visited before its frontier is computed and never re-expanded,
/// which bounds the search by the number of distinct pushed corners and
/// guarantees termination. Returns `None` when every level exhausts without
/// reaching the destination.
fn generate_steps(
    origin: Point,
    destination: Point,
    obstacles: &[Shape],
    push_buffer: f64,
) -> Option<VecDeque<Point>> {
    let mut steps: Vec<Point> = Vec::new();
    let mut visited: Vec<Point> = Vec::new();
    let mut search_stack: Vec<Vec<Point>> = vec![vec![origin]];
    let mut reached = false;

    while let Some(level) = search_stack.last_mut() {
        let Some(current) = level.pop() else {
            let _ = search_stack.pop();
            let _ = steps.pop();
            continue;
        };
        visited.push(current);
        steps.push(current);
        if current == destination {
            reached = true;
            break;
        }

        let mut next_level = visible_points(current.x(), current.y(), obstacles, push_buffer);
        next_level.retain(|point| !visited.contains(point));
        rank_candidates(&mut next_level, current, destination);
        search_stack.push(next_level);
    }

    if !reached {
        return None;
    }
    let mut queue: VecDeque<Point> = steps.into();
    // The first committed step is the origin itself, not a waypoint.
    let _ = queue.pop_front();
    Some(queue)
}

/// Sorts candidates by descending combined score; levels consume from the
/// back, so the smallest combined score expands first and ties keep the
/// resolver's output order.
fn rank_candidates(points: &mut [Point], from: Point, target: Point) {
    points.sort_by(|first, second| {
        combined_score(*second, from, target).total_cmp(&combined_score(*first, from, target))
    });
}

/// Distance to the level's start and distance to the target, treated as
/// orthogonal components of a single score.
fn combined_score(point: Point, from: Point, target: Point) -> f64 {
    let to_target = geometry::distance(target.x(), target.y(), point.x(), point.y());
    let from_start = geometry::distance(from.x(), from.y(), point.x(), point.y());
    ((to_target * to_target) + (from_start * from_start)).sqrt()
}
