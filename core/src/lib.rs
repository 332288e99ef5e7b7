#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blackout engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems, together with the geometric
//! vocabulary those systems share. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! overlays to react to deterministically.

pub mod geometry;
pub mod shape;

use std::hash::{Hash, Hasher};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use shape::Shape;

/// Planar position expressed in world units.
///
/// Screen conventions apply: x grows rightward, y grows downward. Points
/// compare by exact coordinate equality; the navigation layers recognise
/// shared corners by bit-identical coordinates, so no tolerance is applied
/// anywhere in the engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate of the point.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate of the point.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Straight-line distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        geometry::distance(self.x, self.y, other.x, other.y)
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}

/// Pair of points describing a line segment.
///
/// Segments may be zero-length; every consumer treats the degenerate case as
/// "no intersection" rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    /// Creates a new segment between the provided points.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// First terminating point of the segment.
    #[must_use]
    pub const fn start(&self) -> Point {
        self.start
    }

    /// Second terminating point of the segment.
    #[must_use]
    pub const fn end(&self) -> Point {
        self.end
    }

    /// Reports whether the two segments share a terminating point, comparing
    /// endpoints in both orders.
    #[must_use]
    pub fn shares_endpoint(&self, other: &Segment) -> bool {
        self.start == other.start
            || self.end == other.end
            || self.start == other.end
            || self.end == other.start
    }

    /// Length of the segment; zero for degenerate segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }
}

/// Unique identifier assigned to a dynamic entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a static barrier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarrierId(u32);

impl BarrierId {
    /// Creates a new barrier identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of dynamic entities simulated by the world.
///
/// Collision consequences are not attached to the kinds themselves; the
/// collision system's reaction table maps kind pairings to outcomes so new
/// kinds register behaviour without editing a dispatch chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Player-controlled mover that slides along barriers and fires bolts.
    Runner,
    /// Autonomous mover destroyed by bolt hits.
    Drifter,
    /// Hitscan beam with a zero-sized footprint and a short lifetime.
    Bolt,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates the arena layout and its navigation graph.
    ConfigureArena {
        /// Width of the arena in world units.
        width: f64,
        /// Height of the arena in world units.
        height: f64,
        /// Number of barriers scattered across the arena.
        barrier_count: u32,
        /// Seed for the deterministic layout generator.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Queues a dynamic entity for insertion at the start of the next tick.
    SpawnEntity {
        /// Kind of entity to create.
        kind: EntityKind,
        /// Initial horizontal position of the entity's anchor.
        x: f64,
        /// Initial vertical position of the entity's anchor.
        y: f64,
        /// Width of the entity's footprint.
        width: f64,
        /// Height of the entity's footprint.
        height: f64,
        /// Initial rotation in radians clockwise from facing up.
        rotation: f64,
    },
    /// Queues a dynamic entity for removal at the start of the next tick.
    DespawnEntity {
        /// Identifier of the entity to remove.
        id: EntityId,
    },
    /// Applies manual steering to an entity, cancelling any active route.
    ///
    /// Steering persists until replaced; a zero/zero steer releases control
    /// so route following may resume on a later destination request.
    Steer {
        /// Identifier of the steered entity.
        id: EntityId,
        /// Linear velocity in units per second; negative values move the
        /// entity toward its facing direction.
        velocity: f64,
        /// Rotational velocity in radians per second; positive spins
        /// clockwise.
        rotational_velocity: f64,
    },
    /// Requests that an entity fire a bolt, subject to its cooldown.
    Fire {
        /// Identifier of the firing entity.
        id: EntityId,
    },
    /// Requests a navigation route toward the provided destination.
    SetDestination {
        /// Identifier of the navigating entity.
        id: EntityId,
        /// Horizontal coordinate of the requested destination.
        x: f64,
        /// Vertical coordinate of the requested destination.
        y: f64,
    },
}

/// The other body involved in a reported collision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionPartner {
    /// Another dynamic entity.
    Entity(EntityId),
    /// A static barrier.
    Barrier(BarrierId),
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a queued entity entered the simulation.
    EntitySpawned {
        /// Identifier allocated to the entity by the world.
        id: EntityId,
        /// Kind of the spawned entity.
        kind: EntityKind,
    },
    /// Confirms that an entity left the simulation.
    EntityRemoved {
        /// Identifier of the removed entity.
        id: EntityId,
    },
    /// Reports that the collision predicate held for a body pair this tick.
    CollisionDetected {
        /// Moving entity whose collision pass produced the report.
        entity: EntityId,
        /// The other body involved.
        against: CollisionPartner,
    },
    /// Reports the nearest surface struck by a bolt's beam this tick.
    ImpactMarked {
        /// Identifier of the bolt.
        entity: EntityId,
        /// Point where the beam meets the surface.
        point: Point,
    },
    /// Announces the corner point a navigation request resolved to.
    DestinationResolved {
        /// Identifier of the navigating entity.
        entity: EntityId,
        /// Resolved destination; equals the entity's origin when no visible
        /// point exists.
        destination: Point,
    },
    /// Confirms that a navigating entity consumed a waypoint.
    WaypointReached {
        /// Identifier of the navigating entity.
        entity: EntityId,
        /// Waypoint that was consumed.
        waypoint: Point,
    },
    /// Announces that a route ran out of waypoints and was discarded.
    RouteExhausted {
        /// Identifier of the entity whose route ended.
        entity: EntityId,
    },
}

/// Immutable representation of a single mover's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct MoverSnapshot {
    /// Unique identifier assigned to the mover.
    pub id: EntityId,
    /// Kind of the mover.
    pub kind: EntityKind,
    /// Footprint and rotation of the mover.
    pub shape: Shape,
    /// Linear velocity applied during the last tick, units per second.
    pub velocity: f64,
    /// Rotational velocity applied during the last tick, radians per second.
    pub rotational_velocity: f64,
    /// Waypoint currently steered toward, if a route is active.
    pub waypoint: Option<Point>,
    /// Resolved destination of the active route, if any.
    pub destination: Option<Point>,
    /// Nearest beam impact recorded this tick; bolts only.
    pub impact: Option<Point>,
}

/// Read-only snapshot describing all movers within the arena.
#[derive(Clone, Debug, Default)]
pub struct MoverView {
    snapshots: Vec<MoverSnapshot>,
}

impl MoverView {
    /// Creates a new mover view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MoverSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured mover snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &MoverSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MoverSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single barrier used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarrierSnapshot {
    /// Identifier allocated to the barrier by the world.
    pub id: BarrierId,
    /// Footprint of the barrier.
    pub shape: Shape,
}

/// Read-only snapshot describing all barriers within the arena.
#[derive(Clone, Debug, Default)]
pub struct BarrierView {
    snapshots: Vec<BarrierSnapshot>,
}

impl BarrierView {
    /// Creates a new barrier view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BarrierSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured barrier snapshots in deterministic order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &BarrierSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BarrierSnapshot> {
        self.snapshots
    }
}
