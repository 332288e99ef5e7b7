#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Blackout.
//!
//! The world owns the static barrier layout, its precomputed navigation
//! graph, and every dynamic entity. Each simulated tick runs in a fixed
//! order: pending additions and removals are drained, then every mover
//! resets its transient state, moves, acts, and finally the collision pass
//! applies the reaction table. Entity additions and removals requested from
//! collision callbacks are queued behind mutexes and take effect at the
//! start of the following tick.

use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use blackout_core::{
    geometry, shape::Shape, BarrierId, BarrierSnapshot, BarrierView, CollisionPartner, Command,
    EntityId, EntityKind, Event, MoverSnapshot, MoverView, Point,
};
use blackout_system_collision::{self as collision, ColliderClass, Reaction, ReactionTable};
use blackout_system_navigation::{NavigationGraph, Route};
use blackout_system_visibility::{visible_points, FieldOfView};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const ARENA_WIDTH: f64 = 800.0;
const ARENA_HEIGHT: f64 = 600.0;
const DEFAULT_BARRIER_COUNT: u32 = 21;
const LAYOUT_GENERATION_SEED: u64 = 0x51ce_77a3_9b2d_4e01;

/// Minimum clearance kept between any two scattered barriers.
const MIN_GAP_BETWEEN_BARRIERS: f64 = 40.0;
/// Outward nudge applied to corners before visibility testing, half the
/// inter-barrier gap so waypoints always fit between walls.
const CORNER_PUSH_BUFFER: f64 = MIN_GAP_BETWEEN_BARRIERS / 2.0;

/// Linear speed while following a route; negative values travel toward the
/// facing direction.
const FORWARD_SPEED: f64 = -130.0;
/// Turn rate used to align with the next waypoint.
const AUTO_ROTATION_SPEED: f64 = PI * 4.0;
/// Forward offset of the eye/muzzle point from a mover's center.
const VISION_EXTENSION: f64 = 7.0;
/// Half-angle of the vision cone either side of straight ahead.
const VIEW_CONE_HALF_ANGLE: f64 = FRAC_PI_2 * 0.8;

const FIRING_INTERVAL: Duration = Duration::from_millis(400);
const BOLT_PERSISTENCE: Duration = Duration::from_millis(500);
const BOLT_SPREAD: f64 = PI * 0.03;

/// Manual steering intent; persists until replaced or released.
#[derive(Clone, Copy, Debug)]
struct ManualSteer {
    velocity: f64,
    rotational_velocity: f64,
}

/// A dynamic entity simulated by the world.
#[derive(Debug)]
struct Mover {
    id: EntityId,
    kind: EntityKind,
    shape: Shape,
    velocity: f64,
    rotational_velocity: f64,
    old_x: f64,
    old_y: f64,
    manual: Option<ManualSteer>,
    route: Option<Route>,
    fire_requested: bool,
    since_last_shot: Duration,
    age: Duration,
    impact: Option<Point>,
}

impl Mover {
    fn new(id: EntityId, kind: EntityKind, shape: Shape) -> Self {
        Self {
            id,
            kind,
            shape,
            velocity: 0.0,
            rotational_velocity: 0.0,
            old_x: shape.x(),
            old_y: shape.y(),
            manual: None,
            route: None,
            fire_requested: false,
            // A fresh shooter may fire immediately.
            since_last_shot: FIRING_INTERVAL,
            age: Duration::ZERO,
            impact: None,
        }
    }

    /// Clears per-tick transient state at the start of each tick.
    fn reset(&mut self) {
        self.velocity = 0.0;
        self.rotational_velocity = 0.0;
    }

    fn set_x(&mut self, x: f64) {
        self.old_x = self.shape.x();
        self.shape.set_x(x);
    }

    fn set_y(&mut self, y: f64) {
        self.old_y = self.shape.y();
        self.shape.set_y(y);
    }

    /// Swaps the horizontal position with its previous value.
    fn revert_x(&mut self) {
        let keep = self.shape.x();
        self.shape.set_x(self.old_x);
        self.old_x = keep;
    }

    /// Swaps the vertical position with its previous value.
    fn revert_y(&mut self) {
        let keep = self.shape.y();
        self.shape.set_y(self.old_y);
        self.old_y = keep;
    }

    /// Applies the current velocities over the elapsed time.
    ///
    /// The translation components are derived from the rotation as it was
    /// before this tick's turn is applied.
    fn integrate(&mut self, dt: Duration) {
        let dt_seconds = dt.as_secs_f64();
        let rotation_delta = self.rotational_velocity * dt_seconds;
        let x_velocity = -(self.velocity * self.shape.rotation().sin());
        let y_velocity = self.velocity * self.shape.rotation().cos();
        self.shape
            .set_rotation(self.shape.rotation() + rotation_delta);
        self.set_x(self.shape.x() + x_velocity * dt_seconds);
        self.set_y(self.shape.y() + y_velocity * dt_seconds);
    }

    /// Movement phase: manual steering wins and cancels any route;
    /// otherwise an active route steers toward its current waypoint.
    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if let Some(manual) = self.manual {
            // Taking the controls aborts navigation.
            self.route = None;
            self.velocity = manual.velocity;
            self.rotational_velocity = manual.rotational_velocity;
            self.integrate(dt);
            return;
        }

        let Some(route) = self.route.as_mut() else {
            self.integrate(dt);
            return;
        };

        if !route.has_more_steps() {
            self.route = None;
            out_events.push(Event::RouteExhausted { entity: self.id });
            return;
        }

        let Some(step) = route.current_step() else {
            return;
        };
        let arrival_threshold = -FORWARD_SPEED * dt.as_secs_f64();
        if geometry::distance(step.x(), step.y(), self.shape.x(), self.shape.y())
            < arrival_threshold
        {
            let _ = route.discard_current_step();
            self.set_x(step.x());
            self.set_y(step.y());
            out_events.push(Event::WaypointReached {
                entity: self.id,
                waypoint: step,
            });
            return;
        }

        let desired_rotation = geometry::normalise_radians(geometry::line_rotation(
            self.shape.x(),
            self.shape.y(),
            step.x(),
            step.y(),
        ));
        if desired_rotation == self.shape.rotation() {
            self.velocity = FORWARD_SPEED;
            self.integrate(dt);
        } else {
            let direction = geometry::rotation_direction(self.shape.rotation(), desired_rotation);
            self.rotational_velocity = direction.signum() * AUTO_ROTATION_SPEED;
            self.integrate(dt);
            // Overshooting the desired rotation within one tick snaps
            // straight to it.
            if geometry::rotation_direction(self.shape.rotation(), desired_rotation) != direction {
                self.shape.set_rotation(desired_rotation);
            }
        }
    }
}

/// Entity addition queued for the start of the next tick.
#[derive(Clone, Copy, Debug)]
struct PendingSpawn {
    id: EntityId,
    kind: EntityKind,
    shape: Shape,
}

/// Handoff buffers between collision callbacks and the next tick.
///
/// Additions and removals may be queued from outside the tick thread, so
/// both collections sit behind mutexes; the world drains them before
/// simulating. A poisoned lock is survived by adopting the inner state,
/// since queued intents stay valid regardless of where a panic happened.
#[derive(Debug, Default)]
struct PendingQueue {
    additions: Mutex<Vec<PendingSpawn>>,
    removals: Mutex<Vec<EntityId>>,
    next_entity: Mutex<u32>,
}

impl PendingQueue {
    fn queue_addition(&self, kind: EntityKind, shape: Shape) -> EntityId {
        let id = {
            let mut next = locked(&self.next_entity);
            let id = EntityId::new(*next);
            *next = next.wrapping_add(1);
            id
        };
        locked(&self.additions).push(PendingSpawn { id, kind, shape });
        id
    }

    fn queue_removal(&self, id: EntityId) {
        locked(&self.removals).push(id);
    }

    fn drain_removals(&self) -> Vec<EntityId> {
        locked(&self.removals).drain(..).collect()
    }

    fn drain_additions(&self) -> Vec<PendingSpawn> {
        locked(&self.additions).drain(..).collect()
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Represents the authoritative Blackout world state.
#[derive(Debug)]
pub struct World {
    arena_width: f64,
    arena_height: f64,
    barriers: Vec<Shape>,
    movers: Vec<Mover>,
    navigation_graph: NavigationGraph,
    reactions: ReactionTable,
    pending: PendingQueue,
    rng: ChaCha8Rng,
    tick_index: u64,
}

impl World {
    /// Creates a new Blackout world with the default arena layout.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            barriers: Vec::new(),
            movers: Vec::new(),
            navigation_graph: NavigationGraph::default(),
            reactions: ReactionTable::with_default_rules(),
            pending: PendingQueue::default(),
            rng: ChaCha8Rng::seed_from_u64(LAYOUT_GENERATION_SEED),
            tick_index: 0,
        };
        world.regenerate(
            ARENA_WIDTH,
            ARENA_HEIGHT,
            DEFAULT_BARRIER_COUNT,
            LAYOUT_GENERATION_SEED,
        );
        world
    }

    /// Queues an entity addition for the start of the next tick.
    ///
    /// Callable through a shared reference so collision callbacks may spawn
    /// entities without racing the simulation.
    pub fn queue_spawn(
        &self,
        kind: EntityKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> EntityId {
        self.pending
            .queue_addition(kind, Shape::new(x, y, width, height, rotation))
    }

    /// Queues an entity removal for the start of the next tick.
    pub fn queue_despawn(&self, id: EntityId) {
        self.pending.queue_removal(id);
    }

    /// Replaces the barrier layout wholesale and rebuilds the navigation
    /// graph. Test scaffolding for deterministic scenes.
    #[cfg(any(test, feature = "arena_scaffolding"))]
    pub fn install_barriers(&mut self, barriers: Vec<Shape>) {
        self.barriers = barriers;
        self.navigation_graph = NavigationGraph::build(&self.barriers, CORNER_PUSH_BUFFER);
    }

    fn regenerate(&mut self, width: f64, height: f64, barrier_count: u32, seed: u64) {
        self.arena_width = width;
        self.arena_height = height;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.barriers = scatter_barriers(&mut self.rng, width, height, barrier_count);
        self.navigation_graph = NavigationGraph::build(&self.barriers, CORNER_PUSH_BUFFER);
    }

    fn mover_index(&self, id: EntityId) -> Option<usize> {
        self.movers.iter().position(|mover| mover.id == id)
    }

    fn mover_mut(&mut self, id: EntityId) -> Option<&mut Mover> {
        self.movers.iter_mut().find(|mover| mover.id == id)
    }

    fn mover(&self, id: EntityId) -> Option<&Mover> {
        self.movers.iter().find(|mover| mover.id == id)
    }

    fn drain_pending(&mut self, out_events: &mut Vec<Event>) {
        for id in self.pending.drain_removals() {
            if let Some(position) = self.mover_index(id) {
                let _ = self.movers.remove(position);
                out_events.push(Event::EntityRemoved { id });
            }
        }
        for spawn in self.pending.drain_additions() {
            self.movers.push(Mover::new(spawn.id, spawn.kind, spawn.shape));
            out_events.push(Event::EntitySpawned {
                id: spawn.id,
                kind: spawn.kind,
            });
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.drain_pending(out_events);
        out_events.push(Event::TimeAdvanced { dt });

        for mover in &mut self.movers {
            mover.reset();
        }
        for mover in &mut self.movers {
            mover.advance(dt, out_events);
        }
        self.act(dt);
        self.run_collision_pass(out_events);
    }

    /// Action phase: bolts age out, shooters honour their cooldown.
    fn act(&mut self, dt: Duration) {
        for mover in &mut self.movers {
            mover.since_last_shot = mover.since_last_shot.saturating_add(dt);

            if mover.kind == EntityKind::Bolt {
                mover.age = mover.age.saturating_add(dt);
                if mover.age >= BOLT_PERSISTENCE {
                    self.pending.queue_removal(mover.id);
                }
                continue;
            }

            if !mover.fire_requested {
                continue;
            }
            mover.fire_requested = false;
            if mover.since_last_shot < FIRING_INTERVAL {
                continue;
            }
            mover.since_last_shot = Duration::ZERO;

            let center = mover.shape.center();
            let muzzle = geometry::extension_point(
                mover.shape.rotation(),
                center.x(),
                center.y(),
                mover.shape.height() / 2.0 + VISION_EXTENSION,
            );
            let spread = self.rng.gen::<f64>() * BOLT_SPREAD;
            let rotation = if self.rng.gen_bool(0.5) {
                mover.shape.rotation() + spread
            } else {
                mover.shape.rotation() - spread
            };
            let _ = self.pending.queue_addition(
                EntityKind::Bolt,
                Shape::new(muzzle.x(), muzzle.y(), 0.0, 0.0, rotation),
            );
        }
    }

    /// Collision phase: every mover against every barrier and every other
    /// mover, consequences resolved through the reaction table.
    fn run_collision_pass(&mut self, out_events: &mut Vec<Event>) {
        for index in 0..self.movers.len() {
            if self.movers[index].kind == EntityKind::Bolt {
                self.resolve_beam_collisions(index, out_events);
            } else {
                self.resolve_body_collisions(index, out_events);
            }
        }
    }

    fn resolve_body_collisions(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let id = self.movers[index].id;
        let class = ColliderClass::from(self.movers[index].kind);

        for barrier_index in 0..self.barriers.len() {
            let barrier = self.barriers[barrier_index];
            if !collision::collides_with(&self.movers[index].shape, &barrier) {
                continue;
            }
            out_events.push(Event::CollisionDetected {
                entity: id,
                against: CollisionPartner::Barrier(BarrierId::new(barrier_index as u32)),
            });
            match self.reactions.reaction(class, ColliderClass::Barrier) {
                Reaction::SlideAlongAxes => slide_against(&mut self.movers[index], &barrier),
                // Barriers are permanent; only the mover can go.
                Reaction::DestroyBoth => self.pending.queue_removal(id),
                Reaction::MarkImpact | Reaction::Report => {}
            }
        }

        for other_index in (index + 1)..self.movers.len() {
            if self.movers[other_index].kind == EntityKind::Bolt {
                // Beams run their own ray-based pass.
                continue;
            }
            let other_shape = self.movers[other_index].shape;
            if !collision::collides_with(&self.movers[index].shape, &other_shape) {
                continue;
            }
            let other_id = self.movers[other_index].id;
            let other_class = ColliderClass::from(self.movers[other_index].kind);
            out_events.push(Event::CollisionDetected {
                entity: id,
                against: CollisionPartner::Entity(other_id),
            });
            match self.reactions.reaction(class, other_class) {
                Reaction::DestroyBoth => {
                    self.pending.queue_removal(id);
                    self.pending.queue_removal(other_id);
                }
                Reaction::SlideAlongAxes => slide_against(&mut self.movers[index], &other_shape),
                Reaction::MarkImpact | Reaction::Report => {}
            }
        }
    }

    /// Hitscan pass for a bolt: its beam is the forward ray from its anchor,
    /// struck surfaces react through the table, and the nearest strike
    /// becomes the recorded impact.
    fn resolve_beam_collisions(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let bolt_id = self.movers[index].id;
        let rotation = self.movers[index].shape.rotation();
        let origin_x = self.movers[index].shape.x();
        let origin_y = self.movers[index].shape.y();

        let mut nearest: Option<Point> = None;
        let mut nearest_distance = f64::MAX;
        let mut struck: Vec<(CollisionPartner, ColliderClass)> = Vec::new();

        for (barrier_index, barrier) in self.barriers.iter().enumerate() {
            let hits = collision::ray_intersections(barrier, rotation, origin_x, origin_y);
            if hits.is_empty() {
                continue;
            }
            for hit in &hits {
                let hit_distance = geometry::distance(origin_x, origin_y, hit.x(), hit.y());
                if hit_distance < nearest_distance {
                    nearest_distance = hit_distance;
                    nearest = Some(*hit);
                }
            }
            struck.push((
                CollisionPartner::Barrier(BarrierId::new(barrier_index as u32)),
                ColliderClass::Barrier,
            ));
        }

        for other_index in 0..self.movers.len() {
            if other_index == index || self.movers[other_index].kind == EntityKind::Bolt {
                continue;
            }
            let other = &self.movers[other_index];
            let hits = collision::ray_intersections(&other.shape, rotation, origin_x, origin_y);
            if hits.is_empty() {
                continue;
            }
            for hit in &hits {
                let hit_distance = geometry::distance(origin_x, origin_y, hit.x(), hit.y());
                if hit_distance < nearest_distance {
                    nearest_distance = hit_distance;
                    nearest = Some(*hit);
                }
            }
            struck.push((
                CollisionPartner::Entity(other.id),
                ColliderClass::from(other.kind),
            ));
        }

        for (partner, other_class) in struck {
            out_events.push(Event::CollisionDetected {
                entity: bolt_id,
                against: partner,
            });
            if self.reactions.reaction(ColliderClass::Bolt, other_class) == Reaction::DestroyBoth {
                self.pending.queue_removal(bolt_id);
                if let CollisionPartner::Entity(other_id) = partner {
                    self.pending.queue_removal(other_id);
                }
            }
        }

        self.movers[index].impact = nearest;
        if let Some(point) = nearest {
            out_events.push(Event::ImpactMarked {
                entity: bolt_id,
                point,
            });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned slide resolution for a mover blocked by another body.
///
/// The blocking edge is classified by probing from the mover's previous
/// center along its effective travel direction; a vertical edge reverts the
/// horizontal move, a horizontal edge the vertical move. Travelling
/// backwards flips the probe direction.
fn slide_against(mover: &mut Mover, blocker: &Shape) {
    let effective_rotation = if mover.velocity > 0.0 {
        geometry::normalise_radians(mover.shape.rotation() + PI)
    } else {
        mover.shape.rotation()
    };
    let old_center_x = mover.old_x + mover.shape.width() / 2.0;
    let old_center_y = mover.old_y + mover.shape.height() / 2.0;
    if let Some(strike) =
        collision::nearest_intersecting_edge(blocker, effective_rotation, old_center_x, old_center_y)
    {
        if strike.is_vertical_edge() {
            mover.revert_x();
        }
        if strike.is_horizontal_edge() {
            mover.revert_y();
        }
    }
}

/// Collision-rejection scatter of axis-aligned wall strips.
///
/// Candidates carry the inter-barrier gap as extra padding while being
/// placed, then shed it once the layout is accepted, which keeps at least
/// the minimum gap between any two walls. Placement gives up after a
/// bounded number of rejected candidates so a crowded arena cannot stall
/// construction.
fn scatter_barriers(rng: &mut ChaCha8Rng, width: f64, height: f64, count: u32) -> Vec<Shape> {
    let buffer = MIN_GAP_BETWEEN_BARRIERS / 2.0;
    let width_units = (width.max(1.0)) as u32;
    let height_units = (height.max(1.0)) as u32;
    let mut barriers: Vec<Shape> = Vec::new();
    let mut attempts: u32 = 0;

    while barriers.len() < count as usize && attempts < 10_000 {
        attempts += 1;
        let x = f64::from(rng.gen_range(0..width_units));
        let y = f64::from(rng.gen_range(0..height_units));
        let (strip_width, strip_height) = if rng.gen_bool(0.5) {
            (
                f64::from(rng.gen_range(0..width_units)) + 10.0 + buffer,
                10.0 + buffer,
            )
        } else {
            (
                10.0 + buffer,
                f64::from(rng.gen_range(0..height_units)) + 10.0 + buffer,
            )
        };
        let candidate = Shape::new(x, y, strip_width, strip_height, 0.0);
        if barriers
            .iter()
            .all(|existing| !collision::collides_with(&candidate, existing))
        {
            barriers.push(candidate);
        }
    }

    for barrier in &mut barriers {
        barrier.set_width(barrier.width() - buffer);
        barrier.set_height(barrier.height() - buffer);
    }
    barriers
}

/// Applies the provided command to the world, mutating state
/// deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureArena {
            width,
            height,
            barrier_count,
            seed,
        } => {
            world.regenerate(width, height, barrier_count, seed);
        }
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnEntity {
            kind,
            x,
            y,
            width,
            height,
            rotation,
        } => {
            let _ = world.queue_spawn(kind, x, y, width, height, rotation);
        }
        Command::DespawnEntity { id } => world.queue_despawn(id),
        Command::Steer {
            id,
            velocity,
            rotational_velocity,
        } => {
            if let Some(mover) = world.mover_mut(id) {
                if velocity == 0.0 && rotational_velocity == 0.0 {
                    mover.manual = None;
                } else {
                    mover.manual = Some(ManualSteer {
                        velocity,
                        rotational_velocity,
                    });
                    mover.route = None;
                }
            }
        }
        Command::Fire { id } => {
            if let Some(mover) = world.mover_mut(id) {
                mover.fire_requested = true;
            }
        }
        Command::SetDestination { id, x, y } => {
            let Some(index) = world.mover_index(id) else {
                return;
            };
            let origin = Point::new(world.movers[index].shape.x(), world.movers[index].shape.y());
            let route = Route::plan(
                origin,
                Point::new(x, y),
                &world.barriers,
                CORNER_PUSH_BUFFER,
            );
            out_events.push(Event::DestinationResolved {
                entity: id,
                destination: route.ultimate_destination(),
            });
            world.movers[index].route = Some(route);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{
        collision, geometry, visible_points, BarrierId, BarrierSnapshot, BarrierView, EntityId,
        FieldOfView, MoverSnapshot, MoverView, Point, World, CORNER_PUSH_BUFFER,
        VIEW_CONE_HALF_ANGLE, VISION_EXTENSION,
    };
    use blackout_core::Segment;

    /// Width and height of the arena in world units.
    #[must_use]
    pub fn arena_size(world: &World) -> (f64, f64) {
        (world.arena_width, world.arena_height)
    }

    /// Number of ticks the world has simulated.
    #[must_use]
    pub fn simulated_ticks(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of the static barriers.
    #[must_use]
    pub fn barrier_view(world: &World) -> BarrierView {
        BarrierView::from_snapshots(
            world
                .barriers
                .iter()
                .enumerate()
                .map(|(index, shape)| BarrierSnapshot {
                    id: BarrierId::new(index as u32),
                    shape: *shape,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of the dynamic movers.
    #[must_use]
    pub fn mover_view(world: &World) -> MoverView {
        MoverView::from_snapshots(
            world
                .movers
                .iter()
                .map(|mover| MoverSnapshot {
                    id: mover.id,
                    kind: mover.kind,
                    shape: mover.shape,
                    velocity: mover.velocity,
                    rotational_velocity: mover.rotational_velocity,
                    waypoint: mover.route.as_ref().and_then(|route| route.current_step()),
                    destination: mover
                        .route
                        .as_ref()
                        .map(|route| route.ultimate_destination()),
                    impact: mover.impact,
                })
                .collect(),
        )
    }

    /// Undirected edges of the precomputed corner graph, deterministically
    /// ordered for overlays.
    #[must_use]
    pub fn navigation_edges(world: &World) -> Vec<(Point, Point)> {
        world.navigation_graph.edges()
    }

    /// Corner points directly navigable from the provided graph point;
    /// empty when the point is unknown to the graph.
    #[must_use]
    pub fn navigation_neighbors(world: &World, point: Point) -> Vec<Point> {
        world.navigation_graph.neighbors(point).collect()
    }

    /// Remaining waypoints of an entity's active route, if any.
    #[must_use]
    pub fn route_view(world: &World, id: EntityId) -> Option<RouteSnapshot> {
        world.mover(id).and_then(|mover| {
            mover.route.as_ref().map(|route| RouteSnapshot {
                destination: route.ultimate_destination(),
                waypoints: route.waypoints().collect(),
            })
        })
    }

    /// Obstacle corners visible from an arbitrary point, for overlays and
    /// ad-hoc navigation probes.
    #[must_use]
    pub fn viewable_points(world: &World, x: f64, y: f64) -> Vec<Point> {
        visible_points(x, y, &world.barriers, CORNER_PUSH_BUFFER)
    }

    /// Vision cone projected from an entity's eye point.
    #[must_use]
    pub fn field_of_view(world: &World, id: EntityId) -> Option<FieldOfView> {
        world.mover(id).map(|mover| {
            let center = mover.shape.center();
            let origin = geometry::extension_point(
                mover.shape.rotation(),
                center.x(),
                center.y(),
                mover.shape.height() / 2.0 + VISION_EXTENSION,
            );
            FieldOfView::new(origin, mover.shape.rotation(), VIEW_CONE_HALF_ANGLE)
        })
    }

    /// Obstacle corners visible within an entity's vision cone.
    #[must_use]
    pub fn visible_points_in_view(world: &World, id: EntityId) -> Vec<Point> {
        field_of_view(world, id)
            .map(|cone| cone.visible_points(&world.barriers, 0.0))
            .unwrap_or_default()
    }

    /// Beam segment of a bolt: from its anchor to the recorded impact.
    #[must_use]
    pub fn beam_segment(world: &World, id: EntityId) -> Option<Segment> {
        world.mover(id).and_then(|mover| {
            mover.impact.map(|impact| {
                Segment::new(Point::new(mover.shape.x(), mover.shape.y()), impact)
            })
        })
    }

    /// Blocking-edge probe used by movers for slide resolution, exposed for
    /// overlays and tests: the nearest barrier edge struck by the forward
    /// ray from `(x, y)`.
    #[must_use]
    pub fn nearest_blocking_edge(
        world: &World,
        rotation: f64,
        x: f64,
        y: f64,
    ) -> Option<(Segment, Point)> {
        let mut nearest: Option<(Segment, Point)> = None;
        let mut nearest_distance = f64::MAX;
        for barrier in &world.barriers {
            if let Some(strike) = collision::nearest_intersecting_edge(barrier, rotation, x, y) {
                let strike_distance =
                    geometry::distance(x, y, strike.point.x(), strike.point.y());
                if strike_distance < nearest_distance {
                    nearest_distance = strike_distance;
                    nearest = Some((strike.edge, strike.point));
                }
            }
        }
        nearest
    }

    /// Snapshot of an active route for overlays.
    #[derive(Clone, Debug, PartialEq)]
    pub struct RouteSnapshot {
        /// Resolved destination of the route.
        pub destination: Point,
        /// Remaining waypoints in consumption order.
        pub waypoints: Vec<Point>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackout_core::Segment;

    fn empty_world() -> World {
        let mut world = World::new();
        world.install_barriers(Vec::new());
        world
    }

    fn spawn_and_settle(
        world: &mut World,
        kind: EntityKind,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rotation: f64,
    ) -> EntityId {
        let id = world.queue_spawn(kind, x, y, width, height, rotation);
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::ZERO,
            },
            &mut events,
        );
        assert!(events.contains(&Event::EntitySpawned { id, kind }));
        id
    }

    fn tick(world: &mut World, millis: u64) -> Vec<Event> {
        let mut events = Vec::new();
        apply(
            world,
            Command::Tick {
                dt: Duration::from_millis(millis),
            },
            &mut events,
        );
        events
    }

    fn mover_shape(world: &World, id: EntityId) -> Shape {
        query::mover_view(world)
            .iter()
            .find(|snapshot| snapshot.id == id)
            .expect("mover must exist")
            .shape
    }

    #[test]
    fn pending_spawns_take_effect_at_the_next_tick() {
        let mut world = empty_world();
        let id = world.queue_spawn(EntityKind::Runner, 10.0, 10.0, 4.0, 4.0, 0.0);
        assert_eq!(query::mover_view(&world).iter().count(), 0);

        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::EntitySpawned {
            id,
            kind: EntityKind::Runner
        }));
        assert_eq!(query::mover_view(&world).iter().count(), 1);
    }

    #[test]
    fn queued_removals_apply_at_the_next_tick() {
        let mut world = empty_world();
        let id = spawn_and_settle(&mut world, EntityKind::Drifter, 0.0, 0.0, 4.0, 4.0, 0.0);
        world.queue_despawn(id);
        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::EntityRemoved { id }));
        assert_eq!(query::mover_view(&world).iter().count(), 0);
    }

    #[test]
    fn queues_accept_entities_from_other_threads() {
        let world = empty_world();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let world_ref = &world;
                let _ = scope.spawn(move || {
                    let _ = world_ref.queue_spawn(EntityKind::Drifter, 1.0, 1.0, 2.0, 2.0, 0.0);
                });
            }
        });
        let mut world = world;
        let _ = tick(&mut world, 16);
        assert_eq!(query::mover_view(&world).iter().count(), 4);
    }

    #[test]
    fn steering_moves_a_mover_toward_its_facing() {
        let mut world = empty_world();
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 100.0, 100.0, 4.0, 4.0, 0.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Steer {
                id,
                velocity: -130.0,
                rotational_velocity: 0.0,
            },
            &mut events,
        );
        let _ = tick(&mut world, 1000);

        let shape = mover_shape(&world, id);
        // Facing up, one second at forward speed climbs the screen exactly.
        assert_eq!(shape.x(), 100.0);
        assert_eq!(shape.y(), -30.0);
    }

    #[test]
    fn rotational_steering_normalises_the_heading() {
        let mut world = empty_world();
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 0.0, 0.0, 4.0, 4.0, 0.0);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Steer {
                id,
                velocity: 0.0,
                rotational_velocity: FRAC_PI_2,
            },
            &mut events,
        );
        let _ = tick(&mut world, 1000);
        assert_eq!(mover_shape(&world, id).rotation(), FRAC_PI_2);
    }

    #[test]
    fn runner_slides_along_a_vertical_wall() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(40.0, -100.0, 10.0, 300.0, 0.0)]);
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 20.0, 50.0, 10.0, 10.0, 0.0);

        // Turn to face right, then drive into the wall.
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Steer {
                id,
                velocity: 0.0,
                rotational_velocity: FRAC_PI_2,
            },
            &mut events,
        );
        let _ = tick(&mut world, 1000);
        assert_eq!(mover_shape(&world, id).rotation(), FRAC_PI_2);

        apply(
            &mut world,
            Command::Steer {
                id,
                velocity: -130.0,
                rotational_velocity: 0.0,
            },
            &mut events,
        );
        let events = tick(&mut world, 200);

        assert!(events.iter().any(|event| matches!(
            event,
            Event::CollisionDetected {
                against: CollisionPartner::Barrier(_),
                ..
            }
        )));
        let shape = mover_shape(&world, id);
        // The horizontal advance into the wall is reverted; the vertical
        // position keeps only sub-nanometre trigonometric residue.
        assert_eq!(shape.x(), 20.0);
        assert!((shape.y() - 50.0).abs() < 1.0e-9);
    }

    #[test]
    fn firing_honours_the_cooldown() {
        let mut world = empty_world();
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 50.0, 50.0, 10.0, 10.0, 0.0);

        let mut events = Vec::new();
        apply(&mut world, Command::Fire { id }, &mut events);
        let _ = tick(&mut world, 16);
        let mut events = tick(&mut world, 16);
        let first_bolt = events.iter().find_map(|event| match event {
            Event::EntitySpawned {
                id,
                kind: EntityKind::Bolt,
            } => Some(*id),
            _ => None,
        });
        assert!(first_bolt.is_some(), "first shot must spawn a bolt");

        // A second trigger pull right away is inside the cooldown window.
        apply(&mut world, Command::Fire { id }, &mut events);
        let _ = tick(&mut world, 16);
        let events = tick(&mut world, 16);
        assert!(
            !events.iter().any(|event| matches!(
                event,
                Event::EntitySpawned {
                    kind: EntityKind::Bolt,
                    ..
                }
            )),
            "cooldown must suppress the second bolt"
        );
    }

    #[test]
    fn bolts_mark_impacts_and_expire() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(0.0, 0.0, 100.0, 10.0, 0.0)]);
        // A bolt below the wall, facing straight up.
        let bolt = spawn_and_settle(&mut world, EntityKind::Bolt, 50.0, 200.0, 0.0, 0.0, 0.0);

        let events = tick(&mut world, 16);
        let impact = events.iter().find_map(|event| match event {
            Event::ImpactMarked { entity, point } if *entity == bolt => Some(*point),
            _ => None,
        });
        let impact = impact.expect("beam facing the wall must mark an impact");
        assert_eq!(impact, Point::new(50.0, 10.0));
        assert_eq!(
            query::beam_segment(&world, bolt),
            Some(Segment::new(Point::new(50.0, 200.0), impact))
        );

        // Persistence runs out and the bolt is removed on the next drain.
        let _ = tick(&mut world, 600);
        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::EntityRemoved { id: bolt }));
    }

    #[test]
    fn bolts_destroy_drifters_they_strike() {
        let mut world = empty_world();
        let drifter = spawn_and_settle(&mut world, EntityKind::Drifter, 40.0, 40.0, 20.0, 20.0, 0.0);
        // Beam fired from below the drifter, facing up into it.
        let bolt = world.queue_spawn(EntityKind::Bolt, 50.0, 200.0, 0.0, 0.0, 0.0);

        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::EntitySpawned {
            id: bolt,
            kind: EntityKind::Bolt
        }));
        assert!(events.iter().any(|event| matches!(
            event,
            Event::CollisionDetected {
                against: CollisionPartner::Entity(hit),
                ..
            } if *hit == drifter
        )));

        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::EntityRemoved { id: bolt }));
        assert!(events.contains(&Event::EntityRemoved { id: drifter }));
        assert_eq!(query::mover_view(&world).iter().count(), 0);
    }

    #[test]
    fn route_following_walks_the_planned_waypoints() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(350.0, 250.0, 100.0, 100.0, 0.0)]);
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 0.0, 300.0, 0.0, 0.0, 0.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetDestination {
                id,
                x: 800.0,
                y: 300.0,
            },
            &mut events,
        );
        let destination = events
            .iter()
            .find_map(|event| match event {
                Event::DestinationResolved { destination, .. } => Some(*destination),
                _ => None,
            })
            .expect("destination must resolve");
        assert_ne!(destination, Point::new(0.0, 300.0));

        let expected_waypoints = query::route_view(&world, id)
            .expect("route must be active")
            .waypoints;
        assert!(!expected_waypoints.is_empty());

        let mut reached = Vec::new();
        let mut exhausted = false;
        for _ in 0..5_000 {
            let events = tick(&mut world, 16);
            for event in &events {
                match event {
                    Event::WaypointReached { waypoint, .. } => reached.push(*waypoint),
                    Event::RouteExhausted { .. } => exhausted = true,
                    _ => {}
                }
            }
            if exhausted {
                break;
            }
        }

        assert!(exhausted, "route must finish within the tick budget");
        assert_eq!(reached, expected_waypoints);
        let shape = mover_shape(&world, id);
        assert_eq!(Point::new(shape.x(), shape.y()), destination);
        assert!(query::route_view(&world, id).is_none());
    }

    #[test]
    fn manual_steering_cancels_an_active_route() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(350.0, 250.0, 100.0, 100.0, 0.0)]);
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 0.0, 300.0, 0.0, 0.0, 0.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetDestination {
                id,
                x: 800.0,
                y: 300.0,
            },
            &mut events,
        );
        assert!(query::route_view(&world, id).is_some());

        apply(
            &mut world,
            Command::Steer {
                id,
                velocity: 70.0,
                rotational_velocity: 0.0,
            },
            &mut events,
        );
        assert!(query::route_view(&world, id).is_none());
    }

    #[test]
    fn open_arena_destination_collapses_to_the_origin() {
        let mut world = empty_world();
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 10.0, 20.0, 0.0, 0.0, 0.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SetDestination {
                id,
                x: 500.0,
                y: 500.0,
            },
            &mut events,
        );
        assert!(events.contains(&Event::DestinationResolved {
            entity: id,
            destination: Point::new(10.0, 20.0)
        }));

        // The empty route is discarded on the next tick without movement.
        let events = tick(&mut world, 16);
        assert!(events.contains(&Event::RouteExhausted { entity: id }));
        let shape = mover_shape(&world, id);
        assert_eq!((shape.x(), shape.y()), (10.0, 20.0));
    }

    #[test]
    fn vision_cone_tracks_the_mover_pose() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(30.0, -60.0, 40.0, 20.0, 0.0)]);
        let id = spawn_and_settle(&mut world, EntityKind::Runner, 40.0, 40.0, 20.0, 20.0, 0.0);

        let cone = query::field_of_view(&world, id).expect("mover has a cone");
        // Eye point sits ahead of the center: height/2 + extension above it.
        assert_eq!(cone.origin(), Point::new(50.0, 33.0));

        let lit = query::visible_points_in_view(&world, id);
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|point| point.y() < 33.0));
    }

    #[test]
    fn nearest_blocking_edge_classifies_walls() {
        let mut world = empty_world();
        world.install_barriers(vec![Shape::new(100.0, 0.0, 10.0, 200.0, 0.0)]);
        let (edge, point) = query::nearest_blocking_edge(&world, FRAC_PI_2, 0.0, 50.0)
            .expect("wall lies on the probe ray");
        assert_eq!(edge.start().x(), edge.end().x());
        assert_eq!(point, Point::new(100.0, 50.0));
    }
}
