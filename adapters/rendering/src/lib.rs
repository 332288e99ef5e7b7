#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts for Blackout rendering adapters.
//!
//! The simulation core has no rendering dependency of its own; backends in
//! sibling crates translate these declarative scene descriptions into a
//! concrete engine. Everything here is read-only with respect to the world:
//! adapters assemble a [`Scene`] from world queries each frame and hand it
//! to a [`RenderingBackend`].

mod sprites;

pub use sprites::{SpriteAsset, SpriteCatalog, SpriteCatalogError, SpriteKey};

use std::time::Duration;

use anyhow::Result as AnyResult;
use blackout_core::{EntityId, EntityKind, Point};
use glam::Vec2;
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

/// Converts a world point into a screen-space vector.
#[must_use]
pub fn to_screen(point: Point) -> Vec2 {
    Vec2::new(point.x() as f32, point.y() as f32)
}

/// Playable area descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArenaPresentation {
    /// Arena size in world units.
    pub size: Vec2,
    /// Solid background color behind all other content.
    pub background: Color,
}

impl ArenaPresentation {
    /// Creates a new arena descriptor, rejecting degenerate sizes.
    pub fn new(width: f32, height: f32, background: Color) -> Result<Self, RenderingError> {
        if width <= 0.0 || height <= 0.0 {
            return Err(RenderingError::InvalidArenaSize { width, height });
        }
        Ok(Self {
            size: Vec2::new(width, height),
            background,
        })
    }
}

/// Static barrier drawn as an axis-aligned rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BarrierPresentation {
    /// Top-left corner in screen space.
    pub position: Vec2,
    /// Rectangle size.
    pub size: Vec2,
    /// Fill color.
    pub color: Color,
}

/// Dynamic entity drawn from a sprite, rotated about its own center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoverPresentation {
    /// Identifier of the presented entity.
    pub id: EntityId,
    /// Kind of the presented entity.
    pub kind: EntityKind,
    /// Sprite drawn for the entity.
    pub sprite: SpriteKey,
    /// Top-left anchor in screen space.
    pub position: Vec2,
    /// Footprint size.
    pub size: Vec2,
    /// Rotation in radians clockwise from facing up.
    pub rotation: f32,
}

/// Hitscan beam drawn from a bolt's anchor to its recorded impact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamPresentation {
    /// Beam origin.
    pub from: Vec2,
    /// Impact point.
    pub to: Vec2,
    /// Line color.
    pub color: Color,
}

/// Single sightline of the corner graph overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SightLine {
    /// First end of the sightline.
    pub from: Vec2,
    /// Second end of the sightline.
    pub to: Vec2,
}

/// Debug overlay showing the precomputed corner graph.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationOverlay {
    /// Undirected graph edges, one entry per edge.
    pub edges: Vec<SightLine>,
    /// Line color for every edge.
    pub color: Color,
}

/// Debug overlay showing an in-progress route.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOverlay {
    /// Resolved destination marker.
    pub destination: Vec2,
    /// Remaining waypoints in consumption order.
    pub waypoints: Vec<Vec2>,
    /// Color for the destination marker and waypoint links.
    pub color: Color,
}

/// Scene description combining the arena and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Playable area behind all other content.
    pub arena: ArenaPresentation,
    /// Static barriers.
    pub barriers: Vec<BarrierPresentation>,
    /// Dynamic entities.
    pub movers: Vec<MoverPresentation>,
    /// Active hitscan beams.
    pub beams: Vec<BeamPresentation>,
    /// Optional corner-graph overlay.
    pub navigation: Option<NavigationOverlay>,
    /// Optional route overlay for the steered entity.
    pub route: Option<RouteOverlay>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        arena: ArenaPresentation,
        barriers: Vec<BarrierPresentation>,
        movers: Vec<MoverPresentation>,
        beams: Vec<BeamPresentation>,
        navigation: Option<NavigationOverlay>,
        route: Option<RouteOverlay>,
    ) -> Self {
        Self {
            arena,
            barriers,
            movers,
            beams,
            navigation,
            route,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Blackout scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and may
    /// mutate the scene before it is rendered, allowing adapters to refresh
    /// world snapshots deterministically.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderingError {
    /// Arena dimensions must both be positive.
    #[error("arena size must be positive (received {width} x {height})")]
    InvalidArenaSize {
        /// Width that failed validation.
        width: f32,
        /// Height that failed validation.
        height: f32,
    },
}
