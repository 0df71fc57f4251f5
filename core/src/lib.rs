#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mystify workspace.
//!
//! This crate defines the vocabulary that connects the simulation world, its
//! pure systems and the adapters that host it. Geometry is expressed in integer
//! pixel coordinates ([`Point`], [`Velocity`], [`Viewport`]), colors through
//! [`Rgb`] and [`Palette`], and the two historical behaviours of the effect are
//! selected with [`MotionPolicy`] and [`ColorPolicy`]. Collaborators the
//! simulation consumes but does not own are described by the [`RandomSource`]
//! and [`LineRenderer`] traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of entries in the cyclic palette used by the classic variant.
pub const DEFAULT_PALETTE_SIZE: usize = 1024;

/// Smallest accepted extent of either viewport axis, in pixels.
pub const MIN_VIEWPORT_EXTENT: u32 = 2;

/// Smallest accepted number of vertices per polygon.
pub const MIN_POINT_COUNT: u32 = 2;

/// Integer pixel coordinate of a single polygon vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point from pixel coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Signed per-tick displacement of a vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Velocity {
    dx: i32,
    dy: i32,
}

impl Velocity {
    /// Creates a new velocity from per-axis displacements.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Horizontal displacement applied every tick.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Vertical displacement applied every tick.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }
}

/// Dimensions of the drawable area that vertices bounce inside.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Creates a new viewport description.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the viewport in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the viewport in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the point lies inside `[0, width) x [0, height)`.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        let inside = |value: i32, bound: u32| value >= 0 && (value as u32) < bound;
        inside(point.x(), self.width) && inside(point.y(), self.height)
    }

    /// Rejects viewports whose reflection arithmetic would degenerate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_VIEWPORT_EXTENT || self.height < MIN_VIEWPORT_EXTENT {
            return Err(ConfigError::ViewportTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Opaque color expressed as byte RGB channels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    red: u8,
    green: u8,
    blue: u8,
}

impl Rgb {
    /// Creates a new color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Ordered, cyclic sequence of colors shapes step through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Creates a palette from the provided colors.
    ///
    /// Returns an error when `colors` is empty since cyclic indexing would be
    /// undefined.
    pub fn new(colors: Vec<Rgb>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        Ok(Self { colors })
    }

    /// Number of colors in the palette. Always at least one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; palettes cannot be constructed empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping around the end of the palette.
    #[must_use]
    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    /// Colors in palette order.
    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

/// How vertex velocities are chosen at creation and after hitting a wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPolicy {
    /// Speeds are drawn from `[max(1, max_speed / 6), max_speed)` at creation
    /// and re-drawn after every bounce, pointing away from the wall.
    BiasedReroll,
    /// Speeds are drawn symmetrically around zero once; a bounce only flips
    /// the sign and the magnitude is kept forever.
    SignFlip,
}

/// How shapes are colored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Shapes start evenly spaced through the palette and advance one entry
    /// every tick.
    Cycling,
    /// Each shape receives one random RGB color that never changes.
    RandomFixed,
}

/// Presets bundling the two historical policy combinations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Biased speed re-roll on every bounce with palette color cycling.
    #[default]
    Classic,
    /// Sign-flip bounces with one fixed random color per shape.
    Random,
}

impl Variant {
    /// Motion policy used by the preset.
    #[must_use]
    pub const fn motion(self) -> MotionPolicy {
        match self {
            Self::Classic => MotionPolicy::BiasedReroll,
            Self::Random => MotionPolicy::SignFlip,
        }
    }

    /// Color policy used by the preset.
    #[must_use]
    pub const fn coloring(self) -> ColorPolicy {
        match self {
            Self::Classic => ColorPolicy::Cycling,
            Self::Random => ColorPolicy::RandomFixed,
        }
    }
}

/// Color assignment carried by a single shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeColor {
    /// Position within the cyclic palette, advanced every tick.
    Cycling {
        /// Current palette index, always below the palette length.
        index: usize,
    },
    /// Color fixed at construction.
    Fixed(Rgb),
}

impl ShapeColor {
    /// Resolves the color a renderer should stroke the shape with.
    #[must_use]
    pub fn resolve(&self, palette: &Palette) -> Rgb {
        match *self {
            Self::Cycling { index } => palette.color(index),
            Self::Fixed(rgb) => rgb,
        }
    }
}

/// Validated parameters the simulation is constructed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of independently moving shapes.
    pub shape_count: u32,
    /// Number of vertices in every polygon.
    pub point_count: u32,
    /// Number of polygons kept per shape, the lead included.
    pub trail_length: u32,
    /// Upper bound on vertex speed, in pixels per tick.
    pub max_speed: u32,
    /// Advisory pause the host should observe between ticks.
    pub delay: Duration,
    /// Velocity policy applied to every vertex.
    pub motion: MotionPolicy,
    /// Color policy applied to every shape.
    pub coloring: ColorPolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::with_variant(Variant::Classic)
    }
}

impl SimulationConfig {
    /// Default parameters using the policies of the provided preset.
    #[must_use]
    pub fn with_variant(variant: Variant) -> Self {
        Self {
            shape_count: 2,
            point_count: 4,
            trail_length: 6,
            max_speed: 20,
            delay: Duration::from_micros(30_000),
            motion: variant.motion(),
            coloring: variant.coloring(),
        }
    }

    /// Checks every precondition the simulation arithmetic relies on.
    ///
    /// Values are never clamped here; clamping belongs to the configuration
    /// loader.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shape_count == 0 {
            return Err(ConfigError::TooFewShapes);
        }
        if self.point_count < MIN_POINT_COUNT {
            return Err(ConfigError::TooFewPoints {
                point_count: self.point_count,
            });
        }
        if self.trail_length == 0 {
            return Err(ConfigError::EmptyTrail);
        }
        if self.max_speed == 0 {
            return Err(ConfigError::ZeroMaxSpeed);
        }
        Ok(())
    }
}

/// Precondition violations detected while constructing or resizing a simulation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
pub enum ConfigError {
    /// At least one shape is required.
    #[error("shape count must be at least 1")]
    TooFewShapes,
    /// Polygons need at least two vertices.
    #[error("point count must be at least {MIN_POINT_COUNT} (received {point_count})")]
    TooFewPoints {
        /// Provided vertex count that failed validation.
        point_count: u32,
    },
    /// The trail must hold at least the lead polygon.
    #[error("trail length must be at least 1")]
    EmptyTrail,
    /// Vertices must be able to move.
    #[error("max speed must be at least 1")]
    ZeroMaxSpeed,
    /// Reflection needs at least two pixels on each axis.
    #[error("viewport must be at least {MIN_VIEWPORT_EXTENT}x{MIN_VIEWPORT_EXTENT} (received {width}x{height})")]
    ViewportTooSmall {
        /// Provided viewport width.
        width: u32,
        /// Provided viewport height.
        height: u32,
    },
    /// Cyclic coloring needs at least one color.
    #[error("palette must contain at least one color")]
    EmptyPalette,
}

/// Seeded stream of uniform random values consumed by the simulation.
pub trait RandomSource {
    /// Uniform integer in `[0, bound)`. Returns 0 when `bound` is 0.
    fn next_int(&mut self, bound: u32) -> u32;

    /// Uniform boolean.
    fn next_bool(&mut self) -> bool;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_int(&mut self, bound: u32) -> u32 {
        (**self).next_int(bound)
    }

    fn next_bool(&mut self) -> bool {
        (**self).next_bool()
    }
}

/// Drawing surface capable of stroking closed wireframe loops.
///
/// Implementations close the loop themselves (see [`closed_loop`]) and stroke
/// with whatever thickness they were configured with.
pub trait LineRenderer {
    /// Strokes the closed polyline through `points` in the provided color.
    fn draw_closed_polyline(&mut self, color: Rgb, points: &[Point]);
}

/// Input delivered by the host while the simulation runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// A key was pressed.
    KeyPressed {
        /// Character associated with the key, when there is one.
        key: Option<char>,
    },
    /// A pointer button was pressed at the provided position.
    PointerPressed {
        /// Pointer location in viewport pixels.
        position: Point,
    },
    /// The pointer moved to the provided position.
    PointerMoved {
        /// Pointer location in viewport pixels.
        position: Point,
    },
}

/// Iterates the points of a polygon followed by its first point again.
pub fn closed_loop(points: &[Point]) -> impl Iterator<Item = Point> + '_ {
    points.iter().copied().chain(points.first().copied())
}
