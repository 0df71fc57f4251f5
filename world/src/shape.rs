//! Bouncing polygons and their per-vertex velocities.

use mystify_core::{
    ConfigError, LineRenderer, Palette, Point, RandomSource, ShapeColor, Velocity, Viewport,
};
use mystify_system_motion::Motion;

use crate::trail::TrailBuffer;

/// One bouncing polygon together with its trail of earlier positions.
///
/// Velocities are stored once per vertex index and shared by every snapshot in
/// the trail; only the lead snapshot evolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape {
    trail: TrailBuffer,
    velocities: Vec<Velocity>,
    color: ShapeColor,
}

impl Shape {
    /// Creates a shape with random vertices and velocities inside `viewport`.
    pub fn new<R>(
        point_count: usize,
        trail_length: usize,
        color: ShapeColor,
        viewport: Viewport,
        motion: &Motion,
        random: &mut R,
    ) -> Result<Self, ConfigError>
    where
        R: RandomSource + ?Sized,
    {
        viewport.validate()?;
        let initial: Vec<Point> = (0..point_count)
            .map(|_| random_point(viewport, random))
            .collect();
        let trail = TrailBuffer::new(&initial, trail_length)?;
        let velocities = (0..point_count)
            .map(|_| motion.initial_velocity(random))
            .collect();

        Ok(Self {
            trail,
            velocities,
            color,
        })
    }

    /// Trail of snapshots owned by the shape.
    #[must_use]
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    /// Current velocity of every vertex, in vertex order.
    #[must_use]
    pub fn velocities(&self) -> &[Velocity] {
        &self.velocities
    }

    /// Current color assignment.
    #[must_use]
    pub const fn color(&self) -> ShapeColor {
        self.color
    }

    /// Replaces the color assignment.
    pub fn set_color(&mut self, color: ShapeColor) {
        self.color = color;
    }

    /// Advances the trail by one tick and steps a cycling color.
    pub fn update<R>(
        &mut self,
        viewport: Viewport,
        motion: &Motion,
        random: &mut R,
        palette_len: usize,
    ) where
        R: RandomSource + ?Sized,
    {
        self.trail
            .advance(&mut self.velocities, viewport, motion, random);

        if let ShapeColor::Cycling { index } = &mut self.color {
            *index = (*index + 1) % palette_len.max(1);
        }
    }

    /// Strokes every snapshot in buffer order using the current color.
    pub fn render<S>(&self, surface: &mut S, palette: &Palette)
    where
        S: LineRenderer + ?Sized,
    {
        let color = self.color.resolve(palette);
        for polygon in self.trail.polygons() {
            surface.draw_closed_polyline(color, polygon);
        }
    }

    /// Regenerates the geometry for `viewport` and re-rolls every velocity.
    ///
    /// Stale snapshots computed for a previous viewport are discarded: every
    /// slot collapses onto the new lead. The color assignment is untouched.
    pub fn reinit<R>(&mut self, viewport: Viewport, motion: &Motion, random: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        self.trail.reset(|| random_point(viewport, random));
        for velocity in &mut self.velocities {
            *velocity = motion.initial_velocity(random);
        }
    }
}

fn random_point<R>(viewport: Viewport, random: &mut R) -> Point
where
    R: RandomSource + ?Sized,
{
    let x = random.next_int(viewport.width());
    let y = random.next_int(viewport.height());
    Point::new(
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}
