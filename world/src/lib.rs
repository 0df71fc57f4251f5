#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative simulation state for the Mystify effect.
//!
//! A [`Simulation`] owns every [`Shape`], the viewport they bounce inside, the
//! palette cycling shapes step through and the random source all stochastic
//! decisions draw from. Hosts drive it through a small lifecycle:
//! [`Simulation::init`] once, [`Simulation::tick`] at their own cadence,
//! [`Simulation::resize`] when the drawable changes size and
//! [`Simulation::teardown`] at the end. Read-only access goes through the
//! [`query`] module.

mod shape;
mod trail;

use std::time::Duration;

use log::{debug, trace};
use mystify_core::{
    ColorPolicy, ConfigError, InputEvent, LineRenderer, Palette, RandomSource, ShapeColor,
    SimulationConfig, Viewport,
};
use mystify_system_motion::Motion;
use mystify_system_palette::random_rgb;

pub use shape::Shape;
pub use trail::TrailBuffer;

/// Running simulation; holds all shape state exclusively.
///
/// The type is the `Running` state of the lifecycle: it can only be obtained
/// from [`init`](Self::init) and [`teardown`](Self::teardown) consumes it.
#[derive(Debug)]
pub struct Simulation<R> {
    config: SimulationConfig,
    viewport: Viewport,
    motion: Motion,
    palette: Palette,
    shapes: Vec<Shape>,
    random: R,
    tick_count: u64,
}

impl<R: RandomSource> Simulation<R> {
    /// Validates the configuration and builds every shape inside `viewport`.
    ///
    /// Cycling shapes start evenly spaced through `palette`; fixed-color shapes
    /// draw one random color each.
    pub fn init(
        config: SimulationConfig,
        viewport: Viewport,
        palette: Palette,
        mut random: R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        viewport.validate()?;

        let motion = Motion::new(config.motion, config.max_speed);
        let shape_count = config.shape_count as usize;
        let mut shapes = Vec::with_capacity(shape_count);
        for index in 0..shape_count {
            let color = match config.coloring {
                ColorPolicy::Cycling => ShapeColor::Cycling {
                    index: starting_color_index(index, shape_count, palette.len()),
                },
                ColorPolicy::RandomFixed => ShapeColor::Fixed(random_rgb(&mut random)),
            };
            shapes.push(Shape::new(
                config.point_count as usize,
                config.trail_length as usize,
                color,
                viewport,
                &motion,
                &mut random,
            )?);
        }

        debug!(
            "initialised {} shapes of {} points with {} trail slots in {}x{}",
            shape_count,
            config.point_count,
            config.trail_length,
            viewport.width(),
            viewport.height()
        );

        Ok(Self {
            config,
            viewport,
            motion,
            palette,
            shapes,
            random,
            tick_count: 0,
        })
    }

    /// Runs one frame: updates every shape, then renders every shape.
    ///
    /// Returns the configured delay as a pacing hint; the simulation never
    /// sleeps on its own.
    pub fn tick<S>(&mut self, surface: &mut S) -> Duration
    where
        S: LineRenderer + ?Sized,
    {
        self.update();
        self.render(surface);
        self.config.delay
    }

    /// Advances every shape by one tick without drawing.
    pub fn update(&mut self) {
        let palette_len = self.palette.len();
        for shape in &mut self.shapes {
            shape.update(self.viewport, &self.motion, &mut self.random, palette_len);
        }
        self.tick_count = self.tick_count.wrapping_add(1);
        trace!("tick {} advanced {} shapes", self.tick_count, self.shapes.len());
    }

    /// Strokes every shape onto `surface` without advancing the simulation.
    pub fn render<S>(&self, surface: &mut S)
    where
        S: LineRenderer + ?Sized,
    {
        for shape in &self.shapes {
            shape.render(surface, &self.palette);
        }
    }

    /// Replaces the viewport and fully reinitialises every shape.
    ///
    /// Geometry computed for the previous bounds is discarded rather than
    /// rescaled, and cycling colors return to their evenly spaced starting
    /// positions. On error the simulation is left untouched.
    pub fn resize(&mut self, viewport: Viewport) -> Result<(), ConfigError> {
        viewport.validate()?;
        self.viewport = viewport;

        let shape_count = self.shapes.len();
        let palette_len = self.palette.len();
        for (index, shape) in self.shapes.iter_mut().enumerate() {
            shape.reinit(viewport, &self.motion, &mut self.random);
            if let ShapeColor::Cycling { .. } = shape.color() {
                shape.set_color(ShapeColor::Cycling {
                    index: starting_color_index(index, shape_count, palette_len),
                });
            }
        }

        debug!(
            "resized to {}x{}; {} shapes reinitialised",
            viewport.width(),
            viewport.height(),
            shape_count
        );
        Ok(())
    }

    /// The effect is not interactive: every event is reported as unhandled.
    pub fn handle_input_event(&mut self, event: &InputEvent) -> bool {
        trace!("ignoring input event {event:?}");
        false
    }

    /// Releases every shape. The simulation cannot be used afterwards.
    pub fn teardown(self) {
        let Self {
            shapes, tick_count, ..
        } = self;
        debug!(
            "tearing down {} shapes after {} ticks",
            shapes.len(),
            tick_count
        );
        drop(shapes);
    }
}

/// Palette index a cycling shape starts from so shapes are evenly spaced.
#[must_use]
pub fn starting_color_index(shape_index: usize, shape_count: usize, palette_len: usize) -> usize {
    if shape_count == 0 || palette_len == 0 {
        return 0;
    }
    (shape_index * (palette_len / shape_count)) % palette_len
}

/// Query functions that provide read-only access to the simulation state.
pub mod query {
    use mystify_core::{Palette, SimulationConfig, Viewport};

    use super::{Shape, Simulation};

    /// Configuration the simulation was initialised with.
    #[must_use]
    pub fn config<R>(simulation: &Simulation<R>) -> &SimulationConfig {
        &simulation.config
    }

    /// Viewport the shapes currently bounce inside.
    #[must_use]
    pub fn viewport<R>(simulation: &Simulation<R>) -> Viewport {
        simulation.viewport
    }

    /// Palette cycling shapes step through.
    #[must_use]
    pub fn palette<R>(simulation: &Simulation<R>) -> &Palette {
        &simulation.palette
    }

    /// Shapes in construction order.
    #[must_use]
    pub fn shapes<R>(simulation: &Simulation<R>) -> &[Shape] {
        &simulation.shapes
    }

    /// Number of ticks completed since initialisation.
    #[must_use]
    pub fn tick_count<R>(simulation: &Simulation<R>) -> u64 {
        simulation.tick_count
    }
}
