use std::time::Duration;

use log::debug;
use mystify_core::RandomSource;
use mystify_rendering::{FrameInput, Scene};
use mystify_world::Simulation;

/// Paces a simulation against the host's frame clock.
///
/// Frames arriving before the delay hint has elapsed redraw the previous
/// scene. At most one tick runs per frame so a slow host never spirals.
#[derive(Debug)]
pub(crate) struct FrameDriver<R: RandomSource> {
    simulation: Option<Simulation<R>>,
    delay: Duration,
    pending: Duration,
}

impl<R: RandomSource> FrameDriver<R> {
    pub(crate) fn new(simulation: Simulation<R>) -> Self {
        let delay = mystify_world::query::config(&simulation).delay;
        Self {
            simulation: Some(simulation),
            delay,
            pending: Duration::ZERO,
        }
    }

    /// Forwards input, resizes on viewport changes and ticks into `scene` once
    /// the delay has passed.
    ///
    /// An event the simulation reports as handled forces a redraw this frame.
    pub(crate) fn advance(&mut self, dt: Duration, input: FrameInput, scene: &mut Scene) {
        let Some(simulation) = self.simulation.as_mut() else {
            return;
        };

        let mut stale = scene.polylines.is_empty();
        for event in &input.events {
            stale |= simulation.handle_input_event(event);
        }
        if input.viewport != scene.viewport {
            match simulation.resize(input.viewport) {
                Ok(()) => {
                    scene.viewport = input.viewport;
                    stale = true;
                }
                Err(error) => debug!("keeping previous viewport: {error}"),
            }
        }

        self.pending = self.pending.saturating_add(dt);
        if self.pending < self.delay && !stale {
            return;
        }
        self.pending = self.pending.saturating_sub(self.delay).min(self.delay);

        scene.clear();
        self.delay = simulation.tick(&mut scene.recorder());
    }
}

impl<R: RandomSource> Drop for FrameDriver<R> {
    fn drop(&mut self) {
        if let Some(simulation) = self.simulation.take() {
            simulation.teardown();
        }
    }
}
