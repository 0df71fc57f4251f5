//! Simulation setup shared by the windowed and headless runs.

use anyhow::{Context, Result};
use mystify_core::{Palette, RandomSource, Viewport, DEFAULT_PALETTE_SIZE};
use mystify_rendering::Scene;
use mystify_system_palette::{bold_palette, smooth_palette};
use mystify_system_random::SeededRandom;
use mystify_world::Simulation;

use crate::settings::Settings;

/// Bold palettes are fixed; smooth palettes draw their anchors from `random`.
pub(crate) fn build_palette<R: RandomSource>(bold: bool, random: &mut R) -> Result<Palette> {
    let palette = if bold {
        bold_palette(DEFAULT_PALETTE_SIZE)
    } else {
        smooth_palette(DEFAULT_PALETTE_SIZE, random)
    };
    palette.context("failed to build color palette")
}

pub(crate) fn build_simulation(settings: &Settings, seed: u64) -> Result<Simulation<SeededRandom>> {
    let mut random = SeededRandom::new(seed);
    let palette = build_palette(settings.bold_colors, &mut random)?;
    let viewport = Viewport::new(settings.width, settings.height);
    Simulation::init(settings.simulation_config(), viewport, palette, random)
        .context("invalid simulation configuration")
}

pub(crate) fn build_scene(settings: &Settings) -> Result<Scene> {
    let viewport = Viewport::new(settings.width, settings.height);
    Scene::new(viewport, settings.thickness as f32).context("invalid stroke thickness")
}

/// Stroke counts gathered while running without a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeadlessReport {
    pub(crate) ticks: u64,
    pub(crate) total_strokes: usize,
    pub(crate) fewest_strokes: usize,
    pub(crate) most_strokes: usize,
}

/// Runs `ticks` updates back to back, rendering each into `scene`.
///
/// The delay hint is ignored; nothing is paced.
pub(crate) fn run_headless<R: RandomSource>(
    simulation: &mut Simulation<R>,
    scene: &mut Scene,
    ticks: u64,
) -> HeadlessReport {
    let mut report = HeadlessReport {
        ticks: 0,
        total_strokes: 0,
        fewest_strokes: usize::MAX,
        most_strokes: 0,
    };

    for _ in 0..ticks {
        scene.clear();
        simulation.update();
        simulation.render(&mut scene.recorder());

        let strokes = scene.polylines.len();
        report.ticks += 1;
        report.total_strokes = report.total_strokes.saturating_add(strokes);
        report.fewest_strokes = report.fewest_strokes.min(strokes);
        report.most_strokes = report.most_strokes.max(strokes);
    }

    if report.ticks == 0 {
        report.fewest_strokes = 0;
    }
    report
}
