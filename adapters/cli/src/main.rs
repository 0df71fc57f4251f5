#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Mystify effect in a window or headless.

mod driver;
mod session;
mod settings;

use anyhow::Result;
use clap::Parser;
use log::info;
use mystify_rendering::{Color, Presentation, RenderingBackend};
use mystify_rendering_macroquad::MacroquadBackend;
use mystify_world::query;

use self::{
    driver::FrameDriver,
    session::{build_scene, build_simulation, run_headless},
    settings::{Args, Settings},
};

/// Entry point for the Mystify command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load(Args::parse())?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    info!("seeding random source with {seed}");

    let mut simulation = build_simulation(&settings, seed)?;
    let mut scene = build_scene(&settings)?;

    if let Some(ticks) = settings.headless {
        let report = run_headless(&mut simulation, &mut scene, ticks);
        info!(
            "headless run finished after {} ticks with {} strokes recorded ({} to {} per tick)",
            report.ticks, report.total_strokes, report.fewest_strokes, report.most_strokes
        );
        for (index, shape) in query::shapes(&simulation).iter().enumerate() {
            info!(
                "shape {index}: color {:?}, lead {:?}",
                shape.color().resolve(query::palette(&simulation)),
                shape.trail().lead()
            );
        }
        simulation.teardown();
        return Ok(());
    }

    let backend = MacroquadBackend::new()
        .with_vsync(settings.double_buffer)
        .with_show_fps(settings.show_fps)
        .with_window_size(settings.width, settings.height);
    let presentation = Presentation::new("Mystify", Color::from_rgb_u8(0, 0, 0), scene);
    let mut driver = FrameDriver::new(simulation);

    backend.run(presentation, move |dt, input, scene| {
        driver.advance(dt, input, scene);
    })
}
