use std::time::Duration;

use mystify_core::{
    ColorPolicy, ConfigError, InputEvent, LineRenderer, MotionPolicy, Palette, Point, Rgb,
    ShapeColor, SimulationConfig, Variant, Viewport, DEFAULT_PALETTE_SIZE,
};
use mystify_system_palette::bold_palette;
use mystify_system_random::SeededRandom;
use mystify_world::{query, Simulation};

#[derive(Debug, Default)]
struct Recorder {
    strokes: Vec<(Rgb, Vec<Point>)>,
}

impl LineRenderer for Recorder {
    fn draw_closed_polyline(&mut self, color: Rgb, points: &[Point]) {
        self.strokes.push((color, points.to_vec()));
    }
}

fn palette() -> Palette {
    bold_palette(DEFAULT_PALETTE_SIZE).expect("non-empty palette")
}

fn simulation(config: SimulationConfig, viewport: Viewport, seed: u64) -> Simulation<SeededRandom> {
    Simulation::init(config, viewport, palette(), SeededRandom::new(seed)).expect("valid setup")
}

fn assert_contained(simulation: &Simulation<SeededRandom>) {
    let viewport = query::viewport(simulation);
    for shape in query::shapes(simulation) {
        for polygon in shape.trail().polygons() {
            for point in polygon {
                assert!(
                    viewport.contains(*point),
                    "{point:?} escaped {}x{}",
                    viewport.width(),
                    viewport.height()
                );
            }
        }
    }
}

#[test]
fn single_square_stays_inside_for_a_thousand_ticks() {
    let config = SimulationConfig {
        shape_count: 1,
        point_count: 4,
        trail_length: 1,
        max_speed: 5,
        ..SimulationConfig::default()
    };
    let mut simulation = simulation(config, Viewport::new(100, 100), 0xfeed);

    let shapes = query::shapes(&simulation);
    assert_eq!(shapes.len(), 1);
    assert_eq!(shapes[0].trail().lead().len(), 4);
    assert_contained(&simulation);

    for _ in 0..1_000 {
        simulation.update();
        assert_contained(&simulation);
    }
    assert_eq!(query::tick_count(&simulation), 1_000);
}

#[test]
fn containment_holds_for_both_variants_and_extreme_speeds() {
    for variant in [Variant::Classic, Variant::Random] {
        for max_speed in [1, 7, 40, 300] {
            let config = SimulationConfig {
                shape_count: 3,
                point_count: 5,
                trail_length: 4,
                max_speed,
                ..SimulationConfig::with_variant(variant)
            };
            let mut simulation = simulation(config, Viewport::new(37, 23), u64::from(max_speed));
            for _ in 0..300 {
                simulation.update();
                assert_contained(&simulation);
            }
        }
    }
}

#[test]
fn tick_updates_then_renders_every_trail_slot() {
    let config = SimulationConfig {
        shape_count: 2,
        point_count: 3,
        trail_length: 4,
        delay: Duration::from_millis(17),
        ..SimulationConfig::default()
    };
    let mut simulation = simulation(config, Viewport::new(320, 200), 9);
    let mut recorder = Recorder::default();

    let delay = simulation.tick(&mut recorder);

    assert_eq!(delay, Duration::from_millis(17));
    assert_eq!(query::tick_count(&simulation), 1);
    assert_eq!(recorder.strokes.len(), 2 * 4);
    let leads: Vec<Vec<Point>> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.trail().lead().to_vec())
        .collect();
    for lead in &leads {
        assert!(recorder.strokes.iter().any(|(_, points)| points == lead));
    }
}

#[test]
fn render_uses_the_color_after_the_update() {
    let config = SimulationConfig {
        shape_count: 1,
        ..SimulationConfig::default()
    };
    let mut simulation = simulation(config, Viewport::new(320, 200), 10);
    let mut recorder = Recorder::default();

    let _ = simulation.tick(&mut recorder);

    let expected = query::palette(&simulation).color(1);
    assert!(recorder.strokes.iter().all(|(color, _)| *color == expected));
}

#[test]
fn cycling_colors_start_evenly_spaced_and_return_after_a_full_palette() {
    let config = SimulationConfig {
        shape_count: 4,
        trail_length: 2,
        ..SimulationConfig::with_variant(Variant::Classic)
    };
    let mut simulation = simulation(config, Viewport::new(64, 64), 12);

    let starting: Vec<ShapeColor> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.color())
        .collect();
    assert_eq!(
        starting,
        vec![
            ShapeColor::Cycling { index: 0 },
            ShapeColor::Cycling { index: 256 },
            ShapeColor::Cycling { index: 512 },
            ShapeColor::Cycling { index: 768 },
        ]
    );

    for _ in 0..DEFAULT_PALETTE_SIZE {
        simulation.update();
    }
    let after: Vec<ShapeColor> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.color())
        .collect();
    assert_eq!(after, starting);
}

#[test]
fn random_variant_colors_are_fixed() {
    let config = SimulationConfig {
        shape_count: 3,
        ..SimulationConfig::with_variant(Variant::Random)
    };
    let mut simulation = simulation(config, Viewport::new(64, 64), 13);
    let starting: Vec<ShapeColor> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.color())
        .collect();
    assert!(starting
        .iter()
        .all(|color| matches!(color, ShapeColor::Fixed(_))));

    for _ in 0..50 {
        simulation.update();
    }
    simulation
        .resize(Viewport::new(30, 40))
        .expect("valid viewport");

    let after: Vec<ShapeColor> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.color())
        .collect();
    assert_eq!(after, starting);
}

#[test]
fn policies_can_be_mixed_independently() {
    let config = SimulationConfig {
        motion: MotionPolicy::SignFlip,
        coloring: ColorPolicy::Cycling,
        shape_count: 1,
        ..SimulationConfig::default()
    };
    let mut simulation = simulation(config, Viewport::new(50, 50), 14);
    let magnitudes: Vec<(i32, i32)> = query::shapes(&simulation)[0]
        .velocities()
        .iter()
        .map(|velocity| (velocity.dx().abs(), velocity.dy().abs()))
        .collect();

    for _ in 0..200 {
        simulation.update();
    }

    let shape = &query::shapes(&simulation)[0];
    let after: Vec<(i32, i32)> = shape
        .velocities()
        .iter()
        .map(|velocity| (velocity.dx().abs(), velocity.dy().abs()))
        .collect();
    assert_eq!(after, magnitudes);
    assert_eq!(shape.color(), ShapeColor::Cycling { index: 200 });
}

#[test]
fn resize_collapses_every_trail_inside_new_bounds() {
    let config = SimulationConfig {
        shape_count: 3,
        point_count: 6,
        trail_length: 5,
        ..SimulationConfig::default()
    };
    let mut simulation = simulation(config, Viewport::new(800, 600), 15);
    for _ in 0..40 {
        simulation.update();
    }

    let smaller = Viewport::new(40, 30);
    simulation.resize(smaller).expect("valid viewport");

    assert_eq!(query::viewport(&simulation), smaller);
    for (index, shape) in query::shapes(&simulation).iter().enumerate() {
        let lead = shape.trail().lead();
        assert!(lead.iter().all(|point| smaller.contains(*point)));
        assert!(shape.trail().polygons().all(|polygon| polygon == lead));
        assert_eq!(
            shape.color(),
            ShapeColor::Cycling {
                index: index * (DEFAULT_PALETTE_SIZE / 3)
            }
        );
    }
}

#[test]
fn rejected_resize_leaves_state_untouched() {
    let mut simulation = simulation(SimulationConfig::default(), Viewport::new(80, 60), 16);
    for _ in 0..5 {
        simulation.update();
    }
    let before: Vec<Vec<Point>> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.trail().lead().to_vec())
        .collect();

    let error = simulation
        .resize(Viewport::new(0, 60))
        .expect_err("degenerate viewport must be rejected");

    assert_eq!(
        error,
        ConfigError::ViewportTooSmall {
            width: 0,
            height: 60
        }
    );
    assert_eq!(query::viewport(&simulation), Viewport::new(80, 60));
    let after: Vec<Vec<Point>> = query::shapes(&simulation)
        .iter()
        .map(|shape| shape.trail().lead().to_vec())
        .collect();
    assert_eq!(after, before);
}

#[test]
fn init_fails_fast_on_invalid_configuration() {
    let config = SimulationConfig {
        point_count: 1,
        ..SimulationConfig::default()
    };
    let result = Simulation::init(config, Viewport::new(10, 10), palette(), SeededRandom::new(1));
    assert!(matches!(
        result,
        Err(ConfigError::TooFewPoints { point_count: 1 })
    ));

    let result = Simulation::init(
        SimulationConfig::default(),
        Viewport::new(10, 1),
        palette(),
        SeededRandom::new(1),
    );
    assert!(matches!(result, Err(ConfigError::ViewportTooSmall { .. })));
}

#[test]
fn input_events_are_never_handled() {
    let mut simulation = simulation(SimulationConfig::default(), Viewport::new(10, 10), 17);

    assert!(!simulation.handle_input_event(&InputEvent::KeyPressed { key: Some('q') }));
    assert!(!simulation.handle_input_event(&InputEvent::PointerPressed {
        position: Point::new(1, 1)
    }));
    assert!(!simulation.handle_input_event(&InputEvent::PointerMoved {
        position: Point::new(2, 2)
    }));

    simulation.teardown();
}
