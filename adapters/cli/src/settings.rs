use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, warn};
use mystify_core::{SimulationConfig, Variant, MIN_POINT_COUNT, MIN_VIEWPORT_EXTENT};
use serde::Deserialize;

const DEFAULT_DELAY_MICROS: u64 = 30_000;
const DEFAULT_POLYS: u32 = 2;
const DEFAULT_POINTS: u32 = 4;
const DEFAULT_TRAILS: u32 = 5;
const DEFAULT_SPEED: u32 = 20;
const DEFAULT_THICKNESS: u32 = 1;
const DEFAULT_WIDTH: u32 = 960;
const DEFAULT_HEIGHT: u32 = 720;

/// Command-line options; every value left unset falls back to the config file
/// and then to the built-in default.
#[derive(Debug, Parser)]
#[command(name = "mystify", version, about = "Bouncing polygons leaving colored trails")]
pub(crate) struct Args {
    /// Delay hint between frames, in microseconds.
    #[arg(long, value_name = "MICROSECONDS")]
    delay: Option<u64>,
    /// Number of polygons.
    #[arg(long)]
    polys: Option<u32>,
    /// Vertices per polygon.
    #[arg(long)]
    points: Option<u32>,
    /// Trail polygons drawn behind each lead polygon.
    #[arg(long)]
    trails: Option<u32>,
    /// Maximum per-axis speed in pixels per tick.
    #[arg(long)]
    speed: Option<u32>,
    /// Stroke thickness in pixels.
    #[arg(long)]
    thickness: Option<u32>,
    /// Use evenly spaced saturated hues instead of a smooth random palette.
    #[arg(long, overrides_with = "no_bold_colors")]
    bold_colors: bool,
    /// Use a smooth random palette.
    #[arg(long, overrides_with = "bold_colors")]
    no_bold_colors: bool,
    /// Synchronise presentation with the display.
    #[arg(long, overrides_with = "no_db")]
    db: bool,
    /// Present frames as fast as possible.
    #[arg(long, overrides_with = "db")]
    no_db: bool,
    /// Motion and coloring preset.
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,
    /// Seed for the random source; drawn from the OS when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Initial window width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Initial window height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// TOML file providing defaults for the options above.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run the given number of ticks without a window and log a summary.
    #[arg(long, value_name = "TICKS")]
    headless: Option<u64>,
    /// Log the frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VariantArg {
    Classic,
    Random,
}

impl From<VariantArg> for Variant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Classic => Self::Classic,
            VariantArg::Random => Self::Random,
        }
    }
}

/// Options read from a TOML config file, keyed like the long flags.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub(crate) struct FileSettings {
    delay: Option<u64>,
    polys: Option<u32>,
    points: Option<u32>,
    trails: Option<u32>,
    speed: Option<u32>,
    thickness: Option<u32>,
    bold_colors: Option<bool>,
    db: Option<bool>,
    variant: Option<Variant>,
    seed: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
}

impl FileSettings {
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config file contents")
    }
}

/// Fully resolved and clamped options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) delay: Duration,
    pub(crate) polys: u32,
    pub(crate) points: u32,
    pub(crate) trails: u32,
    pub(crate) speed: u32,
    pub(crate) thickness: u32,
    pub(crate) bold_colors: bool,
    pub(crate) double_buffer: bool,
    pub(crate) variant: Variant,
    pub(crate) seed: Option<u64>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) headless: Option<u64>,
    pub(crate) show_fps: bool,
}

impl Settings {
    /// Reads the config file named by `args`, if any, and layers the flags over it.
    pub(crate) fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                debug!("loaded config file {}", path.display());
                FileSettings::parse(&contents)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => FileSettings::default(),
        };
        Ok(Self::resolve(args, file))
    }

    /// Merges flags over file values over defaults, then clamps.
    pub(crate) fn resolve(args: Args, file: FileSettings) -> Self {
        let delay = args.delay.or(file.delay).unwrap_or(DEFAULT_DELAY_MICROS);
        let polys = args.polys.or(file.polys).unwrap_or(DEFAULT_POLYS);
        let points = args.points.or(file.points).unwrap_or(DEFAULT_POINTS);
        let trails = args.trails.or(file.trails).unwrap_or(DEFAULT_TRAILS);
        let speed = args.speed.or(file.speed).unwrap_or(DEFAULT_SPEED);
        let thickness = args.thickness.or(file.thickness).unwrap_or(DEFAULT_THICKNESS);
        let width = args.width.or(file.width).unwrap_or(DEFAULT_WIDTH);
        let height = args.height.or(file.height).unwrap_or(DEFAULT_HEIGHT);

        Self {
            delay: Duration::from_micros(delay),
            polys: at_least("polys", polys, 1),
            points: at_least("points", points, MIN_POINT_COUNT),
            trails: at_least("trails", trails, 1),
            speed: at_least("speed", speed, 1),
            thickness: at_least("thickness", thickness, 1),
            bold_colors: flag_pair(args.bold_colors, args.no_bold_colors)
                .or(file.bold_colors)
                .unwrap_or(false),
            double_buffer: flag_pair(args.db, args.no_db).or(file.db).unwrap_or(true),
            variant: args
                .variant
                .map(Variant::from)
                .or(file.variant)
                .unwrap_or_default(),
            seed: args.seed.or(file.seed),
            width: at_least("width", width, MIN_VIEWPORT_EXTENT),
            height: at_least("height", height, MIN_VIEWPORT_EXTENT),
            headless: args.headless,
            show_fps: args.show_fps,
        }
    }

    /// Simulation parameters; the trail holds the lead plus `trails` older polygons.
    pub(crate) fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            shape_count: self.polys,
            point_count: self.points,
            trail_length: self.trails.saturating_add(1),
            max_speed: self.speed,
            delay: self.delay,
            ..SimulationConfig::with_variant(self.variant)
        }
    }
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    if on {
        Some(true)
    } else if off {
        Some(false)
    } else {
        None
    }
}

fn at_least(name: &str, value: u32, minimum: u32) -> u32 {
    if value < minimum {
        warn!("{name} {value} is below {minimum}; using {minimum}");
        minimum
    } else {
        value
    }
}
