#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Palette provider for shape coloring.
//!
//! Cycling shapes walk a [`Palette`] one entry per tick, so palettes are built
//! to wrap seamlessly: the last entry blends back into the first. Shapes with
//! a fixed color draw it once through [`random_rgb`].

use mystify_core::{ConfigError, Palette, RandomSource, Rgb};

const MIN_ANCHORS: u32 = 2;
const MAX_ANCHORS: u32 = 5;
const MIN_SATURATION: f32 = 0.5;
const MIN_VALUE: f32 = 0.6;

/// Fully saturated hues spaced evenly around the color wheel.
pub fn bold_palette(count: usize) -> Result<Palette, ConfigError> {
    let colors = (0..count)
        .map(|index| hsv_to_rgb(360.0 * index as f32 / count as f32, 1.0, 1.0))
        .collect();
    Palette::new(colors)
}

/// Smooth gradient through a handful of random anchor colors.
///
/// Anchors are visited in order and the gradient returns to the first anchor,
/// so stepping past the final entry produces no visible jump.
pub fn smooth_palette<R>(count: usize, random: &mut R) -> Result<Palette, ConfigError>
where
    R: RandomSource + ?Sized,
{
    if count == 0 {
        return Err(ConfigError::EmptyPalette);
    }

    let anchor_count = MIN_ANCHORS + random.next_int(MAX_ANCHORS - MIN_ANCHORS + 1);
    let anchors: Vec<Hsv> = (0..anchor_count)
        .map(|_| Hsv {
            hue: random.next_int(360) as f32,
            saturation: MIN_SATURATION + unit(random) * (1.0 - MIN_SATURATION),
            value: MIN_VALUE + unit(random) * (1.0 - MIN_VALUE),
        })
        .collect();

    let segments = anchors.len();
    let colors = (0..count)
        .map(|index| {
            let position = index as f32 * segments as f32 / count as f32;
            let segment = (position as usize).min(segments - 1);
            let blend = position - segment as f32;
            let from = anchors[segment];
            let to = anchors[(segment + 1) % segments];
            from.lerp(to, blend).to_rgb()
        })
        .collect();
    Palette::new(colors)
}

/// One uniformly random opaque color.
pub fn random_rgb<R>(random: &mut R) -> Rgb
where
    R: RandomSource + ?Sized,
{
    let red = channel(random);
    let green = channel(random);
    let blue = channel(random);
    Rgb::from_rgb(red, green, blue)
}

fn channel<R>(random: &mut R) -> u8
where
    R: RandomSource + ?Sized,
{
    u8::try_from(random.next_int(256)).unwrap_or(u8::MAX)
}

fn unit<R>(random: &mut R) -> f32
where
    R: RandomSource + ?Sized,
{
    random.next_int(1_000) as f32 / 999.0
}

#[derive(Clone, Copy, Debug)]
struct Hsv {
    hue: f32,
    saturation: f32,
    value: f32,
}

impl Hsv {
    fn lerp(self, other: Self, amount: f32) -> Self {
        let mut delta = other.hue - self.hue;
        if delta > 180.0 {
            delta -= 360.0;
        } else if delta < -180.0 {
            delta += 360.0;
        }
        Self {
            hue: (self.hue + delta * amount).rem_euclid(360.0),
            saturation: self.saturation + (other.saturation - self.saturation) * amount,
            value: self.value + (other.value - self.value) * amount,
        }
    }

    fn to_rgb(self) -> Rgb {
        hsv_to_rgb(self.hue, self.saturation, self.value)
    }
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let hue = hue.rem_euclid(360.0) / 60.0;
    let chroma = value * saturation;
    let secondary = chroma * (1.0 - (hue % 2.0 - 1.0).abs());
    let (red, green, blue) = match hue as u32 {
        0 => (chroma, secondary, 0.0),
        1 => (secondary, chroma, 0.0),
        2 => (0.0, chroma, secondary),
        3 => (0.0, secondary, chroma),
        4 => (secondary, 0.0, chroma),
        _ => (chroma, 0.0, secondary),
    };
    let offset = value - chroma;
    let to_byte = |channel: f32| ((channel + offset).clamp(0.0, 1.0) * 255.0).round() as u8;
    Rgb::from_rgb(to_byte(red), to_byte(green), to_byte(blue))
}
