#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Mystify adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use mystify_core::{closed_loop, InputEvent, LineRenderer, Point, Rgb, Viewport};
use std::{error::Error, fmt, time::Duration};

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

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::from_rgb_u8(rgb.red(), rgb.green(), rgb.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameInput {
    /// Drawable size in pixels at the start of the frame.
    pub viewport: Viewport,
    /// Key and pointer events observed since the previous frame, oldest first.
    pub events: Vec<InputEvent>,
}

impl FrameInput {
    /// Creates a frame input for the provided drawable size with no events.
    #[must_use]
    pub const fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            events: Vec::new(),
        }
    }

    /// Attaches the events observed during the frame.
    #[must_use]
    pub fn with_events(mut self, events: Vec<InputEvent>) -> Self {
        self.events = events;
        self
    }
}

/// Closed polyline stroked in a single color.
///
/// `points` already repeats the first vertex at the end, so backends draw one
/// segment per consecutive pair without wrapping around themselves.
#[derive(Clone, Debug, PartialEq)]
pub struct PolylinePresentation {
    /// Vertices in pixel space, closing vertex included.
    pub points: Vec<Vec2>,
    /// Stroke color.
    pub color: Color,
}

impl PolylinePresentation {
    /// Builds a closed polyline from integer vertices.
    #[must_use]
    pub fn closed(points: &[Point], color: Color) -> Self {
        Self {
            points: closed_loop(points).map(to_vec2).collect(),
            color,
        }
    }

    /// Consecutive vertex pairs forming the stroked segments.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.points.windows(2).map(|pair| (pair[0], pair[1]))
    }
}

fn to_vec2(point: Point) -> Vec2 {
    Vec2::new(point.x() as f32, point.y() as f32)
}

/// Frame content handed to backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Polylines in draw order.
    pub polylines: Vec<PolylinePresentation>,
    /// Stroke width in pixels.
    pub stroke_thickness: f32,
    /// Drawable size the polylines were computed for.
    pub viewport: Viewport,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new(viewport: Viewport, stroke_thickness: f32) -> Result<Self, RenderingError> {
        if !(stroke_thickness > 0.0) {
            return Err(RenderingError::InvalidStrokeThickness { stroke_thickness });
        }

        Ok(Self {
            polylines: Vec::new(),
            stroke_thickness,
            viewport,
        })
    }

    /// Drops every polyline while keeping the allocation.
    pub fn clear(&mut self) {
        self.polylines.clear();
    }

    /// Returns a [`LineRenderer`] that appends into this scene.
    pub fn recorder(&mut self) -> SceneRecorder<'_> {
        SceneRecorder { scene: self }
    }
}

/// Line surface recording every stroke into a [`Scene`].
#[derive(Debug)]
pub struct SceneRecorder<'scene> {
    scene: &'scene mut Scene,
}

impl LineRenderer for SceneRecorder<'_> {
    fn draw_closed_polyline(&mut self, color: Rgb, points: &[Point]) {
        self.scene
            .polylines
            .push(PolylinePresentation::closed(points, Color::from(color)));
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

/// Rendering backend capable of presenting Mystify scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta, the
    /// drawable size and the input events of the frame, and may rebuild the
    /// scene before it is drawn. A scene left untouched is drawn again
    /// unchanged.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Strokes must have a positive width to be visible.
    InvalidStrokeThickness {
        /// Provided thickness that failed validation.
        stroke_thickness: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStrokeThickness { stroke_thickness } => {
                write!(
                    f,
                    "stroke thickness must be positive (received {stroke_thickness})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_from_rgb_scales_channels() {
        let color = Color::from(Rgb::from_rgb(255, 0, 51));

        assert_eq!(color, Color::new(1.0, 0.0, 0.2, 1.0));
    }

    #[test]
    fn frame_input_carries_events_in_order() {
        let events = vec![
            InputEvent::KeyPressed { key: Some('x') },
            InputEvent::PointerPressed {
                position: Point::new(3, 4),
            },
        ];
        let input = FrameInput::new(Viewport::new(8, 8)).with_events(events.clone());

        assert_eq!(input.events, events);
        assert!(FrameInput::new(Viewport::new(8, 8)).events.is_empty());
    }

    #[test]
    fn closed_polyline_repeats_first_vertex() {
        let polyline = PolylinePresentation::closed(
            &[Point::new(0, 0), Point::new(4, 0), Point::new(4, 3)],
            Color::from_rgb_u8(0, 0, 0),
        );

        assert_eq!(
            polyline.points,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(4.0, 0.0),
                Vec2::new(4.0, 3.0),
                Vec2::new(0.0, 0.0),
            ]
        );
        assert_eq!(polyline.segments().count(), 3);
        assert_eq!(
            polyline.segments().last(),
            Some((Vec2::new(4.0, 3.0), Vec2::new(0.0, 0.0)))
        );
    }

    #[test]
    fn scene_rejects_non_positive_thickness_without_panicking() {
        let error = Scene::new(Viewport::new(10, 10), 0.0)
            .expect_err("zero thickness must be rejected");

        assert!(matches!(
            error,
            RenderingError::InvalidStrokeThickness { .. }
        ));
        assert!(Scene::new(Viewport::new(10, 10), f32::NAN).is_err());
    }

    #[test]
    fn recorder_appends_in_draw_order() {
        let mut scene = Scene::new(Viewport::new(20, 20), 1.0).expect("valid scene");
        {
            let mut recorder = scene.recorder();
            recorder.draw_closed_polyline(
                Rgb::from_rgb(255, 0, 0),
                &[Point::new(1, 1), Point::new(2, 2)],
            );
            recorder.draw_closed_polyline(
                Rgb::from_rgb(0, 255, 0),
                &[Point::new(3, 3), Point::new(4, 4)],
            );
        }

        assert_eq!(scene.polylines.len(), 2);
        assert_eq!(scene.polylines[0].color, Color::from_rgb_u8(255, 0, 0));
        assert_eq!(scene.polylines[1].points.len(), 3);

        scene.clear();
        assert!(scene.polylines.is_empty());
    }
}
