#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Mystify.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.

use anyhow::Result;
use log::info;
use macroquad::input::{
    get_char_pressed, is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode,
    MouseButton,
};
use mystify_core::{InputEvent, Point, Viewport};
use mystify_rendering::{Color, FrameInput, Presentation, RenderingBackend, Scene};
use std::time::Duration;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_width: u32,
    window_height: u32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_width: 960,
            window_height: 720,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Requests an initial window size in pixels. The window stays resizable.
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }
}

/// Counts presented frames and reports the rate once a second has elapsed.
#[derive(Debug, Default)]
struct FrameRate {
    elapsed: Duration,
    frames: u32,
}

impl FrameRate {
    fn record(&mut self, frame_time: Duration) -> Option<f32> {
        self.elapsed += frame_time;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let rate = self.frames as f32 / self.elapsed.as_secs_f32();
        *self = Self::default();
        Some(rate)
    }
}

/// Turns raw pointer samples into move/press events.
#[derive(Debug, Default)]
struct PointerTracker {
    last: Option<Point>,
}

impl PointerTracker {
    /// Appends a move event when the pointer left its previous pixel, then a
    /// press event when the primary button went down this frame.
    fn observe(&mut self, position: Point, pressed: bool, events: &mut Vec<InputEvent>) {
        if self.last.is_some_and(|last| last != position) {
            events.push(InputEvent::PointerMoved { position });
        }
        self.last = Some(position);
        if pressed {
            events.push(InputEvent::PointerPressed { position });
        }
    }
}

fn poll_events(pointer: &mut PointerTracker) -> Vec<InputEvent> {
    let mut events = Vec::new();
    while let Some(key) = get_char_pressed() {
        events.push(InputEvent::KeyPressed { key: Some(key) });
    }
    let (x, y) = mouse_position();
    pointer.observe(
        Point::new(x.round() as i32, y.round() as i32),
        is_mouse_button_pressed(MouseButton::Left),
        &mut events,
    );
    events
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_width,
            window_height,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_width).unwrap_or(i32::MAX),
            window_height: i32::try_from(window_height).unwrap_or(i32::MAX),
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut frame_rate = FrameRate::default();
            let mut pointer = PointerTracker::default();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    break;
                }

                macroquad::window::clear_background(background);

                let viewport = screen_viewport(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let input = FrameInput::new(viewport).with_events(poll_events(&mut pointer));

                update_scene(frame_dt, input, &mut scene);
                draw_scene(&scene);

                if let Some(rate) = frame_rate.record(frame_dt) {
                    if show_fps {
                        info!("{rate:.1} frames per second");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn screen_viewport(width: f32, height: f32) -> Viewport {
    Viewport::new(width.max(0.0).round() as u32, height.max(0.0).round() as u32)
}

fn draw_scene(scene: &Scene) {
    for polyline in &scene.polylines {
        let color = to_macroquad_color(polyline.color);
        for (start, end) in polyline.segments() {
            macroquad::shapes::draw_line(
                start.x,
                start.y,
                end.x,
                end.y,
                scene.stroke_thickness,
                color,
            );
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
