// ============================================================================
// CRATE CONFIGURATION & IMPORTS
// ============================================================================

pub mod angle;
pub mod animation;
pub mod config;
pub mod entries;
pub mod error;
pub mod target;
pub mod wheel;

pub use animation::{ease_out_cubic, lerp, Animator, SpinObserver};
pub use config::{
    Color, FontConfig, GeometryConfig, Palette, SpinConfig, WindowConfig, DEFAULT_ENTRIES,
};
pub use error::{Result, WheelError};
pub use target::{resolve_target, MissingForced, SpinPlan, Target};
pub use wheel::{SpinOutcome, Wheel};

// External crate imports
use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::{point, Font, PositionedGlyph, Scale};

// Standard library imports
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

// Window management imports
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use angle::{index_at_screen_angle, wedge_angle, wedge_center};

// ============================================================================
// PUBLIC API - MAIN INTERFACE
// ============================================================================

/// Command enum for driving the wheel from another thread
#[derive(Debug, Clone, PartialEq)]
pub enum WheelCommand {
    Spin,
    SpinForced(String),
    SetEntries(Vec<String>),
    AddEntry(String),
    Shuffle,
    Sort,
    SetForced(Option<String>),
    ClearEntries,
    ClearResults,
}

impl std::str::FromStr for WheelCommand {
    type Err = String;

    /// Parses one line of the stdin command protocol, e.g. `spin CS` or `add SKULL`.
    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let command = match (word.to_lowercase().as_str(), rest) {
            ("spin", "") => WheelCommand::Spin,
            ("spin", label) => WheelCommand::SpinForced(label.to_string()),
            ("add", label) if !label.is_empty() => WheelCommand::AddEntry(label.to_string()),
            ("entries", list) => WheelCommand::SetEntries(
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            ("shuffle", "") => WheelCommand::Shuffle,
            ("sort", "") => WheelCommand::Sort,
            ("forced", label) if !label.is_empty() => {
                WheelCommand::SetForced(Some(label.to_string()))
            }
            ("unforced", "") => WheelCommand::SetForced(None),
            ("clear", "") => WheelCommand::ClearEntries,
            ("clear-results", "") => WheelCommand::ClearResults,
            _ => return Err(format!("unrecognised command: {line}")),
        };
        Ok(command)
    }
}

/// Windowed wheel - the primary public interface
#[derive(Debug, Clone)]
pub struct SpinWheel {
    config: WheelConfig,
    state: SpinWheelState,
}

#[derive(Debug, Clone, Builder)]
pub struct WheelConfig {
    #[builder(default = "Wheel".to_string())]
    pub title: String,
    #[builder(default = DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect())]
    pub entries: Vec<String>,
    pub forced: Option<String>,
    #[builder(default)]
    pub missing_forced: MissingForced,
    pub seed: Option<u64>,

    #[builder(default)]
    pub spin: SpinConfig,
    #[builder(default)]
    pub palette: Palette,
    #[builder(default)]
    pub window: WindowConfig,
    #[builder(default)]
    pub font: FontConfig,
    #[builder(default)]
    pub geometry: GeometryConfig,

    // Feedback
    #[builder(default = true)]
    pub tick_feedback: bool,
    #[builder(default = 90)]
    pub flash_ms: u64,
    #[builder(default = 12)]
    pub max_results: usize,
}

#[derive(Debug, Clone)]
struct SpinWheelState {
    entries: Vec<String>,
    forced: Option<String>,
}

impl SpinWheel {
    pub fn new(config: WheelConfig) -> Self {
        let state = SpinWheelState {
            entries: config.entries.clone(),
            forced: config.forced.clone(),
        };

        Self { config, state }
    }

    pub fn entries(&self) -> &[String] {
        &self.state.entries
    }

    pub fn set_entries(&mut self, entries: Vec<String>) {
        self.state.entries = entries;
    }

    pub fn set_entries_from_text(&mut self, text: &str) {
        self.state.entries = entries::parse_entries(text);
    }

    pub fn add_entry(&mut self, entry: impl Into<String>) {
        self.state.entries.push(entry.into());
    }

    pub fn set_forced(&mut self, forced: Option<String>) {
        self.state.forced = forced;
    }

    pub fn show(&mut self) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.run_window(None)
    }

    pub fn show_with_commands(
        &mut self,
        receiver: Receiver<WheelCommand>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        self.run_window(Some(receiver))
    }

    fn run_window(
        &self,
        receiver: Option<Receiver<WheelCommand>>,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let font = load_font(&self.config.font)?;
        if font.is_none() {
            tracing::warn!("no usable font found, labels will not be drawn");
        }

        let event_loop = EventLoop::new()?;
        let window = WindowBuilder::new()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(
                self.config.window.width as f64,
                self.config.window.height as f64,
            ))
            .with_resizable(true)
            .build(&event_loop)?;

        let window = std::sync::Arc::new(window);

        let mut app_state = AppState::new(&self.config, &self.state);

        let window_clone = window.clone();
        let size = window.inner_size();
        let mut fb_width = size.width as usize;
        let mut fb_height = size.height as usize;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels = Pixels::new(size.width, size.height, surface_texture)?;

        let target_fps = self.config.window.max_framerate.max(1.0);
        let frame_duration = Duration::from_secs_f64(1.0 / target_fps);
        let mut last_frame = Instant::now();

        tracing::info!(
            entries = app_state.wheel.segment_count(),
            "wheel window open"
        );

        event_loop.run(move |event, window_target| {
            window_target.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        fb_width = new_size.width as usize;
                        fb_height = new_size.height as usize;
                        let _ = pixels.resize_buffer(new_size.width, new_size.height);
                        let _ = pixels.resize_surface(new_size.width, new_size.height);
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                repeat: false,
                                ..
                            },
                        ..
                    } => {
                        if let Some(command) = command_for_key(&logical_key) {
                            app_state.apply_command(command, Instant::now());
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        app_state.cursor = Some((position.x, position.y));
                    }
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        let layout = WheelLayout::new(fb_width, fb_height, &self.config.geometry);
                        if let Some((x, y)) = app_state.cursor {
                            if layout.contains(x, y) {
                                app_state.apply_command(WheelCommand::Spin, Instant::now());
                            }
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        if let Some(ref receiver) = receiver {
                            app_state.update_with_commands(receiver, now);
                        } else {
                            app_state.update(now);
                        }

                        let frame = pixels.frame_mut();
                        let mut canvas = Canvas::new(frame, fb_width, fb_height);
                        render_wheel(&mut canvas, &app_state, &self.config, font.as_ref(), now);
                        let _ = pixels.render();
                    }
                    _ => {}
                },
                Event::AboutToWait => {
                    if last_frame.elapsed() >= frame_duration {
                        window_clone.request_redraw();
                        last_frame = Instant::now();
                    }
                }
                _ => {}
            }
        })?;

        Ok(())
    }
}

/// Keyboard shortcuts: Space/Enter spin, S shuffle, O sort, C clear results,
/// F drop the forced entry.
pub fn command_for_key(key: &Key) -> Option<WheelCommand> {
    match key {
        Key::Named(NamedKey::Space) | Key::Named(NamedKey::Enter) => Some(WheelCommand::Spin),
        Key::Character(c) => match c.to_lowercase().as_str() {
            "s" => Some(WheelCommand::Shuffle),
            "o" => Some(WheelCommand::Sort),
            "c" => Some(WheelCommand::ClearResults),
            "f" => Some(WheelCommand::SetForced(None)),
            _ => None,
        },
        _ => None,
    }
}

/// Load the configured font, or the first readable system candidate.
///
/// An explicit path that cannot be used is an error; missing candidates are not.
pub fn load_font(config: &FontConfig) -> Result<Option<Font<'static>>> {
    if let Some(path) = &config.path {
        let data = std::fs::read(path)
            .map_err(|e| WheelError::Font(format!("{}: {e}", path.display())))?;
        return Font::try_from_vec(data)
            .map(Some)
            .ok_or_else(|| WheelError::Font(format!("{}: not a font", path.display())));
    }

    for candidate in &config.candidates {
        if let Ok(data) = std::fs::read(candidate) {
            if let Some(font) = Font::try_from_vec(data) {
                tracing::debug!("using font {}", candidate.display());
                return Ok(Some(font));
            }
        }
    }
    Ok(None)
}

// ============================================================================
// INTERNAL IMPLEMENTATION
// ============================================================================

struct AppState {
    wheel: Wheel,
    forced: Option<String>,
    results: Vec<String>,
    max_results: usize,
    tick_feedback: bool,
    flash: Duration,
    flash_until: Option<Instant>,
    cursor: Option<(f64, f64)>,
}

/// Turns animator callbacks into frame-local feedback.
struct FrameFeedback<'a> {
    enabled: bool,
    now: Instant,
    flash: Duration,
    flash_until: &'a mut Option<Instant>,
}

impl SpinObserver for FrameFeedback<'_> {
    fn on_segment_crossed(&mut self, index: usize) {
        tracing::trace!(index, "tick");
        if self.enabled {
            *self.flash_until = Some(self.now + self.flash);
        }
    }
}

impl AppState {
    fn new(config: &WheelConfig, state: &SpinWheelState) -> Self {
        let entries = state.entries.clone();
        let wheel = match config.seed {
            Some(seed) => Wheel::seeded(entries, seed),
            None => Wheel::new(entries),
        }
        .with_spin_config(config.spin.clone())
        .with_missing_forced(config.missing_forced);

        Self {
            wheel,
            forced: state.forced.clone(),
            results: Vec::new(),
            max_results: config.max_results,
            tick_feedback: config.tick_feedback,
            flash: Duration::from_millis(config.flash_ms),
            flash_until: None,
            cursor: None,
        }
    }

    fn request_spin(&mut self, forced: Option<&str>, now: Instant) {
        if self.wheel.labels().is_empty() {
            tracing::warn!("no entries to spin");
            return;
        }
        let forced = forced.or(self.forced.as_deref());
        match self.wheel.spin(forced, now) {
            Ok(plan) => tracing::debug!(?plan, "spin planned"),
            Err(WheelError::AlreadySpinning) => tracing::debug!("spin ignored, wheel is turning"),
            Err(e) => tracing::warn!("spin refused: {e}"),
        }
    }

    fn apply_command(&mut self, command: WheelCommand, now: Instant) {
        let result = match command {
            WheelCommand::Spin => {
                self.request_spin(None, now);
                Ok(())
            }
            WheelCommand::SpinForced(label) => {
                self.request_spin(Some(&label), now);
                Ok(())
            }
            WheelCommand::SetEntries(entries) => self.wheel.set_labels(entries),
            WheelCommand::AddEntry(entry) => self.wheel.push_label(entry),
            WheelCommand::Shuffle => self.wheel.shuffle(),
            WheelCommand::Sort => self.wheel.sort(),
            WheelCommand::ClearEntries => self.wheel.set_labels(Vec::new()),
            WheelCommand::SetForced(forced) => {
                self.forced = forced.filter(|f| !f.trim().is_empty());
                Ok(())
            }
            WheelCommand::ClearResults => {
                self.results.clear();
                Ok(())
            }
        };
        if let Err(e) = result {
            tracing::debug!("command ignored: {e}");
        }
    }

    fn update(&mut self, now: Instant) {
        let mut feedback = FrameFeedback {
            enabled: self.tick_feedback,
            now,
            flash: self.flash,
            flash_until: &mut self.flash_until,
        };
        if let Some(outcome) = self.wheel.advance(now, &mut feedback) {
            self.results.insert(0, outcome.label);
            self.results.truncate(self.max_results);
        }
    }

    fn update_with_commands(&mut self, receiver: &Receiver<WheelCommand>, now: Instant) {
        while let Ok(command) = receiver.try_recv() {
            self.apply_command(command, now);
        }

        self.update(now);
    }

    fn is_flashing(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }
}

// ============================================================================
// RETAINED MODE ABSTRACTIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
enum Anchor {
    Center,
    Left,
}

#[derive(Clone, Debug)]
enum DrawCommand {
    Clear((u8, u8, u8)),
    Disc {
        cx: i32,
        cy: i32,
        radius: i32,
        color: (u8, u8, u8),
    },
    Wedges {
        cx: i32,
        cy: i32,
        radius: i32,
        rotation: f64,
        colors: Vec<(u8, u8, u8)>,
    },
    Spoke {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: (u8, u8, u8),
    },
    RadialText {
        cx: i32,
        cy: i32,
        angle: f64,
        start_radius: f64,
        text: String,
        font_size: f32,
        color: (u8, u8, u8),
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: (u8, u8, u8),
        anchor: Anchor,
    },
    Pointer {
        tip_x: f64,
        tip_y: f64,
        length: f64,
        half_width: f64,
        color: (u8, u8, u8),
    },
}

struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn render(&self, canvas: &mut Canvas, font: Option<&Font<'static>>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => {
                    canvas.clear(*color);
                }
                DrawCommand::Disc {
                    cx,
                    cy,
                    radius,
                    color,
                } => {
                    draw_disc(canvas, *cx, *cy, *radius, *color);
                }
                DrawCommand::Wedges {
                    cx,
                    cy,
                    radius,
                    rotation,
                    colors,
                } => {
                    fill_wedges(canvas, *cx, *cy, *radius, *rotation, colors);
                }
                DrawCommand::Spoke {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    color,
                } => {
                    draw_spoke(canvas, (*x0, *y0), (*x1, *y1), *thickness, *color);
                }
                DrawCommand::RadialText {
                    cx,
                    cy,
                    angle,
                    start_radius,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        draw_radial_text(
                            canvas,
                            *cx as f64,
                            *cy as f64,
                            *angle,
                            *start_radius,
                            text,
                            font,
                            Scale::uniform(*font_size),
                            *color,
                        );
                    }
                }
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                    anchor,
                } => {
                    if let Some(font) = font {
                        let scale = Scale::uniform(*font_size);
                        let x = match anchor {
                            Anchor::Center => *x,
                            Anchor::Left => *x + calculate_text_width(text, font, scale) / 2,
                        };
                        draw_text(canvas, x, *y, text, font, scale, *color);
                    }
                }
                DrawCommand::Pointer {
                    tip_x,
                    tip_y,
                    length,
                    half_width,
                    color,
                } => {
                    fill_triangle(
                        canvas,
                        [
                            (*tip_x, *tip_y),
                            (tip_x + length, tip_y - half_width),
                            (tip_x + length, tip_y + half_width),
                        ],
                        *color,
                    );
                }
            }
        }
    }
}

// ============================================================================
// CORE DATA TYPES
// ============================================================================

struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn clear(&mut self, color: (u8, u8, u8)) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.0, color.1, color.2, 0xff]);
        }
    }
}

/// Where the wheel sits inside the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WheelLayout {
    cx: i32,
    cy: i32,
    r: i32,
}

impl WheelLayout {
    fn new(width: usize, height: usize, geometry: &GeometryConfig) -> Self {
        let cx = width as i32 / 2;
        let cy = height as i32 / 2;
        let r = ((width.min(height) as i32) / 2 - geometry.rim_padding).max(1);
        Self { cx, cy, r }
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.cx as f64;
        let dy = y - self.cy as f64;
        (dx * dx + dy * dy).sqrt() <= self.r as f64
    }
}

// ============================================================================
// RENDERING AND DRAWING FUNCTIONS
// ============================================================================

fn render_wheel(
    canvas: &mut Canvas,
    state: &AppState,
    config: &WheelConfig,
    font: Option<&Font<'static>>,
    now: Instant,
) {
    let mut scene = Scene::new();
    let palette = &config.palette;
    let geometry = &config.geometry;
    scene.add_command(DrawCommand::Clear(palette.background.as_tuple()));

    let layout = WheelLayout::new(canvas.width, canvas.height, geometry);
    let labels = entries::display_labels(state.wheel.labels());
    let segment_count = labels.len();
    let rotation = state.wheel.rotation();
    let theta = wedge_angle(segment_count);

    // Outer ring
    scene.add_command(DrawCommand::Disc {
        cx: layout.cx,
        cy: layout.cy,
        radius: layout.r + geometry.ring_width,
        color: palette.ring.as_tuple(),
    });

    scene.add_command(DrawCommand::Wedges {
        cx: layout.cx,
        cy: layout.cy,
        radius: layout.r,
        rotation,
        colors: (0..segment_count)
            .map(|i| palette.wedge(i).as_tuple())
            .collect(),
    });

    // Dividers between wedges
    if segment_count > 1 {
        for i in 0..segment_count {
            let angle = i as f64 * theta + rotation;
            scene.add_command(DrawCommand::Spoke {
                x0: layout.cx,
                y0: layout.cy,
                x1: (layout.cx as f64 + angle.cos() * layout.r as f64).round() as i32,
                y1: (layout.cy as f64 + angle.sin() * layout.r as f64).round() as i32,
                thickness: geometry.divider_thickness,
                color: palette.ring.as_tuple(),
            });
        }
    }

    // Labels
    if let Some(font) = font {
        for (i, label) in labels.iter().enumerate() {
            let font_size = label_font_size(font, label, theta, layout.r as f64, config);
            scene.add_command(DrawCommand::RadialText {
                cx: layout.cx,
                cy: layout.cy,
                angle: wedge_center(i, segment_count) + rotation,
                start_radius: geometry.label_inset,
                text: label.clone(),
                font_size,
                color: palette.label(i).as_tuple(),
            });
        }
    }

    // Hub
    scene.add_command(DrawCommand::Disc {
        cx: layout.cx,
        cy: layout.cy,
        radius: geometry.hub_radius,
        color: palette.hub.as_tuple(),
    });
    scene.add_command(DrawCommand::Disc {
        cx: layout.cx,
        cy: layout.cy,
        radius: geometry.hub_inner_radius,
        color: palette.hub_inner.as_tuple(),
    });

    // Pointer
    let pointer_color = if state.is_flashing(now) {
        palette.pointer_flash
    } else {
        palette.pointer
    };
    scene.add_command(DrawCommand::Pointer {
        tip_x: (layout.cx + layout.r - 6) as f64,
        tip_y: layout.cy as f64,
        length: geometry.pointer_length,
        half_width: geometry.pointer_half_width,
        color: pointer_color.as_tuple(),
    });

    add_overlay(&mut scene, state, config, canvas.width, canvas.height);

    scene.render(canvas, font);
}

/// Entry count, result list and the idle hint.
fn add_overlay(
    scene: &mut Scene,
    state: &AppState,
    config: &WheelConfig,
    width: usize,
    height: usize,
) {
    let size = config.font.overlay_size;
    let line = (size * 1.3) as i32;
    let margin = 12;
    let color = config.palette.dark_text.as_tuple();

    scene.add_command(DrawCommand::Text {
        x: margin,
        y: height as i32 - margin - line / 2,
        text: format!("{} entries", state.wheel.segment_count()),
        font_size: size,
        color,
        anchor: Anchor::Left,
    });

    if state.results.is_empty() && !state.wheel.is_spinning() {
        scene.add_command(DrawCommand::Text {
            x: width as i32 / 2,
            y: height as i32 - margin - line / 2,
            text: "Space or click to spin".to_string(),
            font_size: size,
            color,
            anchor: Anchor::Center,
        });
        return;
    }

    for (row, result) in state.results.iter().take(state.max_results).enumerate() {
        scene.add_command(DrawCommand::Text {
            x: margin,
            y: margin + line / 2 + row as i32 * line,
            text: result.clone(),
            font_size: size,
            color,
            anchor: Anchor::Left,
        });
    }
}

/// Wedge-proportional size, shrunk until the label fits between hub and rim.
fn label_font_size(font: &Font, text: &str, theta: f64, radius: f64, config: &WheelConfig) -> f32 {
    let min_size = config.font.label_min_size;
    let max_size = config.font.label_max_size.max(min_size);
    let mut size = ((theta * radius * 0.35) as f32).min(max_size).max(min_size);
    let max_width = (radius * config.geometry.label_span - config.geometry.label_inset) as i32;
    while size > min_size && calculate_text_width(text, font, Scale::uniform(size)) > max_width {
        size -= 1.0;
    }
    size
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Pixel extent of laid-out glyphs as `(min_x, min_y, max_x, max_y)`.
fn glyph_bounds(glyphs: &[PositionedGlyph]) -> Option<(i32, i32, i32, i32)> {
    glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| (bb.min.x, bb.min.y, bb.max.x, bb.max.y))
        .reduce(|a, b| (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3)))
}

fn calculate_text_width(text: &str, font: &Font, scale: Scale) -> i32 {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    glyph_bounds(&glyphs).map_or(0, |(min_x, _, max_x, _)| max_x - min_x)
}

/// Coverage of a pixel at `dist` from the centre of a disc of `radius`.
fn disc_coverage(dist: f64, radius: f64) -> f64 {
    (1.0 - (dist - radius).max(0.0)).max(0.0)
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

impl Canvas<'_> {
    /// Alpha-blend `color` over the pixel at `(x, y)`; off-canvas writes are dropped.
    fn blend(&mut self, x: i32, y: i32, color: (u8, u8, u8), alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 4;
        let Some(pixel) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        let a = alpha.clamp(0.0, 1.0);
        let mix = |src: u8, dst: u8| (src as f32 * a + dst as f32 * (1.0 - a)).round() as u8;
        pixel[0] = mix(color.0, pixel[0]);
        pixel[1] = mix(color.1, pixel[1]);
        pixel[2] = mix(color.2, pixel[2]);
        pixel[3] = 0xff;
    }

    /// Bilinear split of one sub-pixel sample over the four nearest pixels.
    fn blend_subpixel(&mut self, x: f64, y: f64, color: (u8, u8, u8), alpha: f32) {
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i32, y0 as i32);
        for (px, py, weight) in [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ] {
            let a = alpha * weight as f32;
            if a > 0.001 {
                self.blend(px, py, color, a);
            }
        }
    }

    /// Visible pixel rows and columns of a square around `(cx, cy)`.
    fn clip_square(
        &self,
        cx: i32,
        cy: i32,
        half: i32,
    ) -> (std::ops::RangeInclusive<i32>, std::ops::RangeInclusive<i32>) {
        let xs = (cx - half).max(0)..=(cx + half).min(self.width as i32 - 1);
        let ys = (cy - half).max(0)..=(cy + half).min(self.height as i32 - 1);
        (xs, ys)
    }
}

/// Wedge divider from `from` to `to`, antialiased by distance to the segment.
fn draw_spoke(
    canvas: &mut Canvas,
    from: (i32, i32),
    to: (i32, i32),
    thickness: f32,
    color: (u8, u8, u8),
) {
    let pad = thickness.ceil() as i32 + 1;
    let xs = (from.0.min(to.0) - pad).max(0)..=(from.0.max(to.0) + pad).min(canvas.width as i32 - 1);
    let ys = (from.1.min(to.1) - pad).max(0)..=(from.1.max(to.1) + pad).min(canvas.height as i32 - 1);
    let (dx, dy) = ((to.0 - from.0) as f32, (to.1 - from.1) as f32);
    let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);
    for y in ys {
        for x in xs.clone() {
            let (px, py) = ((x - from.0) as f32, (y - from.1) as f32);
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let dist = (px - t * dx).hypot(py - t * dy);
            let coverage = (1.0 - (dist - thickness / 2.0)).clamp(0.0, 1.0);
            if coverage > 0.01 {
                canvas.blend(x, y, color, coverage);
            }
        }
    }
}

/// Solid disc with an antialiased rim.
fn draw_disc(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: (u8, u8, u8)) {
    let (xs, ys) = canvas.clip_square(cx, cy, radius + 1);
    for y in ys {
        for x in xs.clone() {
            let dist = ((x - cx) as f64).hypot((y - cy) as f64);
            let coverage = disc_coverage(dist, radius as f64);
            if coverage > 0.0 {
                canvas.blend(x, y, color, coverage as f32);
            }
        }
    }
}

/// Fill a disc whose pixels take the color of the wedge drawn beneath them.
fn fill_wedges(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    radius: i32,
    rotation: f64,
    colors: &[(u8, u8, u8)],
) {
    if colors.is_empty() {
        return;
    }
    let (xs, ys) = canvas.clip_square(cx, cy, radius + 1);
    for y in ys {
        for x in xs.clone() {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            let coverage = disc_coverage(dx.hypot(dy), radius as f64);
            if coverage <= 0.0 {
                continue;
            }
            let index = index_at_screen_angle(dy.atan2(dx), rotation, colors.len());
            canvas.blend(x, y, colors[index], coverage as f32);
        }
    }
}

/// Filled triangle with a one-pixel coverage ramp along its edges.
fn fill_triangle(canvas: &mut Canvas, vertices: [(f64, f64); 3], color: (u8, u8, u8)) {
    let min_x = vertices.iter().map(|v| v.0).fold(f64::MAX, f64::min).floor() as i32 - 1;
    let max_x = vertices.iter().map(|v| v.0).fold(f64::MIN, f64::max).ceil() as i32 + 1;
    let min_y = vertices.iter().map(|v| v.1).fold(f64::MAX, f64::min).floor() as i32 - 1;
    let max_y = vertices.iter().map(|v| v.1).fold(f64::MIN, f64::max).ceil() as i32 + 1;

    let [a, b, c] = vertices;
    let area = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
    if area.abs() < f64::EPSILON {
        return;
    }
    let orientation = area.signum();

    // Signed distance to an edge, positive inside.
    let edge = |p: (f64, f64), q: (f64, f64), x: f64, y: f64| {
        let len = (q.0 - p.0).hypot(q.1 - p.1);
        orientation * ((q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)) / len
    };

    for y in min_y.max(0)..=max_y.min(canvas.height as i32 - 1) {
        for x in min_x.max(0)..=max_x.min(canvas.width as i32 - 1) {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            let inside = edge(a, b, px, py)
                .min(edge(b, c, px, py))
                .min(edge(c, a, px, py));
            let coverage = (inside + 0.5).clamp(0.0, 1.0);
            if coverage > 0.01 {
                canvas.blend(x, y, color, coverage as f32);
            }
        }
    }
}

/// Horizontal text whose ink box is centred on `(x, y)`.
fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let Some((min_x, min_y, max_x, max_y)) = glyph_bounds(&glyphs) else {
        return;
    };
    let origin_x = x - (max_x - min_x) / 2 - min_x;
    let origin_y = y - (max_y - min_y) / 2 - min_y;
    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                canvas.blend(
                    origin_x + bb.min.x + gx as i32,
                    origin_y + bb.min.y + gy as i32,
                    color,
                    v,
                );
            });
        }
    }
}

/// Text running outward from the centre along `angle`, starting at `start_radius`.
fn draw_radial_text(
    canvas: &mut Canvas,
    cx: f64,
    cy: f64,
    angle: f64,
    start_radius: f64,
    text: &str,
    font: &Font,
    scale: Scale,
    color: (u8, u8, u8),
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let half_height = (v_metrics.ascent - v_metrics.descent) as f64 / 2.0;
    let (sin_a, cos_a) = angle.sin_cos();

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                if v > 0.001 {
                    let local_x = start_radius + (bb.min.x + gx as i32) as f64;
                    let local_y = (bb.min.y + gy as i32) as f64 - half_height;
                    let x = cx + local_x * cos_a - local_y * sin_a;
                    let y = cy + local_x * sin_a + local_y * cos_a;
                    canvas.blend_subpixel(x, y, color, v);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn pixel(frame: &[u8], width: usize, x: usize, y: usize) -> (u8, u8, u8) {
        let idx = (y * width + x) * 4;
        (frame[idx], frame[idx + 1], frame[idx + 2])
    }

    fn test_config(entries: &[&str]) -> WheelConfig {
        WheelConfig::builder()
            .entries(entries.iter().map(|s| s.to_string()).collect())
            .seed(7)
            .spin(SpinConfig::fixed(1000.0, 4))
            .build()
    }

    fn app(config: &WheelConfig) -> AppState {
        let wheel = SpinWheel::new(config.clone());
        AppState::new(config, &wheel.state)
    }

    #[test]
    fn parses_stdin_commands() {
        assert_eq!("spin".parse::<WheelCommand>(), Ok(WheelCommand::Spin));
        assert_eq!(
            "spin  Rakashu ".parse::<WheelCommand>(),
            Ok(WheelCommand::SpinForced("Rakashu".into()))
        );
        assert_eq!(
            "add NEPORAZITELNY".parse::<WheelCommand>(),
            Ok(WheelCommand::AddEntry("NEPORAZITELNY".into()))
        );
        assert_eq!(
            "entries a, b ,,c".parse::<WheelCommand>(),
            Ok(WheelCommand::SetEntries(vec!["a".into(), "b".into(), "c".into()]))
        );
        assert_eq!(
            "forced CS".parse::<WheelCommand>(),
            Ok(WheelCommand::SetForced(Some("CS".into())))
        );
        assert_eq!("unforced".parse::<WheelCommand>(), Ok(WheelCommand::SetForced(None)));
        assert_eq!("clear-results".parse::<WheelCommand>(), Ok(WheelCommand::ClearResults));
        assert!("add".parse::<WheelCommand>().is_err());
        assert!("dance".parse::<WheelCommand>().is_err());
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(command_for_key(&Key::Named(NamedKey::Space)), Some(WheelCommand::Spin));
        assert_eq!(command_for_key(&Key::Named(NamedKey::Enter)), Some(WheelCommand::Spin));
        assert_eq!(command_for_key(&Key::Character("S".into())), Some(WheelCommand::Shuffle));
        assert_eq!(command_for_key(&Key::Character("o".into())), Some(WheelCommand::Sort));
        assert_eq!(command_for_key(&Key::Character("x".into())), None);
    }

    #[test]
    fn builder_defaults_follow_the_source_widget() {
        let config = WheelConfig::builder().build();
        assert_eq!(config.entries.len(), DEFAULT_ENTRIES.len());
        assert_eq!(config.missing_forced, MissingForced::Reject);
        assert!(config.tick_feedback);
        assert!(config.forced.is_none());

        let unset = WheelConfig::builder().maybe_entries(None).build();
        assert_eq!(unset.entries, config.entries);
        let set = WheelConfig::builder()
            .maybe_entries(Some(vec!["solo".to_string()]))
            .build();
        assert_eq!(set.entries, vec!["solo".to_string()]);
    }

    #[test]
    fn spin_result_is_prepended_to_results() {
        let config = test_config(&["A", "B", "C", "D"]);
        let mut state = app(&config);
        let t0 = Instant::now();

        state.apply_command(WheelCommand::SpinForced("b".into()), t0);
        state.update(t0 + Duration::from_secs(2));
        state.apply_command(WheelCommand::SpinForced("D".into()), t0);
        state.update(t0 + Duration::from_secs(4));

        assert_eq!(state.results, vec!["D".to_string(), "B".to_string()]);
        state.apply_command(WheelCommand::ClearResults, t0);
        assert!(state.results.is_empty());
    }

    #[test]
    fn configured_forced_entry_applies_to_plain_spins() {
        let config = WheelConfig::builder()
            .entries(vec!["A".into(), "B".into(), "C".into()])
            .forced("c".to_string())
            .seed(3)
            .build();
        let mut state = app(&config);
        let t0 = Instant::now();
        state.apply_command(WheelCommand::Spin, t0);
        state.update(t0 + Duration::from_secs(30));
        assert_eq!(state.results, vec!["C".to_string()]);

        state.apply_command(WheelCommand::SetForced(None), t0);
        assert!(state.forced.is_none());
    }

    #[test]
    fn commands_while_spinning_do_not_disturb_the_spin() {
        let config = test_config(&["A", "B", "C"]);
        let mut state = app(&config);
        let t0 = Instant::now();
        state.apply_command(WheelCommand::SpinForced("a".into()), t0);
        let start = state.wheel.rotation();

        let (sender, receiver) = mpsc::channel();
        sender.send(WheelCommand::SpinForced("C".into())).unwrap();
        sender.send(WheelCommand::ClearEntries).unwrap();
        sender.send(WheelCommand::Shuffle).unwrap();
        state.update_with_commands(&receiver, t0 + Duration::from_millis(500));
        assert!(state.wheel.is_spinning());
        assert_eq!(state.wheel.segment_count(), 3);
        assert!(state.wheel.rotation() > start);

        state.update(t0 + Duration::from_millis(1000));
        assert_eq!(state.results, vec!["A".to_string()]);
    }

    #[test]
    fn empty_wheel_spin_is_a_no_op() {
        let config = test_config(&[]);
        let mut state = app(&config);
        let t0 = Instant::now();
        state.apply_command(WheelCommand::Spin, t0);
        assert!(!state.wheel.is_spinning());
        state.apply_command(WheelCommand::AddEntry("solo".into()), t0);
        state.apply_command(WheelCommand::Spin, t0);
        assert!(state.wheel.is_spinning());
    }

    #[test]
    fn crossings_flash_the_pointer_when_enabled() {
        let config = test_config(&["A", "B", "C", "D", "E", "F"]);
        let mut state = app(&config);
        let t0 = Instant::now();
        state.apply_command(WheelCommand::Spin, t0);
        state.update(t0 + Duration::from_millis(10));
        assert!(state.is_flashing(t0 + Duration::from_millis(20)));
        assert!(!state.is_flashing(t0 + Duration::from_secs(5)));

        let quiet = WheelConfig::builder()
            .entries(vec!["A".into(), "B".into()])
            .tick_feedback(false)
            .seed(1)
            .build();
        let mut state = app(&quiet);
        state.apply_command(WheelCommand::Spin, t0);
        state.update(t0 + Duration::from_millis(10));
        assert!(!state.is_flashing(t0 + Duration::from_millis(20)));
    }

    #[test]
    fn layout_centres_the_wheel() {
        let layout = WheelLayout::new(640, 480, &GeometryConfig::default());
        assert_eq!(layout, WheelLayout { cx: 320, cy: 240, r: 200 });
        assert!(layout.contains(320.0, 240.0));
        assert!(layout.contains(519.0, 240.0));
        assert!(!layout.contains(0.0, 0.0));
    }

    #[test]
    fn wedge_fill_matches_pointer_mapping() {
        let palette = Palette::default();
        let colors: Vec<_> = (0..5).map(|i| palette.wedge(i).as_tuple()).collect();
        let (width, height) = (101, 101);
        let mut frame = vec![0u8; width * height * 4];
        let rotation = 2.2;
        {
            let mut canvas = Canvas::new(&mut frame, width, height);
            canvas.clear((0xff, 0xff, 0xff));
            fill_wedges(&mut canvas, 50, 50, 40, rotation, &colors);
        }
        // pixel just right of centre is under the pointer direction
        let under_pointer = angle::index_under_pointer(rotation, 5);
        assert_eq!(pixel(&frame, width, 80, 50), colors[under_pointer]);
        // outside the disc stays background
        assert_eq!(pixel(&frame, width, 0, 0), (0xff, 0xff, 0xff));
    }

    #[test]
    fn pointer_triangle_is_filled() {
        let (width, height) = (60, 60);
        let mut frame = vec![0u8; width * height * 4];
        {
            let mut canvas = Canvas::new(&mut frame, width, height);
            canvas.clear((0, 0, 0));
            fill_triangle(
                &mut canvas,
                [(10.0, 30.0), (40.0, 14.0), (40.0, 46.0)],
                (0xef, 0x44, 0x44),
            );
        }
        assert_eq!(pixel(&frame, width, 35, 30), (0xef, 0x44, 0x44));
        assert_eq!(pixel(&frame, width, 5, 5), (0, 0, 0));
        assert_eq!(pixel(&frame, width, 50, 30), (0, 0, 0));
    }

    #[test]
    fn blend_mixes_and_clips() {
        let mut frame = vec![0u8; 2 * 2 * 4];
        {
            let mut canvas = Canvas::new(&mut frame, 2, 2);
            canvas.blend(1, 1, (200, 100, 50), 0.5);
            canvas.blend(5, 5, (255, 255, 255), 1.0);
            canvas.blend(-1, 0, (255, 255, 255), 1.0);
        }
        assert_eq!(pixel(&frame, 2, 1, 1), (100, 50, 25));
        assert_eq!(pixel(&frame, 2, 0, 0), (0, 0, 0));
    }

    #[test]
    fn disc_and_spoke_stay_inside_their_shapes() {
        let (width, height) = (40, 40);
        let mut frame = vec![0u8; width * height * 4];
        {
            let mut canvas = Canvas::new(&mut frame, width, height);
            canvas.clear((0, 0, 0));
            // partly off-canvas disc must not panic
            draw_disc(&mut canvas, 2, 2, 6, (10, 20, 30));
            draw_spoke(&mut canvas, (20, 30), (39, 30), 2.0, (200, 0, 0));
        }
        assert_eq!(pixel(&frame, width, 2, 2), (10, 20, 30));
        assert_eq!(pixel(&frame, width, 20, 20), (0, 0, 0));
        assert_eq!(pixel(&frame, width, 30, 30), (200, 0, 0));
        assert_eq!(pixel(&frame, width, 30, 34), (0, 0, 0));
    }

    #[test]
    fn result_list_is_capped() {
        let config = WheelConfig::builder()
            .entries(vec!["A".into(), "B".into()])
            .spin(SpinConfig::fixed(10.0, 1))
            .max_results(3)
            .seed(5)
            .build();
        let mut state = app(&config);
        let mut now = Instant::now();
        for _ in 0..5 {
            state.apply_command(WheelCommand::SpinForced("B".into()), now);
            now += Duration::from_millis(20);
            state.update(now);
        }
        state.apply_command(WheelCommand::SpinForced("A".into()), now);
        state.update(now + Duration::from_millis(20));
        assert_eq!(state.results, vec!["A".to_string(), "B".to_string(), "B".to_string()]);
    }

    #[test]
    fn missing_explicit_font_is_an_error() {
        let config = FontConfig {
            path: Some("/nonexistent/font.ttf".into()),
            ..FontConfig::default()
        };
        assert!(matches!(load_font(&config), Err(WheelError::Font(_))));

        let none = FontConfig {
            path: None,
            candidates: vec!["/nonexistent/a.ttf".into()],
            ..FontConfig::default()
        };
        assert!(matches!(load_font(&none), Ok(None)));
    }
}
