use std::path::PathBuf;

/// Entries shown when no list is supplied
pub const DEFAULT_ENTRIES: [&str; 11] = [
    "CS",
    "CS",
    "CS",
    "Rakashu",
    "KAJINKA",
    "NEPORAZITELNY",
    "CS",
    "NIKOLKA",
    "CS",
    "Rakashu",
    "SKULL",
];

/// Color representation for wheel elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }
}

/// Timing and shape of a single spin
#[derive(Debug, Clone)]
pub struct SpinConfig {
    /// Animation length is drawn uniformly from this range (milliseconds).
    pub duration_ms: (f64, f64),
    /// Extra full turns, inclusive on both ends.
    pub revolutions: (u32, u32),
    /// Landing offset as a fraction of the wedge width, centred on the wedge
    /// middle. 0.6 means the wheel stops within ±30% of a wedge from the centre.
    pub jitter_fraction: f64,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            duration_ms: (5200.0, 6000.0),
            revolutions: (4, 6),
            jitter_fraction: 0.6,
        }
    }
}

impl SpinConfig {
    pub fn fixed(duration_ms: f64, revolutions: u32) -> Self {
        Self {
            duration_ms: (duration_ms, duration_ms),
            revolutions: (revolutions, revolutions),
            jitter_fraction: 0.0,
        }
    }
}

/// Wedge and label colors
#[derive(Debug, Clone)]
pub struct Palette {
    pub wedges: Vec<Color>,
    pub dark_text: Color,
    pub light_text: Color,
    pub background: Color,
    pub ring: Color,
    pub hub: Color,
    pub hub_inner: Color,
    pub pointer: Color,
    pub pointer_flash: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            wedges: vec![
                Color::new(0xfa, 0xcc, 0x15),
                Color::new(0x1d, 0x4e, 0xd8),
                Color::new(0xef, 0x44, 0x44),
                Color::new(0x10, 0xb9, 0x81),
                Color::new(0xf5, 0x9e, 0x0b),
                Color::new(0x3b, 0x82, 0xf6),
                Color::new(0xef, 0x44, 0x44),
                Color::new(0x10, 0xb9, 0x81),
            ],
            dark_text: Color::new(0x11, 0x18, 0x27),
            light_text: Color::new(0xff, 0xff, 0xff),
            background: Color::new(0xff, 0xff, 0xff),
            ring: Color::new(0xe5, 0xe7, 0xeb),
            hub: Color::new(0xff, 0xff, 0xff),
            hub_inner: Color::new(0xe5, 0xe7, 0xeb),
            pointer: Color::new(0xef, 0x44, 0x44),
            pointer_flash: Color::new(0xff, 0xb4, 0x00),
        }
    }
}

impl Palette {
    /// Wedge colors cycle; label text alternates dark and light.
    pub fn wedge(&self, index: usize) -> Color {
        if self.wedges.is_empty() {
            return self.ring;
        }
        self.wedges[index % self.wedges.len()]
    }

    pub fn label(&self, index: usize) -> Color {
        if index % 2 == 0 {
            self.dark_text
        } else {
            self.light_text
        }
    }
}

/// Configuration for application window
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub max_framerate: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
            max_framerate: 60.0,
        }
    }
}

/// Configuration for fonts and text rendering
#[derive(Debug, Clone)]
pub struct FontConfig {
    /// Explicit font file. When unset the system candidates are tried in order.
    pub path: Option<PathBuf>,
    pub candidates: Vec<PathBuf>,
    pub label_max_size: f32,
    pub label_min_size: f32,
    pub overlay_size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            candidates: [
                "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
                "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
                "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
                "C:\\Windows\\Fonts\\arialbd.ttf",
            ]
            .iter()
            .map(PathBuf::from)
            .collect(),
            label_max_size: 26.0,
            label_min_size: 12.0,
            overlay_size: 18.0,
        }
    }
}

/// Configuration for wheel geometry on screen
#[derive(Debug, Clone)]
pub struct GeometryConfig {
    pub rim_padding: i32,
    pub ring_width: i32,
    pub hub_radius: i32,
    pub hub_inner_radius: i32,
    pub pointer_length: f64,
    pub pointer_half_width: f64,
    pub label_inset: f64,
    pub label_span: f64,
    pub divider_thickness: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            rim_padding: 40,
            ring_width: 6,
            hub_radius: 28,
            hub_inner_radius: 10,
            pointer_length: 26.0,
            pointer_half_width: 16.0,
            label_inset: 36.0,
            label_span: 0.9,
            divider_thickness: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles_and_alternates() {
        let palette = Palette::default();
        assert_eq!(palette.wedge(0), palette.wedge(8));
        assert_eq!(palette.wedge(3), Color::new(0x10, 0xb9, 0x81));
        assert_eq!(palette.label(0), palette.dark_text);
        assert_eq!(palette.label(1), palette.light_text);
    }

    #[test]
    fn default_spin_matches_source_ranges() {
        let spin = SpinConfig::default();
        assert_eq!(spin.revolutions, (4, 6));
        assert!(spin.duration_ms.0 <= spin.duration_ms.1);
        assert!(spin.jitter_fraction < 1.0);
    }
}
