use crate::coords::Vec2;
use crate::paint::Color;
use crate::style::Style;
use crate::text::ATLAS_SIZE;

/// Frames a filled-circle mesh stays cached after it was built.
pub const CIRCLE_TTL: u32 = 60;
/// Frames a text mesh stays cached after it was laid out.
pub const TEXT_TTL: u32 = 30;

/// Construction parameters for a [`Canvas`](super::Canvas).
#[derive(Debug, Clone)]
pub struct CanvasConfig {
    /// Logical resolution every draw call is expressed in.
    pub canvas_size: Vec2,
    /// Clear color of the canvas region.
    pub background: Color,
    /// Color of the letterbox bars outside the canvas region.
    pub border: Color,
    pub circle_ttl: u32,
    pub text_ttl: u32,
    /// Style in effect at startup.
    pub style: Style,
    /// Edge length of the glyph atlas in pixels.
    pub atlas_size: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            canvas_size: Vec2::new(720.0, 1280.0),
            background: Color::BLACK,
            border: Color::from_srgb_u8(24, 24, 24, 255),
            circle_ttl: CIRCLE_TTL,
            text_ttl: TEXT_TTL,
            style: Style::default(),
            atlas_size: ATLAS_SIZE,
        }
    }
}

/// Counters for the frame being recorded.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FrameStats {
    pub opaque: usize,
    pub transparent: usize,
    /// Draw calls dropped for invalid arguments, degenerate geometry or unavailable resources.
    pub skipped: usize,
    pub scratch_meshes: usize,
    pub cached_circles: usize,
    pub cached_texts: usize,
    pub atlas_rebuilds: u32,
}
