use crate::asset::{Image, Texture};
use crate::coords::{Rect, Vec2};

/// Every primitive the canvas can draw.
///
/// Each `Canvas::draw_*` method builds one of these and hands it to
/// [`Canvas::draw`](super::Canvas::draw), which validates it, resolves geometry,
/// composes the transform and enqueues the command.
///
/// `rect: None` on images and textures means "natural size at the origin".
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable<'a> {
    FillCircle { center: Vec2, radius: f32 },
    StrokeCircle { center: Vec2, radius: f32 },
    FillRect { rect: Rect, rotation: f32 },
    StrokeRect { rect: Rect, rotation: f32 },
    Line { from: Vec2, to: Vec2 },
    Image { image: Image, rect: Option<Rect>, rotation: f32 },
    Text { text: &'a str, position: Vec2, rotation: f32 },
    Texture { texture: Texture, rect: Option<Rect>, rotation: f32 },
}

impl Drawable<'_> {
    /// Short name for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::FillCircle { .. } => "fill_circle",
            Drawable::StrokeCircle { .. } => "draw_circle",
            Drawable::FillRect { .. } => "fill_rect",
            Drawable::StrokeRect { .. } => "draw_rect",
            Drawable::Line { .. } => "draw_line",
            Drawable::Image { .. } => "draw_image",
            Drawable::Text { .. } => "draw_text",
            Drawable::Texture { .. } => "draw_texture",
        }
    }
}
