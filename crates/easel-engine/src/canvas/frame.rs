use crate::coords::CanvasMapping;
use crate::geometry::{MeshId, ScratchPool};
use crate::paint::Color;
use crate::scene::DrawCmd;
use crate::text::GlyphAtlas;

use super::FrameStats;

/// Everything the renderer needs to present one recorded frame.
pub struct FrameView<'a> {
    pub mapping: &'a CanvasMapping,
    pub background: Color,
    pub border: Color,
    /// Solid, fully opaque commands; drawn first with depth writes.
    pub opaque: &'a [DrawCmd],
    /// Everything that blends; drawn second, depth-tested only.
    pub transparent: &'a [DrawCmd],
    /// Backing storage for `MeshRef::Scratch` commands.
    pub scratch: &'a ScratchPool,
    /// Glyph atlas. The renderer takes its dirty band once the rows are on the GPU,
    /// so rows changed in a frame that was never presented are uploaded later.
    pub atlas: &'a mut GlyphAtlas,
    /// Shared meshes dropped since the previous frame view; their GPU buffers can go.
    pub released: Vec<MeshId>,
    pub stats: FrameStats,
}
