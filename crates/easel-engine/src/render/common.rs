//! GPU-side data layouts shared by the composer's pipelines.

use bytemuck::{Pod, Zeroable};

use crate::coords::{Affine, Rect};
use crate::geometry::Mesh;
use crate::paint::{Color, Material, TextureSource};
use crate::scene::DrawCmd;

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

/// Canvas units → clip space, as three padded columns.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Globals {
    pub canvas_to_clip: [[f32; 4]; 3],
}

impl Globals {
    /// Canvas → device pixels → NDC (+Y up) for a `width`×`height` target.
    pub(super) fn new(canvas_to_device: Affine, width: u32, height: u32) -> Self {
        let (w, h) = (width.max(1) as f32, height.max(1) as f32);
        let to_ndc = Affine::new(2.0 / w, 0.0, 0.0, -2.0 / h, -1.0, 1.0);
        Self { canvas_to_clip: canvas_to_device.mul(to_ndc).to_columns() }
    }
}

/// Letterbox blit parameters, in surface pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct BlitUniform {
    /// `min.xy, max.xy` of the canvas region.
    pub canvas_rect: [f32; 4],
    pub border: [f32; 4],
    /// `x = 1` encodes linear output to sRGB for a non-sRGB surface.
    pub encode: [f32; 4],
}

impl BlitUniform {
    /// The offscreen holds linear color; an sRGB surface encodes on store, any
    /// other surface gets the transfer function applied in the blit.
    pub(super) fn new(canvas_rect: Rect, border: Color, surface: wgpu::TextureFormat) -> Self {
        let (min, max) = (canvas_rect.min(), canvas_rect.max());
        Self {
            canvas_rect: [min.x, min.y, max.x, max.y],
            border: border.to_array(),
            encode: [if surface.is_srgb() { 0.0 } else { 1.0 }, 0.0, 0.0, 0.0],
        }
    }
}

pub(super) fn uniform_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── vertex ────────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct Vertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // pos
        1 => Float32x2, // uv
        2 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Interleaves a mesh; missing UVs become `(0, 0)` and missing colors white.
pub(super) fn interleave(mesh: &Mesh, out: &mut Vec<Vertex>) {
    out.extend(mesh.positions.iter().enumerate().map(|(i, &pos)| Vertex {
        pos,
        uv: mesh.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        color: mesh.colors.get(i).copied().unwrap_or([1.0; 4]),
    }));
}

// ── instance ──────────────────────────────────────────────────────────────

pub(super) const SHADE_SOLID: f32 = 0.0;
pub(super) const SHADE_RGBA: f32 = 1.0;
pub(super) const SHADE_COVERAGE: f32 = 2.0;

/// Per-command data (80 bytes):
///
///  offset  0  xform0   [f32; 4]  loc 3
///  offset 16  xform1   [f32; 4]  loc 4
///  offset 32  xform2   [f32; 4]  loc 5
///  offset 48  color    [f32; 4]  loc 6  (solid color or tint, premultiplied)
///  offset 64  params   [f32; 4]  loc 7  (.x = z, .y = shade mode)
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct DrawInstance {
    pub xform: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub params: [f32; 4],
}

impl DrawInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<DrawInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    pub(super) fn from_cmd(cmd: &DrawCmd) -> Self {
        let (color, shade) = match cmd.material {
            Material::Solid(c) => (c, SHADE_SOLID),
            Material::Textured { source: TextureSource::GlyphAtlas, tint } => (tint, SHADE_COVERAGE),
            Material::Textured { source: TextureSource::Texture(_), tint } => (tint, SHADE_RGBA),
        };
        Self {
            xform: cmd.transform.to_columns(),
            color: color.to_array(),
            params: [cmd.depth.z(), shade, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{CanvasMapping, Vec2};

    fn clip(g: &Globals, p: Vec2) -> Vec2 {
        let [c0, c1, c2] = g.canvas_to_clip;
        Vec2::new(c0[0] * p.x + c1[0] * p.y + c2[0], c0[1] * p.x + c1[1] * p.y + c2[1])
    }

    #[test]
    fn letterboxed_canvas_spans_the_middle_of_clip_space() {
        let mapping = CanvasMapping::new(Vec2::new(720.0, 1280.0), Vec2::new(1920.0, 1080.0));
        let g = Globals::new(mapping.canvas_to_device_affine(), 1920, 1080);

        let tl = clip(&g, Vec2::zero());
        let br = clip(&g, Vec2::new(720.0, 1280.0));
        assert!((tl.y - 1.0).abs() < 1e-4);
        assert!((br.y + 1.0).abs() < 1e-4);
        assert!((tl.x + br.x).abs() < 1e-4);
        assert!(tl.x > -1.0 && br.x < 1.0);
    }

    #[test]
    fn blit_encodes_only_for_linear_surfaces() {
        let rect = Rect::from_origin_size(Vec2::new(10.0, 0.0), Vec2::new(100.0, 50.0));
        let srgb = BlitUniform::new(rect, Color::BLACK, wgpu::TextureFormat::Bgra8UnormSrgb);
        let linear = BlitUniform::new(rect, Color::BLACK, wgpu::TextureFormat::Bgra8Unorm);
        assert_eq!(srgb.encode[0], 0.0);
        assert_eq!(linear.encode[0], 1.0);
        assert_eq!(srgb.canvas_rect, [10.0, 0.0, 110.0, 50.0]);
    }

    #[test]
    fn interleave_fills_missing_attributes() {
        let mut mesh = Mesh::new();
        mesh.positions.push([1.0, 2.0]);
        let mut out = Vec::new();
        interleave(&mesh, &mut out);
        assert_eq!(out[0].uv, [0.0, 0.0]);
        assert_eq!(out[0].color, [1.0; 4]);
    }
}
