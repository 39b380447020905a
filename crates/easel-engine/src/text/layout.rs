use std::rc::Rc;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;
use crate::geometry::Mesh;
use crate::paint::Color;

use super::atlas::{AtlasError, GlyphAtlas};

/// Laid-out, single-line text ready to draw.
///
/// The mesh is in text-local canvas units with the block's top-left at the
/// origin. Its UVs are only valid until the atlas is rebuilt.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub mesh: Rc<Mesh>,
    pub extent: Vec2,
}

/// Lays out `text` and emits one textured, vertex-colored quad per visible glyph.
///
/// Glyphs are rasterized at `size * raster_scale` pixels so they land 1:1 on
/// device pixels; positions are divided back to canvas units.
///
/// A glyph too large for the atlas is left out of the mesh. Only
/// [`AtlasError::Full`] is returned; the caller may rebuild and retry.
pub fn layout_text(
    font: &fontdue::Font,
    atlas: &mut GlyphAtlas,
    text: &str,
    size: f32,
    raster_scale: f32,
    color: Color,
) -> Result<TextBlock, AtlasError> {
    let scale = raster_scale.max(0.01);
    let px = size * scale;

    let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let glyphs = layout.glyphs();
    let mut mesh = Mesh::with_capacity(glyphs.len() * 4, glyphs.len() * 6);
    let rgba = color.to_array();
    let mut width = 0.0f32;

    for g in glyphs {
        let m = font.metrics_indexed(g.key.glyph_index, px);
        width = width.max(g.x - m.xmin as f32 + m.advance_width);

        if !g.char_data.rasterize() || g.width == 0 || g.height == 0 {
            continue;
        }
        let entry = match atlas.glyph(font, g.key) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(AtlasError::GlyphTooLarge { width, height }) => {
                log::warn!("glyph {:?} skipped: {width}x{height} px exceeds the atlas", g.parent);
                continue;
            }
            Err(err) => return Err(err),
        };

        let x0 = g.x / scale;
        let y0 = g.y / scale;
        let x1 = (g.x + g.width as f32) / scale;
        let y1 = (g.y + g.height as f32) / scale;
        let [u0, v0] = entry.uv_min;
        let [u1, v1] = entry.uv_max;

        let base = mesh.vertex_count() as u32;
        mesh.positions.extend_from_slice(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]]);
        mesh.uvs.extend_from_slice(&[[u0, v0], [u1, v0], [u1, v1], [u0, v1]]);
        mesh.colors.extend_from_slice(&[rgba; 4]);
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }

    let extent = Vec2::new(width.max(0.0) / scale, (layout.height() / scale).max(size * 1.2));
    Ok(TextBlock { mesh: Rc::new(mesh), extent })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::TEST_FONT;

    fn font() -> fontdue::Font {
        fontdue::Font::from_bytes(TEST_FONT, fontdue::FontSettings::default()).unwrap()
    }

    // ── quads ──────────────────────────────────────────────────────────────

    #[test]
    fn one_textured_quad_per_visible_glyph() {
        let font = font();
        let mut atlas = GlyphAtlas::new(256);
        let block = layout_text(&font, &mut atlas, "Hi", 32.0, 1.0, Color::RED).unwrap();

        assert_eq!(block.mesh.vertex_count(), 8);
        assert_eq!(block.mesh.index_count(), 12);
        assert!(block.mesh.is_well_formed());
        assert!(block.mesh.uvs.iter().flatten().all(|&u| (0.0..=1.0).contains(&u)));
        assert!(block.mesh.colors.iter().all(|&c| c == Color::RED.to_array()));
        assert_eq!(atlas.glyph_count(), 2);
    }

    #[test]
    fn repeated_glyphs_are_rasterized_once() {
        let font = font();
        let mut atlas = GlyphAtlas::new(256);
        let block = layout_text(&font, &mut atlas, "a a", 20.0, 1.0, Color::WHITE).unwrap();

        // The space has no coverage and gets no quad.
        assert_eq!(block.mesh.vertex_count(), 8);
        assert_eq!(atlas.glyph_count(), 1);
    }

    #[test]
    fn glyphs_sit_inside_the_extent() {
        let font = font();
        let mut atlas = GlyphAtlas::new(256);
        let block = layout_text(&font, &mut atlas, "Hello", 24.0, 1.0, Color::WHITE).unwrap();

        assert!(block.extent.x > 0.0);
        assert!(block.extent.y >= 24.0 * 1.2 - 1e-3);
        assert!(block.mesh.positions.iter().all(|p| p[0] >= -1.0 && p[0] <= block.extent.x + 1.0));
    }

    // ── scale ──────────────────────────────────────────────────────────────

    #[test]
    fn raster_scale_keeps_canvas_size() {
        let font = font();
        let mut atlas = GlyphAtlas::new(512);
        let one = layout_text(&font, &mut atlas, "Hello", 24.0, 1.0, Color::WHITE).unwrap();
        let two = layout_text(&font, &mut atlas, "Hello", 24.0, 2.0, Color::WHITE).unwrap();
        assert!((one.extent.x - two.extent.x).abs() < 1.0);
        assert!((one.extent.y - two.extent.y).abs() < 1.0);
    }

    #[test]
    fn extent_matches_measurement() {
        let mut fonts = crate::text::FontSystem::new();
        let id = fonts.load_font(TEST_FONT).unwrap();
        let mut atlas = GlyphAtlas::new(256);
        let block = layout_text(fonts.get(id).unwrap(), &mut atlas, "Hello", 24.0, 1.0, Color::WHITE).unwrap();
        let measured = fonts.measure_text("Hello", id, 24.0);
        assert!((block.extent.x - measured.x).abs() < 1e-3);
        assert!((block.extent.y - measured.y).abs() < 1e-3);
    }

    // ── atlas limits ───────────────────────────────────────────────────────

    #[test]
    fn oversized_glyph_is_dropped_without_failing() {
        let font = font();
        let mut atlas = GlyphAtlas::new(64);
        let block = layout_text(&font, &mut atlas, "W", 400.0, 1.0, Color::WHITE).unwrap();

        assert!(block.mesh.is_empty());
        assert!(block.extent.x > 64.0);
        assert_eq!(atlas.glyph_count(), 0);
        assert_eq!(atlas.generation(), 0);
    }

    #[test]
    fn exhausted_atlas_reports_full() {
        let font = font();
        let mut atlas = GlyphAtlas::new(64);
        let all: String = ('A'..='Z').collect();
        let err = layout_text(&font, &mut atlas, &all, 24.0, 1.0, Color::WHITE).unwrap_err();
        assert_eq!(err, AtlasError::Full);
    }
}
