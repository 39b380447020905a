use std::collections::HashMap;
use std::fmt;

use fontdue::layout::GlyphRasterConfig;

/// Default atlas edge length in pixels.
pub const ATLAS_SIZE: u32 = 1024;
const GLYPH_PADDING: u32 = 1;

/// Normalized texture rectangle of a glyph in the atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AtlasGlyph {
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
}

/// Why a glyph could not be placed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AtlasError {
    /// No room left; a [`rebuild`](GlyphAtlas::rebuild) makes room.
    Full,
    /// Larger than an empty atlas. Rebuilding does not help.
    GlyphTooLarge { width: u32, height: u32 },
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtlasError::Full => write!(f, "glyph atlas is full"),
            AtlasError::GlyphTooLarge { width, height } => {
                write!(f, "glyph of {width}x{height} px exceeds the atlas")
            }
        }
    }
}

impl std::error::Error for AtlasError {}

/// Row band of the atlas modified since the last upload.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DirtyRows {
    pub y: u32,
    pub height: u32,
}

/// CPU-side single-channel glyph atlas with shelf packing.
///
/// Glyphs are rasterized on first use and kept until the atlas is rebuilt. When a
/// glyph no longer fits, the owner calls [`rebuild`](Self::rebuild), which wipes
/// every glyph and bumps [`generation`](Self::generation); any mesh that references
/// atlas UVs from an older generation is stale.
pub struct GlyphAtlas {
    size: u32,
    pixels: Vec<u8>,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
    glyphs: HashMap<GlyphRasterConfig, AtlasGlyph>,
    generation: u64,
    dirty: Option<(u32, u32)>,
}

impl GlyphAtlas {
    pub fn new(size: u32) -> Self {
        let size = size.max(64);
        Self {
            size,
            pixels: vec![0; (size * size) as usize],
            cursor_x: GLYPH_PADDING,
            cursor_y: GLYPH_PADDING,
            row_height: 0,
            glyphs: HashMap::new(),
            generation: 0,
            dirty: None,
        }
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns the atlas entry for `key`, rasterizing it with `font` on first use.
    ///
    /// `Ok(None)` means the glyph has no coverage (e.g. whitespace).
    pub fn glyph(
        &mut self,
        font: &fontdue::Font,
        key: GlyphRasterConfig,
    ) -> Result<Option<AtlasGlyph>, AtlasError> {
        if let Some(g) = self.glyphs.get(&key) {
            return Ok(Some(*g));
        }

        let (metrics, bitmap) = font.rasterize_config(key);
        if metrics.width == 0 || metrics.height == 0 {
            return Ok(None);
        }

        let entry = self.place(&bitmap, metrics.width as u32, metrics.height as u32)?;
        self.glyphs.insert(key, entry);
        Ok(Some(entry))
    }

    fn place(&mut self, bitmap: &[u8], w: u32, h: u32) -> Result<AtlasGlyph, AtlasError> {
        if w + 2 * GLYPH_PADDING > self.size || h + 2 * GLYPH_PADDING > self.size {
            return Err(AtlasError::GlyphTooLarge { width: w, height: h });
        }

        if self.cursor_x + w + GLYPH_PADDING > self.size {
            self.cursor_y += self.row_height + GLYPH_PADDING;
            self.cursor_x = GLYPH_PADDING;
            self.row_height = 0;
        }
        if self.cursor_y + h + GLYPH_PADDING > self.size {
            return Err(AtlasError::Full);
        }

        let (gx, gy) = (self.cursor_x, self.cursor_y);
        for row in 0..h {
            let src = (row * w) as usize;
            let dst = ((gy + row) * self.size + gx) as usize;
            self.pixels[dst..dst + w as usize].copy_from_slice(&bitmap[src..src + w as usize]);
        }
        self.mark_dirty(gy, h);

        self.cursor_x += w + GLYPH_PADDING;
        self.row_height = self.row_height.max(h);

        let s = self.size as f32;
        Ok(AtlasGlyph {
            uv_min: [gx as f32 / s, gy as f32 / s],
            uv_max: [(gx + w) as f32 / s, (gy + h) as f32 / s],
        })
    }

    fn mark_dirty(&mut self, y: u32, h: u32) {
        self.dirty = Some(match self.dirty {
            None => (y, y + h),
            Some((y0, y1)) => (y0.min(y), y1.max(y + h)),
        });
    }

    /// Wipes every glyph and starts a new generation.
    pub fn rebuild(&mut self) {
        self.pixels.fill(0);
        self.glyphs.clear();
        self.cursor_x = GLYPH_PADDING;
        self.cursor_y = GLYPH_PADDING;
        self.row_height = 0;
        self.generation += 1;
        self.dirty = Some((0, self.size));
        log::debug!("glyph atlas rebuilt (generation {})", self.generation);
    }

    /// Band of rows modified since the last [`take_dirty`](Self::take_dirty).
    pub fn dirty(&self) -> Option<DirtyRows> {
        self.dirty.map(|(y0, y1)| DirtyRows { y: y0, height: y1 - y0 })
    }

    /// Returns and resets the dirty band. Call only once the rows are uploaded.
    pub fn take_dirty(&mut self) -> Option<DirtyRows> {
        self.dirty.take().map(|(y0, y1)| DirtyRows { y: y0, height: y1 - y0 })
    }
}

impl Default for GlyphAtlas {
    fn default() -> Self {
        Self::new(ATLAS_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_advances_along_the_shelf() {
        let mut atlas = GlyphAtlas::new(64);
        let a = atlas.place(&[255; 4 * 4], 4, 4).unwrap();
        let b = atlas.place(&[255; 4 * 4], 4, 4).unwrap();
        assert!(b.uv_min[0] > a.uv_min[0]);
        assert_eq!(a.uv_min[1], b.uv_min[1]);
        assert_eq!(atlas.take_dirty(), Some(DirtyRows { y: 1, height: 4 }));
        assert_eq!(atlas.take_dirty(), None);
    }

    #[test]
    fn pixels_are_copied_row_by_row() {
        let mut atlas = GlyphAtlas::new(64);
        atlas.place(&[1, 2, 3, 4, 5, 6], 3, 2).unwrap();
        let s = atlas.size() as usize;
        assert_eq!(&atlas.pixels()[s + 1..s + 4], &[1, 2, 3]);
        assert_eq!(&atlas.pixels()[2 * s + 1..2 * s + 4], &[4, 5, 6]);
    }

    #[test]
    fn full_atlas_reports_and_rebuild_recovers() {
        let mut atlas = GlyphAtlas::new(64);
        let glyph = [0u8; 31 * 31];
        assert!(atlas.place(&glyph, 31, 31).is_ok());
        // Neither the current shelf nor a new one has room for a second 31×31.
        assert_eq!(atlas.place(&glyph, 31, 31), Err(AtlasError::Full));

        let before = atlas.generation();
        atlas.rebuild();
        assert_eq!(atlas.generation(), before + 1);
        assert!(atlas.place(&glyph, 31, 31).is_ok());
    }

    #[test]
    fn oversized_glyph_is_not_reported_as_full() {
        let mut atlas = GlyphAtlas::new(64);
        assert_eq!(
            atlas.place(&[0u8; 100 * 2], 100, 2),
            Err(AtlasError::GlyphTooLarge { width: 100, height: 2 })
        );
        // Nothing was consumed, so a normal glyph still lands at the origin shelf.
        assert!(atlas.place(&[0u8; 4], 2, 2).is_ok());
        assert_eq!(atlas.take_dirty(), Some(DirtyRows { y: 1, height: 2 }));
    }
}
