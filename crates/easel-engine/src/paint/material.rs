use crate::asset::TextureId;
use crate::paint::Color;

/// Texture bound by a textured material.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureSource {
    /// The engine-owned glyph atlas (single-channel coverage).
    GlyphAtlas,
    /// A texture registered with the renderer.
    Texture(TextureId),
}

/// How a draw command is shaded.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    Solid(Color),
    /// Texture sampled at the mesh UVs, multiplied by `tint` (and by per-vertex
    /// colors when the mesh carries them).
    Textured { source: TextureSource, tint: Color },
}

impl Material {
    /// A command is opaque iff it is a solid fill with full alpha.
    ///
    /// Textured materials always go through the transparent list, regardless of
    /// texture contents.
    #[inline]
    pub fn is_opaque(&self) -> bool {
        match self {
            Material::Solid(c) => c.is_opaque(),
            Material::Textured { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_full_alpha_solids_are_opaque() {
        assert!(Material::Solid(Color::BLUE).is_opaque());
        assert!(!Material::Solid(Color::BLUE.with_alpha(0.5)).is_opaque());
        assert!(!Material::Textured { source: TextureSource::GlyphAtlas, tint: Color::WHITE }.is_opaque());
    }
}
