//! Text: font loading, glyph atlas and text mesh layout.

mod atlas;
mod font_system;
mod layout;

pub use atlas::{AtlasError, AtlasGlyph, DirtyRows, GlyphAtlas, ATLAS_SIZE};
pub use font_system::{FontId, FontLoadError, FontSystem};
pub use layout::{layout_text, TextBlock};

/// Cantarell Regular (SIL OFL 1.1), used by text tests.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!("../../testdata/Cantarell-Regular.ttf");
