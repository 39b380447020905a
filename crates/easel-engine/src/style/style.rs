use std::fmt;

use crate::geometry::MIN_CIRCLE_RESOLUTION;
use crate::paint::Color;
use crate::text::FontId;

use super::Anchor;

/// End treatment of stroked lines.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum LineCap {
    /// Stroke ends exactly at the endpoints.
    #[default]
    Butt,
    /// Stroke extends past each endpoint by half the line width.
    Square,
}

/// Value rejected by a checked style setter.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum StyleError {
    LineWidth(f32),
    FontSize(f32),
    CircleResolution(u32),
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleError::LineWidth(w) => write!(f, "line width must be > 0, got {w}"),
            StyleError::FontSize(s) => write!(f, "font size must be >= 1, got {s}"),
            StyleError::CircleResolution(n) => {
                write!(f, "circle resolution must be >= {MIN_CIRCLE_RESOLUTION}, got {n}")
            }
        }
    }
}

impl std::error::Error for StyleError {}

/// Drawing style consulted by every draw call.
///
/// `Style` is a plain value; the canvas keeps one "current" style and saves/restores
/// it through the style stack. The `with_*` builders are the raw setters: they
/// assert their contract and panic on invalid input. The canvas exposes checked
/// setters that reject invalid values instead.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Style {
    pub color: Color,
    line_width: f32,
    pub line_cap: LineCap,
    circle_resolution: u32,
    pub font: Option<FontId>,
    font_size: f32,
    pub rect_anchor: Anchor,
    pub text_anchor: Anchor,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            circle_resolution: 32,
            font: None,
            font_size: 16.0,
            rect_anchor: Anchor::TopLeft,
            text_anchor: Anchor::TopLeft,
        }
    }
}

impl Style {
    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    #[inline]
    pub fn circle_resolution(&self) -> u32 {
        self.circle_resolution
    }

    #[inline]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// # Panics
    /// Panics if `width` is not a positive finite number.
    pub fn with_line_width(mut self, width: f32) -> Self {
        assert!(width > 0.0 && width.is_finite(), "{}", StyleError::LineWidth(width));
        self.line_width = width;
        self
    }

    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    /// # Panics
    /// Panics if `resolution` is below [`MIN_CIRCLE_RESOLUTION`].
    pub fn with_circle_resolution(mut self, resolution: u32) -> Self {
        assert!(
            resolution >= MIN_CIRCLE_RESOLUTION,
            "{}",
            StyleError::CircleResolution(resolution)
        );
        self.circle_resolution = resolution;
        self
    }

    pub fn with_font(mut self, font: Option<FontId>) -> Self {
        self.font = font;
        self
    }

    /// # Panics
    /// Panics if `size` is below 1 or not finite.
    pub fn with_font_size(mut self, size: f32) -> Self {
        assert!(size >= 1.0 && size.is_finite(), "{}", StyleError::FontSize(size));
        self.font_size = size;
        self
    }

    pub fn with_rect_anchor(mut self, anchor: Anchor) -> Self {
        self.rect_anchor = anchor;
        self
    }

    pub fn with_text_anchor(mut self, anchor: Anchor) -> Self {
        self.text_anchor = anchor;
        self
    }

    // ── checked setters ──────────────────────────────────────────────────

    pub(crate) fn try_set_line_width(&mut self, width: f32) -> Result<(), StyleError> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(StyleError::LineWidth(width));
        }
        self.line_width = width;
        Ok(())
    }

    pub(crate) fn try_set_font_size(&mut self, size: f32) -> Result<(), StyleError> {
        if !(size >= 1.0 && size.is_finite()) {
            return Err(StyleError::FontSize(size));
        }
        self.font_size = size;
        Ok(())
    }

    pub(crate) fn try_set_circle_resolution(&mut self, resolution: u32) -> Result<(), StyleError> {
        if resolution < MIN_CIRCLE_RESOLUTION {
            return Err(StyleError::CircleResolution(resolution));
        }
        self.circle_resolution = resolution;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_setter_keeps_previous_on_reject() {
        let mut s = Style::default().with_line_width(3.0);
        assert_eq!(s.try_set_line_width(-1.0), Err(StyleError::LineWidth(-1.0)));
        assert_eq!(s.line_width(), 3.0);
        assert!(s.try_set_line_width(f32::NAN).is_err());
        assert_eq!(s.line_width(), 3.0);
    }

    #[test]
    fn checked_font_size_requires_at_least_one() {
        let mut s = Style::default();
        assert!(s.try_set_font_size(0.5).is_err());
        assert!(s.try_set_font_size(1.0).is_ok());
        assert_eq!(s.font_size(), 1.0);
    }

    #[test]
    fn checked_resolution_requires_three() {
        let mut s = Style::default();
        assert!(s.try_set_circle_resolution(2).is_err());
        assert_eq!(s.circle_resolution(), 32);
    }

    #[test]
    #[should_panic(expected = "line width must be > 0")]
    fn raw_line_width_is_fatal() {
        let _ = Style::default().with_line_width(0.0);
    }

    #[test]
    #[should_panic(expected = "font size must be >= 1")]
    fn raw_font_size_is_fatal() {
        let _ = Style::default().with_font_size(-2.0);
    }
}
