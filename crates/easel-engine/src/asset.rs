//! Value-typed resource descriptors.
//!
//! Callers never hold GPU objects. Images and textures are small `Copy` handles
//! naming a texture registered with the renderer plus the metadata the canvas
//! needs to build geometry for it.

/// Identifies a texture registered with the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

impl TextureId {
    /// Raw index; stable for the lifetime of the renderer that issued it.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Row order of the source pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum StorageOrigin {
    /// First row is the top of the picture (decoded image files).
    #[default]
    TopLeft,
    /// First row is the bottom of the picture (GL-style render targets, some camera feeds).
    BottomLeft,
}

/// UV orientation for a textured quad.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct ImageOrientation {
    pub flip_y: bool,
    /// Clockwise quarter turns applied to the sampled picture (0..=3).
    pub quarter_turns: u8,
}

impl ImageOrientation {
    pub const UPRIGHT: ImageOrientation = ImageOrientation { flip_y: false, quarter_turns: 0 };

    #[inline]
    pub fn new(origin: StorageOrigin, quarter_turns: u8) -> Self {
        Self {
            flip_y: origin == StorageOrigin::BottomLeft,
            quarter_turns: quarter_turns % 4,
        }
    }
}

/// A decoded, GPU-resident image.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Image {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub origin: StorageOrigin,
}

impl Image {
    #[inline]
    pub fn orientation(&self) -> ImageOrientation {
        ImageOrientation::new(self.origin, 0)
    }
}

/// An arbitrary texture, e.g. a camera frame, with rotation metadata.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Texture {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub origin: StorageOrigin,
    /// Clockwise quarter turns needed to display the texture upright.
    pub quarter_turns: u8,
}

impl Texture {
    #[inline]
    pub fn orientation(&self) -> ImageOrientation {
        ImageOrientation::new(self.origin, self.quarter_turns)
    }

    /// Size as displayed, after applying `quarter_turns`.
    #[inline]
    pub fn display_size(&self) -> (u32, u32) {
        if self.quarter_turns % 2 == 1 {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

impl From<Image> for Texture {
    fn from(img: Image) -> Self {
        Texture {
            texture: img.texture,
            width: img.width,
            height: img.height,
            origin: img.origin,
            quarter_turns: 0,
        }
    }
}

/// Availability of an asynchronously fetched resource.
///
/// Draw calls against anything but `Ready` are skipped for the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset<T> {
    Ready(T),
    Pending,
    Missing,
}

impl<T> Asset<T> {
    #[inline]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Asset::Ready(t) => Some(t),
            Asset::Pending | Asset::Missing => None,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Asset::Ready(_))
    }
}

impl<T> From<Option<T>> for Asset<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Asset::Pending, Asset::Ready)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_texture_swaps_display_size() {
        let t = Texture {
            texture: TextureId(0),
            width: 640,
            height: 480,
            origin: StorageOrigin::TopLeft,
            quarter_turns: 1,
        };
        assert_eq!(t.display_size(), (480, 640));
    }

    #[test]
    fn bottom_left_storage_flips() {
        assert!(ImageOrientation::new(StorageOrigin::BottomLeft, 0).flip_y);
        assert_eq!(ImageOrientation::new(StorageOrigin::TopLeft, 6).quarter_turns, 2);
    }

    #[test]
    fn only_ready_assets_resolve() {
        assert_eq!(Asset::Ready(3).ready(), Some(&3));
        assert_eq!(Asset::<i32>::Pending.ready(), None);
        assert_eq!(Asset::<i32>::Missing.ready(), None);
    }
}
