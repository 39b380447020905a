use crate::coords::{Affine, Vec2};

/// Reference point a rectangle, image or text block is positioned by.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Anchor {
    #[default]
    TopLeft,
    Top,
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Anchor {
    /// Anchor position as a fraction of the extent, `(0,0)` = top-left.
    #[inline]
    pub fn factors(self) -> Vec2 {
        let (fx, fy) = match self {
            Anchor::TopLeft => (0.0, 0.0),
            Anchor::Top => (0.5, 0.0),
            Anchor::TopRight => (1.0, 0.0),
            Anchor::Left => (0.0, 0.5),
            Anchor::Center => (0.5, 0.5),
            Anchor::Right => (1.0, 0.5),
            Anchor::BottomLeft => (0.0, 1.0),
            Anchor::Bottom => (0.5, 1.0),
            Anchor::BottomRight => (1.0, 1.0),
        };
        Vec2::new(fx, fy)
    }

    /// Translation that moves the anchor point of an `extent`-sized box to the origin.
    #[inline]
    pub fn offset(self, extent: Vec2) -> Vec2 {
        let f = self.factors();
        Vec2::new(-extent.x * f.x, -extent.y * f.y)
    }

    /// [`offset`](Self::offset) as a transform, composed before the shape's own transform.
    #[inline]
    pub fn pre_translation(self, extent: Vec2) -> Affine {
        Affine::from_translate(self.offset(extent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_left_is_no_op() {
        assert_eq!(Anchor::TopLeft.offset(Vec2::new(10.0, 20.0)), Vec2::zero());
    }

    #[test]
    fn center_shifts_by_half_extent() {
        assert_eq!(Anchor::Center.offset(Vec2::new(10.0, 20.0)), Vec2::new(-5.0, -10.0));
    }

    #[test]
    fn bottom_right_shifts_by_full_extent() {
        let t = Anchor::BottomRight.pre_translation(Vec2::new(4.0, 6.0));
        assert_eq!(t.apply(Vec2::new(4.0, 6.0)), Vec2::zero());
    }
}
