/// Z distance between consecutive draw calls.
///
/// With a `Depth32Float` target and z in `(0, 1]` this separates about a million
/// draws per frame.
pub const DEPTH_STEP: f32 = 1.0 / 1_048_576.0;

/// Painter's-order position of a draw call within its frame.
///
/// Later calls get larger depths and draw on top.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct Depth(pub u32);

impl Depth {
    /// Clip-space z. Decreases with depth so the `Less` depth test keeps later draws on top.
    #[inline]
    pub fn z(self) -> f32 {
        (1.0 - (self.0 as f32 + 1.0) * DEPTH_STEP).max(0.0)
    }
}

/// Per-frame monotonic depth source.
#[derive(Debug, Default)]
pub struct DepthCounter {
    next: u32,
}

impl DepthCounter {
    /// Returns the next depth and advances the counter.
    #[inline]
    pub fn next(&mut self) -> Depth {
        let d = Depth(self.next);
        self.next = self.next.saturating_add(1);
        d
    }

    /// Number of depths handed out this frame.
    #[inline]
    pub fn issued(&self) -> u32 {
        self.next
    }

    #[inline]
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_strictly_increasing_and_resets() {
        let mut c = DepthCounter::default();
        let a = c.next();
        let b = c.next();
        assert!(b > a);
        assert!(b.z() < a.z());
        c.reset();
        assert_eq!(c.next(), Depth(0));
    }

    #[test]
    fn consecutive_depths_pass_a_strict_less_test() {
        for d in [0, 1, 1_000, 500_000, 1_048_573] {
            assert!(Depth(d + 1).z() < Depth(d).z(), "depth {d}");
        }
        // The first draw must beat the depth clear value of 1.0.
        assert!(Depth(0).z() < 1.0);
    }

    #[test]
    fn z_stays_in_clip_range() {
        assert!(Depth(0).z() < 1.0);
        assert!(Depth(u32::MAX).z() >= 0.0);
    }
}
