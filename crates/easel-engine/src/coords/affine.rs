use core::ops::Mul;

use super::Vec2;

/// 2×3 affine transform.
///
/// Layout is column-major `[a, b, c, d, tx, ty]` for the matrix
///
/// ```text
/// | a  c  tx |
/// | b  d  ty |
/// ```
///
/// Composition convention: `child.mul(parent)` applies `child` first, then `parent`.
/// Every call site in the engine that layers a local transform under the current
/// coordinate system relies on this ordering.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Affine {
    pub m: [f32; 6],
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine { m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0] };

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { m: [a, b, c, d, tx, ty] }
    }

    #[inline]
    pub const fn from_translate(v: Vec2) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, v.x, v.y)
    }

    /// Rotation by `radians`. With +Y down, positive angles turn clockwise on screen.
    #[inline]
    pub fn from_rotate(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    #[inline]
    pub const fn from_scale(v: Vec2) -> Self {
        Self::new(v.x, 0.0, 0.0, v.y, 0.0, 0.0)
    }

    /// Scale, then rotate, then translate.
    #[inline]
    pub fn from_trs(pos: Vec2, radians: f32, scale: Vec2) -> Self {
        Self::from_scale(scale)
            .mul(Self::from_rotate(radians))
            .mul(Self::from_translate(pos))
    }

    /// Returns the transform that applies `self` first, then `parent`.
    #[inline]
    pub fn mul(self, parent: Affine) -> Affine {
        let [a1, b1, c1, d1, e1, f1] = self.m;
        let [a2, b2, c2, d2, e2, f2] = parent.m;
        Affine::new(
            a2 * a1 + c2 * b1,
            b2 * a1 + d2 * b1,
            a2 * c1 + c2 * d1,
            b2 * c1 + d2 * d1,
            a2 * e1 + c2 * f1 + e2,
            b2 * e1 + d2 * f1 + f2,
        )
    }

    #[inline]
    pub fn apply(self, p: Vec2) -> Vec2 {
        let [a, b, c, d, tx, ty] = self.m;
        Vec2::new(a * p.x + c * p.y + tx, b * p.x + d * p.y + ty)
    }

    /// Applies only the linear part (no translation).
    #[inline]
    pub fn apply_vector(self, v: Vec2) -> Vec2 {
        let [a, b, c, d, _, _] = self.m;
        Vec2::new(a * v.x + c * v.y, b * v.x + d * v.y)
    }

    #[inline]
    pub fn translation(self) -> Vec2 {
        Vec2::new(self.m[4], self.m[5])
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        let [a, b, c, d, _, _] = self.m;
        a * d - b * c
    }

    pub fn inverse(self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let [a, b, c, d, tx, ty] = self.m;
        let inv = 1.0 / det;
        let (ia, ib, ic, id) = (d * inv, -b * inv, -c * inv, a * inv);
        Some(Affine::new(ia, ib, ic, id, -(ia * tx + ic * ty), -(ib * tx + id * ty)))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// Three columns padded to vec4 for WGSL uniform/vertex layouts.
    #[inline]
    pub fn to_columns(self) -> [[f32; 4]; 3] {
        let [a, b, c, d, tx, ty] = self.m;
        [[a, b, 0.0, 0.0], [c, d, 0.0, 0.0], [tx, ty, 1.0, 0.0]]
    }
}

impl Mul for Affine {
    type Output = Affine;
    #[inline]
    fn mul(self, parent: Affine) -> Affine {
        Affine::mul(self, parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn approx_v(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    fn approx_m(a: Affine, b: Affine) -> bool {
        a.m.iter().zip(b.m.iter()).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn identity_is_neutral() {
        let t = Affine::from_trs(Vec2::new(3.0, 4.0), 0.7, Vec2::new(2.0, 0.5));
        assert!(approx_m(t.mul(Affine::IDENTITY), t));
        assert!(approx_m(Affine::IDENTITY.mul(t), t));
    }

    #[test]
    fn child_is_applied_before_parent() {
        let child = Affine::from_translate(Vec2::new(1.0, 0.0));
        let parent = Affine::from_scale(Vec2::new(10.0, 10.0));
        let p = child.mul(parent).apply(Vec2::zero());
        // translate to (1,0), then scale → (10,0)
        assert!(approx_v(p, Vec2::new(10.0, 0.0)));

        let q = parent.mul(child).apply(Vec2::zero());
        assert!(approx_v(q, Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn rotation_quarter_turn() {
        let p = Affine::from_rotate(FRAC_PI_2).apply(Vec2::new(1.0, 0.0));
        assert!(approx_v(p, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn composition_is_associative() {
        let a = Affine::from_trs(Vec2::new(1.0, 2.0), 0.3, Vec2::new(2.0, 3.0));
        let b = Affine::from_trs(Vec2::new(-4.0, 0.5), -1.1, Vec2::new(0.5, 0.25));
        let c = Affine::from_trs(Vec2::new(7.0, -3.0), 2.2, Vec2::new(1.5, 1.0));
        assert!(approx_m(a.mul(b).mul(c), a.mul(b.mul(c))));
    }

    #[test]
    fn trs_scales_then_rotates_then_translates() {
        let t = Affine::from_trs(Vec2::new(5.0, 5.0), FRAC_PI_2, Vec2::new(2.0, 1.0));
        let p = t.apply(Vec2::new(1.0, 0.0));
        // (1,0) → scale (2,0) → rotate (0,2) → translate (5,7)
        assert!(approx_v(p, Vec2::new(5.0, 7.0)));
    }

    #[test]
    fn inverse_round_trips() {
        let t = Affine::from_trs(Vec2::new(3.0, -2.0), 0.9, Vec2::new(4.0, 0.5));
        let inv = t.inverse().unwrap();
        let p = Vec2::new(12.5, -7.25);
        assert!(approx_v(inv.apply(t.apply(p)), p));
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Affine::from_scale(Vec2::new(0.0, 1.0)).inverse().is_none());
    }
}
