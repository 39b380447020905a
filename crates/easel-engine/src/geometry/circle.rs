use core::f32::consts::TAU;

use crate::coords::{Affine, Vec2};

use super::Mesh;

/// Smallest tessellation that still encloses area.
pub const MIN_CIRCLE_RESOLUTION: u32 = 3;

/// Filled unit circle as an `n`-vertex convex fan (`n` clamped to ≥ 3).
///
/// Radius and position come from the command transform, so one mesh per
/// resolution serves every filled circle.
pub fn fill_circle(resolution: u32) -> Mesh {
    let n = resolution.max(MIN_CIRCLE_RESOLUTION);
    let mut mesh = Mesh::with_capacity(n as usize, (n as usize - 2) * 3);

    for i in 0..n {
        let p = unit_point(i, n);
        mesh.push_vertex(p.to_array());
    }
    for i in 1..n - 1 {
        mesh.push_triangle(0, i, i + 1);
    }
    mesh
}

/// Outline of the unit circle under `transform`, extruded ±½ `line_width` along
/// the radial normal in canvas space.
///
/// The ring is emitted in canvas space (the command transform is identity), so the
/// stroke keeps its width under non-uniform scale. Vertices alternate outer/inner
/// per sample; the last quad closes `n-1 → 0`.
///
/// Returns `false` and leaves `mesh` untouched when the transformed circle collapses
/// to a point or the width is not positive.
pub fn wire_circle(mesh: &mut Mesh, transform: Affine, resolution: u32, line_width: f32) -> bool {
    if !(line_width > 0.0) || !transform.is_finite() {
        return false;
    }

    let n = resolution.max(MIN_CIRCLE_RESOLUTION);
    let center = transform.apply(Vec2::zero());
    let half = line_width * 0.5;

    let samples: Option<Vec<(Vec2, Vec2)>> = (0..n)
        .map(|i| {
            let p = transform.apply(unit_point(i, n));
            (p - center).normalized().map(|normal| (p, normal))
        })
        .collect();
    let Some(samples) = samples else { return false };

    let base = mesh.vertex_count() as u32;
    for (p, normal) in samples {
        mesh.push_vertex((p + normal * half).to_array());
        mesh.push_vertex((p - normal * half).to_array());
    }
    for i in 0..n {
        let j = (i + 1) % n;
        let (oi, ii) = (base + 2 * i, base + 2 * i + 1);
        let (oj, ij) = (base + 2 * j, base + 2 * j + 1);
        mesh.push_triangle(oi, oj, ij);
        mesh.push_triangle(oi, ij, ii);
    }
    true
}

#[inline]
fn unit_point(i: u32, n: u32) -> Vec2 {
    let (s, c) = (TAU * i as f32 / n as f32).sin_cos();
    Vec2::new(c, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_has_n_vertices_and_n_minus_2_triangles() {
        let m = fill_circle(16);
        assert_eq!(m.vertex_count(), 16);
        assert_eq!(m.index_count(), 14 * 3);
        assert!(m.is_well_formed());
    }

    #[test]
    fn resolution_is_clamped_to_three() {
        let m = fill_circle(1);
        assert_eq!(m.vertex_count(), 3);
        assert_eq!(m.index_count(), 3);
    }

    #[test]
    fn fan_vertices_lie_on_unit_circle() {
        for p in fill_circle(7).positions {
            let r = (p[0] * p[0] + p[1] * p[1]).sqrt();
            assert!((r - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn wire_ring_straddles_the_radius() {
        let t = Affine::from_scale(Vec2::splat(10.0)).mul(Affine::from_translate(Vec2::new(50.0, 50.0)));
        let mut m = Mesh::new();
        assert!(wire_circle(&mut m, t, 8, 2.0));
        assert_eq!(m.vertex_count(), 16);
        assert_eq!(m.index_count(), 8 * 6);
        assert!(m.is_well_formed());

        let c = Vec2::new(50.0, 50.0);
        let outer = Vec2::from((m.positions[0][0], m.positions[0][1])) - c;
        let inner = Vec2::from((m.positions[1][0], m.positions[1][1])) - c;
        assert!((outer.length() - 11.0).abs() < 1e-4);
        assert!((inner.length() - 9.0).abs() < 1e-4);
    }

    #[test]
    fn wire_ring_closes_the_loop() {
        let mut m = Mesh::new();
        assert!(wire_circle(&mut m, Affine::IDENTITY, 4, 0.5));
        // Last quad references the first ring pair.
        let tail = &m.indices[m.indices.len() - 6..];
        assert!(tail.contains(&0) && tail.contains(&1));
    }

    #[test]
    fn collapsed_circle_emits_nothing() {
        let mut m = Mesh::new();
        let t = Affine::from_scale(Vec2::zero());
        assert!(!wire_circle(&mut m, t, 12, 1.0));
        assert!(m.is_empty());
        assert_eq!(m.vertex_count(), 0);
    }

    #[test]
    fn non_positive_width_emits_nothing() {
        let mut m = Mesh::new();
        assert!(!wire_circle(&mut m, Affine::IDENTITY, 12, 0.0));
        assert!(m.is_empty());
    }
}
