use crate::coords::Vec2;
use crate::style::LineCap;

use super::Mesh;

/// Line segment between two canvas-space endpoints, extruded ±½ `line_width`
/// along the segment's perpendicular.
///
/// With [`LineCap::Square`] both ends are pushed outward by ½ `line_width`.
/// Zero-length segments and non-positive widths emit nothing and return `false`.
pub fn line_segment(mesh: &mut Mesh, from: Vec2, to: Vec2, line_width: f32, cap: LineCap) -> bool {
    if !(line_width > 0.0) || !from.is_finite() || !to.is_finite() {
        return false;
    }
    let Some(dir) = (to - from).normalized() else {
        return false;
    };

    let half = line_width * 0.5;
    let (a, b) = match cap {
        LineCap::Butt => (from, to),
        LineCap::Square => (from - dir * half, to + dir * half),
    };
    let n = dir.perp() * half;

    let base = mesh.vertex_count() as u32;
    for p in [a + n, b + n, b - n, a - n] {
        mesh.push_vertex(p.to_array());
    }
    mesh.push_triangle(base, base + 1, base + 2);
    mesh.push_triangle(base, base + 2, base + 3);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xs(m: &Mesh) -> Vec<f32> {
        m.positions.iter().map(|p| p[0]).collect()
    }

    #[test]
    fn butt_cap_keeps_endpoints() {
        let mut m = Mesh::new();
        assert!(line_segment(&mut m, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0, LineCap::Butt));
        assert_eq!(m.vertex_count(), 4);
        assert_eq!(m.index_count(), 6);
        assert_eq!(xs(&m), vec![0.0, 10.0, 10.0, 0.0]);
        let ys: Vec<f32> = m.positions.iter().map(|p| p[1]).collect();
        assert_eq!(ys, vec![1.0, 1.0, -1.0, -1.0]);
    }

    #[test]
    fn square_cap_extends_both_ends() {
        let mut m = Mesh::new();
        assert!(line_segment(&mut m, Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), 2.0, LineCap::Square));
        assert_eq!(xs(&m), vec![-1.0, 11.0, 11.0, -1.0]);
    }

    #[test]
    fn zero_length_segment_emits_nothing() {
        let mut m = Mesh::new();
        let p = Vec2::new(3.0, 4.0);
        assert!(!line_segment(&mut m, p, p, 2.0, LineCap::Square));
        assert!(m.is_empty());
        assert_eq!(m.vertex_count(), 0);
    }

    #[test]
    fn zero_width_emits_nothing() {
        let mut m = Mesh::new();
        assert!(!line_segment(&mut m, Vec2::zero(), Vec2::new(1.0, 1.0), 0.0, LineCap::Butt));
        assert!(m.is_empty());
    }
}
