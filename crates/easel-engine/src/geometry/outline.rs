use crate::coords::Vec2;

use super::Mesh;

const PARALLEL_EPSILON: f32 = 1e-6;

/// Mitered outline of a quadrilateral given by its four (already transformed) corners.
///
/// Each edge is offset outward and inward by ½ `line_width`; adjacent offset lines
/// are intersected at every corner so joins are clean miters. Vertex layout is
/// `outer[0..4]` then `inner[0..4]`, one quad per edge.
///
/// Returns `false` and emits nothing when any edge has zero length, the quad has no
/// area, or adjacent offset lines are parallel.
pub fn wire_rect(mesh: &mut Mesh, corners: [Vec2; 4], line_width: f32) -> bool {
    if !(line_width > 0.0) || corners.iter().any(|c| !c.is_finite()) {
        return false;
    }

    let mut dirs = [Vec2::zero(); 4];
    for i in 0..4 {
        let Some(d) = (corners[(i + 1) % 4] - corners[i]).normalized() else {
            return false;
        };
        dirs[i] = d;
    }

    // Shoelace sum; its sign tells which side of each edge is outside.
    let area2: f32 = (0..4).map(|i| corners[i].cross(corners[(i + 1) % 4])).sum();
    if area2.abs() <= PARALLEL_EPSILON {
        return false;
    }
    let side = area2.signum();
    let half = line_width * 0.5;

    let mut outer = [Vec2::zero(); 4];
    let mut inner = [Vec2::zero(); 4];
    for j in 0..4 {
        let prev = (j + 3) % 4;
        let n_prev = -dirs[prev].perp() * side * half;
        let n_cur = -dirs[j].perp() * side * half;

        // Both offset lines through corner j: edge `prev` ends there, edge `j` starts there.
        let Some(o) = intersect(corners[j] + n_prev, dirs[prev], corners[j] + n_cur, dirs[j]) else {
            return false;
        };
        let Some(i) = intersect(corners[j] - n_prev, dirs[prev], corners[j] - n_cur, dirs[j]) else {
            return false;
        };
        outer[j] = o;
        inner[j] = i;
    }

    let base = mesh.vertex_count() as u32;
    for p in outer.iter().chain(inner.iter()) {
        mesh.push_vertex(p.to_array());
    }
    for j in 0..4u32 {
        let k = (j + 1) % 4;
        mesh.push_triangle(base + j, base + k, base + 4 + k);
        mesh.push_triangle(base + j, base + 4 + k, base + 4 + j);
    }
    true
}

/// Intersection of the lines `p1 + t·d1` and `p2 + s·d2`.
fn intersect(p1: Vec2, d1: Vec2, p2: Vec2, d2: Vec2) -> Option<Vec2> {
    let denom = d1.cross(d2);
    if denom.abs() <= PARALLEL_EPSILON {
        return None;
    }
    let t = (p2 - p1).cross(d2) / denom;
    Some(p1 + d1 * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Affine, Rect};

    fn v(m: &Mesh, i: usize) -> Vec2 {
        Vec2::new(m.positions[i][0], m.positions[i][1])
    }

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn square_outline_has_mitered_corners() {
        let mut m = Mesh::new();
        assert!(wire_rect(&mut m, Rect::new(0.0, 0.0, 10.0, 10.0).corners(), 2.0));
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(m.index_count(), 24);
        assert!(m.is_well_formed());

        assert!(approx(v(&m, 0), Vec2::new(-1.0, -1.0)));
        assert!(approx(v(&m, 2), Vec2::new(11.0, 11.0)));
        assert!(approx(v(&m, 4), Vec2::new(1.0, 1.0)));
        assert!(approx(v(&m, 6), Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn winding_does_not_flip_outer_and_inner() {
        let mut c = Rect::new(0.0, 0.0, 10.0, 10.0).corners();
        c.reverse();
        let mut m = Mesh::new();
        assert!(wire_rect(&mut m, c, 2.0));
        // corners reversed: index 0 is now (0, 10)
        assert!(approx(v(&m, 0), Vec2::new(-1.0, 11.0)));
        assert!(approx(v(&m, 4), Vec2::new(1.0, 9.0)));
    }

    #[test]
    fn rotated_rect_miters_stay_on_diagonal() {
        let t = Affine::from_rotate(0.5);
        let corners = Rect::new(-5.0, -5.0, 10.0, 10.0).corners().map(|p| t.apply(p));
        let mut m = Mesh::new();
        assert!(wire_rect(&mut m, corners, 1.0));
        let outer = v(&m, 0).length();
        let inner = v(&m, 4).length();
        assert!((outer - 5.5 * 2f32.sqrt()).abs() < 1e-3);
        assert!((inner - 4.5 * 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn zero_height_rect_emits_nothing() {
        let mut m = Mesh::new();
        assert!(!wire_rect(&mut m, Rect::new(0.0, 0.0, 10.0, 0.0).corners(), 1.0));
        assert_eq!(m.vertex_count(), 0);
        assert!(m.is_empty());
    }

    #[test]
    fn collinear_corners_are_rejected() {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(3.0, 0.0),
        ];
        let mut m = Mesh::new();
        assert!(!wire_rect(&mut m, corners, 1.0));
        assert!(m.is_empty());
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        assert!(intersect(Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0)).is_none());
    }
}
