use crate::asset::ImageOrientation;

use super::Mesh;

/// Unit square `(0,0)..(1,1)` as two triangles, with UVs oriented for `orientation`.
///
/// Built once per orientation and scaled/rotated per draw via the command transform.
pub fn unit_quad(orientation: ImageOrientation) -> Mesh {
    const CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let mut mesh = Mesh::with_capacity(4, 6);
    for p in CORNERS {
        mesh.push_vertex(p);
    }
    mesh.uvs = CORNERS.iter().map(|&p| orient_uv(p, orientation)).collect();
    mesh.push_triangle(0, 1, 2);
    mesh.push_triangle(0, 2, 3);
    mesh
}

/// Maps a display-space UV to the texel-space UV of the stored picture.
///
/// Quarter turns are undone first (display → upright source), then the storage
/// row order is applied.
fn orient_uv(p: [f32; 2], orientation: ImageOrientation) -> [f32; 2] {
    let [mut u, mut v] = p;
    for _ in 0..orientation.quarter_turns % 4 {
        // Inverse of a clockwise quarter turn: (x, y) → (y, 1 - x).
        (u, v) = (v, 1.0 - u);
    }
    if orientation.flip_y {
        v = 1.0 - v;
    }
    [u, v]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::StorageOrigin;

    #[test]
    fn upright_quad_uvs_match_positions() {
        let q = unit_quad(ImageOrientation::UPRIGHT);
        assert_eq!(q.positions, q.uvs);
        assert_eq!(q.indices, vec![0, 1, 2, 0, 2, 3]);
        assert!(q.is_well_formed());
    }

    #[test]
    fn bottom_left_storage_flips_v() {
        let q = unit_quad(ImageOrientation::new(StorageOrigin::BottomLeft, 0));
        assert_eq!(q.uvs[0], [0.0, 1.0]);
        assert_eq!(q.uvs[2], [1.0, 0.0]);
    }

    #[test]
    fn quarter_turn_samples_left_column_at_top() {
        let q = unit_quad(ImageOrientation::new(StorageOrigin::TopLeft, 1));
        // Display top-left shows the source bottom-left after a clockwise turn.
        assert_eq!(q.uvs[0], [0.0, 1.0]);
        // Display top-right shows the source top-left.
        assert_eq!(q.uvs[1], [0.0, 0.0]);
    }

    #[test]
    fn four_turns_are_identity() {
        let a = unit_quad(ImageOrientation { flip_y: false, quarter_turns: 4 });
        assert_eq!(a.uvs, a.positions);
    }
}
