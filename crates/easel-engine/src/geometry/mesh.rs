use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a mesh for GPU buffer caching.
///
/// Ids are process-unique; the renderer keys uploaded buffers by them and drops
/// the buffers when the canvas reports the id as released.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        MeshId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Indexed triangle geometry.
///
/// `uvs` and `colors` are either empty (absent) or have one entry per position.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    id: MeshId,
    pub positions: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    pub colors: Vec<[f32; 4]>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            id: MeshId::next(),
            positions: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            id: MeshId::next(),
            positions: Vec::with_capacity(vertices),
            uvs: Vec::new(),
            colors: Vec::new(),
            indices: Vec::with_capacity(indices),
        }
    }

    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    #[inline]
    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    #[inline]
    pub fn has_colors(&self) -> bool {
        !self.colors.is_empty()
    }

    /// Drops all geometry, keeping the allocations and the id.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
    }

    /// Appends a vertex and returns its index.
    #[inline]
    pub(crate) fn push_vertex(&mut self, pos: [f32; 2]) -> u32 {
        let i = self.positions.len() as u32;
        self.positions.push(pos);
        i
    }

    #[inline]
    pub(crate) fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Checks the attribute-length and index-range invariants.
    pub fn is_well_formed(&self) -> bool {
        let n = self.positions.len();
        (self.uvs.is_empty() || self.uvs.len() == n)
            && (self.colors.is_empty() || self.colors.len() == n)
            && self.indices.len() % 3 == 0
            && self.indices.iter().all(|&i| (i as usize) < n)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Mesh::new().id(), Mesh::new().id());
    }

    #[test]
    fn clear_keeps_id() {
        let mut m = Mesh::new();
        let id = m.id();
        m.push_vertex([0.0, 0.0]);
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.vertex_count(), 0);
        assert_eq!(m.id(), id);
    }

    #[test]
    fn out_of_range_index_is_malformed() {
        let mut m = Mesh::new();
        m.push_vertex([0.0, 0.0]);
        m.push_triangle(0, 0, 1);
        assert!(!m.is_well_formed());
    }
}
