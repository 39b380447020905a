use super::Mesh;

/// Index of a mesh checked out of a [`ScratchPool`] for the current frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ScratchId(pub(crate) u32);

/// Per-frame pool of meshes rebuilt on every draw (outlines, lines).
///
/// Meshes are checked out during the frame and returned in bulk by
/// [`recycle`](Self::recycle) at the start of the next one. Allocations are kept,
/// so a steady-state frame allocates nothing here.
#[derive(Debug, Default)]
pub struct ScratchPool {
    meshes: Vec<Mesh>,
    in_use: usize,
}

impl ScratchPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds into a fresh scratch mesh.
    ///
    /// If `build` returns `false` the mesh goes straight back to the pool and
    /// `None` is returned.
    pub fn build<F>(&mut self, build: F) -> Option<ScratchId>
    where
        F: FnOnce(&mut Mesh) -> bool,
    {
        if self.in_use == self.meshes.len() {
            self.meshes.push(Mesh::new());
        }
        let mesh = &mut self.meshes[self.in_use];
        mesh.clear();

        if !build(mesh) || mesh.is_empty() {
            mesh.clear();
            return None;
        }

        let id = ScratchId(self.in_use as u32);
        self.in_use += 1;
        Some(id)
    }

    #[inline]
    pub fn get(&self, id: ScratchId) -> Option<&Mesh> {
        let i = id.0 as usize;
        if i < self.in_use { self.meshes.get(i) } else { None }
    }

    /// Meshes checked out this frame, in checkout order.
    pub fn active(&self) -> &[Mesh] {
        &self.meshes[..self.in_use]
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Total meshes owned, including idle ones.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.meshes.len()
    }

    /// Returns every checked-out mesh to the pool.
    pub fn recycle(&mut self) {
        self.in_use = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(m: &mut Mesh) -> bool {
        let a = m.push_vertex([0.0, 0.0]);
        let b = m.push_vertex([1.0, 0.0]);
        let c = m.push_vertex([0.0, 1.0]);
        m.push_triangle(a, b, c);
        true
    }

    #[test]
    fn checkout_hands_out_sequential_ids() {
        let mut pool = ScratchPool::new();
        let a = pool.build(tri).unwrap();
        let b = pool.build(tri).unwrap();
        assert_ne!(a, b);
        assert_eq!(pool.in_use(), 2);
        assert_eq!(pool.get(b).unwrap().vertex_count(), 3);
    }

    #[test]
    fn failed_build_returns_the_mesh() {
        let mut pool = ScratchPool::new();
        assert!(pool.build(|_| false).is_none());
        assert_eq!(pool.in_use(), 0);
        assert!(pool.build(tri).is_some());
        assert_eq!(pool.capacity(), 1);
    }

    #[test]
    fn recycle_reuses_allocations() {
        let mut pool = ScratchPool::new();
        let first = pool.build(tri).unwrap();
        pool.recycle();
        assert!(pool.get(first).is_none());
        assert!(pool.active().is_empty());

        pool.build(tri).unwrap();
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.active()[0].vertex_count(), 3);
    }
}
