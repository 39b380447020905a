use super::DrawCmd;

/// Ordered draw commands recorded for one frame.
///
/// Keeps its allocation across frames; `clear()` is O(1) apart from dropping the
/// `Rc` handles of shared meshes.
#[derive(Debug, Default)]
pub struct CommandList {
    items: Vec<DrawCmd>,
}

impl CommandList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd) {
        self.items.push(cmd);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drops every command for which `keep` returns `false`, preserving order.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&DrawCmd) -> bool,
    {
        self.items.retain(keep);
    }

    /// Commands in submission order.
    #[inline]
    pub fn items(&self) -> &[DrawCmd] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The two per-frame lists: solid opaque fills, then everything that blends.
#[derive(Debug, Default)]
pub struct FrameLists {
    pub opaque: CommandList,
    pub transparent: CommandList,
}

impl FrameLists {
    /// Routes `cmd` by its material: opaque iff solid with full alpha.
    pub fn enqueue(&mut self, cmd: DrawCmd) {
        if cmd.is_opaque() {
            self.opaque.push(cmd);
        } else {
            self.transparent.push(cmd);
        }
    }

    pub fn clear(&mut self) {
        self.opaque.clear();
        self.transparent.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All commands of the frame in depth order, merging both lists.
    pub fn iter_by_depth(&self) -> impl Iterator<Item = &DrawCmd> {
        let mut all: Vec<&DrawCmd> = self.opaque.items().iter().chain(self.transparent.items()).collect();
        all.sort_by_key(|c| c.depth);
        all.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::coords::Affine;
    use crate::geometry::Mesh;
    use crate::paint::{Color, Material, TextureSource};
    use crate::scene::{Depth, MeshRef};

    fn cmd(depth: u32, material: Material) -> DrawCmd {
        DrawCmd {
            mesh: MeshRef::Shared(Rc::new(Mesh::new())),
            transform: Affine::IDENTITY,
            depth: Depth(depth),
            material,
        }
    }

    #[test]
    fn enqueue_routes_by_material() {
        let mut lists = FrameLists::default();
        lists.enqueue(cmd(0, Material::Solid(Color::RED)));
        lists.enqueue(cmd(1, Material::Solid(Color::RED.with_alpha(0.5))));
        lists.enqueue(cmd(2, Material::Textured { source: TextureSource::GlyphAtlas, tint: Color::WHITE }));
        assert_eq!(lists.opaque.len(), 1);
        assert_eq!(lists.transparent.len(), 2);
    }

    #[test]
    fn iter_by_depth_interleaves_lists() {
        let mut lists = FrameLists::default();
        lists.enqueue(cmd(0, Material::Solid(Color::RED.with_alpha(0.5))));
        lists.enqueue(cmd(1, Material::Solid(Color::RED)));
        lists.enqueue(cmd(2, Material::Solid(Color::BLUE.with_alpha(0.1))));
        let order: Vec<u32> = lists.iter_by_depth().map(|c| c.depth.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn clear_empties_both() {
        let mut lists = FrameLists::default();
        lists.enqueue(cmd(0, Material::Solid(Color::RED)));
        lists.enqueue(cmd(1, Material::Solid(Color::TRANSPARENT)));
        lists.clear();
        assert!(lists.is_empty());
    }
}
