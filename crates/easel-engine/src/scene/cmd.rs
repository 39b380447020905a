use std::rc::Rc;

use crate::coords::Affine;
use crate::geometry::{Mesh, MeshId, ScratchId, ScratchPool};
use crate::paint::Material;

use super::Depth;

/// Geometry referenced by a draw command.
#[derive(Debug, Clone)]
pub enum MeshRef {
    /// Long-lived mesh (unit quad, cached circle or text). The GPU copy is kept
    /// across frames, keyed by [`MeshId`].
    Shared(Rc<Mesh>),
    /// Mesh rebuilt this frame in the scratch pool; uploaded every frame.
    Scratch(ScratchId),
}

impl MeshRef {
    /// Resolves the reference against this frame's scratch pool.
    pub fn resolve<'a>(&'a self, scratch: &'a ScratchPool) -> Option<&'a Mesh> {
        match self {
            MeshRef::Shared(m) => Some(m),
            MeshRef::Scratch(id) => scratch.get(*id),
        }
    }

    /// Id of a shared mesh; scratch meshes have no stable identity.
    pub fn shared_id(&self) -> Option<MeshId> {
        match self {
            MeshRef::Shared(m) => Some(m.id()),
            MeshRef::Scratch(_) => None,
        }
    }
}

/// One GPU draw: geometry, placement, painter's depth and material.
#[derive(Debug, Clone)]
pub struct DrawCmd {
    pub mesh: MeshRef,
    /// Mesh-local → canvas units.
    pub transform: Affine,
    pub depth: Depth,
    pub material: Material,
}

impl DrawCmd {
    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.material.is_opaque()
    }
}
