use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::geometry::{Mesh, MeshId, ScratchId, ScratchPool};

use super::common::{interleave, Vertex};

/// GPU copy of a shared mesh.
pub(super) struct GpuMesh {
    pub vbo: wgpu::Buffer,
    pub ibo: wgpu::Buffer,
    pub index_count: u32,
}

/// Location of one scratch mesh inside the frame's packed scratch buffers.
#[derive(Debug, Copy, Clone, Default)]
pub(super) struct ScratchSlice {
    pub first_index: u32,
    pub index_count: u32,
    pub base_vertex: i32,
}

/// Vertex/index buffers for everything the frame draws.
///
/// Shared meshes are uploaded once and kept until their id is released.
/// Scratch meshes are packed back to back into one growable buffer pair and
/// rewritten every frame.
#[derive(Default)]
pub(super) struct MeshBuffers {
    shared: HashMap<MeshId, GpuMesh>,

    scratch_vbo: Option<wgpu::Buffer>,
    scratch_ibo: Option<wgpu::Buffer>,
    scratch_vertex_capacity: usize,
    scratch_index_capacity: usize,
    scratch_slices: Vec<ScratchSlice>,

    vertex_staging: Vec<Vertex>,
    index_staging: Vec<u32>,
}

impl MeshBuffers {
    /// Uploads `mesh` unless a buffer for its id already exists.
    pub(super) fn ensure_shared(&mut self, device: &wgpu::Device, mesh: &Mesh) {
        if self.shared.contains_key(&mesh.id()) || mesh.is_empty() {
            return;
        }
        self.vertex_staging.clear();
        interleave(mesh, &mut self.vertex_staging);

        let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel mesh vbo"),
            contents: bytemuck::cast_slice(&self.vertex_staging),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("easel mesh ibo"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.shared.insert(
            mesh.id(),
            GpuMesh { vbo, ibo, index_count: mesh.index_count() as u32 },
        );
    }

    pub(super) fn shared(&self, id: MeshId) -> Option<&GpuMesh> {
        self.shared.get(&id)
    }

    /// Drops the buffers of meshes the canvas no longer owns.
    pub(super) fn release(&mut self, ids: &[MeshId]) {
        let before = self.shared.len();
        for id in ids {
            self.shared.remove(id);
        }
        let dropped = before - self.shared.len();
        if dropped > 0 {
            log::debug!("released {dropped} mesh buffers ({} resident)", self.shared.len());
        }
    }

    pub(super) fn resident(&self) -> usize {
        self.shared.len()
    }

    /// Packs and uploads this frame's scratch meshes.
    pub(super) fn upload_scratch(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, pool: &ScratchPool) {
        self.scratch_slices.clear();
        self.vertex_staging.clear();
        self.index_staging.clear();

        for mesh in pool.active() {
            let slice = ScratchSlice {
                first_index: self.index_staging.len() as u32,
                index_count: mesh.index_count() as u32,
                base_vertex: self.vertex_staging.len() as i32,
            };
            interleave(mesh, &mut self.vertex_staging);
            self.index_staging.extend_from_slice(&mesh.indices);
            self.scratch_slices.push(slice);
        }

        if self.vertex_staging.is_empty() {
            return;
        }

        if self.scratch_vertex_capacity < self.vertex_staging.len() || self.scratch_vbo.is_none() {
            let cap = self.vertex_staging.len().next_power_of_two().max(256);
            self.scratch_vbo = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel scratch vbo"),
                size: (cap * std::mem::size_of::<Vertex>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.scratch_vertex_capacity = cap;
        }
        if self.scratch_index_capacity < self.index_staging.len() || self.scratch_ibo.is_none() {
            let cap = self.index_staging.len().next_power_of_two().max(512);
            self.scratch_ibo = Some(device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel scratch ibo"),
                size: (cap * std::mem::size_of::<u32>()) as u64,
                usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.scratch_index_capacity = cap;
        }

        if let (Some(vbo), Some(ibo)) = (self.scratch_vbo.as_ref(), self.scratch_ibo.as_ref()) {
            queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.vertex_staging));
            queue.write_buffer(ibo, 0, bytemuck::cast_slice(&self.index_staging));
        }
    }

    pub(super) fn scratch_buffers(&self) -> Option<(&wgpu::Buffer, &wgpu::Buffer)> {
        Some((self.scratch_vbo.as_ref()?, self.scratch_ibo.as_ref()?))
    }

    pub(super) fn scratch_slice(&self, id: ScratchId) -> Option<ScratchSlice> {
        self.scratch_slices.get(id.0 as usize).copied()
    }
}
