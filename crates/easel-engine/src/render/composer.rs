use anyhow::Result;

use crate::asset::{Image, StorageOrigin, Texture};
use crate::canvas::FrameView;
use crate::paint::{Material, TextureSource};
use crate::scene::{DrawCmd, MeshRef};

use super::common::{
    premul_alpha_blend, uniform_binding_size, BlitUniform, DrawInstance, Globals, Vertex, DEPTH_FORMAT,
};
use super::meshes::MeshBuffers;
use super::textures::TextureRegistry;
use super::{RenderCtx, RenderTarget};

/// Pipelines and layouts for one target format.
struct Pipelines {
    format: wgpu::TextureFormat,
    globals_bgl: wgpu::BindGroupLayout,
    blit_bgl: wgpu::BindGroupLayout,
    solid_opaque: wgpu::RenderPipeline,
    solid_blend: wgpu::RenderPipeline,
    textured_blend: wgpu::RenderPipeline,
    blit: wgpu::RenderPipeline,
}

/// Device-sized color + depth targets the canvas is drawn into.
struct Offscreen {
    size: (u32, u32),
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    blit_bind_group: wgpu::BindGroup,
}

/// GPU side of the frame: uploads what a [`FrameView`] references and draws it.
///
/// Per frame:
/// 1. sync the glyph atlas and upload missing shared meshes and all scratch meshes
/// 2. clear the offscreen target to the background color and depth to 1
/// 3. draw the opaque list (depth write), then the transparent list (depth test only)
/// 4. blit the offscreen target to the surface, border color outside the canvas
/// 5. drop buffers of released meshes
///
/// GPU objects are created lazily on first use and rebuilt when the surface format
/// or size changes.
#[derive(Default)]
pub struct FrameComposer {
    pipelines: Option<Pipelines>,
    textures: Option<TextureRegistry>,
    meshes: MeshBuffers,

    globals_ubo: Option<wgpu::Buffer>,
    globals_bind_group: Option<wgpu::BindGroup>,
    blit_ubo: Option<wgpu::Buffer>,
    offscreen: Option<Offscreen>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
    instances: Vec<DrawInstance>,
}

impl FrameComposer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── resources ──────────────────────────────────────────────────────────

    /// Registers straight-alpha RGBA8 pixels as an image.
    pub fn upload_image(
        &mut self,
        ctx: &RenderCtx<'_>,
        rgba: &[u8],
        width: u32,
        height: u32,
        origin: StorageOrigin,
    ) -> Result<Image> {
        self.textures(ctx).upload_image(ctx, rgba, width, height, origin)
    }

    /// Decodes an encoded image (PNG, JPEG, BMP, GIF) and registers it.
    pub fn load_image(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8]) -> Result<Image> {
        self.textures(ctx).load_image(ctx, bytes)
    }

    /// Registers a texture whose pixels are replaced over time, such as camera frames.
    pub fn upload_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        rgba: &[u8],
        width: u32,
        height: u32,
        origin: StorageOrigin,
        quarter_turns: u8,
    ) -> Result<Texture> {
        self.textures(ctx)
            .upload_texture(ctx, rgba, width, height, origin, quarter_turns)
    }

    /// Replaces the pixels of a texture registered by this composer.
    pub fn update_texture(&mut self, ctx: &RenderCtx<'_>, texture: &Texture, rgba: &[u8]) -> Result<()> {
        self.textures(ctx).update(ctx, texture.texture, rgba)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.as_ref().map_or(0, TextureRegistry::len)
    }

    /// Shared meshes currently holding GPU buffers.
    pub fn resident_meshes(&self) -> usize {
        self.meshes.resident()
    }

    // ── frame ──────────────────────────────────────────────────────────────

    /// Draws `frame` into `target`.
    ///
    /// The glyph atlas is synced even when the target is empty (minimized window),
    /// since later frames reuse glyphs placed during this one.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, mut frame: FrameView<'_>) {
        self.textures(ctx).sync_atlas(ctx, &mut *frame.atlas);

        let (width, height) = target.size;
        if width == 0 || height == 0 {
            self.meshes.release(&frame.released);
            return;
        }

        self.ensure_pipelines(ctx);
        self.ensure_globals(ctx);
        self.ensure_offscreen(ctx, width, height);

        for cmd in frame.opaque.iter().chain(frame.transparent) {
            if let MeshRef::Shared(mesh) = &cmd.mesh {
                self.meshes.ensure_shared(ctx.device, mesh);
            }
        }
        self.meshes.upload_scratch(ctx.device, ctx.queue, frame.scratch);

        self.instances.clear();
        self.instances.extend(frame.opaque.iter().chain(frame.transparent).map(DrawInstance::from_cmd));
        self.write_instances(ctx);

        if let Some(ubo) = self.globals_ubo.as_ref() {
            let globals = Globals::new(frame.mapping.canvas_to_device_affine(), width, height);
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&globals));
        }
        if let Some(ubo) = self.blit_ubo.as_ref() {
            let blit = BlitUniform::new(frame.mapping.canvas_rect_in_device(), frame.border, ctx.target_format);
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&blit));
        }

        self.draw_canvas(target, &frame);
        self.blit(target);

        self.meshes.release(&frame.released);
    }

    fn draw_canvas(&self, target: &mut RenderTarget<'_>, frame: &FrameView<'_>) {
        let Some(p) = self.pipelines.as_ref() else { return };
        let Some(off) = self.offscreen.as_ref() else { return };
        let Some(globals) = self.globals_bind_group.as_ref() else { return };
        let Some(textures) = self.textures.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel canvas pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &off.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(frame.background.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &off.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if self.instances.is_empty() {
            return;
        }
        let Some(instance_vbo) = self.instance_vbo.as_ref() else { return };

        rpass.set_bind_group(0, globals, &[]);
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));

        rpass.set_pipeline(&p.solid_opaque);
        for (i, cmd) in frame.opaque.iter().enumerate() {
            self.draw_mesh(&mut rpass, cmd, i as u32);
        }

        let base = frame.opaque.len() as u32;
        let mut bound: Option<Option<TextureSource>> = None;
        for (i, cmd) in frame.transparent.iter().enumerate() {
            let source = match cmd.material {
                Material::Solid(_) => None,
                Material::Textured { source, .. } => Some(source),
            };
            if bound != Some(source) {
                match source {
                    None => rpass.set_pipeline(&p.solid_blend),
                    Some(src) => {
                        let group = match src {
                            TextureSource::GlyphAtlas => textures.atlas_bind_group(),
                            TextureSource::Texture(id) => textures.bind_group(id),
                        };
                        let Some(group) = group else {
                            log::trace!("skipping draw with unregistered texture {src:?}");
                            continue;
                        };
                        rpass.set_pipeline(&p.textured_blend);
                        rpass.set_bind_group(1, group, &[]);
                    }
                }
                bound = Some(source);
            }
            self.draw_mesh(&mut rpass, cmd, base + i as u32);
        }
    }

    fn draw_mesh(&self, rpass: &mut wgpu::RenderPass<'_>, cmd: &DrawCmd, instance: u32) {
        let instances = instance..instance + 1;
        match &cmd.mesh {
            MeshRef::Shared(mesh) => {
                let Some(gpu) = self.meshes.shared(mesh.id()) else { return };
                rpass.set_vertex_buffer(0, gpu.vbo.slice(..));
                rpass.set_index_buffer(gpu.ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..gpu.index_count, 0, instances);
            }
            MeshRef::Scratch(id) => {
                let Some((vbo, ibo)) = self.meshes.scratch_buffers() else { return };
                let Some(slice) = self.meshes.scratch_slice(*id) else { return };
                rpass.set_vertex_buffer(0, vbo.slice(..));
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(
                    slice.first_index..slice.first_index + slice.index_count,
                    slice.base_vertex,
                    instances,
                );
            }
        }
    }

    fn blit(&self, target: &mut RenderTarget<'_>) {
        let Some(p) = self.pipelines.as_ref() else { return };
        let Some(off) = self.offscreen.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("easel blit pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_pipeline(&p.blit);
        rpass.set_bind_group(0, &off.blit_bind_group, &[]);
        rpass.draw(0..3, 0..1);
    }

    // ── lazy init ──────────────────────────────────────────────────────────

    fn textures(&mut self, ctx: &RenderCtx<'_>) -> &mut TextureRegistry {
        self.textures.get_or_insert_with(|| TextureRegistry::new(ctx.device))
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == ctx.target_format) {
            return;
        }
        let Some(textures) = self.textures.as_ref() else { return };
        let device = ctx.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });
        let blit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("easel blit shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/blit.wgsl").into()),
        });

        let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel globals bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: uniform_binding_size::<Globals>(),
                },
                count: None,
            }],
        });
        let blit_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel blit bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: uniform_binding_size::<BlitUniform>(),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let solid_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel solid pipeline layout"),
            bind_group_layouts: &[&globals_bgl],
            immediate_size: 0,
        });
        let textured_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel textured pipeline layout"),
            bind_group_layouts: &[&globals_bgl, textures.layout()],
            immediate_size: 0,
        });
        let blit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("easel blit pipeline layout"),
            bind_group_layouts: &[&blit_bgl],
            immediate_size: 0,
        });

        let mesh_pipeline = |label: &str, layout: &wgpu::PipelineLayout, fs: &str, opaque: bool| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[Vertex::layout(), DrawInstance::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(fs),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: ctx.target_format,
                        blend: if opaque { None } else { Some(premul_alpha_blend()) },
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: opaque,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        let solid_opaque = mesh_pipeline("easel solid opaque pipeline", &solid_layout, "fs_solid", true);
        let solid_blend = mesh_pipeline("easel solid blend pipeline", &solid_layout, "fs_solid", false);
        let textured_blend = mesh_pipeline("easel textured pipeline", &textured_layout, "fs_textured", false);

        let blit = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("easel blit pipeline"),
            layout: Some(&blit_layout),
            vertex: wgpu::VertexState {
                module: &blit_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &blit_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built canvas pipelines for {:?}", ctx.target_format);
        self.pipelines = Some(Pipelines {
            format: ctx.target_format,
            globals_bgl,
            blit_bgl,
            solid_opaque,
            solid_blend,
            textured_blend,
            blit,
        });
        self.globals_bind_group = None;
        self.offscreen = None;
    }

    fn ensure_globals(&mut self, ctx: &RenderCtx<'_>) {
        if self.globals_bind_group.is_some() {
            return;
        }
        let Some(p) = self.pipelines.as_ref() else { return };

        let ubo = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("easel globals ubo"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel globals bind group"),
            layout: &p.globals_bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
        });
        self.globals_ubo = Some(ubo);
        self.globals_bind_group = Some(bind_group);
    }

    fn ensure_offscreen(&mut self, ctx: &RenderCtx<'_>, width: u32, height: u32) {
        if self.offscreen.as_ref().is_some_and(|o| o.size == (width, height)) {
            return;
        }
        let Some(p) = self.pipelines.as_ref() else { return };
        let device = ctx.device;
        let size = wgpu::Extent3d { width, height, depth_or_array_layers: 1 };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("easel offscreen color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: ctx.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("easel offscreen depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let blit_ubo = self.blit_ubo.get_or_insert_with(|| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel blit ubo"),
                size: std::mem::size_of::<BlitUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel blit bind group"),
            layout: &p.blit_bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: blit_ubo.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(&color_view) },
            ],
        });

        log::debug!("offscreen target {width}x{height}");
        self.offscreen = Some(Offscreen {
            size: (width, height),
            color_view,
            depth_view,
            blit_bind_group,
        });
    }

    fn write_instances(&mut self, ctx: &RenderCtx<'_>) {
        if self.instances.is_empty() {
            return;
        }
        if self.instances.len() > self.instance_capacity || self.instance_vbo.is_none() {
            let cap = self.instances.len().next_power_of_two().max(64);
            self.instance_vbo = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("easel instance vbo"),
                size: (cap * std::mem::size_of::<DrawInstance>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.instance_capacity = cap;
        }
        if let Some(vbo) = self.instance_vbo.as_ref() {
            ctx.queue.write_buffer(vbo, 0, bytemuck::cast_slice(&self.instances));
        }
    }
}
