use anyhow::{Context, Result};

use crate::asset::{Image, StorageOrigin, Texture, TextureId};
use crate::paint::{linear_to_srgb, srgb_to_linear};
use crate::text::{DirtyRows, GlyphAtlas};

use super::RenderCtx;

/// One sampled texture and its bind group.
struct GpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

/// Owns every texture the canvas can reference: registered images/textures and
/// the GPU copy of the glyph atlas.
///
/// Registered textures are `Rgba8UnormSrgb`, so sampling yields linear color
/// to match [`Color`](crate::paint::Color). Uploads premultiply straight-alpha
/// input on the CPU, in linear light.
pub(super) struct TextureRegistry {
    layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    textures: Vec<GpuTexture>,
    atlas: Option<GpuTexture>,
}

impl TextureRegistry {
    pub(super) fn new(device: &wgpu::Device) -> Self {
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("easel texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("easel texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self { layout, sampler, textures: Vec::new(), atlas: None }
    }

    pub(super) fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub(super) fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.textures.get(id.index() as usize).map(|t| &t.bind_group)
    }

    pub(super) fn atlas_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.atlas.as_ref().map(|t| &t.bind_group)
    }

    pub(super) fn len(&self) -> usize {
        self.textures.len()
    }

    /// Registers straight-alpha RGBA8 pixels as a new texture.
    pub(super) fn upload_image(
        &mut self,
        ctx: &RenderCtx<'_>,
        rgba: &[u8],
        width: u32,
        height: u32,
        origin: StorageOrigin,
    ) -> Result<Image> {
        let texture = self.register(ctx, rgba, width, height, wgpu::TextureFormat::Rgba8UnormSrgb, "easel image")?;
        Ok(Image { texture, width, height, origin })
    }

    /// Decodes PNG/JPEG/BMP/GIF bytes and registers the result.
    pub(super) fn load_image(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8]) -> Result<Image> {
        let decoded = image::load_from_memory(bytes).context("failed to decode image")?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded image {width}x{height}");
        self.upload_image(ctx, rgba.as_raw(), width, height, StorageOrigin::TopLeft)
    }

    /// Registers a streaming texture (e.g. a camera feed) with its orientation metadata.
    pub(super) fn upload_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        rgba: &[u8],
        width: u32,
        height: u32,
        origin: StorageOrigin,
        quarter_turns: u8,
    ) -> Result<Texture> {
        let texture = self.register(ctx, rgba, width, height, wgpu::TextureFormat::Rgba8UnormSrgb, "easel texture")?;
        Ok(Texture { texture, width, height, origin, quarter_turns: quarter_turns % 4 })
    }

    /// Replaces the pixels of a registered texture; size must match.
    pub(super) fn update(&mut self, ctx: &RenderCtx<'_>, id: TextureId, rgba: &[u8]) -> Result<()> {
        let entry = self
            .textures
            .get(id.index() as usize)
            .with_context(|| format!("unknown texture {id:?}"))?;
        let premul = premultiply(rgba, entry.width, entry.height)?;
        write_rgba(ctx.queue, &entry.texture, &premul, entry.width, entry.height);
        Ok(())
    }

    /// Creates the atlas texture on first use and uploads the rows changed since
    /// the previous sync, clearing the atlas dirty band.
    pub(super) fn sync_atlas(&mut self, ctx: &RenderCtx<'_>, atlas: &mut GlyphAtlas) {
        let size = atlas.size();
        let fresh = self.atlas.as_ref().is_none_or(|a| a.width != size);
        if fresh {
            let texture = create_texture(ctx.device, size, size, wgpu::TextureFormat::R8Unorm, "easel glyph atlas");
            let bind_group = self.make_bind_group(ctx.device, &texture);
            self.atlas = Some(GpuTexture { texture, bind_group, width: size, height: size });
        }

        let dirty = atlas.take_dirty();
        let rows = if fresh { Some(DirtyRows { y: 0, height: size }) } else { dirty };
        let (Some(rows), Some(gpu)) = (rows, self.atlas.as_ref()) else { return };
        if rows.height == 0 {
            return;
        }

        let start = (rows.y * size) as usize;
        let end = ((rows.y + rows.height) * size) as usize;
        let Some(pixels) = atlas.pixels().get(start..end) else { return };

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: rows.y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: Some(rows.height),
            },
            wgpu::Extent3d { width: size, height: rows.height, depth_or_array_layers: 1 },
        );
    }

    fn register(
        &mut self,
        ctx: &RenderCtx<'_>,
        rgba: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        label: &str,
    ) -> Result<TextureId> {
        anyhow::ensure!(width > 0 && height > 0, "texture has zero size ({width}x{height})");
        let premul = premultiply(rgba, width, height)?;

        let texture = create_texture(ctx.device, width, height, format, label);
        write_rgba(ctx.queue, &texture, &premul, width, height);
        let bind_group = self.make_bind_group(ctx.device, &texture);

        let id = TextureId(u32::try_from(self.textures.len()).context("too many textures")?);
        self.textures.push(GpuTexture { texture, bind_group, width, height });
        log::debug!("registered texture {id:?} ({width}x{height})");
        Ok(id)
    }

    fn make_bind_group(&self, device: &wgpu::Device, texture: &wgpu::Texture) -> wgpu::BindGroup {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("easel texture bind group"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&self.sampler) },
            ],
        })
    }
}

fn create_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
    label: &str,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn write_rgba(queue: &wgpu::Queue, texture: &wgpu::Texture, rgba: &[u8], width: u32, height: u32) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    );
}

/// Straight → premultiplied sRGB-encoded RGBA8. Color is scaled by alpha in
/// linear light and re-encoded; opaque and fully transparent pixels skip the math.
pub(super) fn premultiply(rgba: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected = width as usize * height as usize * 4;
    anyhow::ensure!(
        rgba.len() == expected,
        "pixel buffer is {} bytes, expected {expected} for {width}x{height} RGBA8",
        rgba.len()
    );
    Ok(rgba
        .chunks_exact(4)
        .flat_map(|px| match px[3] {
            255 => [px[0], px[1], px[2], 255],
            0 => [0; 4],
            alpha => {
                let a = alpha as f32 / 255.0;
                let mul = |c: u8| {
                    let lin = srgb_to_linear(c as f32 / 255.0) * a;
                    (linear_to_srgb(lin) * 255.0).round().clamp(0.0, 255.0) as u8
                };
                [mul(px[0]), mul(px[1]), mul(px[2]), alpha]
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premultiply_scales_color_by_alpha_in_linear_light() {
        let out = premultiply(&[255, 128, 0, 128, 10, 20, 30, 255], 2, 1).unwrap();
        // Half alpha in linear light re-encodes brighter than half the byte.
        assert!(out[0].abs_diff(188) <= 1, "{out:?}");
        assert!(out[1].abs_diff(93) <= 1, "{out:?}");
        assert_eq!(out[2..8], [0, 128, 10, 20, 30, 255]);
    }

    #[test]
    fn premultiply_clears_transparent_pixels() {
        let out = premultiply(&[200, 100, 50, 0], 1, 1).unwrap();
        assert_eq!(out, vec![0, 0, 0, 0]);
    }

    #[test]
    fn premultiply_rejects_wrong_length() {
        assert!(premultiply(&[0; 12], 2, 2).is_err());
    }
}
