use anyhow::Result;

use crate::asset::{Image, StorageOrigin, Texture};

use super::{FrameComposer, RenderCtx};

/// Upload access handed to sketches: turns pixels into value handles the canvas can draw.
pub struct Resources<'a> {
    ctx: RenderCtx<'a>,
    composer: &'a mut FrameComposer,
}

impl<'a> Resources<'a> {
    pub fn new(ctx: RenderCtx<'a>, composer: &'a mut FrameComposer) -> Self {
        Self { ctx, composer }
    }

    pub fn load_image(&mut self, bytes: &[u8]) -> Result<Image> {
        self.composer.load_image(&self.ctx, bytes)
    }

    pub fn upload_image(&mut self, rgba: &[u8], width: u32, height: u32, origin: StorageOrigin) -> Result<Image> {
        self.composer.upload_image(&self.ctx, rgba, width, height, origin)
    }

    pub fn upload_texture(
        &mut self,
        rgba: &[u8],
        width: u32,
        height: u32,
        origin: StorageOrigin,
        quarter_turns: u8,
    ) -> Result<Texture> {
        self.composer
            .upload_texture(&self.ctx, rgba, width, height, origin, quarter_turns)
    }

    pub fn update_texture(&mut self, texture: &Texture, rgba: &[u8]) -> Result<()> {
        self.composer.update_texture(&self.ctx, texture, rgba)
    }
}
