// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Uploads textures once and re-syncs them when their change counters move.

use ahash::AHashMap;
use prism_core::asset::{AssetId, AssetUUID};
use prism_core::renderer::{
    GraphicsContext, RenderError, ResourceError, ResourceLoadError, SamplerParams, TextureFormat,
    TextureId,
};
use prism_data::assets::{Assets, Texture};

/// Placeholder textures owned by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinTexture {
    /// 50% gray, bound to samplers a material leaves unset.
    Gray,
    /// Magenta, bound where a texture failed to resolve.
    Error,
    /// A flat tangent-space normal.
    Normal,
    /// Opaque white.
    White,
}

impl BuiltinTexture {
    const ALL: [BuiltinTexture; 4] = [
        BuiltinTexture::Gray,
        BuiltinTexture::Error,
        BuiltinTexture::Normal,
        BuiltinTexture::White,
    ];

    fn rgba(self) -> [u8; 4] {
        match self {
            BuiltinTexture::Gray => [128, 128, 128, 255],
            BuiltinTexture::Error => [255, 0, 255, 255],
            BuiltinTexture::Normal => [128, 128, 255, 255],
            BuiltinTexture::White => [255, 255, 255, 255],
        }
    }
}

/// The GPU side of one texture asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuTexture {
    /// The texture object.
    pub texture: TextureId,
    /// Width at the last pixel upload.
    pub width: u32,
    /// Height at the last pixel upload.
    pub height: u32,
    data_version: u64,
    sampler_version: u64,
}

impl GpuTexture {
    fn upload(
        ctx: &mut dyn GraphicsContext,
        texture: &Texture,
    ) -> Result<Self, ResourceError> {
        let id = ctx.create_texture()?;
        upload_pixels(ctx, id, texture)?;
        ctx.set_sampler(id, texture.sampler())?;
        Ok(Self {
            texture: id,
            width: texture.width(),
            height: texture.height(),
            data_version: texture.data_version(),
            sampler_version: texture.sampler_version(),
        })
    }

    /// Re-uploads pixels iff the data counter moved and re-applies the
    /// sampler iff the parameter counter moved.
    fn sync(&mut self, ctx: &mut dyn GraphicsContext, texture: &Texture) -> Result<(), ResourceError> {
        if texture.data_version() != self.data_version {
            upload_pixels(ctx, self.texture, texture)?;
            self.width = texture.width();
            self.height = texture.height();
            self.data_version = texture.data_version();
            log::trace!("Re-uploaded pixels of texture {:?}", self.texture);
        }
        if texture.sampler_version() != self.sampler_version {
            ctx.set_sampler(self.texture, texture.sampler())?;
            self.sampler_version = texture.sampler_version();
            log::trace!("Re-applied sampler of texture {:?}", self.texture);
        }
        Ok(())
    }
}

fn upload_pixels(
    ctx: &mut dyn GraphicsContext,
    id: TextureId,
    texture: &Texture,
) -> Result<(), ResourceError> {
    ctx.upload_texture(
        id,
        texture.width(),
        texture.height(),
        texture.format(),
        texture.pixels(),
    )
}

/// Maps texture assets to GPU texture objects, one object per asset.
#[derive(Debug)]
pub struct TextureCache {
    textures: AHashMap<AssetUUID, GpuTexture>,
    builtins: [TextureId; 4],
}

impl TextureCache {
    /// Creates the cache and uploads the built-in placeholder textures.
    pub fn new(ctx: &mut dyn GraphicsContext) -> Result<Self, ResourceError> {
        let mut builtins = [TextureId(0); 4];
        for (slot, builtin) in builtins.iter_mut().zip(BuiltinTexture::ALL) {
            let id = ctx.create_texture()?;
            ctx.upload_texture(id, 1, 1, TextureFormat::Rgba8, &builtin.rgba())?;
            ctx.set_sampler(id, &SamplerParams::NEAREST_CLAMP)?;
            *slot = id;
        }
        log::debug!("Built-in placeholder textures ready");
        Ok(Self {
            textures: AHashMap::new(),
            builtins,
        })
    }

    /// The texture object of a placeholder.
    pub fn builtin(&self, which: BuiltinTexture) -> TextureId {
        let index = BuiltinTexture::ALL
            .iter()
            .position(|b| *b == which)
            .unwrap_or(0);
        self.builtins[index]
    }

    /// Returns the GPU texture for an asset, creating it on a miss and
    /// syncing it on a hit.
    pub fn get(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        id: AssetId<Texture>,
        texture: &Texture,
    ) -> Result<TextureId, ResourceError> {
        if let Some(record) = self.textures.get_mut(&id.uuid()) {
            record.sync(ctx, texture)?;
            return Ok(record.texture);
        }
        let record = GpuTexture::upload(ctx, texture)?;
        log::debug!(
            "Uploaded texture {} ({}x{}) as {:?}",
            id.uuid(),
            record.width,
            record.height,
            record.texture
        );
        let handle = record.texture;
        self.textures.insert(id.uuid(), record);
        Ok(handle)
    }

    /// Looks the asset up in `textures` and returns its GPU texture.
    ///
    /// ## Errors
    /// * `ResourceLoadError::MissingTexture` - The asset is not loaded.
    pub fn get_loaded(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        id: AssetId<Texture>,
        textures: &Assets<Texture>,
    ) -> Result<TextureId, RenderError> {
        let texture = textures
            .get(id)
            .ok_or(ResourceLoadError::MissingTexture { texture: id.uuid() })?;
        Ok(self.get(ctx, id, texture)?)
    }

    /// The cached record for an asset, if it was ever uploaded.
    pub fn record(&self, id: AssetId<Texture>) -> Option<&GpuTexture> {
        self.textures.get(&id.uuid())
    }

    /// Number of cached asset textures, not counting placeholders.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Returns `true` if no asset texture is cached.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
