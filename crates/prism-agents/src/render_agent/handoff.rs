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

//! Hands decoded resources from loader threads to the render thread.

use prism_core::asset::{AssetId, AssetUUID};
use prism_core::renderer::{RenderError, ResourceLoadError, TextureFormat, VertexFormat};
use prism_data::assets::{AssetLibrary, Indices, Mesh, Texture};

/// A fully decoded payload waiting to replace an asset's content.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceUpdate {
    /// New pixel content for a loaded texture.
    Texture {
        /// The texture to replace.
        id: AssetId<Texture>,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Pixel layout.
        format: TextureFormat,
        /// Tightly packed rows.
        pixels: Vec<u8>,
    },
    /// New geometry for a loaded mesh.
    Mesh {
        /// The mesh to replace.
        id: AssetId<Mesh>,
        /// Vertex layout.
        format: VertexFormat,
        /// Interleaved vertex floats.
        vertices: Vec<f32>,
        /// Element indices, if any.
        indices: Option<Indices>,
    },
    /// The loader gave up on an asset.
    Failed {
        /// The asset that failed.
        asset: AssetUUID,
        /// The loader's explanation.
        reason: String,
    },
}

impl ResourceUpdate {
    /// The asset this update targets.
    pub fn asset(&self) -> AssetUUID {
        match self {
            ResourceUpdate::Texture { id, .. } => id.uuid(),
            ResourceUpdate::Mesh { id, .. } => id.uuid(),
            ResourceUpdate::Failed { asset, .. } => *asset,
        }
    }

    /// Swaps the payload into the library as a whole.
    ///
    /// A successful swap bumps the asset's change counter exactly once. An
    /// invalid payload leaves the asset untouched.
    ///
    /// ## Errors
    /// * `ResourceLoadError::MissingTexture` / `MissingMesh` - The target is not loaded.
    /// * `ResourceLoadError::InvalidPixelData` / `InvalidVertexData` /
    ///   `IndexOutOfRange` - The payload is malformed.
    /// * `ResourceLoadError::DecodeFailed` - The update reports a loader failure.
    pub fn apply(self, assets: &mut AssetLibrary) -> Result<AssetUUID, RenderError> {
        match self {
            ResourceUpdate::Texture {
                id,
                width,
                height,
                format,
                pixels,
            } => {
                let texture = assets
                    .textures
                    .get_mut(id)
                    .ok_or(ResourceLoadError::MissingTexture { texture: id.uuid() })?;
                texture.replace_pixels(width, height, format, pixels)?;
                Ok(id.uuid())
            }
            ResourceUpdate::Mesh {
                id,
                format,
                vertices,
                indices,
            } => {
                let mesh = assets
                    .meshes
                    .get_mut(id)
                    .ok_or(ResourceLoadError::MissingMesh { mesh: id.uuid() })?;
                mesh.replace(format, vertices, indices)?;
                Ok(id.uuid())
            }
            ResourceUpdate::Failed { asset, reason } => {
                Err(ResourceLoadError::DecodeFailed { asset, reason }.into())
            }
        }
    }
}

/// The sending half of the hand-off queue. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct ResourceHandoff {
    sender: flume::Sender<ResourceUpdate>,
}

impl ResourceHandoff {
    pub(crate) fn new(sender: flume::Sender<ResourceUpdate>) -> Self {
        Self { sender }
    }

    /// Queues an update for the next frame.
    ///
    /// Returns `false` if the render agent is gone.
    pub fn submit(&self, update: ResourceUpdate) -> bool {
        let asset = update.asset();
        match self.sender.send(update) {
            Ok(()) => true,
            Err(_) => {
                log::warn!("Dropped update for asset {asset}: render agent is gone");
                false
            }
        }
    }

    /// Queues replacement pixels for a texture.
    pub fn submit_texture(
        &self,
        id: AssetId<Texture>,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: Vec<u8>,
    ) -> bool {
        self.submit(ResourceUpdate::Texture {
            id,
            width,
            height,
            format,
            pixels,
        })
    }

    /// Queues replacement geometry for a mesh.
    pub fn submit_mesh(
        &self,
        id: AssetId<Mesh>,
        format: VertexFormat,
        vertices: Vec<f32>,
        indices: Option<Indices>,
    ) -> bool {
        self.submit(ResourceUpdate::Mesh {
            id,
            format,
            vertices,
            indices,
        })
    }

    /// Reports that decoding an asset failed.
    pub fn report_failure(&self, asset: AssetUUID, reason: impl Into<String>) -> bool {
        self.submit(ResourceUpdate::Failed {
            asset,
            reason: reason.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_update_bumps_the_data_counter_once() {
        let mut assets = AssetLibrary::new();
        let id = assets.textures.add(Texture::solid([0, 0, 0, 255]));
        let update = ResourceUpdate::Texture {
            id,
            width: 2,
            height: 1,
            format: TextureFormat::Rgba8,
            pixels: vec![255; 8],
        };

        assert_eq!(update.apply(&mut assets), Ok(id.uuid()));
        let texture = assets.textures.get(id).expect("texture");
        assert_eq!(texture.data_version(), 1);
        assert_eq!(texture.sampler_version(), 0);
        assert_eq!(texture.width(), 2);
    }

    #[test]
    fn malformed_payload_leaves_the_asset_untouched() {
        let mut assets = AssetLibrary::new();
        let id = assets.textures.add(Texture::solid([0, 0, 0, 255]));
        let update = ResourceUpdate::Texture {
            id,
            width: 4,
            height: 4,
            format: TextureFormat::Rgba8,
            pixels: vec![0; 3],
        };

        assert!(matches!(
            update.apply(&mut assets),
            Err(RenderError::ResourceLoad(
                ResourceLoadError::InvalidPixelData { .. }
            ))
        ));
        assert_eq!(assets.textures.get(id).expect("texture").data_version(), 0);
    }

    #[test]
    fn submit_fails_once_the_receiver_is_dropped() {
        let (sender, receiver) = flume::unbounded();
        let handoff = ResourceHandoff::new(sender);
        assert!(handoff.report_failure(AssetUUID::new(), "truncated file"));
        drop(receiver);
        assert!(!handoff.report_failure(AssetUUID::new(), "truncated file"));
    }
}
