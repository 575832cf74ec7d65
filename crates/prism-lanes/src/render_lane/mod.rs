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

//! Rendering lane - hot path for graphics operations

mod frame_uniforms;
mod instance_registry;
mod instanced_lane;
mod mesh_cache;
mod recorder;
mod shader_cache;
pub mod shaders;
mod state;
mod texture_cache;

pub use frame_uniforms::*;
pub use instance_registry::*;
pub use instanced_lane::*;
pub use mesh_cache::*;
pub use recorder::*;
pub use shader_cache::*;
pub use state::*;
pub use texture_cache::*;

use prism_core::renderer::{GraphicsContext, ResourceError};

/// The three GPU resource caches, owned together by the render thread.
#[derive(Debug)]
pub struct GpuResources {
    /// Linked programs.
    pub shaders: ShaderCache,
    /// Uploaded textures and placeholders.
    pub textures: TextureCache,
    /// Uploaded meshes.
    pub meshes: MeshCache,
}

impl GpuResources {
    /// Creates empty caches and uploads the placeholder textures.
    pub fn new(ctx: &mut dyn GraphicsContext) -> Result<Self, ResourceError> {
        Ok(Self {
            shaders: ShaderCache::new(),
            textures: TextureCache::new(ctx)?,
            meshes: MeshCache::new(),
        })
    }
}
