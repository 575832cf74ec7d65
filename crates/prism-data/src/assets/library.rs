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

use crate::assets::{Assets, Material, Mesh, ShaderSource, Texture};
use prism_core::asset::{AssetId, AssetUUID};

/// Every asset collection the renderer reads from.
#[derive(Default)]
pub struct AssetLibrary {
    /// Decoded images.
    pub textures: Assets<Texture>,
    /// Vertex and index data.
    pub meshes: Assets<Mesh>,
    /// GLSL stage sources.
    pub shaders: Assets<ShaderSource>,
    /// Materials referencing shaders and textures.
    pub materials: Assets<Material>,
}

impl AssetLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }
}

/// A typed reference to an asset of any renderer-visible kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRef {
    /// A texture.
    Texture(AssetId<Texture>),
    /// A mesh.
    Mesh(AssetId<Mesh>),
    /// A shader source.
    Shader(AssetId<ShaderSource>),
    /// A material.
    Material(AssetId<Material>),
}

impl AssetRef {
    /// Returns the untyped UUID of the referenced asset.
    pub fn uuid(&self) -> AssetUUID {
        match self {
            AssetRef::Texture(id) => id.uuid(),
            AssetRef::Mesh(id) => id.uuid(),
            AssetRef::Shader(id) => id.uuid(),
            AssetRef::Material(id) => id.uuid(),
        }
    }
}
