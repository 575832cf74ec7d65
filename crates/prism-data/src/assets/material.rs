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

use crate::assets::{ShaderSource, Texture};
use prism_core::asset::{Asset, AssetId};
use prism_core::renderer::UniformValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a material's shader program comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderRef {
    /// An embedded shader addressed by name, such as `"pbr"`.
    Builtin(String),
    /// A shader loaded into the asset library.
    Asset(AssetId<ShaderSource>),
}

/// Surface description shared by every entity that uses it.
///
/// Properties and textures are looked up by uniform name. Names the shader
/// does not declare are ignored, so one material can serve several shaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// The shader program. `None` selects the pipeline's default shader.
    pub shader: Option<ShaderRef>,
    /// Uniform values keyed by uniform name.
    pub properties: BTreeMap<String, UniformValue>,
    /// Sampler bindings keyed by sampler uniform name.
    pub textures: BTreeMap<String, AssetId<Texture>>,
    /// Enables depth testing.
    pub depth_test: bool,
    /// Disables back-face culling.
    pub double_sided: bool,
    /// Submission order hint; higher values draw later when ordering is enforced.
    pub draw_order: i32,
}

impl Asset for Material {}

impl Default for Material {
    fn default() -> Self {
        Self {
            shader: None,
            properties: BTreeMap::new(),
            textures: BTreeMap::new(),
            depth_test: true,
            double_sided: false,
            draw_order: 0,
        }
    }
}

impl Material {
    /// A material drawn with an embedded shader.
    pub fn builtin(name: impl Into<String>) -> Self {
        Self {
            shader: Some(ShaderRef::Builtin(name.into())),
            ..Default::default()
        }
    }

    /// A material drawn with a shader asset.
    pub fn with_shader_asset(shader: AssetId<ShaderSource>) -> Self {
        Self {
            shader: Some(ShaderRef::Asset(shader)),
            ..Default::default()
        }
    }

    /// Sets a uniform property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Binds a texture to a sampler uniform.
    pub fn with_texture(mut self, sampler: impl Into<String>, texture: AssetId<Texture>) -> Self {
        self.textures.insert(sampler.into(), texture);
        self
    }

    /// Sets the depth test flag.
    pub fn with_depth_test(mut self, enabled: bool) -> Self {
        self.depth_test = enabled;
        self
    }

    /// Sets the double-sided flag.
    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Sets the draw order hint.
    pub fn with_draw_order(mut self, draw_order: i32) -> Self {
        self.draw_order = draw_order;
        self
    }
}
