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

use crate::assets::{Material, Mesh};
use prism_core::asset::AssetId;
use prism_core::math::LinearRgba;

/// Marks an entity as drawable: a mesh, a material and a per-instance tint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Renderable {
    /// The geometry.
    pub mesh: AssetId<Mesh>,
    /// The surface. A renderable without one cannot be registered.
    pub material: Option<AssetId<Material>>,
    /// Per-instance color multiplier.
    pub tint: LinearRgba,
}

impl Renderable {
    /// Creates a renderable with a white tint.
    pub fn new(mesh: AssetId<Mesh>, material: AssetId<Material>) -> Self {
        Self {
            mesh,
            material: Some(material),
            tint: LinearRgba::WHITE,
        }
    }

    /// Returns the renderable with a different tint.
    pub fn with_tint(mut self, tint: LinearRgba) -> Self {
        self.tint = tint;
        self
    }
}
