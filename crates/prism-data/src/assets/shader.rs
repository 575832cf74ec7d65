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

use prism_core::asset::Asset;

/// GLSL source for a vertex and fragment stage pair.
///
/// `version` advances on [`ShaderSource::replace`], which triggers a
/// recompile the next time the shader cache sees this asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    label: String,
    vertex: String,
    fragment: String,
    version: u64,
}

impl Asset for ShaderSource {}

impl ShaderSource {
    /// Creates a shader source pair.
    pub fn new(
        label: impl Into<String>,
        vertex: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
            version: 0,
        }
    }

    /// Swaps in new stage sources.
    pub fn replace(&mut self, vertex: impl Into<String>, fragment: impl Into<String>) {
        self.vertex = vertex.into();
        self.fragment = fragment.into();
        self.version += 1;
    }

    /// A human-readable name used in logs and errors.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Vertex stage source.
    pub fn vertex(&self) -> &str {
        &self.vertex
    }

    /// Fragment stage source.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    /// Counter advanced on every source change.
    pub fn version(&self) -> u64 {
        self.version
    }
}
