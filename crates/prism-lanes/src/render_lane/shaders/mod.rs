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

//! Built-in GLSL 330 shaders, addressable by name from a material.
//!
//! - `"pbr"`: metallic-roughness shading with one light and an ambient term.
//! - `"unlit"`: base color times tint times texture.
//! - `"background"`: full-screen vertical gradient, used by the background pass.

/// An embedded vertex/fragment source pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinShader {
    /// The name materials use to select it.
    pub name: &'static str,
    /// Vertex stage source.
    pub vertex: &'static str,
    /// Fragment stage source.
    pub fragment: &'static str,
}

/// Name of the gradient shader drawn by the background pass.
pub const BACKGROUND_SHADER: &str = "background";

/// Every shader compiled from embedded source.
pub const BUILTIN_SHADERS: &[BuiltinShader] = &[
    BuiltinShader {
        name: "pbr",
        vertex: include_str!("pbr.vert"),
        fragment: include_str!("pbr.frag"),
    },
    BuiltinShader {
        name: "unlit",
        vertex: include_str!("unlit.vert"),
        fragment: include_str!("unlit.frag"),
    },
    BuiltinShader {
        name: BACKGROUND_SHADER,
        vertex: include_str!("background.vert"),
        fragment: include_str!("background.frag"),
    },
];

/// Looks up a built-in shader by name.
pub fn builtin(name: &str) -> Option<&'static BuiltinShader> {
    BUILTIN_SHADERS.iter().find(|shader| shader.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::renderer::{ATTRIB_INSTANCE_COLOR, ATTRIB_INSTANCE_TRANSFORM};

    #[test]
    fn every_builtin_targets_glsl_330() {
        for shader in BUILTIN_SHADERS {
            assert!(shader.vertex.starts_with("#version 330 core"), "{}", shader.name);
            assert!(shader.fragment.starts_with("#version 330 core"), "{}", shader.name);
        }
    }

    #[test]
    fn mesh_shaders_read_instance_attributes() {
        for name in ["pbr", "unlit"] {
            let shader = builtin(name).expect("builtin exists");
            assert!(shader.vertex.contains(ATTRIB_INSTANCE_TRANSFORM));
            assert!(shader.vertex.contains(ATTRIB_INSTANCE_COLOR));
        }
    }

    #[test]
    fn unknown_names_are_not_builtins() {
        assert!(builtin("toon").is_none());
    }
}
