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

//! Vertex layouts and attribute bindings.

use crate::renderer::api::BufferId;
use serde::{Deserialize, Serialize};

/// Shader input name for vertex positions.
pub const ATTRIB_POSITION: &str = "a_position";
/// Shader input name for vertex normals.
pub const ATTRIB_NORMAL: &str = "a_normal";
/// Shader input name for texture coordinates.
pub const ATTRIB_UV: &str = "a_uv";
/// Shader input name for the per-instance world transform (`mat4`, four slots).
pub const ATTRIB_INSTANCE_TRANSFORM: &str = "a_instance_transform";
/// Shader input name for the per-instance tint (`vec4`).
pub const ATTRIB_INSTANCE_COLOR: &str = "a_instance_color";

/// Floats written per instance: a 4x4 transform followed by an RGBA tint.
pub const INSTANCE_FLOATS: usize = 16 + 4;
/// Byte stride of one instance record.
pub const INSTANCE_STRIDE: usize = INSTANCE_FLOATS * std::mem::size_of::<f32>();

/// One float attribute inside an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    /// The shader input this element feeds.
    pub name: &'static str,
    /// Number of float components.
    pub components: u32,
    /// Offset from the start of the vertex, in floats.
    pub offset: usize,
}

const POSITION: VertexElement = VertexElement {
    name: ATTRIB_POSITION,
    components: 3,
    offset: 0,
};

/// The interleaved layout of a mesh's vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexFormat {
    /// `position: vec3`
    #[default]
    Position,
    /// `position: vec3, normal: vec3`
    PositionNormal,
    /// `position: vec3, uv: vec2`
    PositionUv,
    /// `position: vec3, uv: vec2, normal: vec3`
    PositionUvNormal,
}

impl VertexFormat {
    /// Returns the elements of one vertex in buffer order.
    pub fn elements(self) -> &'static [VertexElement] {
        const NORMAL_AT_3: VertexElement = VertexElement {
            name: ATTRIB_NORMAL,
            components: 3,
            offset: 3,
        };
        const UV_AT_3: VertexElement = VertexElement {
            name: ATTRIB_UV,
            components: 2,
            offset: 3,
        };
        const NORMAL_AT_5: VertexElement = VertexElement {
            name: ATTRIB_NORMAL,
            components: 3,
            offset: 5,
        };
        match self {
            VertexFormat::Position => &[POSITION],
            VertexFormat::PositionNormal => &[POSITION, NORMAL_AT_3],
            VertexFormat::PositionUv => &[POSITION, UV_AT_3],
            VertexFormat::PositionUvNormal => &[POSITION, UV_AT_3, NORMAL_AT_5],
        }
    }

    /// Returns the number of floats in one vertex.
    pub fn floats_per_vertex(self) -> usize {
        match self {
            VertexFormat::Position => 3,
            VertexFormat::PositionNormal => 6,
            VertexFormat::PositionUv => 5,
            VertexFormat::PositionUvNormal => 8,
        }
    }

    /// Returns the byte stride of one vertex.
    pub fn stride(self) -> usize {
        self.floats_per_vertex() * std::mem::size_of::<f32>()
    }
}

/// A single float attribute pointer recorded into the bound vertex array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// The attribute slot.
    pub location: u32,
    /// The buffer the data is read from.
    pub buffer: BufferId,
    /// Number of float components (1 to 4).
    pub components: u32,
    /// Byte distance between consecutive elements.
    pub stride: usize,
    /// Byte offset of the first element.
    pub offset: usize,
    /// `0` advances per vertex, `1` advances per instance.
    pub divisor: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_offsets_fit_inside_the_stride() {
        for format in [
            VertexFormat::Position,
            VertexFormat::PositionNormal,
            VertexFormat::PositionUv,
            VertexFormat::PositionUvNormal,
        ] {
            let used: u32 = format.elements().iter().map(|e| e.components).sum();
            assert_eq!(used as usize, format.floats_per_vertex(), "{format:?}");
            let last = format.elements().last().expect("at least one element");
            assert_eq!(
                last.offset + last.components as usize,
                format.floats_per_vertex()
            );
        }
    }

    #[test]
    fn instance_record_is_eighty_bytes() {
        assert_eq!(INSTANCE_STRIDE, 80);
    }
}
