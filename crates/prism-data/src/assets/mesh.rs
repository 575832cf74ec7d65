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
use prism_core::renderer::{IndexFormat, ResourceLoadError, VertexFormat};

/// Element indices in one of the supported widths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indices {
    /// 8-bit indices.
    U8(Vec<u8>),
    /// 16-bit indices.
    U16(Vec<u16>),
    /// 32-bit indices.
    U32(Vec<u32>),
}

impl Indices {
    /// Returns the number of indices.
    pub fn len(&self) -> usize {
        match self {
            Indices::U8(v) => v.len(),
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    /// Returns `true` if there are no indices.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the integer width of the indices.
    pub fn format(&self) -> IndexFormat {
        match self {
            Indices::U8(_) => IndexFormat::U8,
            Indices::U16(_) => IndexFormat::U16,
            Indices::U32(_) => IndexFormat::U32,
        }
    }

    /// Returns the raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U8(v) => v.as_slice(),
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }

    fn max(&self) -> Option<u32> {
        match self {
            Indices::U8(v) => v.iter().copied().max().map(u32::from),
            Indices::U16(v) => v.iter().copied().max().map(u32::from),
            Indices::U32(v) => v.iter().copied().max(),
        }
    }
}

/// Interleaved float vertices with optional indices.
///
/// `version` advances once per [`Mesh::replace`]; the mesh cache re-uploads
/// only when it has moved.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    format: VertexFormat,
    vertices: Vec<f32>,
    indices: Option<Indices>,
    version: u64,
}

impl Asset for Mesh {}

fn validate(
    format: VertexFormat,
    vertices: &[f32],
    indices: Option<&Indices>,
) -> Result<(), ResourceLoadError> {
    let stride = format.floats_per_vertex();
    if vertices.len() % stride != 0 {
        return Err(ResourceLoadError::InvalidVertexData {
            len: vertices.len(),
            stride,
        });
    }
    let vertex_count = (vertices.len() / stride) as u32;
    if let Some(index) = indices.and_then(Indices::max) {
        if index >= vertex_count {
            return Err(ResourceLoadError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

impl Mesh {
    /// Creates a mesh, checking that vertices and indices are consistent.
    pub fn new(
        format: VertexFormat,
        vertices: Vec<f32>,
        indices: Option<Indices>,
    ) -> Result<Self, ResourceLoadError> {
        validate(format, &vertices, indices.as_ref())?;
        Ok(Self {
            format,
            vertices,
            indices,
            version: 0,
        })
    }

    /// A unit quad in the XY plane facing +Z, with UVs and normals.
    pub fn quad() -> Self {
        #[rustfmt::skip]
        let vertices = vec![
            -0.5, -0.5, 0.0,  0.0, 0.0,  0.0, 0.0, 1.0,
             0.5, -0.5, 0.0,  1.0, 0.0,  0.0, 0.0, 1.0,
             0.5,  0.5, 0.0,  1.0, 1.0,  0.0, 0.0, 1.0,
            -0.5,  0.5, 0.0,  0.0, 1.0,  0.0, 0.0, 1.0,
        ];
        Self {
            format: VertexFormat::PositionUvNormal,
            vertices,
            indices: Some(Indices::U16(vec![0, 1, 2, 2, 3, 0])),
            version: 0,
        }
    }

    /// A single position-only triangle, drawn without indices.
    pub fn triangle() -> Self {
        Self {
            format: VertexFormat::Position,
            vertices: vec![-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.0, 0.5, 0.0],
            indices: None,
            version: 0,
        }
    }

    /// Swaps in new geometry as a whole, bumping the version once.
    pub fn replace(
        &mut self,
        format: VertexFormat,
        vertices: Vec<f32>,
        indices: Option<Indices>,
    ) -> Result<(), ResourceLoadError> {
        validate(format, &vertices, indices.as_ref())?;
        self.format = format;
        self.vertices = vertices;
        self.indices = indices;
        self.version += 1;
        Ok(())
    }

    /// The vertex layout.
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    /// Interleaved vertex floats.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Vertex floats as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Optional element indices.
    pub fn indices(&self) -> Option<&Indices> {
        self.indices.as_ref()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> u32 {
        (self.vertices.len() / self.format.floats_per_vertex()) as u32
    }

    /// Number of indices, `0` for a non-indexed mesh.
    pub fn element_count(&self) -> u32 {
        self.indices.as_ref().map_or(0, |i| i.len() as u32)
    }

    /// Counter advanced on every geometry change.
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_follow_the_format() {
        let quad = Mesh::quad();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.element_count(), 6);
        assert_eq!(quad.vertex_bytes().len(), 4 * 8 * 4);

        let tri = Mesh::triangle();
        assert_eq!((tri.vertex_count(), tri.element_count()), (3, 0));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let err = Mesh::new(
            VertexFormat::Position,
            vec![0.0; 9],
            Some(Indices::U8(vec![0, 1, 3])),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResourceLoadError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn replace_bumps_version_once() {
        let mut mesh = Mesh::triangle();
        mesh.replace(VertexFormat::PositionNormal, vec![0.0; 18], None)
            .expect("valid mesh");
        assert_eq!(mesh.version(), 1);
        assert_eq!(mesh.vertex_count(), 3);

        let err = mesh
            .replace(VertexFormat::PositionNormal, vec![0.0; 17], None)
            .unwrap_err();
        assert!(matches!(err, ResourceLoadError::InvalidVertexData { .. }));
        assert_eq!(mesh.version(), 1);
    }
}
