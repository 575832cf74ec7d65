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

//! Uploads mesh geometry into vertex and index buffers.

use ahash::AHashMap;
use prism_core::asset::{AssetId, AssetUUID};
use prism_core::renderer::{
    BufferId, BufferTarget, BufferUsage, GraphicsContext, IndexFormat, ResourceError, VertexFormat,
};
use prism_data::assets::Mesh;

/// The GPU side of one mesh asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuMesh {
    /// Interleaved vertex data.
    pub vertex_buffer: BufferId,
    /// Element indices, absent for non-indexed meshes.
    pub index_buffer: Option<BufferId>,
    /// Layout of `vertex_buffer`.
    pub format: VertexFormat,
    /// Width of the indices in `index_buffer`.
    pub index_format: Option<IndexFormat>,
    /// Number of vertices.
    pub vertex_count: u32,
    /// Number of indices, `0` when non-indexed.
    pub element_count: u32,
    /// Advances when the vertex format or index buffer binding changes, so
    /// vertex arrays built on this mesh know to re-bind their attributes.
    pub layout_generation: u64,
    version: u64,
}

impl GpuMesh {
    fn upload(ctx: &mut dyn GraphicsContext, mesh: &Mesh) -> Result<Self, ResourceError> {
        let vertex_buffer = ctx.create_buffer()?;
        ctx.upload_buffer(
            vertex_buffer,
            BufferTarget::Vertex,
            mesh.vertex_bytes(),
            BufferUsage::Static,
        )?;
        let mut record = Self {
            vertex_buffer,
            index_buffer: None,
            format: mesh.format(),
            index_format: None,
            vertex_count: mesh.vertex_count(),
            element_count: mesh.element_count(),
            layout_generation: 0,
            version: mesh.version(),
        };
        record.upload_indices(ctx, mesh)?;
        Ok(record)
    }

    fn upload_indices(&mut self, ctx: &mut dyn GraphicsContext, mesh: &Mesh) -> Result<(), ResourceError> {
        match (mesh.indices(), self.index_buffer) {
            (Some(indices), existing) => {
                let buffer = match existing {
                    Some(buffer) => buffer,
                    None => ctx.create_buffer()?,
                };
                ctx.upload_buffer(buffer, BufferTarget::Index, indices.as_bytes(), BufferUsage::Static)?;
                self.index_buffer = Some(buffer);
                self.index_format = Some(indices.format());
            }
            (None, Some(buffer)) => {
                ctx.delete_buffer(buffer)?;
                self.index_buffer = None;
                self.index_format = None;
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Re-uploads both buffers iff the mesh version moved.
    fn sync(&mut self, ctx: &mut dyn GraphicsContext, mesh: &Mesh) -> Result<(), ResourceError> {
        if mesh.version() == self.version {
            return Ok(());
        }
        let was_indexed = self.index_buffer.is_some();
        let old_format = self.format;

        ctx.upload_buffer(
            self.vertex_buffer,
            BufferTarget::Vertex,
            mesh.vertex_bytes(),
            BufferUsage::Static,
        )?;
        self.upload_indices(ctx, mesh)?;
        self.format = mesh.format();
        self.vertex_count = mesh.vertex_count();
        self.element_count = mesh.element_count();
        self.version = mesh.version();

        if self.format != old_format || self.index_buffer.is_some() != was_indexed {
            self.layout_generation += 1;
        }
        log::trace!("Re-uploaded mesh buffers {:?}", self.vertex_buffer);
        Ok(())
    }
}

/// Maps mesh assets to their GPU buffers.
#[derive(Debug, Default)]
pub struct MeshCache {
    meshes: AHashMap<AssetUUID, GpuMesh>,
}

impl MeshCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the GPU buffers for a mesh, uploading on a miss and syncing on a hit.
    pub fn get(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        id: AssetId<Mesh>,
        mesh: &Mesh,
    ) -> Result<&GpuMesh, ResourceError> {
        use std::collections::hash_map::Entry;

        match self.meshes.entry(id.uuid()) {
            Entry::Occupied(entry) => {
                let record = entry.into_mut();
                record.sync(ctx, mesh)?;
                Ok(record)
            }
            Entry::Vacant(entry) => {
                let record = GpuMesh::upload(ctx, mesh)?;
                log::debug!(
                    "Uploaded mesh {} ({} vertices, {} indices)",
                    id.uuid(),
                    record.vertex_count,
                    record.element_count
                );
                Ok(entry.insert(record))
            }
        }
    }

    /// The cached record for a mesh, if it was ever uploaded.
    pub fn record(&self, id: AssetId<Mesh>) -> Option<&GpuMesh> {
        self.meshes.get(&id.uuid())
    }

    /// Number of cached meshes.
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}
