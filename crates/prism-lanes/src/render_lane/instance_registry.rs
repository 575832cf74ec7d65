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

//! Groups renderable entities into instanced batches keyed by (material, mesh).

use super::{GpuMesh, GpuResources, ShaderKey, ShaderProgram};
use ahash::AHashMap;
use prism_core::asset::AssetId;
use prism_core::ecs::EntityId;
use prism_core::math::Mat4;
use prism_core::renderer::{
    BufferId, BufferTarget, BufferUsage, ConfigurationError, GraphicsContext, RenderDiagnostic,
    RenderError, ResourceError, ResourceLoadError, VertexArrayId, VertexAttribute,
    ATTRIB_INSTANCE_COLOR, ATTRIB_INSTANCE_TRANSFORM, INSTANCE_FLOATS, INSTANCE_STRIDE,
};
use prism_data::assets::{AssetLibrary, Material, Mesh};
use prism_data::scene::SceneView;

/// The identity a batch is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchKey {
    /// The shared material.
    pub material: AssetId<Material>,
    /// The shared mesh.
    pub mesh: AssetId<Mesh>,
}

/// One instanced draw: every member shares a material and a mesh.
#[derive(Debug)]
pub struct InstanceBatch {
    key: BatchKey,
    shader: ShaderKey,
    vertex_array: VertexArrayId,
    instance_buffer: BufferId,
    members: Vec<EntityId>,
    staging: Vec<f32>,
    bound_layout: Option<u64>,
    bound_shader: Option<u64>,
    ready: bool,
}

impl InstanceBatch {
    /// The (material, mesh) identity.
    pub fn key(&self) -> BatchKey {
        self.key
    }

    /// The program the batch is drawn with.
    pub fn shader(&self) -> &ShaderKey {
        &self.shader
    }

    /// The vertex array binding mesh and instance attributes.
    pub fn vertex_array(&self) -> VertexArrayId {
        self.vertex_array
    }

    /// The per-instance attribute buffer.
    pub fn instance_buffer(&self) -> BufferId {
        self.instance_buffer
    }

    /// Members in draw order.
    pub fn members(&self) -> &[EntityId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the batch has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Staged per-instance floats: `len() * 20` after a prepare.
    pub fn staging(&self) -> &[f32] {
        &self.staging
    }

    /// `true` once the last prepare uploaded this batch's instance data.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Points the vertex array at the mesh buffers and the instance buffer,
    /// using the attribute slots the program declares.
    fn bind_layout(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        mesh: &GpuMesh,
        program: &ShaderProgram,
    ) -> Result<(), ResourceError> {
        ctx.bind_vertex_array(Some(self.vertex_array))?;

        let stride = mesh.format.stride();
        for element in mesh.format.elements() {
            if let Some(location) = program.attribute_location(element.name) {
                ctx.set_vertex_attribute(&VertexAttribute {
                    location,
                    buffer: mesh.vertex_buffer,
                    components: element.components,
                    stride,
                    offset: element.offset * std::mem::size_of::<f32>(),
                    divisor: 0,
                })?;
            }
        }
        ctx.bind_index_buffer(mesh.index_buffer)?;

        if let Some(base) = program.attribute_location(ATTRIB_INSTANCE_TRANSFORM) {
            for column in 0..4u32 {
                ctx.set_vertex_attribute(&VertexAttribute {
                    location: base + column,
                    buffer: self.instance_buffer,
                    components: 4,
                    stride: INSTANCE_STRIDE,
                    offset: column as usize * 16,
                    divisor: 1,
                })?;
            }
        }
        if let Some(location) = program.attribute_location(ATTRIB_INSTANCE_COLOR) {
            ctx.set_vertex_attribute(&VertexAttribute {
                location,
                buffer: self.instance_buffer,
                components: 4,
                stride: INSTANCE_STRIDE,
                offset: 64,
                divisor: 1,
            })?;
        }

        ctx.bind_vertex_array(None)?;
        self.bound_layout = Some(mesh.layout_generation);
        self.bound_shader = Some(program.generation());
        Ok(())
    }

    fn needs_rebind(&self, mesh: &GpuMesh, program: &ShaderProgram) -> bool {
        self.bound_layout != Some(mesh.layout_generation)
            || self.bound_shader != Some(program.generation())
    }

    /// Writes every member's transform and tint, then replaces the GPU buffer.
    fn stage_and_upload(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        scene: &dyn SceneView,
    ) -> Result<(), ResourceError> {
        self.staging.resize(self.members.len() * INSTANCE_FLOATS, 0.0);
        for (record, entity) in self
            .staging
            .chunks_exact_mut(INSTANCE_FLOATS)
            .zip(&self.members)
        {
            // A member whose transform vanished collapses to a zero-area instance.
            let transform = scene
                .transform(*entity)
                .map_or(Mat4::ZERO, |t| t.to_mat4());
            let tint = scene
                .renderable(*entity)
                .map_or([1.0; 4], |r| r.tint.to_array());
            record[..16].copy_from_slice(&transform.to_cols_array());
            record[16..].copy_from_slice(&tint);
        }
        ctx.upload_buffer(
            self.instance_buffer,
            BufferTarget::Vertex,
            bytemuck::cast_slice(&self.staging),
            BufferUsage::Dynamic,
        )
    }
}

/// What [`InstanceRegistry::register`] did with an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new batch was created with the entity as its first member.
    Created(BatchKey),
    /// The entity joined an existing batch.
    Joined(BatchKey),
    /// The entity was already registered; nothing changed.
    Unchanged(BatchKey),
}

impl Registration {
    /// The batch the entity belongs to.
    pub fn key(&self) -> BatchKey {
        match *self {
            Registration::Created(key) | Registration::Joined(key) | Registration::Unchanged(key) => {
                key
            }
        }
    }
}

/// Every batch, plus which batch each registered entity belongs to.
///
/// Batches are drawn in creation order and never removed; a batch whose
/// members all left is kept and skipped.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    batches: Vec<InstanceBatch>,
    by_key: AHashMap<BatchKey, usize>,
    membership: AHashMap<EntityId, usize>,
}

impl InstanceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a renderable entity to the batch for its (material, mesh) pair.
    ///
    /// The pair is read once, here; later changes to the entity's material or
    /// mesh need [`InstanceRegistry::reregister`]. Registering an entity twice
    /// is a no-op.
    ///
    /// ## Errors
    /// * `ConfigurationError` - The entity has no mesh, no material, or refers to
    ///   unloaded assets, or its shader cannot be resolved.
    /// * `CompileError` - The material's shader failed to build.
    /// * `UnsupportedValueError` - A material property does not match the kind
    ///   the shader declares for it.
    pub fn register(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        resources: &mut GpuResources,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
        entity: EntityId,
        default_shader: &str,
    ) -> Result<Registration, RenderError> {
        if let Some(&index) = self.membership.get(&entity) {
            return Ok(Registration::Unchanged(self.batches[index].key));
        }
        if !scene.contains(entity) {
            return Err(ConfigurationError::UnknownEntity { entity }.into());
        }
        let renderable = scene
            .renderable(entity)
            .ok_or(ConfigurationError::NotRenderable { entity })?;
        let material_id = renderable
            .material
            .ok_or(ConfigurationError::MissingMaterial { entity })?;
        let key = BatchKey {
            material: material_id,
            mesh: renderable.mesh,
        };

        if let Some(&index) = self.by_key.get(&key) {
            self.batches[index].members.push(entity);
            self.membership.insert(entity, index);
            return Ok(Registration::Joined(key));
        }

        let material = assets.materials.get(material_id).ok_or(
            ConfigurationError::UnknownMaterial {
                entity,
                material: material_id.uuid(),
            },
        )?;
        let mesh = assets
            .meshes
            .get(key.mesh)
            .ok_or(ConfigurationError::UnknownMesh {
                entity,
                mesh: key.mesh.uuid(),
            })?;

        let GpuResources {
            shaders,
            textures,
            meshes,
        } = resources;

        let shader = shaders.resolve(ctx, material.shader.as_ref(), &assets.shaders, default_shader)?;
        let program = shaders
            .get(&shader)
            .ok_or_else(|| ConfigurationError::UnknownShader {
                name: shader.to_string(),
            })?;
        for (name, value) in &material.properties {
            program.check(name, value)?;
        }

        for (sampler, texture_id) in &material.textures {
            match assets.textures.get(*texture_id) {
                Some(texture) => {
                    textures.get(ctx, *texture_id, texture)?;
                }
                None => log::debug!(
                    "Texture {} for sampler '{sampler}' is not loaded yet",
                    texture_id.uuid()
                ),
            }
        }

        let gpu_mesh = meshes.get(ctx, key.mesh, mesh)?;

        let vertex_array = ctx.create_vertex_array()?;
        let instance_buffer = match ctx.create_buffer() {
            Ok(buffer) => buffer,
            Err(err) => {
                ctx.delete_vertex_array(vertex_array)?;
                return Err(err.into());
            }
        };
        let mut batch = InstanceBatch {
            key,
            shader,
            vertex_array,
            instance_buffer,
            members: vec![entity],
            staging: Vec::with_capacity(INSTANCE_FLOATS),
            bound_layout: None,
            bound_shader: None,
            ready: false,
        };
        if let Err(err) = batch.bind_layout(ctx, gpu_mesh, program) {
            // Deleting the vertex array also unbinds it.
            ctx.delete_vertex_array(vertex_array)?;
            ctx.delete_buffer(instance_buffer)?;
            return Err(err.into());
        }
        log::debug!(
            "Created batch #{} for material {} / mesh {} with shader {}",
            self.batches.len(),
            key.material.uuid(),
            key.mesh.uuid(),
            batch.shader
        );

        let index = self.batches.len();
        self.batches.push(batch);
        self.by_key.insert(key, index);
        self.membership.insert(entity, index);
        Ok(Registration::Created(key))
    }

    /// Removes an entity from its batch. Returns `false` if it was not registered.
    pub fn unregister(&mut self, entity: EntityId) -> bool {
        let Some(index) = self.membership.remove(&entity) else {
            return false;
        };
        let members = &mut self.batches[index].members;
        if let Some(position) = members.iter().position(|m| *m == entity) {
            members.remove(position);
        }
        true
    }

    /// Removes the entity and registers it again with its current material and mesh.
    pub fn reregister(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        resources: &mut GpuResources,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
        entity: EntityId,
        default_shader: &str,
    ) -> Result<Registration, RenderError> {
        self.unregister(entity);
        self.register(ctx, resources, scene, assets, entity, default_shader)
    }

    /// Syncs each non-empty batch's mesh, re-binds its vertex array if the
    /// mesh layout or shader program changed, and uploads its instance data.
    ///
    /// A batch whose mesh cannot be synced is skipped for this frame and
    /// reported; it keeps its members.
    pub fn prepare(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        resources: &mut GpuResources,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
    ) -> Result<Vec<RenderDiagnostic>, RenderError> {
        let mut diagnostics = Vec::new();
        let GpuResources { shaders, meshes, .. } = resources;

        for batch in &mut self.batches {
            batch.ready = false;
            if batch.members.is_empty() {
                batch.staging.clear();
                continue;
            }
            let Some(mesh) = assets.meshes.get(batch.key.mesh) else {
                diagnostics.push(RenderDiagnostic::error(ResourceLoadError::MissingMesh {
                    mesh: batch.key.mesh.uuid(),
                }));
                continue;
            };
            let gpu_mesh = match meshes.get(ctx, batch.key.mesh, mesh) {
                Ok(gpu_mesh) => gpu_mesh,
                Err(err) => {
                    diagnostics.push(RenderDiagnostic::error(err));
                    continue;
                }
            };
            let Some(program) = shaders.get(&batch.shader) else {
                diagnostics.push(RenderDiagnostic::error(ConfigurationError::UnknownShader {
                    name: batch.shader.to_string(),
                }));
                continue;
            };
            if batch.needs_rebind(gpu_mesh, program) {
                log::trace!("Re-binding vertex array {:?}", batch.vertex_array);
                batch.bind_layout(ctx, gpu_mesh, program)?;
            }
            batch.stage_and_upload(ctx, scene)?;
            batch.ready = true;
        }
        Ok(diagnostics)
    }

    /// All batches in creation order.
    pub fn batches(&self) -> &[InstanceBatch] {
        &self.batches
    }

    /// The batch for a (material, mesh) pair.
    pub fn batch(&self, key: BatchKey) -> Option<&InstanceBatch> {
        self.by_key.get(&key).map(|&index| &self.batches[index])
    }

    /// The batch an entity belongs to.
    pub fn batch_of(&self, entity: EntityId) -> Option<&InstanceBatch> {
        self.membership.get(&entity).map(|&index| &self.batches[index])
    }

    /// Returns `true` if the entity is a member of some batch.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.membership.contains_key(&entity)
    }

    /// Number of batches, including empty ones.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns `true` if no batch was ever created.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
