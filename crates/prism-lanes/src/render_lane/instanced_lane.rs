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

//! Implements the instanced forward rendering strategy.
//!
//! The `InstancedLane` turns the registry's batches into one instanced draw
//! call per non-empty batch. A frame runs in two steps:
//! - **prepare**: rebuild changed shaders, sync mesh buffers, upload every
//!   batch's per-instance transforms and tints, then sync the textures the
//!   batches sample;
//! - **pass**: clear, optionally draw the background, then for each batch bind
//!   its program, push frame and material uniforms through the value cache,
//!   bind textures (gray for unbound samplers), set depth and cull state and draw.
//!
//! Texture uploads go through the active texture unit, so they all happen in
//! prepare. The pass only binds.
//!
//! Batches are drawn in creation order unless draw-order enforcement is
//! configured, in which case they are stably sorted by material draw order.
//! There is no depth sorting.

use super::shaders::BACKGROUND_SHADER;
use super::{BuiltinTexture, FrameUniforms, GpuResources, InstanceRegistry, StateTracker};
use ahash::AHashSet;
use prism_core::asset::AssetUUID;
use prism_core::math::LinearRgba;
use prism_core::renderer::{
    BackgroundMode, Capability, ConfigurationError, GraphicsContext, PipelineConfig,
    PrimitiveMode, RenderDiagnostic, RenderError, VertexArrayId,
};
use prism_data::assets::AssetLibrary;
use prism_data::scene::SceneView;

/// Result of one pass.
#[derive(Debug, Default)]
pub struct PassOutput {
    /// Batches that issued a draw call.
    pub batches_drawn: usize,
    /// Recoverable failures met while drawing.
    pub diagnostics: Vec<RenderDiagnostic>,
}

/// A lane that draws every batch with hardware instancing.
#[derive(Debug)]
pub struct InstancedLane {
    clear_color: LinearRgba,
    background: BackgroundMode,
    enforce_draw_order: bool,
    state: StateTracker,
    background_vertex_array: Option<VertexArrayId>,
    /// Textures whose last sync failed. Drawn with the error placeholder
    /// and reported once until they sync again.
    failing_textures: AHashSet<AssetUUID>,
}

impl InstancedLane {
    /// Creates the lane from the pipeline configuration.
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            clear_color: config.clear_color,
            background: config.background,
            enforce_draw_order: config.enforce_draw_order,
            state: StateTracker::default(),
            background_vertex_array: None,
            failing_textures: AHashSet::new(),
        }
    }

    /// Returns a human-readable identifier for this rendering strategy.
    pub fn strategy_name(&self) -> &'static str {
        "Instanced"
    }

    /// Refreshes GPU resources and uploads instance data for every non-empty batch.
    pub fn prepare(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        registry: &mut InstanceRegistry,
        resources: &mut GpuResources,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
    ) -> Result<Vec<RenderDiagnostic>, RenderError> {
        let mut diagnostics: Vec<RenderDiagnostic> = resources
            .shaders
            .refresh(ctx, &assets.shaders)
            .into_iter()
            .map(RenderDiagnostic::error)
            .collect();
        diagnostics.extend(registry.prepare(ctx, resources, scene, assets)?);
        self.sync_textures(ctx, registry, resources, assets, &mut diagnostics);
        // Rebinding vertex arrays and texture units during prepare bypasses the tracker.
        self.state.reset();
        Ok(diagnostics)
    }

    /// Uploads new or changed pixels for every texture a drawable batch samples.
    fn sync_textures(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        registry: &InstanceRegistry,
        resources: &mut GpuResources,
        assets: &AssetLibrary,
        diagnostics: &mut Vec<RenderDiagnostic>,
    ) {
        let GpuResources {
            shaders, textures, ..
        } = resources;
        for batch in registry.batches() {
            if batch.is_empty() || !batch.is_ready() {
                continue;
            }
            let (Some(material), Some(program)) = (
                assets.materials.get(batch.key().material),
                shaders.get(batch.shader()),
            ) else {
                continue;
            };
            for sampler in program.samplers() {
                let Some(id) = material.textures.get(sampler) else {
                    continue;
                };
                match textures.get_loaded(ctx, *id, &assets.textures) {
                    Ok(_) => {
                        self.failing_textures.remove(&id.uuid());
                    }
                    Err(err) => {
                        if self.failing_textures.insert(id.uuid()) {
                            diagnostics.push(RenderDiagnostic::warning(err));
                        }
                    }
                }
            }
        }
    }

    /// Clears the framebuffer and draws every prepared batch.
    pub fn pass(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        registry: &InstanceRegistry,
        resources: &mut GpuResources,
        assets: &AssetLibrary,
        uniforms: &FrameUniforms,
    ) -> Result<PassOutput, RenderError> {
        let mut output = PassOutput::default();

        ctx.clear(Some(self.clear_color.to_array()), true)?;
        if let BackgroundMode::Gradient { top, bottom } = self.background {
            self.draw_background(ctx, resources, top, bottom)?;
        }

        let GpuResources {
            shaders,
            textures,
            meshes,
        } = resources;
        let frame_values = uniforms.values();

        for index in self.draw_order(registry, assets) {
            let batch = &registry.batches()[index];
            if batch.is_empty() || !batch.is_ready() {
                continue;
            }
            let key = batch.key();
            let Some(material) = assets.materials.get(key.material) else {
                output.diagnostics.push(RenderDiagnostic::error(
                    ConfigurationError::UnknownMaterial {
                        entity: batch.members()[0],
                        material: key.material.uuid(),
                    },
                ));
                continue;
            };
            let (Some(gpu_mesh), Some(program)) =
                (meshes.record(key.mesh), shaders.get_mut(batch.shader()))
            else {
                continue;
            };

            self.state.use_program(ctx, program.program())?;
            for (name, value) in &frame_values {
                program.set(ctx, name, value)?;
            }
            // Material properties may override frame values of the same name.
            let shared: Vec<&str> = frame_values
                .iter()
                .map(|(name, _)| *name)
                .filter(|name| !material.properties.contains_key(*name))
                .collect();
            for rejected in program.apply_material(ctx, &material.properties, &shared)? {
                output.diagnostics.push(RenderDiagnostic::warning(rejected));
            }

            for sampler in 0..program.samplers().len() {
                let unit = sampler as u32;
                let texture = match material.textures.get(&program.samplers()[sampler]) {
                    None => textures.builtin(BuiltinTexture::Gray),
                    Some(id) if self.failing_textures.contains(&id.uuid()) => {
                        textures.builtin(BuiltinTexture::Error)
                    }
                    Some(id) => textures
                        .record(*id)
                        .map_or_else(|| textures.builtin(BuiltinTexture::Error), |r| r.texture),
                };
                self.state.bind_texture(ctx, unit, texture)?;
                program.set_sampler_unit(ctx, sampler, unit)?;
            }

            self.state
                .set_capability(ctx, Capability::DepthTest, material.depth_test)?;
            self.state
                .set_capability(ctx, Capability::CullFace, !material.double_sided)?;
            self.state.bind_vertex_array(ctx, batch.vertex_array())?;

            let instances = batch.len() as u32;
            match gpu_mesh.index_format {
                Some(format) if gpu_mesh.element_count > 0 => ctx.draw_elements_instanced(
                    PrimitiveMode::Triangles,
                    gpu_mesh.element_count,
                    format,
                    instances,
                )?,
                _ => ctx.draw_arrays_instanced(
                    PrimitiveMode::Triangles,
                    0,
                    gpu_mesh.vertex_count,
                    instances,
                )?,
            }
            output.batches_drawn += 1;
        }

        Ok(output)
    }

    /// Batch indices in submission order.
    fn draw_order(&self, registry: &InstanceRegistry, assets: &AssetLibrary) -> Vec<usize> {
        let mut order: Vec<usize> = (0..registry.len()).collect();
        if self.enforce_draw_order {
            order.sort_by_key(|&index| {
                assets
                    .materials
                    .get(registry.batches()[index].key().material)
                    .map_or(0, |m| m.draw_order)
            });
        }
        order
    }

    fn draw_background(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        resources: &mut GpuResources,
        top: LinearRgba,
        bottom: LinearRgba,
    ) -> Result<(), RenderError> {
        let key = resources.shaders.builtin(ctx, BACKGROUND_SHADER)?;
        let vertex_array = match self.background_vertex_array {
            Some(vertex_array) => vertex_array,
            None => {
                let vertex_array = ctx.create_vertex_array()?;
                self.background_vertex_array = Some(vertex_array);
                vertex_array
            }
        };
        let program = resources
            .shaders
            .get_mut(&key)
            .ok_or_else(|| ConfigurationError::UnknownShader {
                name: BACKGROUND_SHADER.to_owned(),
            })?;

        self.state.use_program(ctx, program.program())?;
        program.set(ctx, "u_top_color", &top.into())?;
        program.set(ctx, "u_bottom_color", &bottom.into())?;
        self.state.set_capability(ctx, Capability::DepthTest, false)?;
        self.state.set_capability(ctx, Capability::CullFace, false)?;
        self.state.bind_vertex_array(ctx, vertex_array)?;
        ctx.draw_arrays_instanced(PrimitiveMode::Triangles, 0, 3, 1)?;
        Ok(())
    }
}
