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

//! A pass-through context that tallies GPU work into [`FrameStats`].

use prism_core::renderer::*;

/// Wraps a context and counts uploads, uniform writes, clears and draws.
pub struct StatsRecorder<'a> {
    inner: &'a mut dyn GraphicsContext,
    stats: &'a mut FrameStats,
}

impl<'a> StatsRecorder<'a> {
    /// Starts counting into `stats`.
    pub fn new(inner: &'a mut dyn GraphicsContext, stats: &'a mut FrameStats) -> Self {
        Self { inner, stats }
    }
}

impl GraphicsContext for StatsRecorder<'_> {
    fn create_buffer(&mut self) -> Result<BufferId, ResourceError> {
        self.inner.create_buffer()
    }

    fn upload_buffer(
        &mut self,
        id: BufferId,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), ResourceError> {
        self.inner.upload_buffer(id, target, data, usage)?;
        self.stats.buffer_uploads += 1;
        Ok(())
    }

    fn delete_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.inner.delete_buffer(id)
    }

    fn create_texture(&mut self) -> Result<TextureId, ResourceError> {
        self.inner.create_texture()
    }

    fn upload_texture(
        &mut self,
        id: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: &[u8],
    ) -> Result<(), ResourceError> {
        self.inner.upload_texture(id, width, height, format, pixels)?;
        self.stats.texture_uploads += 1;
        Ok(())
    }

    fn set_sampler(&mut self, id: TextureId, params: &SamplerParams) -> Result<(), ResourceError> {
        self.inner.set_sampler(id, params)?;
        self.stats.sampler_updates += 1;
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        self.inner.bind_texture(unit, id)
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.inner.delete_texture(id)
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError> {
        self.inner.create_vertex_array()
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        self.inner.bind_vertex_array(id)
    }

    fn bind_index_buffer(&mut self, id: Option<BufferId>) -> Result<(), ResourceError> {
        self.inner.bind_index_buffer(id)
    }

    fn set_vertex_attribute(&mut self, attribute: &VertexAttribute) -> Result<(), ResourceError> {
        self.inner.set_vertex_attribute(attribute)
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError> {
        self.inner.delete_vertex_array(id)
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderObjectId, String> {
        self.inner.compile_shader(stage, source)
    }

    fn link_program(
        &mut self,
        vertex: ShaderObjectId,
        fragment: ShaderObjectId,
    ) -> Result<ProgramId, String> {
        self.inner.link_program(vertex, fragment)
    }

    fn delete_shader(&mut self, id: ShaderObjectId) -> Result<(), ResourceError> {
        self.inner.delete_shader(id)
    }

    fn delete_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        self.inner.delete_program(id)
    }

    fn active_uniforms(&mut self, program: ProgramId) -> Result<Vec<UniformInfo>, ResourceError> {
        self.inner.active_uniforms(program)
    }

    fn active_attributes(
        &mut self,
        program: ProgramId,
    ) -> Result<Vec<AttributeInfo>, ResourceError> {
        self.inner.active_attributes(program)
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ResourceError> {
        self.inner.use_program(program)
    }

    fn set_uniform(
        &mut self,
        location: UniformLocation,
        value: &UniformValue,
    ) -> Result<(), ResourceError> {
        self.inner.set_uniform(location, value)?;
        self.stats.uniform_writes += 1;
        Ok(())
    }

    fn set_capability(
        &mut self,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), ResourceError> {
        self.inner.set_capability(capability, enabled)
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), ResourceError> {
        self.inner.viewport(x, y, width, height)
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) -> Result<(), ResourceError> {
        self.inner.clear(color, depth)?;
        self.stats.clears += 1;
        Ok(())
    }

    fn draw_arrays_instanced(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instances: u32,
    ) -> Result<(), ResourceError> {
        self.inner.draw_arrays_instanced(mode, first, count, instances)?;
        self.stats.draw_calls += 1;
        self.stats.instances += instances as usize;
        Ok(())
    }

    fn draw_elements_instanced(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        format: IndexFormat,
        instances: u32,
    ) -> Result<(), ResourceError> {
        self.inner.draw_elements_instanced(mode, count, format, instances)?;
        self.stats.draw_calls += 1;
        self.stats.instances += instances as usize;
        Ok(())
    }
}
