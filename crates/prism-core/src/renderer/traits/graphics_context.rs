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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;

/// An immediate-mode graphics API bound to the current thread.
///
/// This is the only surface through which the renderer touches the GPU.
/// Implementations are not required to be `Send`: the context and everything
/// that calls into it live on a single render thread.
///
/// Calls that operate on "the bound vertex array" (`bind_index_buffer`,
/// `set_vertex_attribute`) affect whatever was last passed to
/// [`bind_vertex_array`](Self::bind_vertex_array), as in OpenGL.
pub trait GraphicsContext {
    /// Creates an empty buffer object.
    fn create_buffer(&mut self) -> Result<BufferId, ResourceError>;

    /// Replaces the whole content of a buffer.
    /// ## Arguments
    /// * `id` - The buffer to fill.
    /// * `target` - The binding point used for the upload.
    /// * `data` - The new content; the buffer is resized to fit.
    /// * `usage` - How often the content is expected to change.
    fn upload_buffer(
        &mut self,
        id: BufferId,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), ResourceError>;

    /// Destroys a buffer object.
    fn delete_buffer(&mut self, id: BufferId) -> Result<(), ResourceError>;

    /// Creates an empty 2D texture object.
    fn create_texture(&mut self) -> Result<TextureId, ResourceError>;

    /// Replaces the pixel data of a texture.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - If `pixels` does not hold exactly
    ///   `width * height` pixels of `format`.
    fn upload_texture(
        &mut self,
        id: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: &[u8],
    ) -> Result<(), ResourceError>;

    /// Applies wrap and filter parameters to a texture.
    fn set_sampler(&mut self, id: TextureId, params: &SamplerParams) -> Result<(), ResourceError>;

    /// Binds a texture to a texture unit.
    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError>;

    /// Destroys a texture object.
    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError>;

    /// Creates an empty vertex array object.
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError>;

    /// Binds a vertex array, or unbinds with `None`.
    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError>;

    /// Attaches an index buffer to the bound vertex array.
    fn bind_index_buffer(&mut self, id: Option<BufferId>) -> Result<(), ResourceError>;

    /// Records and enables a float attribute pointer in the bound vertex array.
    fn set_vertex_attribute(&mut self, attribute: &VertexAttribute) -> Result<(), ResourceError>;

    /// Destroys a vertex array object.
    fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError>;

    /// Compiles one shader stage.
    ///
    /// Returns the compiler log as the error when compilation fails.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderObjectId, String>;

    /// Links a vertex and a fragment stage into a program.
    ///
    /// Returns the linker log as the error when linking fails.
    fn link_program(
        &mut self,
        vertex: ShaderObjectId,
        fragment: ShaderObjectId,
    ) -> Result<ProgramId, String>;

    /// Destroys a shader stage object.
    fn delete_shader(&mut self, id: ShaderObjectId) -> Result<(), ResourceError>;

    /// Destroys a program.
    fn delete_program(&mut self, id: ProgramId) -> Result<(), ResourceError>;

    /// Lists the active uniforms of a linked program with their link-time values.
    fn active_uniforms(&mut self, program: ProgramId) -> Result<Vec<UniformInfo>, ResourceError>;

    /// Lists the active vertex inputs of a linked program.
    fn active_attributes(&mut self, program: ProgramId)
    -> Result<Vec<AttributeInfo>, ResourceError>;

    /// Makes a program current, or clears it with `None`.
    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ResourceError>;

    /// Writes a uniform of the current program.
    fn set_uniform(
        &mut self,
        location: UniformLocation,
        value: &UniformValue,
    ) -> Result<(), ResourceError>;

    /// Enables or disables a piece of fixed-function state.
    fn set_capability(&mut self, capability: Capability, enabled: bool)
    -> Result<(), ResourceError>;

    /// Sets the viewport rectangle in pixels.
    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), ResourceError>;

    /// Clears the color buffer to `color` (when given) and the depth buffer (when `depth`).
    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) -> Result<(), ResourceError>;

    /// Draws `instances` copies of `count` vertices starting at `first`.
    fn draw_arrays_instanced(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instances: u32,
    ) -> Result<(), ResourceError>;

    /// Draws `instances` copies of `count` indices from the bound index buffer.
    fn draw_elements_instanced(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        format: IndexFormat,
        instances: u32,
    ) -> Result<(), ResourceError>;
}
