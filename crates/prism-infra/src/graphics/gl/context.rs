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

use super::conversions::{uniform_kind, IntoGl};
use glow::HasContext;
use prism_core::renderer::*;
use std::collections::HashMap;

/// Resolves a handle in one of the object tables.
fn lookup<T: Copy>(
    table: &HashMap<usize, T>,
    kind: &'static str,
    id: usize,
) -> Result<T, ResourceError> {
    table
        .get(&id)
        .copied()
        .ok_or(ResourceError::InvalidHandle { kind, id })
}

/// A [`GraphicsContext`] issuing OpenGL 3.3 core calls through `glow`.
///
/// The context must be current on the calling thread for the lifetime of
/// this value. Engine handles index tables of `glow` objects, so a stale
/// handle is reported as [`ResourceError::InvalidHandle`] instead of reaching
/// the driver.
pub struct GlowContext {
    gl: glow::Context,
    next_id: usize,
    buffers: HashMap<usize, glow::Buffer>,
    textures: HashMap<usize, glow::Texture>,
    vertex_arrays: HashMap<usize, glow::VertexArray>,
    shaders: HashMap<usize, glow::Shader>,
    programs: HashMap<usize, glow::Program>,
    uniform_locations: HashMap<usize, glow::UniformLocation>,
}

impl GlowContext {
    /// Wraps a loaded `glow` context.
    pub fn new(gl: glow::Context) -> Self {
        unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            log::info!(
                "OpenGL context: {} ({})",
                gl.get_parameter_string(glow::VERSION),
                gl.get_parameter_string(glow::RENDERER)
            );
        }
        Self {
            gl,
            next_id: 0,
            buffers: HashMap::new(),
            textures: HashMap::new(),
            vertex_arrays: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            uniform_locations: HashMap::new(),
        }
    }

    /// The underlying `glow` context.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    /// Reads a uniform's current value from the program `location` belongs to.
    fn read_uniform(
        &self,
        program: glow::Program,
        location: &glow::UniformLocation,
        kind: UniformKind,
    ) -> UniformValue {
        if matches!(kind, UniformKind::Int | UniformKind::Sampler2D) {
            let mut value = [0i32];
            unsafe { self.gl.get_uniform_i32(program, location, &mut value) };
            return UniformValue::Int(value[0]);
        }
        let mut components = [0.0f32; 16];
        let components = &mut components[..kind.components()];
        unsafe { self.gl.get_uniform_f32(program, location, components) };
        UniformValue::from_components(kind, components).unwrap_or_else(|| kind.zero())
    }
}

impl GraphicsContext for GlowContext {
    fn create_buffer(&mut self) -> Result<BufferId, ResourceError> {
        let buffer = unsafe { self.gl.create_buffer() }.map_err(ResourceError::Backend)?;
        let id = self.next();
        self.buffers.insert(id, buffer);
        Ok(BufferId(id))
    }

    fn upload_buffer(
        &mut self,
        id: BufferId,
        _target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), ResourceError> {
        let buffer = lookup(&self.buffers, "buffer", id.0)?;
        // Index data also goes through ARRAY_BUFFER so the upload does not
        // rebind the element buffer of whatever vertex array is bound.
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, usage.into_gl());
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        Ok(())
    }

    fn delete_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        let buffer = self
            .buffers
            .remove(&id.0)
            .ok_or(ResourceError::InvalidHandle {
                kind: "buffer",
                id: id.0,
            })?;
        unsafe { self.gl.delete_buffer(buffer) };
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureId, ResourceError> {
        let texture = unsafe { self.gl.create_texture() }.map_err(ResourceError::Backend)?;
        let id = self.next();
        self.textures.insert(id, texture);
        Ok(TextureId(id))
    }

    fn upload_texture(
        &mut self,
        id: TextureId,
        width: u32,
        height: u32,
        format: TextureFormat,
        pixels: &[u8],
    ) -> Result<(), ResourceError> {
        if pixels.len() != width as usize * height as usize * format.bytes_per_pixel() {
            return Err(ResourceError::OutOfBounds);
        }
        let texture = lookup(&self.textures, "texture", id.0)?;
        let (internal, pixel_format) = format.into_gl();
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal,
                width as i32,
                height as i32,
                0,
                pixel_format,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_BASE_LEVEL, 0);
            self.gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAX_LEVEL, 0);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        Ok(())
    }

    fn set_sampler(&mut self, id: TextureId, params: &SamplerParams) -> Result<(), ResourceError> {
        let texture = lookup(&self.textures, "texture", id.0)?;
        unsafe {
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, params.wrap_u.into_gl());
            self.gl
                .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, params.wrap_v.into_gl());
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                params.min_filter.into_gl(),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                params.mag_filter.into_gl(),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        let texture = lookup(&self.textures, "texture", id.0)?;
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        }
        Ok(())
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        let texture = self
            .textures
            .remove(&id.0)
            .ok_or(ResourceError::InvalidHandle {
                kind: "texture",
                id: id.0,
            })?;
        unsafe { self.gl.delete_texture(texture) };
        Ok(())
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError> {
        let vertex_array =
            unsafe { self.gl.create_vertex_array() }.map_err(ResourceError::Backend)?;
        let id = self.next();
        self.vertex_arrays.insert(id, vertex_array);
        Ok(VertexArrayId(id))
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        let vertex_array = id
            .map(|id| lookup(&self.vertex_arrays, "vertex array", id.0))
            .transpose()?;
        unsafe { self.gl.bind_vertex_array(vertex_array) };
        Ok(())
    }

    fn bind_index_buffer(&mut self, id: Option<BufferId>) -> Result<(), ResourceError> {
        let buffer = id
            .map(|id| lookup(&self.buffers, "buffer", id.0))
            .transpose()?;
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, buffer) };
        Ok(())
    }

    fn set_vertex_attribute(&mut self, attribute: &VertexAttribute) -> Result<(), ResourceError> {
        let buffer = lookup(&self.buffers, "buffer", attribute.buffer.0)?;
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.gl.enable_vertex_attrib_array(attribute.location);
            self.gl.vertex_attrib_pointer_f32(
                attribute.location,
                attribute.components as i32,
                glow::FLOAT,
                false,
                attribute.stride as i32,
                attribute.offset as i32,
            );
            self.gl
                .vertex_attrib_divisor(attribute.location, attribute.divisor);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
        Ok(())
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError> {
        let vertex_array =
            self.vertex_arrays
                .remove(&id.0)
                .ok_or(ResourceError::InvalidHandle {
                    kind: "vertex array",
                    id: id.0,
                })?;
        unsafe { self.gl.delete_vertex_array(vertex_array) };
        Ok(())
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderObjectId, String> {
        let shader = unsafe {
            let shader = self.gl.create_shader(stage.into_gl())?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(log);
            }
            shader
        };
        let id = self.next();
        self.shaders.insert(id, shader);
        Ok(ShaderObjectId(id))
    }

    fn link_program(
        &mut self,
        vertex: ShaderObjectId,
        fragment: ShaderObjectId,
    ) -> Result<ProgramId, String> {
        let vs = lookup(&self.shaders, "shader", vertex.0).map_err(|e| e.to_string())?;
        let fs = lookup(&self.shaders, "shader", fragment.0).map_err(|e| e.to_string())?;
        let program = unsafe {
            let program = self.gl.create_program()?;
            self.gl.attach_shader(program, vs);
            self.gl.attach_shader(program, fs);
            self.gl.link_program(program);
            self.gl.detach_shader(program, vs);
            self.gl.detach_shader(program, fs);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(log);
            }
            program
        };
        let id = self.next();
        self.programs.insert(id, program);
        Ok(ProgramId(id))
    }

    fn delete_shader(&mut self, id: ShaderObjectId) -> Result<(), ResourceError> {
        let shader = self
            .shaders
            .remove(&id.0)
            .ok_or(ResourceError::InvalidHandle {
                kind: "shader",
                id: id.0,
            })?;
        unsafe { self.gl.delete_shader(shader) };
        Ok(())
    }

    fn delete_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        let program = self
            .programs
            .remove(&id.0)
            .ok_or(ResourceError::InvalidHandle {
                kind: "program",
                id: id.0,
            })?;
        unsafe { self.gl.delete_program(program) };
        Ok(())
    }

    fn active_uniforms(&mut self, program: ProgramId) -> Result<Vec<UniformInfo>, ResourceError> {
        let handle = lookup(&self.programs, "program", program.0)?;
        let active: Vec<_> = unsafe {
            (0..self.gl.get_active_uniforms(handle))
                .filter_map(|index| self.gl.get_active_uniform(handle, index))
                .collect()
        };

        let mut uniforms = Vec::with_capacity(active.len());
        for uniform in active {
            let Some(kind) = uniform_kind(uniform.utype) else {
                log::trace!("Skipping uniform '{}' of GL type {:#x}", uniform.name, uniform.utype);
                continue;
            };
            // Arrays report their first element as `name[0]`.
            let name = uniform
                .name
                .strip_suffix("[0]")
                .unwrap_or(&uniform.name)
                .to_owned();
            let Some(location) = (unsafe { self.gl.get_uniform_location(handle, &name) }) else {
                continue;
            };
            let initial = self.read_uniform(handle, &location, kind);
            let id = self.next();
            self.uniform_locations.insert(id, location);
            uniforms.push(UniformInfo {
                name,
                location: UniformLocation(id),
                kind,
                initial,
            });
        }
        Ok(uniforms)
    }

    fn active_attributes(
        &mut self,
        program: ProgramId,
    ) -> Result<Vec<AttributeInfo>, ResourceError> {
        let handle = lookup(&self.programs, "program", program.0)?;
        let attributes = unsafe {
            (0..self.gl.get_active_attributes(handle))
                .filter_map(|index| self.gl.get_active_attribute(handle, index))
                .filter_map(|attribute| {
                    let location = self.gl.get_attrib_location(handle, &attribute.name)?;
                    Some(AttributeInfo {
                        name: attribute.name,
                        location,
                    })
                })
                .collect()
        };
        Ok(attributes)
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ResourceError> {
        let handle = program
            .map(|id| lookup(&self.programs, "program", id.0))
            .transpose()?;
        unsafe { self.gl.use_program(handle) };
        Ok(())
    }

    fn set_uniform(
        &mut self,
        location: UniformLocation,
        value: &UniformValue,
    ) -> Result<(), ResourceError> {
        let handle = self
            .uniform_locations
            .get(&location.0)
            .ok_or(ResourceError::InvalidHandle {
                kind: "uniform location",
                id: location.0,
            })?;
        let loc = Some(handle);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, *v),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(loc, *x, *y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(loc, *x, *y, *z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(loc, *x, *y, *z, *w),
                UniformValue::Mat4(m) => self.gl.uniform_matrix_4_f32_slice(loc, false, m),
                UniformValue::Int(v) => self.gl.uniform_1_i32(loc, *v),
            }
        }
        Ok(())
    }

    fn set_capability(
        &mut self,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), ResourceError> {
        unsafe {
            if enabled {
                self.gl.enable(capability.into_gl());
            } else {
                self.gl.disable(capability.into_gl());
            }
        }
        Ok(())
    }

    fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) -> Result<(), ResourceError> {
        unsafe { self.gl.viewport(x, y, width as i32, height as i32) };
        Ok(())
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) -> Result<(), ResourceError> {
        let mut mask = 0;
        unsafe {
            if let Some([r, g, b, a]) = color {
                self.gl.clear_color(r, g, b, a);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if depth {
                self.gl.depth_mask(true);
                self.gl.clear_depth_f32(1.0);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            if mask != 0 {
                self.gl.clear(mask);
            }
        }
        Ok(())
    }

    fn draw_arrays_instanced(
        &mut self,
        mode: PrimitiveMode,
        first: u32,
        count: u32,
        instances: u32,
    ) -> Result<(), ResourceError> {
        unsafe {
            self.gl
                .draw_arrays_instanced(mode.into_gl(), first as i32, count as i32, instances as i32)
        };
        Ok(())
    }

    fn draw_elements_instanced(
        &mut self,
        mode: PrimitiveMode,
        count: u32,
        format: IndexFormat,
        instances: u32,
    ) -> Result<(), ResourceError> {
        unsafe {
            self.gl.draw_elements_instanced(
                mode.into_gl(),
                count as i32,
                format.into_gl(),
                0,
                instances as i32,
            )
        };
        Ok(())
    }
}
