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

use super::glsl;
use prism_core::renderer::*;
use std::collections::{BTreeMap, HashMap};

/// One call made on a [`HeadlessContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    /// `create_buffer`
    CreateBuffer(BufferId),
    /// `upload_buffer`, with the uploaded byte length.
    UploadBuffer {
        /// Target buffer.
        id: BufferId,
        /// Binding point.
        target: BufferTarget,
        /// Bytes uploaded.
        len: usize,
        /// Usage hint.
        usage: BufferUsage,
    },
    /// `delete_buffer`
    DeleteBuffer(BufferId),
    /// `create_texture`
    CreateTexture(TextureId),
    /// `upload_texture`
    UploadTexture {
        /// Target texture.
        id: TextureId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
        /// Pixel layout.
        format: TextureFormat,
    },
    /// `set_sampler`
    SetSampler {
        /// Target texture.
        id: TextureId,
        /// Applied parameters.
        params: SamplerParams,
    },
    /// `bind_texture`
    BindTexture {
        /// Texture unit.
        unit: u32,
        /// Bound texture.
        id: TextureId,
    },
    /// `delete_texture`
    DeleteTexture(TextureId),
    /// `create_vertex_array`
    CreateVertexArray(VertexArrayId),
    /// `bind_vertex_array`
    BindVertexArray(Option<VertexArrayId>),
    /// `bind_index_buffer`
    BindIndexBuffer(Option<BufferId>),
    /// `set_vertex_attribute`
    SetVertexAttribute(VertexAttribute),
    /// `delete_vertex_array`
    DeleteVertexArray(VertexArrayId),
    /// `compile_shader`; `None` when compilation failed.
    CompileShader {
        /// Stage compiled.
        stage: ShaderStage,
        /// The created object.
        id: Option<ShaderObjectId>,
    },
    /// `link_program`; `None` when linking failed.
    LinkProgram(Option<ProgramId>),
    /// `delete_shader`
    DeleteShader(ShaderObjectId),
    /// `delete_program`
    DeleteProgram(ProgramId),
    /// `use_program`
    UseProgram(Option<ProgramId>),
    /// `set_uniform`
    SetUniform {
        /// Written location.
        location: UniformLocation,
        /// Written value.
        value: UniformValue,
    },
    /// `set_capability`
    SetCapability {
        /// Toggled state.
        capability: Capability,
        /// New value.
        enabled: bool,
    },
    /// `viewport`
    Viewport {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// `clear`
    Clear {
        /// Clear color, if the color buffer was cleared.
        color: Option<[f32; 4]>,
        /// Whether depth was cleared.
        depth: bool,
    },
    /// `draw_arrays_instanced`
    DrawArraysInstanced {
        /// Vertices per instance.
        count: u32,
        /// Instance count.
        instances: u32,
    },
    /// `draw_elements_instanced`
    DrawElementsInstanced {
        /// Indices per instance.
        count: u32,
        /// Index width.
        format: IndexFormat,
        /// Instance count.
        instances: u32,
    },
}

impl GlCall {
    /// Returns `true` for either instanced draw call.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            GlCall::DrawArraysInstanced { .. } | GlCall::DrawElementsInstanced { .. }
        )
    }

    /// The instance count of a draw call.
    pub fn instances(&self) -> Option<u32> {
        match self {
            GlCall::DrawArraysInstanced { instances, .. }
            | GlCall::DrawElementsInstanced { instances, .. } => Some(*instances),
            _ => None,
        }
    }
}

/// Attribute pointers and index binding recorded into a vertex array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArrayState {
    /// Attribute pointers by slot.
    pub attributes: BTreeMap<u32, VertexAttribute>,
    /// The attached index buffer.
    pub index_buffer: Option<BufferId>,
}

#[derive(Debug, Clone)]
struct TextureState {
    width: u32,
    height: u32,
    sampler: Option<SamplerParams>,
}

#[derive(Debug, Clone)]
struct ProgramState {
    attributes: Vec<AttributeInfo>,
    uniforms: Vec<UniformInfo>,
    values: HashMap<UniformLocation, UniformValue>,
}

/// A [`GraphicsContext`] that validates handles, keeps enough state to
/// answer introspection queries, and logs every successful call.
///
/// Shader stages "compile" unless their source is empty, lacks `main`, or
/// contains an `#error` directive. Program introspection reads the `in` and
/// `uniform` declarations of the sources; vertex inputs without an explicit
/// `layout(location = N)` are assigned slots in declaration order.
///
/// Texture units follow the GL backend: uploads and sampler changes bind the
/// texture to the active unit and leave that unit empty afterwards.
#[derive(Debug, Default)]
pub struct HeadlessContext {
    next_id: usize,
    calls: Vec<GlCall>,
    buffers: HashMap<BufferId, Vec<u8>>,
    textures: HashMap<TextureId, TextureState>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    shaders: HashMap<ShaderObjectId, (ShaderStage, String)>,
    programs: HashMap<ProgramId, ProgramState>,
    bound_vertex_array: Option<VertexArrayId>,
    current_program: Option<ProgramId>,
    capabilities: HashMap<Capability, bool>,
    viewport: (u32, u32),
    active_texture_unit: u32,
    texture_units: BTreeMap<u32, TextureId>,
}

fn invalid(kind: &'static str, id: usize) -> ResourceError {
    ResourceError::InvalidHandle { kind, id }
}

impl HeadlessContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> usize {
        self.next_id += 1;
        self.next_id
    }

    /// Every call recorded so far.
    pub fn calls(&self) -> &[GlCall] {
        &self.calls
    }

    /// Returns and clears the call log.
    pub fn take_calls(&mut self) -> Vec<GlCall> {
        std::mem::take(&mut self.calls)
    }

    /// Clears the call log without touching object state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Counts recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|call| predicate(call)).count()
    }

    /// Instance counts of the recorded draw calls, in order.
    pub fn draw_instances(&self) -> Vec<u32> {
        self.calls.iter().filter_map(GlCall::instances).collect()
    }

    /// Current content of a buffer.
    pub fn buffer_data(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(&id).map(Vec::as_slice)
    }

    /// Recorded state of a vertex array.
    pub fn vertex_array(&self, id: VertexArrayId) -> Option<&VertexArrayState> {
        self.vertex_arrays.get(&id)
    }

    /// Size of a texture at its last upload.
    pub fn texture_size(&self, id: TextureId) -> Option<(u32, u32)> {
        self.textures.get(&id).map(|t| (t.width, t.height))
    }

    /// Last sampler parameters applied to a texture.
    pub fn texture_sampler(&self, id: TextureId) -> Option<SamplerParams> {
        self.textures.get(&id).and_then(|t| t.sampler)
    }

    /// The texture currently bound to a texture unit.
    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.texture_units.get(&unit).copied()
    }

    /// Last value written to a uniform, looked up by name.
    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let state = self.programs.get(&program)?;
        let info = state.uniforms.iter().find(|u| u.name == name)?;
        state.values.get(&info.location).copied()
    }

    /// The current program.
    pub fn current_program(&self) -> Option<ProgramId> {
        self.current_program
    }

    /// Number of live programs.
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Number of live shader stage objects.
    pub fn shader_object_count(&self) -> usize {
        self.shaders.len()
    }

    /// Whether a capability is enabled. Everything starts disabled.
    pub fn capability(&self, capability: Capability) -> bool {
        self.capabilities.get(&capability).copied().unwrap_or(false)
    }

    /// The last viewport size.
    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport
    }

    fn bound_vertex_array_mut(&mut self) -> Result<&mut VertexArrayState, ResourceError> {
        let id = self
            .bound_vertex_array
            .ok_or_else(|| ResourceError::Backend("no vertex array bound".to_owned()))?;
        self.vertex_arrays
            .get_mut(&id)
            .ok_or(invalid("vertex array", id.0))
    }

    fn check_draw(&self, indexed: bool) -> Result<(), ResourceError> {
        if self.current_program.is_none() {
            return Err(ResourceError::Backend("draw without a program".to_owned()));
        }
        let vertex_array = self
            .bound_vertex_array
            .and_then(|id| self.vertex_arrays.get(&id))
            .ok_or_else(|| ResourceError::Backend("draw without a vertex array".to_owned()))?;
        if indexed && vertex_array.index_buffer.is_none() {
            return Err(ResourceError::Backend(
                "indexed draw without an index buffer".to_owned(),
            ));
        }
        Ok(())
    }

    fn introspect(vertex: &str, fragment: &str) -> (Vec<AttributeInfo>, Vec<UniformInfo>) {
        let mut attributes = Vec::new();
        let mut next_slot = 0;
        for decl in glsl::declarations(vertex, "in") {
            let location = decl.location.unwrap_or(next_slot);
            next_slot = location + glsl::attribute_slots(decl.ty);
            attributes.push(AttributeInfo {
                name: decl.name.to_owned(),
                location,
            });
        }

        let mut uniforms: Vec<UniformInfo> = Vec::new();
        for decl in glsl::declarations(vertex, "uniform")
            .into_iter()
            .chain(glsl::declarations(fragment, "uniform"))
        {
            if uniforms.iter().any(|u| u.name == decl.name) {
                continue;
            }
            if let Some(kind) = glsl::uniform_kind(decl.ty) {
                uniforms.push(UniformInfo {
                    name: decl.name.to_owned(),
                    location: UniformLocation(0),
                    kind,
                    initial: glsl::initial_value(kind, decl.initializer),
                });
            }
        }
        (attributes, uniforms)
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_buffer(&mut self) -> Result<BufferId, ResourceError> {
        let id = BufferId(self.next());
        self.buffers.insert(id, Vec::new());
        self.calls.push(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn upload_buffer(
        &mut self,
        id: BufferId,
        target: BufferTarget,
        data: &[u8],
        usage: BufferUsage,
    ) -> Result<(), ResourceError> {
        let buffer = self.buffers.get_mut(&id).ok_or(invalid("buffer", id.0))?;
        buffer.clear();
        buffer.extend_from_slice(data);
        self.calls.push(GlCall::UploadBuffer {
            id,
            target,
            len: data.len(),
            usage,
        });
        Ok(())
    }

    fn delete_buffer(&mut self, id: BufferId) -> Result<(), ResourceError> {
        self.buffers.remove(&id).ok_or(invalid("buffer", id.0))?;
        self.calls.push(GlCall::DeleteBuffer(id));
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureId, ResourceError> {
        let id = TextureId(self.next());
        self.textures.insert(
            id,
            TextureState {
                width: 0,
                height: 0,
                sampler: None,
            },
        );
        self.calls.push(GlCall::CreateTexture(id));
        Ok(id)
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
        let texture = self.textures.get_mut(&id).ok_or(invalid("texture", id.0))?;
        texture.width = width;
        texture.height = height;
        self.texture_units.remove(&self.active_texture_unit);
        self.calls.push(GlCall::UploadTexture {
            id,
            width,
            height,
            format,
        });
        Ok(())
    }

    fn set_sampler(&mut self, id: TextureId, params: &SamplerParams) -> Result<(), ResourceError> {
        let texture = self.textures.get_mut(&id).ok_or(invalid("texture", id.0))?;
        texture.sampler = Some(*params);
        self.texture_units.remove(&self.active_texture_unit);
        self.calls.push(GlCall::SetSampler {
            id,
            params: *params,
        });
        Ok(())
    }

    fn bind_texture(&mut self, unit: u32, id: TextureId) -> Result<(), ResourceError> {
        if !self.textures.contains_key(&id) {
            return Err(invalid("texture", id.0));
        }
        self.active_texture_unit = unit;
        self.texture_units.insert(unit, id);
        self.calls.push(GlCall::BindTexture { unit, id });
        Ok(())
    }

    fn delete_texture(&mut self, id: TextureId) -> Result<(), ResourceError> {
        self.textures.remove(&id).ok_or(invalid("texture", id.0))?;
        self.texture_units.retain(|_, bound| *bound != id);
        self.calls.push(GlCall::DeleteTexture(id));
        Ok(())
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, ResourceError> {
        let id = VertexArrayId(self.next());
        self.vertex_arrays.insert(id, VertexArrayState::default());
        self.calls.push(GlCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) -> Result<(), ResourceError> {
        if let Some(id) = id {
            if !self.vertex_arrays.contains_key(&id) {
                return Err(invalid("vertex array", id.0));
            }
        }
        self.bound_vertex_array = id;
        self.calls.push(GlCall::BindVertexArray(id));
        Ok(())
    }

    fn bind_index_buffer(&mut self, id: Option<BufferId>) -> Result<(), ResourceError> {
        if let Some(buffer) = id {
            if !self.buffers.contains_key(&buffer) {
                return Err(invalid("buffer", buffer.0));
            }
        }
        self.bound_vertex_array_mut()?.index_buffer = id;
        self.calls.push(GlCall::BindIndexBuffer(id));
        Ok(())
    }

    fn set_vertex_attribute(&mut self, attribute: &VertexAttribute) -> Result<(), ResourceError> {
        if !self.buffers.contains_key(&attribute.buffer) {
            return Err(invalid("buffer", attribute.buffer.0));
        }
        if !(1..=4).contains(&attribute.components) {
            return Err(ResourceError::OutOfBounds);
        }
        self.bound_vertex_array_mut()?
            .attributes
            .insert(attribute.location, *attribute);
        self.calls.push(GlCall::SetVertexAttribute(*attribute));
        Ok(())
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<(), ResourceError> {
        self.vertex_arrays
            .remove(&id)
            .ok_or(invalid("vertex array", id.0))?;
        if self.bound_vertex_array == Some(id) {
            self.bound_vertex_array = None;
        }
        self.calls.push(GlCall::DeleteVertexArray(id));
        Ok(())
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderObjectId, String> {
        if let Some(log) = glsl::compile_log(source) {
            self.calls.push(GlCall::CompileShader { stage, id: None });
            return Err(log);
        }
        let id = ShaderObjectId(self.next());
        self.shaders.insert(id, (stage, source.to_owned()));
        self.calls.push(GlCall::CompileShader {
            stage,
            id: Some(id),
        });
        Ok(id)
    }

    fn link_program(
        &mut self,
        vertex: ShaderObjectId,
        fragment: ShaderObjectId,
    ) -> Result<ProgramId, String> {
        let sources = match (self.shaders.get(&vertex), self.shaders.get(&fragment)) {
            (Some((ShaderStage::Vertex, vs)), Some((ShaderStage::Fragment, fs))) => {
                Ok((vs.clone(), fs.clone()))
            }
            (Some(_), Some(_)) => Err("error: stage mismatch between attached shaders".to_owned()),
            _ => Err("error: attached shader object does not exist".to_owned()),
        };
        let (vs, fs) = match sources {
            Ok(sources) => sources,
            Err(log) => {
                self.calls.push(GlCall::LinkProgram(None));
                return Err(log);
            }
        };

        let (attributes, mut uniforms) = Self::introspect(&vs, &fs);
        for uniform in &mut uniforms {
            uniform.location = UniformLocation(self.next());
        }
        let values = uniforms
            .iter()
            .map(|u| (u.location, u.initial))
            .collect();
        let id = ProgramId(self.next());
        self.programs.insert(
            id,
            ProgramState {
                attributes,
                uniforms,
                values,
            },
        );
        self.calls.push(GlCall::LinkProgram(Some(id)));
        Ok(id)
    }

    fn delete_shader(&mut self, id: ShaderObjectId) -> Result<(), ResourceError> {
        self.shaders.remove(&id).ok_or(invalid("shader", id.0))?;
        self.calls.push(GlCall::DeleteShader(id));
        Ok(())
    }

    fn delete_program(&mut self, id: ProgramId) -> Result<(), ResourceError> {
        self.programs.remove(&id).ok_or(invalid("program", id.0))?;
        if self.current_program == Some(id) {
            self.current_program = None;
        }
        self.calls.push(GlCall::DeleteProgram(id));
        Ok(())
    }

    fn active_uniforms(&mut self, program: ProgramId) -> Result<Vec<UniformInfo>, ResourceError> {
        self.programs
            .get(&program)
            .map(|p| p.uniforms.clone())
            .ok_or(invalid("program", program.0))
    }

    fn active_attributes(
        &mut self,
        program: ProgramId,
    ) -> Result<Vec<AttributeInfo>, ResourceError> {
        self.programs
            .get(&program)
            .map(|p| p.attributes.clone())
            .ok_or(invalid("program", program.0))
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> Result<(), ResourceError> {
        if let Some(id) = program {
            if !self.programs.contains_key(&id) {
                return Err(invalid("program", id.0));
            }
        }
        self.current_program = program;
        self.calls.push(GlCall::UseProgram(program));
        Ok(())
    }

    fn set_uniform(
        &mut self,
        location: UniformLocation,
        value: &UniformValue,
    ) -> Result<(), ResourceError> {
        let program = self
            .current_program
            .ok_or_else(|| ResourceError::Backend("uniform write without a program".to_owned()))?;
        let state = self
            .programs
            .get_mut(&program)
            .ok_or(invalid("program", program.0))?;
        let info = state
            .uniforms
            .iter()
            .find(|u| u.location == location)
            .ok_or(invalid("uniform location", location.0))?;
        if !info.kind.accepts(value) {
            return Err(ResourceError::Backend(format!(
                "uniform '{}' is a {}, got a {}",
                info.name,
                info.kind,
                value.kind()
            )));
        }
        state.values.insert(location, *value);
        self.calls.push(GlCall::SetUniform {
            location,
            value: *value,
        });
        Ok(())
    }

    fn set_capability(
        &mut self,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), ResourceError> {
        self.capabilities.insert(capability, enabled);
        self.calls.push(GlCall::SetCapability {
            capability,
            enabled,
        });
        Ok(())
    }

    fn viewport(&mut self, _x: i32, _y: i32, width: u32, height: u32) -> Result<(), ResourceError> {
        self.viewport = (width, height);
        self.calls.push(GlCall::Viewport { width, height });
        Ok(())
    }

    fn clear(&mut self, color: Option<[f32; 4]>, depth: bool) -> Result<(), ResourceError> {
        self.calls.push(GlCall::Clear { color, depth });
        Ok(())
    }

    fn draw_arrays_instanced(
        &mut self,
        _mode: PrimitiveMode,
        _first: u32,
        count: u32,
        instances: u32,
    ) -> Result<(), ResourceError> {
        self.check_draw(false)?;
        self.calls
            .push(GlCall::DrawArraysInstanced { count, instances });
        Ok(())
    }

    fn draw_elements_instanced(
        &mut self,
        _mode: PrimitiveMode,
        count: u32,
        format: IndexFormat,
        instances: u32,
    ) -> Result<(), ResourceError> {
        self.check_draw(true)?;
        self.calls.push(GlCall::DrawElementsInstanced {
            count,
            format,
            instances,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "#version 330 core\n\
                      in vec3 a_position;\n\
                      in mat4 a_instance_transform;\n\
                      in vec4 a_instance_color;\n\
                      uniform mat4 u_view;\n\
                      void main() {}\n";
    const FS: &str = "#version 330 core\n\
                      in vec4 v_color;\n\
                      uniform mat4 u_view;\n\
                      uniform sampler2D u_albedo_map;\n\
                      void main() {}\n";

    fn link(ctx: &mut HeadlessContext) -> ProgramId {
        let vs = ctx.compile_shader(ShaderStage::Vertex, VS).expect("vs");
        let fs = ctx.compile_shader(ShaderStage::Fragment, FS).expect("fs");
        ctx.link_program(vs, fs).expect("link")
    }

    #[test]
    fn matrix_inputs_take_four_slots() {
        let mut ctx = HeadlessContext::new();
        let program = link(&mut ctx);
        let attributes = ctx.active_attributes(program).expect("program");
        let slots: Vec<_> = attributes.iter().map(|a| (a.name.as_str(), a.location)).collect();
        assert_eq!(
            slots,
            [
                ("a_position", 0),
                ("a_instance_transform", 1),
                ("a_instance_color", 5)
            ]
        );
    }

    #[test]
    fn uniforms_are_deduplicated_across_stages() {
        let mut ctx = HeadlessContext::new();
        let program = link(&mut ctx);
        let uniforms = ctx.active_uniforms(program).expect("program");
        let names: Vec<_> = uniforms.iter().map(|u| (u.name.as_str(), u.kind)).collect();
        assert_eq!(
            names,
            [
                ("u_view", UniformKind::Mat4),
                ("u_albedo_map", UniformKind::Sampler2D)
            ]
        );
    }

    #[test]
    fn uniform_writes_need_the_program_bound() {
        let mut ctx = HeadlessContext::new();
        let program = link(&mut ctx);
        let location = ctx.active_uniforms(program).expect("program")[0].location;
        let value = UniformValue::Mat4([2.0; 16]);

        assert!(ctx.set_uniform(location, &value).is_err());
        ctx.use_program(Some(program)).expect("use");
        ctx.set_uniform(location, &value).expect("write");
        assert_eq!(ctx.uniform_value(program, "u_view"), Some(value));
    }

    #[test]
    fn linking_seeds_uniforms_with_their_initializers() {
        let mut ctx = HeadlessContext::new();
        let vs = ctx
            .compile_shader(ShaderStage::Vertex, "uniform float u_scale = 2.0;\nvoid main() {}\n")
            .expect("vs");
        let fs = ctx
            .compile_shader(ShaderStage::Fragment, "uniform vec4 u_tint;\nvoid main() {}\n")
            .expect("fs");
        let program = ctx.link_program(vs, fs).expect("link");

        let uniforms = ctx.active_uniforms(program).expect("program");
        assert_eq!(uniforms[0].initial, UniformValue::Float(2.0));
        assert_eq!(ctx.uniform_value(program, "u_scale"), Some(UniformValue::Float(2.0)));
        assert_eq!(ctx.uniform_value(program, "u_tint"), Some(UniformValue::Vec4([0.0; 4])));
    }

    #[test]
    fn uploads_leave_the_active_texture_unit_empty() {
        let mut ctx = HeadlessContext::new();
        let first = ctx.create_texture().expect("texture");
        let second = ctx.create_texture().expect("texture");
        ctx.bind_texture(0, first).expect("bind");
        ctx.bind_texture(1, second).expect("bind");

        ctx.upload_texture(first, 1, 1, TextureFormat::Rgba8, &[0; 4])
            .expect("upload");
        assert_eq!(ctx.bound_texture(0), Some(first));
        assert_eq!(ctx.bound_texture(1), None);

        ctx.delete_texture(first).expect("delete");
        assert_eq!(ctx.bound_texture(0), None);
    }

    #[test]
    fn indexed_draw_requires_an_index_buffer() {
        let mut ctx = HeadlessContext::new();
        let program = link(&mut ctx);
        let vao = ctx.create_vertex_array().expect("vao");
        ctx.use_program(Some(program)).expect("use");
        ctx.bind_vertex_array(Some(vao)).expect("bind");

        assert!(ctx
            .draw_elements_instanced(PrimitiveMode::Triangles, 3, IndexFormat::U16, 1)
            .is_err());
        ctx.draw_arrays_instanced(PrimitiveMode::Triangles, 0, 3, 2)
            .expect("array draw");
        assert_eq!(ctx.draw_instances(), vec![2]);
    }
}
