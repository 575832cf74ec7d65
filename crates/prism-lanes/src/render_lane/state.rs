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

//! Skips GPU state calls that would not change anything.

use prism_core::renderer::{
    Capability, GraphicsContext, ProgramId, ResourceError, TextureId, VertexArrayId,
};

/// Mirrors the bound program, vertex array, toggles and texture units.
///
/// Starts out knowing nothing, so the first call of each kind always reaches
/// the GPU. Anything that binds behind the tracker's back must be followed by
/// [`StateTracker::reset`].
#[derive(Debug, Default)]
pub struct StateTracker {
    program: Option<ProgramId>,
    vertex_array: Option<VertexArrayId>,
    capabilities: [Option<bool>; 3],
    textures: Vec<Option<TextureId>>,
}

fn capability_slot(capability: Capability) -> usize {
    match capability {
        Capability::DepthTest => 0,
        Capability::CullFace => 1,
        Capability::Blend => 2,
    }
}

impl StateTracker {
    /// Forgets all known state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Makes `program` current unless it already is.
    pub fn use_program(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        program: ProgramId,
    ) -> Result<(), ResourceError> {
        if self.program != Some(program) {
            ctx.use_program(Some(program))?;
            self.program = Some(program);
        }
        Ok(())
    }

    /// Binds a vertex array unless it already is.
    pub fn bind_vertex_array(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        vertex_array: VertexArrayId,
    ) -> Result<(), ResourceError> {
        if self.vertex_array != Some(vertex_array) {
            ctx.bind_vertex_array(Some(vertex_array))?;
            self.vertex_array = Some(vertex_array);
        }
        Ok(())
    }

    /// Toggles a capability unless it is already in that state.
    pub fn set_capability(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        capability: Capability,
        enabled: bool,
    ) -> Result<(), ResourceError> {
        let slot = &mut self.capabilities[capability_slot(capability)];
        if *slot != Some(enabled) {
            ctx.set_capability(capability, enabled)?;
            *slot = Some(enabled);
        }
        Ok(())
    }

    /// Binds a texture to a unit unless it is already bound there.
    pub fn bind_texture(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        unit: u32,
        texture: TextureId,
    ) -> Result<(), ResourceError> {
        let unit_index = unit as usize;
        if self.textures.len() <= unit_index {
            self.textures.resize(unit_index + 1, None);
        }
        if self.textures[unit_index] != Some(texture) {
            ctx.bind_texture(unit, texture)?;
            self.textures[unit_index] = Some(texture);
        }
        Ok(())
    }
}
