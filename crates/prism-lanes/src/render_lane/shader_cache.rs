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

//! Compiles shader programs and tracks the last value written to each uniform.

use super::shaders;
use ahash::AHashMap;
use prism_core::asset::{AssetId, AssetUUID};
use prism_core::renderer::{
    CompileError, ConfigurationError, GraphicsContext, ProgramId, RenderError, ShaderStage,
    UniformKind, UniformLocation, UniformValue, UnsupportedValueError,
};
use prism_data::assets::{Assets, ShaderRef, ShaderSource};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies a program in the [`ShaderCache`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKey {
    /// An embedded shader, by name.
    Builtin(String),
    /// A shader asset, by id.
    Asset(AssetUUID),
}

impl fmt::Display for ShaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKey::Builtin(name) => write!(f, "builtin:{name}"),
            ShaderKey::Asset(uuid) => write!(f, "asset:{uuid}"),
        }
    }
}

#[derive(Debug, Clone)]
struct UniformSlot {
    location: UniformLocation,
    kind: UniformKind,
    initial: UniformValue,
    cached: Option<UniformValue>,
}

/// A linked program with its introspected interface.
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    program: ProgramId,
    attributes: AHashMap<String, u32>,
    uniforms: AHashMap<String, UniformSlot>,
    samplers: Vec<String>,
    generation: u64,
    source_version: u64,
}

impl ShaderProgram {
    /// The program handle.
    pub fn program(&self) -> ProgramId {
        self.program
    }

    /// The label used in logs.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The first attribute slot of a vertex input, if the program declares it.
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.get(name).copied()
    }

    /// The declared kind of a uniform.
    pub fn uniform_kind(&self, name: &str) -> Option<UniformKind> {
        self.uniforms.get(name).map(|slot| slot.kind)
    }

    /// Sampler uniform names in declaration order. Index `i` samples texture unit `i`.
    pub fn samplers(&self) -> &[String] {
        &self.samplers
    }

    /// Advances whenever the program object is rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Checks that `value` could be written to `name`. Undeclared names always pass.
    pub fn check(&self, name: &str, value: &UniformValue) -> Result<(), UnsupportedValueError> {
        match self.uniforms.get(name) {
            Some(slot) if !slot.kind.accepts(value) => Err(UnsupportedValueError {
                uniform: name.to_owned(),
                expected: slot.kind,
                found: value.kind(),
            }),
            _ => Ok(()),
        }
    }

    /// Writes a uniform of this program, which must be the current program.
    ///
    /// Returns `Ok(true)` when a GPU write was issued and `Ok(false)` when the
    /// name is not declared or the value equals the cached one.
    pub fn set(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        name: &str,
        value: &UniformValue,
    ) -> Result<bool, RenderError> {
        let Some(slot) = self.uniforms.get_mut(name) else {
            return Ok(false);
        };
        write_slot(ctx, name, slot, value)
    }

    /// Points the `index`-th sampler at a texture unit.
    pub fn set_sampler_unit(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        index: usize,
        unit: u32,
    ) -> Result<bool, RenderError> {
        let Some(name) = self.samplers.get(index) else {
            return Ok(false);
        };
        let Some(slot) = self.uniforms.get_mut(name) else {
            return Ok(false);
        };
        write_slot(ctx, name, slot, &UniformValue::Int(unit as i32))
    }

    /// Writes a material's values to every non-sampler uniform outside
    /// `shared`, falling back to the link-time value for uniforms the
    /// material leaves unset.
    ///
    /// A property of the wrong kind is treated as unset and reported in the
    /// returned list.
    pub fn apply_material(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        properties: &BTreeMap<String, UniformValue>,
        shared: &[&str],
    ) -> Result<Vec<UnsupportedValueError>, RenderError> {
        let mut rejected = Vec::new();
        for (name, slot) in &mut self.uniforms {
            if slot.kind == UniformKind::Sampler2D || shared.contains(&name.as_str()) {
                continue;
            }
            let value = match properties.get(name) {
                Some(value) if slot.kind.accepts(value) => *value,
                Some(value) => {
                    rejected.push(UnsupportedValueError {
                        uniform: name.clone(),
                        expected: slot.kind,
                        found: value.kind(),
                    });
                    slot.initial
                }
                None => slot.initial,
            };
            write_slot(ctx, name, slot, &value)?;
        }
        rejected.sort_by(|a, b| a.uniform.cmp(&b.uniform));
        Ok(rejected)
    }
}

fn write_slot(
    ctx: &mut dyn GraphicsContext,
    name: &str,
    slot: &mut UniformSlot,
    value: &UniformValue,
) -> Result<bool, RenderError> {
    if !slot.kind.accepts(value) {
        return Err(UnsupportedValueError {
            uniform: name.to_owned(),
            expected: slot.kind,
            found: value.kind(),
        }
        .into());
    }
    if slot.cached.as_ref() == Some(value) {
        return Ok(false);
    }
    ctx.set_uniform(slot.location, value)?;
    slot.cached = Some(*value);
    Ok(true)
}

/// Compiles, links and introspects a program, releasing the stage objects.
fn build_program(
    ctx: &mut dyn GraphicsContext,
    label: &str,
    vertex_src: &str,
    fragment_src: &str,
    generation: u64,
    source_version: u64,
) -> Result<ShaderProgram, RenderError> {
    let vertex = ctx.compile_shader(ShaderStage::Vertex, vertex_src);
    let fragment = ctx.compile_shader(ShaderStage::Fragment, fragment_src);

    let (vs, fs) = match (vertex, fragment) {
        (Ok(vs), Ok(fs)) => (vs, fs),
        (vertex, fragment) => {
            for stage in [&vertex, &fragment].into_iter().flatten() {
                ctx.delete_shader(*stage)?;
            }
            return Err(CompileError {
                label: label.to_owned(),
                vertex_log: vertex.err(),
                fragment_log: fragment.err(),
                link_log: None,
            }
            .into());
        }
    };

    let linked = ctx.link_program(vs, fs);
    ctx.delete_shader(vs)?;
    ctx.delete_shader(fs)?;
    let program = linked.map_err(|log| CompileError {
        label: label.to_owned(),
        vertex_log: None,
        fragment_log: None,
        link_log: Some(log),
    })?;

    let attributes: AHashMap<String, u32> = ctx
        .active_attributes(program)?
        .into_iter()
        .map(|a| (a.name, a.location))
        .collect();

    let mut uniforms = AHashMap::new();
    let mut samplers = Vec::new();
    for info in ctx.active_uniforms(program)? {
        if info.kind == UniformKind::Sampler2D {
            samplers.push(info.name.clone());
        }
        uniforms.insert(
            info.name,
            UniformSlot {
                location: info.location,
                kind: info.kind,
                initial: info.initial,
                cached: Some(info.initial),
            },
        );
    }

    log::debug!(
        "Linked shader '{label}' ({} attributes, {} uniforms, {} samplers)",
        attributes.len(),
        uniforms.len(),
        samplers.len()
    );

    Ok(ShaderProgram {
        label: label.to_owned(),
        program,
        attributes,
        uniforms,
        samplers,
        generation,
        source_version,
    })
}

/// Memoizes linked programs by [`ShaderKey`].
///
/// Built-in shaders are compiled from embedded source the first time they
/// are requested. Asset shaders are recompiled when their source version
/// moves; a failed recompile keeps the previous program in use.
#[derive(Debug, Default)]
pub struct ShaderCache {
    programs: AHashMap<ShaderKey, ShaderProgram>,
    next_generation: u64,
    failed_versions: AHashMap<AssetUUID, u64>,
    pending_errors: Vec<RenderError>,
}

impl ShaderCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Resolves a material's shader reference to a cached program, compiling on first use.
    ///
    /// `None` selects the built-in named `default_shader`.
    pub fn resolve(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        shader: Option<&ShaderRef>,
        sources: &Assets<ShaderSource>,
        default_shader: &str,
    ) -> Result<ShaderKey, RenderError> {
        match shader {
            None => self.builtin(ctx, default_shader),
            Some(ShaderRef::Builtin(name)) => self.builtin(ctx, name),
            Some(ShaderRef::Asset(id)) => {
                let source = sources
                    .get(*id)
                    .ok_or(ConfigurationError::MissingShaderAsset { shader: id.uuid() })?;
                self.asset(ctx, *id, source)
            }
        }
    }

    /// Returns the key of a built-in program, compiling it on first use.
    ///
    /// ## Errors
    /// * `ConfigurationError::UnknownShader` - No built-in has this name.
    /// * `CompileError` - The embedded source failed to build.
    pub fn builtin(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        name: &str,
    ) -> Result<ShaderKey, RenderError> {
        let key = ShaderKey::Builtin(name.to_owned());
        if self.programs.contains_key(&key) {
            return Ok(key);
        }
        let builtin = shaders::builtin(name).ok_or_else(|| ConfigurationError::UnknownShader {
            name: name.to_owned(),
        })?;
        let generation = self.generation();
        let program = build_program(ctx, name, builtin.vertex, builtin.fragment, generation, 0)?;
        log::info!("Compiled built-in shader '{name}'");
        self.programs.insert(key.clone(), program);
        Ok(key)
    }

    /// Returns the key of an asset program, compiling on a miss and
    /// recompiling on a hit whose source version moved.
    ///
    /// A failed recompile on a hit is not an error here: the previous program
    /// stays current and the failure is returned by the next [`ShaderCache::refresh`].
    pub fn asset(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        id: AssetId<ShaderSource>,
        source: &ShaderSource,
    ) -> Result<ShaderKey, RenderError> {
        let key = ShaderKey::Asset(id.uuid());
        if self.programs.contains_key(&key) {
            if let Err(err) = self.sync(ctx, id.uuid(), source) {
                self.pending_errors.push(err);
            }
            return Ok(key);
        }
        let generation = self.generation();
        let program = build_program(
            ctx,
            source.label(),
            source.vertex(),
            source.fragment(),
            generation,
            source.version(),
        )?;
        log::debug!("Compiled shader asset '{}'", source.label());
        self.programs.insert(key.clone(), program);
        Ok(key)
    }

    /// Recompiles every cached asset program whose source version moved.
    ///
    /// Returns the failures, including those hit by [`ShaderCache::asset`]
    /// since the last call. Each failed version is reported once.
    pub fn refresh(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        sources: &Assets<ShaderSource>,
    ) -> Vec<RenderError> {
        let stale: Vec<AssetUUID> = self
            .programs
            .iter()
            .filter_map(|(key, program)| match key {
                ShaderKey::Asset(uuid) => sources
                    .get_by_uuid(uuid)
                    .filter(|source| source.version() != program.source_version)
                    .filter(|source| self.failed_versions.get(uuid) != Some(&source.version()))
                    .map(|_| *uuid),
                ShaderKey::Builtin(_) => None,
            })
            .collect();

        let mut errors = std::mem::take(&mut self.pending_errors);
        for uuid in stale {
            if let Some(source) = sources.get_by_uuid(&uuid) {
                if let Err(err) = self.sync(ctx, uuid, source) {
                    errors.push(err);
                }
            }
        }
        errors
    }

    fn sync(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        uuid: AssetUUID,
        source: &ShaderSource,
    ) -> Result<(), RenderError> {
        let key = ShaderKey::Asset(uuid);
        let current = match self.programs.get(&key) {
            Some(program) if program.source_version != source.version() => program.program,
            _ => return Ok(()),
        };
        if self.failed_versions.get(&uuid) == Some(&source.version()) {
            return Ok(());
        }

        let generation = self.generation();
        match build_program(
            ctx,
            source.label(),
            source.vertex(),
            source.fragment(),
            generation,
            source.version(),
        ) {
            Ok(mut rebuilt) => {
                ctx.delete_program(current)?;
                self.failed_versions.remove(&uuid);
                log::info!(
                    "Reloaded shader '{}' (version {})",
                    source.label(),
                    source.version()
                );
                self.programs.insert(key, rebuilt);
                Ok(())
            }
            Err(err) => {
                log::warn!(
                    "Keeping previous program for '{}': {err}",
                    source.label()
                );
                self.failed_versions.insert(uuid, source.version());
                Err(err)
            }
        }
    }

    /// Returns a cached program.
    pub fn get(&self, key: &ShaderKey) -> Option<&ShaderProgram> {
        self.programs.get(key)
    }

    /// Returns a cached program for uniform writes.
    pub fn get_mut(&mut self, key: &ShaderKey) -> Option<&mut ShaderProgram> {
        self.programs.get_mut(key)
    }

    /// Number of cached programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Returns `true` if nothing has been compiled.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}
