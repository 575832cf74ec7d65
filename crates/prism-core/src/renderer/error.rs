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

//! Defines the hierarchy of error types for the rendering subsystem.

use crate::asset::AssetUUID;
use crate::ecs::EntityId;
use crate::renderer::api::UniformKind;
use thiserror::Error;

/// The scene or a material is wired up in a way the renderer cannot draw.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// A renderable entity has no material set.
    #[error("{entity} has a mesh but no material")]
    MissingMaterial {
        /// The offending entity.
        entity: EntityId,
    },
    /// The entity's material is not present in the asset library.
    #[error("{entity} references unknown material {material}")]
    UnknownMaterial {
        /// The offending entity.
        entity: EntityId,
        /// The material that could not be found.
        material: AssetUUID,
    },
    /// The entity's mesh is not present in the asset library.
    #[error("{entity} references unknown mesh {mesh}")]
    UnknownMesh {
        /// The offending entity.
        entity: EntityId,
        /// The mesh that could not be found.
        mesh: AssetUUID,
    },
    /// No built-in shader exists under this name.
    #[error("no built-in shader is registered under the name '{name}'")]
    UnknownShader {
        /// The requested name.
        name: String,
    },
    /// A material points at a shader asset that is not loaded.
    #[error("shader asset {shader} is not loaded")]
    MissingShaderAsset {
        /// The missing shader asset.
        shader: AssetUUID,
    },
    /// The entity exposes no mesh and material.
    #[error("{entity} is not renderable")]
    NotRenderable {
        /// The offending entity.
        entity: EntityId,
    },
    /// The entity does not exist in the scene, or its id is stale.
    #[error("{entity} does not exist")]
    UnknownEntity {
        /// The offending entity.
        entity: EntityId,
    },
}

/// A shader program failed to compile or link. `None` marks a stage that succeeded.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "shader '{label}' failed to build{}",
    stage_logs(.vertex_log, .fragment_log, .link_log)
)]
pub struct CompileError {
    /// The shader's label.
    pub label: String,
    /// The vertex stage compiler log.
    pub vertex_log: Option<String>,
    /// The fragment stage compiler log.
    pub fragment_log: Option<String>,
    /// The linker log.
    pub link_log: Option<String>,
}

fn stage_logs(
    vertex: &Option<String>,
    fragment: &Option<String>,
    link: &Option<String>,
) -> String {
    [("vertex", vertex), ("fragment", fragment), ("link", link)]
        .into_iter()
        .filter_map(|(stage, log)| log.as_ref().map(|log| format!("\n[{stage}] {}", log.trim())))
        .collect()
}

/// A texture or mesh payload could not be turned into GPU data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResourceLoadError {
    /// A material binds a texture that is not loaded.
    #[error("texture {texture} is not loaded")]
    MissingTexture {
        /// The missing texture.
        texture: AssetUUID,
    },
    /// A batch's mesh has been removed from the asset library.
    #[error("mesh {mesh} is not loaded")]
    MissingMesh {
        /// The missing mesh.
        mesh: AssetUUID,
    },
    /// The pixel buffer does not match `width * height * bytes_per_pixel`.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    InvalidPixelData {
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },
    /// The vertex buffer is not a whole number of vertices.
    #[error("vertex buffer of {len} floats is not a multiple of the {stride}-float stride")]
    InvalidVertexData {
        /// Number of floats supplied.
        len: usize,
        /// Floats per vertex.
        stride: usize,
    },
    /// An index points past the end of the vertex buffer.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: u32,
    },
    /// An asynchronous loader reported that decoding failed.
    #[error("failed to decode asset {asset}: {reason}")]
    DecodeFailed {
        /// The asset being loaded.
        asset: AssetUUID,
        /// The loader's explanation.
        reason: String,
    },
}

/// A material property does not match the kind declared by the shader uniform.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("uniform '{uniform}' is declared as {expected} but was given a {found}")]
pub struct UnsupportedValueError {
    /// The uniform name.
    pub uniform: String,
    /// The kind declared in the shader.
    pub expected: UniformKind,
    /// The kind of the supplied value.
    pub found: UniformKind,
}

/// A graphics context call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// The backend reported an error.
    #[error("graphics backend error: {0}")]
    Backend(String),
    /// A handle does not name a live object of the expected kind.
    #[error("invalid {kind} handle {id}")]
    InvalidHandle {
        /// The object kind, e.g. `"buffer"`.
        kind: &'static str,
        /// The raw handle value.
        id: usize,
    },
    /// A read or write fell outside an object's bounds.
    #[error("access out of bounds")]
    OutOfBounds,
}

/// Any error the render pipeline can produce.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// See [`ConfigurationError`].
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// See [`CompileError`].
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// See [`ResourceLoadError`].
    #[error(transparent)]
    ResourceLoad(#[from] ResourceLoadError),
    /// See [`UnsupportedValueError`].
    #[error(transparent)]
    UnsupportedValue(#[from] UnsupportedValueError),
    /// See [`ResourceError`].
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// The graphics context is gone; rendering cannot continue.
    #[error("the graphics context was lost")]
    ContextLost,
    /// A render call was made from a thread other than the one owning the context.
    #[error("render call issued off the render thread")]
    WrongThread,
}

impl RenderError {
    /// Returns `true` for failures scoped to one entity or resource, which
    /// are reported as diagnostics while the pipeline keeps running.
    ///
    /// Compile failures, backend errors and context loss are not
    /// recoverable and are returned to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RenderError::Configuration(_)
                | RenderError::ResourceLoad(_)
                | RenderError::UnsupportedValue(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_lists_only_failed_stages() {
        let err = CompileError {
            label: "pbr".into(),
            vertex_log: None,
            fragment_log: Some("0:12: syntax error\n".into()),
            link_log: None,
        };
        let text = err.to_string();
        assert_eq!(text, "shader 'pbr' failed to build\n[fragment] 0:12: syntax error");
    }

    #[test]
    fn render_error_wraps_transparently() {
        let err: RenderError = ConfigurationError::UnknownShader {
            name: "toon".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "no built-in shader is registered under the name 'toon'"
        );
        assert!(err.is_recoverable());
        assert!(!RenderError::ContextLost.is_recoverable());
    }
}
