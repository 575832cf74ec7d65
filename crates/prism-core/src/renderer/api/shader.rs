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

//! Shader objects and the results of program introspection.

use crate::renderer::api::{UniformKind, UniformValue};

/// An opaque handle to a single compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderObjectId(pub usize);

/// An opaque handle to a linked shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(pub usize);

/// An opaque handle to a uniform of a linked program.
///
/// Only valid for the program it was introspected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub usize);

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Per-vertex stage.
    Vertex,
    /// Per-fragment stage.
    Fragment,
}

/// An active uniform reported by a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformInfo {
    /// The uniform's name as written in the source.
    pub name: String,
    /// The handle used to write the uniform.
    pub location: UniformLocation,
    /// The declared type.
    pub kind: UniformKind,
    /// The value the program holds right after linking: the source
    /// initializer, or zero.
    pub initial: UniformValue,
}

/// An active vertex input reported by a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInfo {
    /// The input's name as written in the source.
    pub name: String,
    /// The first attribute slot the input occupies.
    pub location: u32,
}
