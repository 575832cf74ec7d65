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

//! Uniform value payloads and their declared kinds.

use crate::math::{LinearRgba, Mat4, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a uniform in a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UniformKind {
    /// `float`
    Float,
    /// `vec2`
    Vec2,
    /// `vec3`
    Vec3,
    /// `vec4`
    Vec4,
    /// `mat4`
    Mat4,
    /// `int`
    Int,
    /// `sampler2D`, written as the texture unit index.
    Sampler2D,
}

impl UniformKind {
    /// Returns `true` if `value` can be written to a uniform of this kind.
    pub fn accepts(self, value: &UniformValue) -> bool {
        match self {
            UniformKind::Sampler2D => matches!(value, UniformValue::Int(_)),
            kind => value.kind() == kind,
        }
    }

    /// Number of scalar components in a value of this kind.
    pub fn components(self) -> usize {
        match self {
            UniformKind::Float | UniformKind::Int | UniformKind::Sampler2D => 1,
            UniformKind::Vec2 => 2,
            UniformKind::Vec3 => 3,
            UniformKind::Vec4 => 4,
            UniformKind::Mat4 => 16,
        }
    }

    /// The value a uniform of this kind holds when its source gives no initializer.
    pub fn zero(self) -> UniformValue {
        match self {
            UniformKind::Float => UniformValue::Float(0.0),
            UniformKind::Vec2 => UniformValue::Vec2([0.0; 2]),
            UniformKind::Vec3 => UniformValue::Vec3([0.0; 3]),
            UniformKind::Vec4 => UniformValue::Vec4([0.0; 4]),
            UniformKind::Mat4 => UniformValue::Mat4([0.0; 16]),
            UniformKind::Int | UniformKind::Sampler2D => UniformValue::Int(0),
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UniformKind::Float => "float",
            UniformKind::Vec2 => "vec2",
            UniformKind::Vec3 => "vec3",
            UniformKind::Vec4 => "vec4",
            UniformKind::Mat4 => "mat4",
            UniformKind::Int => "int",
            UniformKind::Sampler2D => "sampler2D",
        };
        f.write_str(name)
    }
}

/// A value that can be written to a uniform.
///
/// Equality is plain component-wise equality; the shader cache relies on it
/// to skip writes of an unchanged value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UniformValue {
    /// A single float.
    Float(f32),
    /// Two floats.
    Vec2([f32; 2]),
    /// Three floats.
    Vec3([f32; 3]),
    /// Four floats.
    Vec4([f32; 4]),
    /// A column-major 4x4 matrix.
    Mat4([f32; 16]),
    /// A signed integer, also used for sampler units.
    Int(i32),
}

impl UniformValue {
    /// Returns the kind a uniform must declare to accept this value.
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat4(_) => UniformKind::Mat4,
            UniformValue::Int(_) => UniformKind::Int,
        }
    }

    /// Builds a value of `kind` from its scalar components.
    ///
    /// Returns `None` unless exactly [`UniformKind::components`] are given.
    /// Integer kinds truncate.
    pub fn from_components(kind: UniformKind, components: &[f32]) -> Option<Self> {
        if components.len() != kind.components() {
            return None;
        }
        Some(match kind {
            UniformKind::Float => UniformValue::Float(components[0]),
            UniformKind::Vec2 => UniformValue::Vec2(components.try_into().ok()?),
            UniformKind::Vec3 => UniformValue::Vec3(components.try_into().ok()?),
            UniformKind::Vec4 => UniformValue::Vec4(components.try_into().ok()?),
            UniformKind::Mat4 => UniformValue::Mat4(components.try_into().ok()?),
            UniformKind::Int | UniformKind::Sampler2D => UniformValue::Int(components[0] as i32),
        })
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v.to_array())
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v.to_array())
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        UniformValue::Vec4(v.to_array())
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        UniformValue::Mat4(m.to_cols_array())
    }
}

impl From<LinearRgba> for UniformValue {
    fn from(c: LinearRgba) -> Self {
        UniformValue::Vec4(c.to_array())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampler_uniforms_accept_integer_units() {
        assert!(UniformKind::Sampler2D.accepts(&UniformValue::Int(3)));
        assert!(!UniformKind::Sampler2D.accepts(&UniformValue::Float(3.0)));
        assert!(UniformKind::Vec3.accepts(&Vec3::ONE.into()));
        assert!(!UniformKind::Vec3.accepts(&UniformValue::Vec4([0.0; 4])));
    }

    #[test]
    fn matrices_convert_column_major() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        let UniformValue::Mat4(cols) = UniformValue::from(m) else {
            panic!("expected a mat4 payload");
        };
        assert_eq!(&cols[12..15], &[1.0, 2.0, 3.0]);
    }
}
