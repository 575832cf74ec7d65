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

use prism_core::renderer::{
    BufferUsage, Capability, FilterMode, IndexFormat, PrimitiveMode, ShaderStage, TextureFormat,
    UniformKind, WrapMode,
};

/// A local extension trait to convert our engine's types into GL enums.
/// This avoids Rust's orphan rules while keeping an idiomatic `.into_gl()` syntax.
pub trait IntoGl<T> {
    /// Consumes self and converts it into a GL-compatible value.
    fn into_gl(self) -> T;
}

impl IntoGl<u32> for BufferUsage {
    fn into_gl(self) -> u32 {
        match self {
            BufferUsage::Static => glow::STATIC_DRAW,
            BufferUsage::Dynamic => glow::DYNAMIC_DRAW,
        }
    }
}

/// `(internal format, pixel format)` for `glTexImage2D`.
impl IntoGl<(i32, u32)> for TextureFormat {
    fn into_gl(self) -> (i32, u32) {
        match self {
            TextureFormat::Rgba8 => (glow::RGBA8 as i32, glow::RGBA),
            TextureFormat::Rgb8 => (glow::RGB8 as i32, glow::RGB),
            TextureFormat::R8 => (glow::R8 as i32, glow::RED),
        }
    }
}

impl IntoGl<i32> for WrapMode {
    fn into_gl(self) -> i32 {
        (match self {
            WrapMode::Repeat => glow::REPEAT,
            WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
            WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        }) as i32
    }
}

impl IntoGl<i32> for FilterMode {
    fn into_gl(self) -> i32 {
        (match self {
            FilterMode::Nearest => glow::NEAREST,
            FilterMode::Linear => glow::LINEAR,
        }) as i32
    }
}

impl IntoGl<u32> for Capability {
    fn into_gl(self) -> u32 {
        match self {
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::CullFace => glow::CULL_FACE,
            Capability::Blend => glow::BLEND,
        }
    }
}

impl IntoGl<u32> for PrimitiveMode {
    fn into_gl(self) -> u32 {
        match self {
            PrimitiveMode::Triangles => glow::TRIANGLES,
            PrimitiveMode::Lines => glow::LINES,
            PrimitiveMode::Points => glow::POINTS,
        }
    }
}

impl IntoGl<u32> for IndexFormat {
    fn into_gl(self) -> u32 {
        match self {
            IndexFormat::U8 => glow::UNSIGNED_BYTE,
            IndexFormat::U16 => glow::UNSIGNED_SHORT,
            IndexFormat::U32 => glow::UNSIGNED_INT,
        }
    }
}

impl IntoGl<u32> for ShaderStage {
    fn into_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// Maps an active uniform's GL type to the kinds the renderer writes.
pub(super) fn uniform_kind(gl_type: u32) -> Option<UniformKind> {
    match gl_type {
        glow::FLOAT => Some(UniformKind::Float),
        glow::FLOAT_VEC2 => Some(UniformKind::Vec2),
        glow::FLOAT_VEC3 => Some(UniformKind::Vec3),
        glow::FLOAT_VEC4 => Some(UniformKind::Vec4),
        glow::FLOAT_MAT4 => Some(UniformKind::Mat4),
        glow::INT => Some(UniformKind::Int),
        glow::SAMPLER_2D => Some(UniformKind::Sampler2D),
        _ => None,
    }
}
