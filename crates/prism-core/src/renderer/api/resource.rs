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

//! Opaque GPU object handles and the parameters used to fill them.

use serde::{Deserialize, Serialize};

/// An opaque handle to a GPU buffer object.
///
/// Returned by [`GraphicsContext::create_buffer`](crate::renderer::GraphicsContext::create_buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// An opaque handle to a GPU texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a vertex array object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexArrayId(pub usize);

/// The binding point a buffer is uploaded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex or per-instance attribute data.
    Vertex,
    /// Element indices.
    Index,
}

/// A hint describing how often a buffer's contents will be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times.
    Static,
    /// Replaced wholesale most frames.
    Dynamic,
}

/// The channel layout of texture pixel data. Every channel is one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureFormat {
    /// Four channels, 8 bits each.
    Rgba8,
    /// Three channels, 8 bits each.
    Rgb8,
    /// One channel, 8 bits.
    R8,
}

impl TextureFormat {
    /// Returns the size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            TextureFormat::Rgba8 => 4,
            TextureFormat::Rgb8 => 3,
            TextureFormat::R8 => 1,
        }
    }
}

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WrapMode {
    /// Tile the texture.
    #[default]
    Repeat,
    /// Tile the texture, mirroring every other repetition.
    MirroredRepeat,
    /// Clamp to the edge texel.
    ClampToEdge,
}

/// The filter used when sampling between texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterMode {
    /// Nearest texel.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Linear,
}

/// Sampler state applied to a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SamplerParams {
    /// Wrap mode along the horizontal axis.
    pub wrap_u: WrapMode,
    /// Wrap mode along the vertical axis.
    pub wrap_v: WrapMode,
    /// Filter used when the texture is minified.
    pub min_filter: FilterMode,
    /// Filter used when the texture is magnified.
    pub mag_filter: FilterMode,
}

impl SamplerParams {
    /// Nearest filtering with edge clamping, suited to tiny placeholder textures.
    pub const NEAREST_CLAMP: Self = Self {
        wrap_u: WrapMode::ClampToEdge,
        wrap_v: WrapMode::ClampToEdge,
        min_filter: FilterMode::Nearest,
        mag_filter: FilterMode::Nearest,
    };
}
