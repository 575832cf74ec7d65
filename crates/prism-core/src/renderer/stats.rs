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

/// Why a frame issued no GPU work at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No entity with a camera is registered.
    NoCamera,
}

/// Counters collected over one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Monotonic frame index, starting at 1.
    pub frame_number: u64,
    /// Non-empty batches that were drawn.
    pub batches_drawn: usize,
    /// Instanced draw calls issued.
    pub draw_calls: usize,
    /// Total instances across every draw call.
    pub instances: usize,
    /// Vertex, index and instance buffer uploads.
    pub buffer_uploads: usize,
    /// Texture pixel uploads.
    pub texture_uploads: usize,
    /// Sampler parameter updates.
    pub sampler_updates: usize,
    /// Uniform writes that reached the GPU.
    pub uniform_writes: usize,
    /// Framebuffer clears.
    pub clears: usize,
    /// Set when the frame was skipped.
    pub skipped: Option<SkipReason>,
}

impl FrameStats {
    /// Returns stats for a frame that was skipped.
    pub fn skipped(frame_number: u64, reason: SkipReason) -> Self {
        Self {
            frame_number,
            skipped: Some(reason),
            ..Default::default()
        }
    }
}
