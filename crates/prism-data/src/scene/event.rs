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

use crate::assets::AssetRef;
use prism_core::ecs::EntityId;

/// Notifications the scene layer sends to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneEvent {
    /// An entity was spawned and should be classified.
    EntityAdded(EntityId),
    /// An entity was despawned.
    EntityRemoved(EntityId),
    /// The simulation step finished; render a frame.
    PostUpdate {
        /// Seconds since the previous tick.
        dt: f32,
    },
    /// The drawable surface changed size.
    Resized {
        /// New width in pixels.
        width: u32,
        /// New height in pixels.
        height: u32,
    },
    /// An asset finished loading and may be uploaded ahead of use.
    AssetAdded(AssetRef),
}
