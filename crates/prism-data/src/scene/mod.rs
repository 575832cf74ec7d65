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

//! A minimal scene: entities with optional capability components.
//!
//! The renderer never inspects concrete entity types. It asks a
//! [`SceneView`] which roles an entity satisfies (renderable, camera,
//! light) and reads the typed component for each.

mod camera;
mod event;
mod light;
mod renderable;
mod store;
mod transform;

pub use camera::{Camera, ProjectionType};
pub use event::SceneEvent;
pub use light::{Light, LightKind};
pub use renderable::Renderable;
pub use store::{Scene, SceneEntity, SceneView};
pub use transform::Transform;
