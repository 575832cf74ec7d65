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

//! Generational entity storage.

use crate::scene::{Camera, Light, Renderable, SceneEvent, Transform};
use prism_core::ecs::EntityId;

/// Typed capability queries over a scene.
///
/// An entity may satisfy several roles at once; every accessor returns
/// `None` for a missing role or a stale id.
pub trait SceneView {
    /// Returns `true` if the id names a live entity.
    fn contains(&self, id: EntityId) -> bool;
    /// The entity's world transform.
    fn transform(&self, id: EntityId) -> Option<&Transform>;
    /// The renderable role.
    fn renderable(&self, id: EntityId) -> Option<&Renderable>;
    /// The camera role.
    fn camera(&self, id: EntityId) -> Option<&Camera>;
    /// The light role.
    fn light(&self, id: EntityId) -> Option<&Light>;
}

/// One entity: a transform plus any combination of roles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneEntity {
    /// World transform.
    pub transform: Transform,
    /// Drawable role.
    pub renderable: Option<Renderable>,
    /// Camera role.
    pub camera: Option<Camera>,
    /// Light role.
    pub light: Option<Light>,
}

impl SceneEntity {
    /// Creates an entity with no roles.
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    /// Adds the renderable role.
    pub fn with_renderable(mut self, renderable: Renderable) -> Self {
        self.renderable = Some(renderable);
        self
    }

    /// Adds the camera role.
    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Adds the light role.
    pub fn with_light(mut self, light: Light) -> Self {
        self.light = Some(light);
        self
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entity: Option<SceneEntity>,
}

/// A flat entity store that records spawn and despawn notifications.
///
/// Indices are recycled through a free list, bumping the generation so old
/// ids stop resolving.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    freed: Vec<u32>,
    len: usize,
    events: Vec<SceneEvent>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity and queues an [`SceneEvent::EntityAdded`].
    pub fn spawn(&mut self, entity: SceneEntity) -> EntityId {
        let id = if let Some(index) = self.freed.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation += 1;
            slot.entity = Some(entity);
            EntityId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entity: Some(entity),
            });
            EntityId {
                index,
                generation: 0,
            }
        };
        self.len += 1;
        log::trace!("Spawned {id}");
        self.events.push(SceneEvent::EntityAdded(id));
        id
    }

    /// Removes an entity and queues an [`SceneEvent::EntityRemoved`].
    pub fn despawn(&mut self, id: EntityId) -> Option<SceneEntity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entity = slot.entity.take()?;
        self.freed.push(id.index);
        self.len -= 1;
        self.events.push(SceneEvent::EntityRemoved(id));
        Some(entity)
    }

    /// Returns the entity if the id is live.
    pub fn get(&self, id: EntityId) -> Option<&SceneEntity> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_ref())
    }

    /// Returns the entity for mutation if the id is live.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneEntity> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entity.as_mut())
    }

    /// Returns the entity's transform for mutation.
    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.get_mut(id).map(|e| &mut e.transform)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no entity is alive.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates over live entities.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &SceneEntity)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.entity.as_ref().map(|entity| {
                (
                    EntityId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    entity,
                )
            })
        })
    }

    /// Takes every notification queued since the last call.
    pub fn take_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }
}

impl SceneView for Scene {
    fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.get(id).map(|e| &e.transform)
    }

    fn renderable(&self, id: EntityId) -> Option<&Renderable> {
        self.get(id).and_then(|e| e.renderable.as_ref())
    }

    fn camera(&self, id: EntityId) -> Option<&Camera> {
        self.get(id).and_then(|e| e.camera.as_ref())
    }

    fn light(&self, id: EntityId) -> Option<&Light> {
        self.get(id).and_then(|e| e.light.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::math::Vec3;

    #[test]
    fn recycled_ids_reject_stale_handles() {
        let mut scene = Scene::new();
        let a = scene.spawn(SceneEntity::default());
        assert!(scene.despawn(a).is_some());

        let b = scene.spawn(SceneEntity::default());
        assert_eq!(b.index, a.index);
        assert_ne!(b.generation, a.generation);
        assert!(!scene.contains(a));
        assert!(scene.contains(b));
        assert!(scene.despawn(a).is_none());
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn an_entity_can_hold_several_roles() {
        let mut scene = Scene::new();
        let id = scene.spawn(
            SceneEntity::new(Transform::from_translation(Vec3::Y))
                .with_camera(Camera::default())
                .with_light(Light::default()),
        );

        assert!(scene.camera(id).is_some());
        assert!(scene.light(id).is_some());
        assert!(scene.renderable(id).is_none());
        assert_eq!(scene.transform(id).map(|t| t.translation), Some(Vec3::Y));
    }

    #[test]
    fn spawn_and_despawn_queue_events() {
        let mut scene = Scene::new();
        let id = scene.spawn(SceneEntity::default());
        scene.despawn(id);

        assert_eq!(
            scene.take_events(),
            vec![SceneEvent::EntityAdded(id), SceneEvent::EntityRemoved(id)]
        );
        assert!(scene.take_events().is_empty());
    }
}
