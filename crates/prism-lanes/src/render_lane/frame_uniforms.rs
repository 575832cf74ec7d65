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

//! Camera and light values shared by every batch in a frame.

use prism_core::ecs::EntityId;
use prism_core::math::{LinearRgba, Mat4, Vec3, Vec4};
use prism_core::renderer::UniformValue;
use prism_data::scene::SceneView;

/// Projection matrix uniform.
pub const U_PROJECTION: &str = "u_projection";
/// View matrix uniform.
pub const U_VIEW: &str = "u_view";
/// Camera world position uniform.
pub const U_CAMERA_POSITION: &str = "u_camera_position";
/// Light position uniform; `w = 0` marks a direction.
pub const U_LIGHT_POSITION: &str = "u_light_position";
/// Light radiance uniform.
pub const U_LIGHT_COLOR: &str = "u_light_color";
/// Ambient color uniform.
pub const U_AMBIENT_COLOR: &str = "u_ambient_color";

/// Frame-level uniforms, computed once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Camera projection.
    pub projection: Mat4,
    /// Inverse of the camera's world transform.
    pub view: Mat4,
    /// Camera position in world space.
    pub camera_position: Vec3,
    /// Homogeneous light position; zero when there is no light.
    pub light_position: Vec4,
    /// Light color times intensity; zero when there is no light.
    pub light_color: Vec3,
    /// Ambient term.
    pub ambient_color: Vec3,
}

impl FrameUniforms {
    /// Derives the frame uniforms from a camera entity and an optional light entity.
    ///
    /// Returns `None` if `camera` lacks a transform or a camera role. A missing
    /// or disabled light yields a zero-intensity light.
    pub fn compute(
        scene: &dyn SceneView,
        camera: EntityId,
        light: Option<EntityId>,
        viewport_aspect: f32,
        ambient: LinearRgba,
    ) -> Option<Self> {
        let camera_transform = scene.transform(camera)?;
        let projection = scene.camera(camera)?.projection_matrix(viewport_aspect);

        let (light_position, light_color) = light
            .and_then(|id| Some((scene.light(id)?, scene.transform(id)?)))
            .filter(|(light, _)| light.enabled)
            .map_or((Vec4::ZERO, Vec3::ZERO), |(light, transform)| {
                (
                    light.homogeneous_position(transform.translation, transform.forward()),
                    light.radiance(),
                )
            });

        Some(Self {
            projection,
            view: camera_transform.to_mat4().inverse(),
            camera_position: camera_transform.translation,
            light_position,
            light_color,
            ambient_color: Vec3::new(ambient.r, ambient.g, ambient.b),
        })
    }

    /// The uniforms as name/value pairs, in upload order.
    pub fn values(&self) -> [(&'static str, UniformValue); 6] {
        [
            (U_PROJECTION, self.projection.into()),
            (U_VIEW, self.view.into()),
            (U_CAMERA_POSITION, self.camera_position.into()),
            (U_LIGHT_POSITION, self.light_position.into()),
            (U_LIGHT_COLOR, self.light_color.into()),
            (U_AMBIENT_COLOR, self.ambient_color.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_data::scene::{Camera, Light, Scene, SceneEntity, Transform};

    #[test]
    fn missing_light_is_zero() {
        let mut scene = Scene::new();
        let camera = scene.spawn(
            SceneEntity::new(Transform::from_translation(Vec3::new(0.0, 0.0, 5.0)))
                .with_camera(Camera::default()),
        );

        let uniforms =
            FrameUniforms::compute(&scene, camera, None, 1.0, LinearRgba::BLACK).expect("camera");
        assert_eq!(uniforms.light_position, Vec4::ZERO);
        assert_eq!(uniforms.light_color, Vec3::ZERO);
        assert_eq!(uniforms.camera_position, Vec3::new(0.0, 0.0, 5.0));
        let origin = uniforms.view.transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn point_light_is_positional() {
        let mut scene = Scene::new();
        let camera = scene.spawn(SceneEntity::default().with_camera(Camera::default()));
        let light = scene.spawn(
            SceneEntity::new(Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)))
                .with_light(Light::point(LinearRgba::WHITE, 2.0)),
        );

        let uniforms = FrameUniforms::compute(&scene, camera, Some(light), 1.0, LinearRgba::BLACK)
            .expect("camera");
        assert_eq!(uniforms.light_position, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(uniforms.light_color, Vec3::splat(2.0));
    }

    #[test]
    fn entity_without_camera_role_yields_nothing() {
        let mut scene = Scene::new();
        let not_a_camera = scene.spawn(SceneEntity::default());
        assert!(
            FrameUniforms::compute(&scene, not_a_camera, None, 1.0, LinearRgba::BLACK).is_none()
        );
    }
}
