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

use prism_core::math::Mat4;

/// Defines the type of camera projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionType {
    /// Perspective projection with field of view.
    Perspective {
        /// The vertical field of view in radians.
        fov_y_radians: f32,
    },
    /// Orthographic projection with view bounds.
    Orthographic {
        /// The height of the orthographic view volume; the width follows the aspect ratio.
        height: f32,
    },
}

/// A camera's projection parameters. Its view comes from the entity's transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// The type of projection (perspective or orthographic).
    pub projection: ProjectionType,
    /// Fixed aspect ratio. `None` follows the viewport.
    pub aspect_override: Option<f32>,
    /// The distance to the near clipping plane.
    pub z_near: f32,
    /// The distance to the far clipping plane.
    pub z_far: f32,
    /// Inactive cameras are ignored when choosing the frame's camera.
    pub is_active: bool,
}

impl Camera {
    /// Creates a new perspective camera.
    pub fn new_perspective(fov_y_radians: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            projection: ProjectionType::Perspective { fov_y_radians },
            aspect_override: None,
            z_near,
            z_far,
            is_active: true,
        }
    }

    /// Creates a new orthographic camera.
    pub fn new_orthographic(height: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            projection: ProjectionType::Orthographic { height },
            aspect_override: None,
            z_near,
            z_far,
            is_active: true,
        }
    }

    /// Calculates the projection matrix for a viewport of the given aspect ratio.
    ///
    /// Right-handed, with the OpenGL `[-1, 1]` depth range.
    pub fn projection_matrix(&self, viewport_aspect: f32) -> Mat4 {
        let aspect = self.aspect_override.unwrap_or(viewport_aspect);
        match self.projection {
            ProjectionType::Perspective { fov_y_radians } => {
                Mat4::perspective_rh_gl(fov_y_radians, aspect, self.z_near, self.z_far)
            }
            ProjectionType::Orthographic { height } => {
                let half_height = height / 2.0;
                let half_width = half_height * aspect;
                Mat4::orthographic_rh_gl(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.z_near,
                    self.z_far,
                )
            }
        }
    }
}

impl Default for Camera {
    /// A 60 degree perspective camera with planes at 0.1 and 1000.
    fn default() -> Self {
        Self::new_perspective(60.0_f32.to_radians(), 0.1, 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::math::Vec4;

    #[test]
    fn projection_follows_viewport_aspect() {
        let camera = Camera::default();
        let wide = camera.projection_matrix(2.0);
        let square = camera.projection_matrix(1.0);
        assert!((square.x_axis.x - 2.0 * wide.x_axis.x).abs() < 1e-5);
    }

    #[test]
    fn override_wins_over_viewport() {
        let camera = Camera {
            aspect_override: Some(1.0),
            ..Camera::default()
        };
        assert_eq!(camera.projection_matrix(3.0), camera.projection_matrix(1.0));
    }

    #[test]
    fn near_plane_maps_to_minus_one() {
        let camera = Camera::new_perspective(std::f32::consts::FRAC_PI_2, 1.0, 10.0);
        let clip = camera.projection_matrix(1.0) * Vec4::new(0.0, 0.0, -1.0, 1.0);
        assert!((clip.z / clip.w + 1.0).abs() < 1e-5);
    }
}
