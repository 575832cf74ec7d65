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

use prism_core::math::{LinearRgba, Vec3, Vec4};

/// The shape of a light's influence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightKind {
    /// Emits from the entity's position in every direction.
    #[default]
    Point,
    /// Parallel rays along the entity's forward axis.
    Directional,
}

/// A light source attached to an entity.
///
/// The entity's transform provides the position (point) or direction (directional).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// Point or directional.
    pub kind: LightKind,
    /// Emitted color.
    pub color: LinearRgba,
    /// Multiplier applied to `color`.
    pub intensity: f32,
    /// Disabled lights are never selected for a frame.
    pub enabled: bool,
}

impl Default for Light {
    fn default() -> Self {
        Self::point(LinearRgba::WHITE, 1.0)
    }
}

impl Light {
    /// Creates an enabled point light.
    pub fn point(color: LinearRgba, intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            color,
            intensity,
            enabled: true,
        }
    }

    /// Creates an enabled directional light.
    pub fn directional(color: LinearRgba, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            ..Self::point(color, intensity)
        }
    }

    /// Returns `color * intensity` as RGB.
    pub fn radiance(&self) -> Vec3 {
        Vec3::new(self.color.r, self.color.g, self.color.b) * self.intensity
    }

    /// Homogeneous light position: `w = 1` for a point at `position`,
    /// `w = 0` for a direction pointing towards the light.
    pub fn homogeneous_position(&self, position: Vec3, forward: Vec3) -> Vec4 {
        match self.kind {
            LightKind::Point => position.extend(1.0),
            LightKind::Directional => (-forward).normalize_or_zero().extend(0.0),
        }
    }
}
