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

//! Pipeline configuration passed to the render agent at construction.

use crate::math::LinearRgba;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// What fills the framebuffer before batches are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BackgroundMode {
    /// Clear to [`PipelineConfig::clear_color`].
    #[default]
    Clear,
    /// Clear, then draw a full-screen vertical gradient with the `"background"` shader.
    Gradient {
        /// Color at the top edge.
        top: LinearRgba,
        /// Color at the bottom edge.
        bottom: LinearRgba,
    },
}

/// Options for the instanced render pipeline.
///
/// Every field has a default, so a RON file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Color the framebuffer is cleared to.
    pub clear_color: LinearRgba,
    /// Ambient light added to every lit material.
    pub ambient_color: LinearRgba,
    /// Background pass selection.
    pub background: BackgroundMode,
    /// Built-in shader used by materials that name none.
    pub default_shader: String,
    /// When `true`, batches are drawn in ascending material draw order
    /// (stable, so ties keep registration order).
    pub enforce_draw_order: bool,
    /// Viewport size until the first resize event.
    pub initial_viewport: (u32, u32),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clear_color: LinearRgba::rgb(0.05, 0.05, 0.08),
            ambient_color: LinearRgba::rgb(0.1, 0.1, 0.1),
            background: BackgroundMode::Clear,
            default_shader: "pbr".to_owned(),
            enforce_draw_order: false,
            initial_viewport: (1280, 720),
        }
    }
}

/// An error raised while loading a [`PipelineConfig`].
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration file could not be read.
    #[error("failed to read pipeline configuration: {0}")]
    Io(#[from] std::io::Error),
    /// The text is not a valid RON `PipelineConfig`.
    #[error("invalid pipeline configuration: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The configuration could not be serialized.
    #[error("failed to serialize pipeline configuration: {0}")]
    Serialize(#[from] ron::Error),
}

impl PipelineConfig {
    /// Parses a configuration from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, SettingsError> {
        Ok(ron::from_str(text)?)
    }

    /// Reads and parses a RON configuration file.
    pub fn from_ron_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&text)?;
        log::debug!("Loaded pipeline configuration from {}", path.display());
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Returns the aspect ratio of the initial viewport.
    pub fn initial_aspect(&self) -> f32 {
        let (w, h) = self.initial_viewport;
        w.max(1) as f32 / h.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_take_defaults() {
        let config =
            PipelineConfig::from_ron_str("(enforce_draw_order: true, initial_viewport: (640, 480))")
                .expect("valid config");
        assert!(config.enforce_draw_order);
        assert_eq!(config.initial_viewport, (640, 480));
        assert_eq!(config.default_shader, "pbr");
        assert_eq!(config.background, BackgroundMode::Clear);
    }

    #[test]
    fn gradient_background_parses() {
        let text = r#"(
            background: Gradient(
                top: (r: 0.2, g: 0.3, b: 0.8, a: 1.0),
                bottom: (r: 0.9, g: 0.9, b: 1.0, a: 1.0),
            ),
        )"#;
        let config = PipelineConfig::from_ron_str(text).expect("valid config");
        let BackgroundMode::Gradient { top, bottom } = config.background else {
            panic!("expected a gradient background");
        };
        assert_eq!(top, LinearRgba::rgb(0.2, 0.3, 0.8));
        assert_eq!(bottom, LinearRgba::rgb(0.9, 0.9, 1.0));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let original = PipelineConfig {
            default_shader: "unlit".into(),
            ..Default::default()
        };
        let text = original.to_ron_string().expect("serializable");
        file.write_all(text.as_bytes()).expect("write config");

        let loaded = PipelineConfig::from_ron_file(file.path()).expect("load config");
        assert_eq!(loaded, original);
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        let err = PipelineConfig::from_ron_str("(clear_color: 3)").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
