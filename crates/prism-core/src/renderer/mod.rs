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

//! Backend-agnostic rendering contracts.
//!
//! - **[`api`]**: GPU handles, descriptors, vertex layouts and uniform values.
//! - **[`traits`]**: the [`GraphicsContext`] every backend implements.
//! - **[`error`]**: the error taxonomy shared by every rendering crate.

pub mod api;
pub mod diagnostic;
pub mod error;
pub mod settings;
pub mod stats;
pub mod traits;

pub use self::api::*;
pub use self::diagnostic::{RenderDiagnostic, Severity};
pub use self::error::{
    CompileError, ConfigurationError, RenderError, ResourceError, ResourceLoadError,
    UnsupportedValueError,
};
pub use self::settings::{BackgroundMode, PipelineConfig, SettingsError};
pub use self::stats::{FrameStats, SkipReason};
pub use self::traits::GraphicsContext;
