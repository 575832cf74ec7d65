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

//! Recoverable failures reported to the host application.

use crate::renderer::error::RenderError;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Rendering continues with a fallback.
    Warning,
    /// Something was not drawn or not updated.
    Error,
}

/// A failure that did not stop the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDiagnostic {
    /// How serious the failure is.
    pub severity: Severity,
    /// What went wrong.
    pub error: RenderError,
}

impl RenderDiagnostic {
    /// Creates a warning diagnostic.
    pub fn warning(error: impl Into<RenderError>) -> Self {
        Self {
            severity: Severity::Warning,
            error: error.into(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(error: impl Into<RenderError>) -> Self {
        Self {
            severity: Severity::Error,
            error: error.into(),
        }
    }

    /// Writes the diagnostic to the log at the matching level.
    pub fn log(&self) {
        match self.severity {
            Severity::Warning => log::warn!("{}", self.error),
            Severity::Error => log::error!("{}", self.error),
        }
    }
}
