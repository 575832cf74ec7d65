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

//! Acts as the **[A]gent** for the rendering subsystem.
//!
//! The [`RenderAgent`] classifies entities as they are observed, keeps track
//! of the camera and light roles, and runs one frame per tick:
//! apply pending resource hand-offs, prepare batches, then draw them. It
//! delegates the GPU work to `prism_lanes::render_lane`.
//!
//! Everything here runs on the render thread. Loader threads talk to the
//! agent only through a [`ResourceHandoff`].

mod agent;
mod handoff;

pub use agent::*;
pub use handoff::*;
