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

//! Defines the RenderAgent, the central orchestrator for the rendering subsystem.

use super::handoff::{ResourceHandoff, ResourceUpdate};
use prism_core::ecs::EntityId;
use prism_core::event::EventBus;
use prism_core::renderer::{
    ConfigurationError, FrameStats, GraphicsContext, PipelineConfig, RenderDiagnostic,
    RenderError, ResourceLoadError, SkipReason,
};
use prism_data::assets::{AssetLibrary, AssetRef};
use prism_data::scene::{SceneEvent, SceneView};
use prism_lanes::render_lane::{
    FrameUniforms, GpuResources, InstanceRegistry, InstancedLane, Registration, StatsRecorder,
};
use std::thread::{self, ThreadId};

/// Prepares and draws one frame through the lane.
fn run_lane(
    lane: &mut InstancedLane,
    ctx: &mut dyn GraphicsContext,
    registry: &mut InstanceRegistry,
    resources: &mut GpuResources,
    scene: &dyn SceneView,
    assets: &AssetLibrary,
    uniforms: &FrameUniforms,
) -> Result<(usize, Vec<RenderDiagnostic>), RenderError> {
    let mut diagnostics = lane.prepare(ctx, registry, resources, scene, assets)?;
    let output = lane.pass(ctx, registry, resources, assets, uniforms)?;
    diagnostics.extend(output.diagnostics);
    Ok((output.batches_drawn, diagnostics))
}

/// The agent responsible for managing the state and logic of the rendering pipeline.
///
/// It owns the graphics context, so it is bound to the thread that created
/// it: every entry point checks the calling thread and fails with
/// [`RenderError::WrongThread`] elsewhere.
pub struct RenderAgent<C: GraphicsContext> {
    ctx: C,
    config: PipelineConfig,
    resources: GpuResources,
    registry: InstanceRegistry,
    lane: InstancedLane,
    // Entities observed with a camera or light role, in observation order.
    cameras: Vec<EntityId>,
    lights: Vec<EntityId>,
    viewport: (u32, u32),
    updates: EventBus<ResourceUpdate>,
    diagnostics: EventBus<RenderDiagnostic>,
    render_thread: ThreadId,
    frame_count: u64,
    last_stats: FrameStats,
}

impl<C: GraphicsContext> RenderAgent<C> {
    /// Creates the agent on the current thread, which becomes the render thread.
    ///
    /// The default shader is compiled up front so a broken pipeline fails here
    /// rather than on the first registration.
    ///
    /// ## Errors
    /// * `ConfigurationError::UnknownShader` - `config.default_shader` names no built-in.
    /// * `CompileError` - The default shader failed to build.
    /// * `ResourceError` - The context rejected the placeholder uploads.
    pub fn new(mut ctx: C, config: PipelineConfig) -> Result<Self, RenderError> {
        let (width, height) = config.initial_viewport;
        ctx.viewport(0, 0, width, height)?;
        let mut resources = GpuResources::new(&mut ctx)?;
        resources.shaders.builtin(&mut ctx, &config.default_shader)?;
        let lane = InstancedLane::new(&config);
        log::info!(
            "RenderAgent ready: strategy '{}', default shader '{}', viewport {width}x{height}",
            lane.strategy_name(),
            config.default_shader
        );

        Ok(Self {
            ctx,
            resources,
            registry: InstanceRegistry::new(),
            lane,
            cameras: Vec::new(),
            lights: Vec::new(),
            viewport: config.initial_viewport,
            config,
            updates: EventBus::new(),
            diagnostics: EventBus::new(),
            render_thread: thread::current().id(),
            frame_count: 0,
            last_stats: FrameStats::default(),
        })
    }

    fn check_thread(&self) -> Result<(), RenderError> {
        if thread::current().id() != self.render_thread {
            log::error!("RenderAgent called from {:?}", thread::current().id());
            return Err(RenderError::WrongThread);
        }
        Ok(())
    }

    fn report(&self, diagnostic: RenderDiagnostic) {
        diagnostic.log();
        self.diagnostics.publish(diagnostic);
    }

    /// Reacts to one scene notification.
    ///
    /// `PostUpdate` renders a frame; its stats are available from
    /// [`RenderAgent::last_stats`]. Per-entity and per-asset failures are
    /// published as diagnostics; only unrecoverable errors are returned.
    pub fn handle_event(
        &mut self,
        event: &SceneEvent,
        scene: &dyn SceneView,
        assets: &mut AssetLibrary,
    ) -> Result<(), RenderError> {
        self.check_thread()?;
        match *event {
            SceneEvent::EntityAdded(entity) => {
                self.observe(scene, assets, entity)?;
            }
            SceneEvent::EntityRemoved(entity) => {
                self.forget(entity);
            }
            SceneEvent::PostUpdate { dt } => {
                log::trace!("Frame tick ({dt:.4}s)");
                self.render_frame(scene, assets)?;
            }
            SceneEvent::Resized { width, height } => {
                self.resize(width, height)?;
            }
            SceneEvent::AssetAdded(asset) => {
                if let Err(err) = self.warm(asset, assets) {
                    if !err.is_recoverable() {
                        return Err(err);
                    }
                    self.report(RenderDiagnostic::warning(err));
                }
            }
        }
        Ok(())
    }

    /// Classifies a newly observed entity by every role it satisfies.
    fn observe(
        &mut self,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
        entity: EntityId,
    ) -> Result<(), RenderError> {
        if scene.camera(entity).is_some() && !self.cameras.contains(&entity) {
            log::debug!("Tracking camera {entity}");
            self.cameras.push(entity);
        }
        if scene.light(entity).is_some() && !self.lights.contains(&entity) {
            log::debug!("Tracking light {entity}");
            self.lights.push(entity);
        }
        if scene.renderable(entity).is_some() {
            if let Err(err) = self.register_entity(scene, assets, entity) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                self.report(RenderDiagnostic::error(err));
            }
        }
        Ok(())
    }

    fn forget(&mut self, entity: EntityId) {
        self.cameras.retain(|id| *id != entity);
        self.lights.retain(|id| *id != entity);
        if self.registry.unregister(entity) {
            log::debug!("Unregistered {entity}");
        }
    }

    /// Adds a renderable entity to its batch.
    ///
    /// ## Errors
    /// See [`InstanceRegistry::register`]; also `RenderError::WrongThread`.
    pub fn register_entity(
        &mut self,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
        entity: EntityId,
    ) -> Result<Registration, RenderError> {
        self.check_thread()?;
        self.registry.register(
            &mut self.ctx,
            &mut self.resources,
            scene,
            assets,
            entity,
            &self.config.default_shader,
        )
    }

    /// Removes an entity from its batch. Returns `Ok(false)` if it was not registered.
    ///
    /// ## Errors
    /// * `RenderError::WrongThread` - Called off the render thread.
    pub fn unregister_entity(&mut self, entity: EntityId) -> Result<bool, RenderError> {
        self.check_thread()?;
        Ok(self.registry.unregister(entity))
    }

    /// Moves an entity to the batch matching its current material and mesh.
    pub fn reregister_entity(
        &mut self,
        scene: &dyn SceneView,
        assets: &AssetLibrary,
        entity: EntityId,
    ) -> Result<Registration, RenderError> {
        self.check_thread()?;
        self.registry.reregister(
            &mut self.ctx,
            &mut self.resources,
            scene,
            assets,
            entity,
            &self.config.default_shader,
        )
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.ctx.viewport(0, 0, width, height)?;
        if width == 0 || height == 0 {
            log::debug!("Viewport collapsed to {width}x{height}; keeping the previous aspect");
        }
        self.viewport = (width, height);
        Ok(())
    }

    fn aspect(&self) -> f32 {
        match self.viewport {
            (width, height) if width > 0 && height > 0 => width as f32 / height as f32,
            _ => self.config.initial_aspect(),
        }
    }

    /// Uploads a newly loaded asset ahead of its first use.
    fn warm(&mut self, asset: AssetRef, assets: &AssetLibrary) -> Result<(), RenderError> {
        match asset {
            AssetRef::Texture(id) => {
                self.resources
                    .textures
                    .get_loaded(&mut self.ctx, id, &assets.textures)?;
            }
            AssetRef::Mesh(id) => {
                let mesh = assets
                    .meshes
                    .get(id)
                    .ok_or(ResourceLoadError::MissingMesh { mesh: id.uuid() })?;
                self.resources.meshes.get(&mut self.ctx, id, mesh)?;
            }
            AssetRef::Shader(id) => {
                let source = assets
                    .shaders
                    .get(id)
                    .ok_or(ConfigurationError::MissingShaderAsset { shader: id.uuid() })?;
                self.resources.shaders.asset(&mut self.ctx, id, source)?;
            }
            AssetRef::Material(id) => {
                log::trace!("Material {} is resolved at registration", id.uuid());
            }
        }
        Ok(())
    }

    /// Swaps in every payload loader threads queued since the last frame.
    fn apply_updates(&mut self, assets: &mut AssetLibrary) {
        for update in self.updates.drain() {
            match update.apply(assets) {
                Ok(asset) => log::trace!("Swapped in new content for asset {asset}"),
                Err(err) => self.report(RenderDiagnostic::error(err)),
            }
        }
    }

    fn active_camera(&self, scene: &dyn SceneView) -> Option<EntityId> {
        self.cameras.iter().copied().find(|id| {
            scene.transform(*id).is_some() && scene.camera(*id).is_some_and(|c| c.is_active)
        })
    }

    fn active_light(&self, scene: &dyn SceneView) -> Option<EntityId> {
        self.lights
            .iter()
            .copied()
            .find(|id| scene.light(*id).is_some_and(|l| l.enabled))
    }

    /// Renders one frame.
    ///
    /// Queued hand-offs are applied first. Without an active camera the frame
    /// is skipped and no GPU call is made.
    ///
    /// ## Errors
    /// Unrecoverable pipeline failures. Recoverable ones are published on
    /// the diagnostics channel and the frame completes.
    pub fn render_frame(
        &mut self,
        scene: &dyn SceneView,
        assets: &mut AssetLibrary,
    ) -> Result<FrameStats, RenderError> {
        self.check_thread()?;
        self.frame_count += 1;
        self.apply_updates(assets);

        let uniforms = self.active_camera(scene).and_then(|camera| {
            FrameUniforms::compute(
                scene,
                camera,
                self.active_light(scene),
                self.aspect(),
                self.config.ambient_color,
            )
        });
        let Some(uniforms) = uniforms else {
            log::trace!("Frame {} skipped: no active camera", self.frame_count);
            self.last_stats = FrameStats::skipped(self.frame_count, SkipReason::NoCamera);
            return Ok(self.last_stats);
        };

        let mut stats = FrameStats {
            frame_number: self.frame_count,
            ..Default::default()
        };
        let frame = {
            let mut recorder = StatsRecorder::new(&mut self.ctx, &mut stats);
            run_lane(
                &mut self.lane,
                &mut recorder,
                &mut self.registry,
                &mut self.resources,
                scene,
                assets,
                &uniforms,
            )
        };

        let (batches_drawn, diagnostics) = match frame {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("Frame {} failed: {err}", self.frame_count);
                self.diagnostics
                    .publish(RenderDiagnostic::error(err.clone()));
                return Err(err);
            }
        };
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }

        stats.batches_drawn = batches_drawn;
        log::trace!(
            "Frame {}: {} batches, {} instances, {} uniform writes",
            stats.frame_number,
            stats.batches_drawn,
            stats.instances,
            stats.uniform_writes
        );
        self.last_stats = stats;
        Ok(stats)
    }

    /// A sender loader threads use to hand decoded resources to this agent.
    pub fn handoff(&self) -> ResourceHandoff {
        ResourceHandoff::new(self.updates.sender())
    }

    /// The receiving end of the diagnostics channel.
    pub fn diagnostics(&self) -> &flume::Receiver<RenderDiagnostic> {
        self.diagnostics.receiver()
    }

    /// Removes and returns every diagnostic published so far.
    pub fn drain_diagnostics(&self) -> Vec<RenderDiagnostic> {
        self.diagnostics.drain()
    }

    /// Stats of the most recent frame.
    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    /// Frames rendered or skipped so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns a human-readable identifier for the active rendering strategy.
    pub fn strategy_name(&self) -> &'static str {
        self.lane.strategy_name()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The batches built so far.
    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// The GPU resource caches.
    pub fn resources(&self) -> &GpuResources {
        &self.resources
    }

    /// The graphics context.
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// The graphics context, mutably.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }
}
