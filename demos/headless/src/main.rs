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

//! Renders a small instanced scene through the recording backend and logs
//! what each frame sent to the GPU.
//!
//! Pass a RON pipeline configuration path as the first argument to override
//! the defaults.

use anyhow::Result;
use prism_agents::render_agent::RenderAgent;
use prism_core::math::{LinearRgba, Quat, Vec3};
use prism_core::renderer::{PipelineConfig, TextureFormat};
use prism_data::assets::{AssetLibrary, Material, Mesh, Texture};
use prism_data::scene::{Camera, Light, Renderable, Scene, SceneEntity, SceneEvent, Transform};
use prism_infra::HeadlessContext;

const GRID: i32 = 8;
const FRAMES: u32 = 5;

fn load_config() -> Result<PipelineConfig> {
    match std::env::args().nth(1) {
        Some(path) => Ok(PipelineConfig::from_ron_file(path)?),
        None => Ok(PipelineConfig::default()),
    }
}

fn forward(
    agent: &mut RenderAgent<HeadlessContext>,
    scene: &mut Scene,
    assets: &mut AssetLibrary,
) -> Result<()> {
    for event in scene.take_events() {
        agent.handle_event(&event, &*scene, assets)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let mut agent = RenderAgent::new(HeadlessContext::new(), config)?;
    let mut scene = Scene::new();
    let mut assets = AssetLibrary::new();

    let quad = assets.meshes.add(Mesh::quad());
    let triangle = assets.meshes.add(Mesh::triangle());
    let checker = assets.textures.add(Texture::solid([200, 200, 200, 255]));
    let lit = assets.materials.add(
        Material::builtin("pbr")
            .with_property("u_roughness", 0.6f32)
            .with_texture("u_albedo_map", checker),
    );
    let flat = assets
        .materials
        .add(Material::builtin("unlit").with_property("u_base_color", LinearRgba::rgb(1.0, 0.4, 0.1)));

    scene.spawn(
        SceneEntity::new(
            Transform::from_translation(Vec3::new(0.0, 6.0, 14.0)).looking_at(Vec3::ZERO, Vec3::Y),
        )
        .with_camera(Camera::default()),
    );
    scene.spawn(
        SceneEntity::new(Transform::from_translation(Vec3::new(3.0, 8.0, 3.0)))
            .with_light(Light::point(LinearRgba::WHITE, 20.0)),
    );
    let mut spinners = Vec::new();
    for x in -GRID / 2..GRID / 2 {
        for z in -GRID / 2..GRID / 2 {
            let (mesh, material) = if (x + z) % 2 == 0 {
                (quad, lit)
            } else {
                (triangle, flat)
            };
            let at = Vec3::new(x as f32 * 1.5, 0.0, z as f32 * 1.5);
            spinners.push(scene.spawn(
                SceneEntity::new(Transform::from_translation(at))
                    .with_renderable(Renderable::new(mesh, material)),
            ));
        }
    }
    forward(&mut agent, &mut scene, &mut assets)?;
    log::info!(
        "Scene ready: {} entities in {} batches ({})",
        scene.len(),
        agent.registry().len(),
        agent.strategy_name()
    );

    // Pixels arrive from a loader thread between frames.
    let handoff = agent.handoff();
    let loader = std::thread::spawn(move || {
        let pixels = (0..4 * 4)
            .flat_map(|i| if i % 2 == 0 { [255, 255, 255, 255] } else { [32, 32, 32, 255] })
            .collect();
        handoff.submit_texture(checker, 4, 4, TextureFormat::Rgba8, pixels)
    });

    for frame in 0..FRAMES {
        if frame == 1 && !loader.is_finished() {
            log::debug!("Texture still loading, rendering with the previous pixels");
        }
        let angle = frame as f32 * 0.1;
        for &id in &spinners {
            if let Some(transform) = scene.transform_mut(id) {
                transform.rotation = Quat::from_rotation_y(angle);
            }
        }
        agent.handle_event(&SceneEvent::PostUpdate { dt: 1.0 / 60.0 }, &scene, &mut assets)?;
        let stats = agent.last_stats();
        log::info!(
            "Frame {}: {} draws, {} instances, {} buffer uploads, {} texture uploads, {} uniform writes",
            stats.frame_number,
            stats.draw_calls,
            stats.instances,
            stats.buffer_uploads,
            stats.texture_uploads,
            stats.uniform_writes
        );
        agent.context_mut().clear_calls();
    }

    if loader.join().is_err() {
        log::error!("Texture loader panicked");
    }
    for diagnostic in agent.drain_diagnostics() {
        log::warn!("Unhandled diagnostic {:?}: {}", diagnostic.severity, diagnostic.error);
    }
    Ok(())
}
