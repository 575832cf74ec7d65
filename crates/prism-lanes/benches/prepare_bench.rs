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

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prism_core::ecs::EntityId;
use prism_core::math::{LinearRgba, Vec3};
use prism_core::renderer::PipelineConfig;
use prism_data::assets::{AssetLibrary, Material, Mesh};
use prism_data::scene::{Camera, Renderable, Scene, SceneEntity, Transform};
use prism_infra::HeadlessContext;
use prism_lanes::render_lane::{FrameUniforms, GpuResources, InstanceRegistry, InstancedLane};

struct World {
    ctx: HeadlessContext,
    resources: GpuResources,
    registry: InstanceRegistry,
    scene: Scene,
    assets: AssetLibrary,
    camera: EntityId,
}

/// Setup 10,000 quads spread over 8 batches
fn setup_world() -> World {
    let mut ctx = HeadlessContext::new();
    let mut resources = GpuResources::new(&mut ctx).expect("caches");
    let mut registry = InstanceRegistry::new();
    let mut scene = Scene::new();
    let mut assets = AssetLibrary::new();

    let quad = assets.meshes.add(Mesh::quad());
    let materials: Vec<_> = (0..8)
        .map(|_| assets.materials.add(Material::builtin("unlit")))
        .collect();

    let camera = scene.spawn(
        SceneEntity::new(
            Transform::from_translation(Vec3::new(0.0, 10.0, 50.0)).looking_at(Vec3::ZERO, Vec3::Y),
        )
        .with_camera(Camera::default()),
    );
    for i in 0..10_000 {
        let entity = scene.spawn(
            SceneEntity::new(Transform::from_translation(Vec3::new(i as f32, 0.0, 0.0)))
                .with_renderable(Renderable::new(quad, materials[i % materials.len()])),
        );
        registry
            .register(&mut ctx, &mut resources, &scene, &assets, entity, "unlit")
            .expect("register");
    }

    World {
        ctx,
        resources,
        registry,
        scene,
        assets,
        camera,
    }
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("Instance Registry");

    let mut world = setup_world();
    group.bench_function("Prepare 10k instances / 8 batches", |b| {
        b.iter(|| {
            let diagnostics = world
                .registry
                .prepare(&mut world.ctx, &mut world.resources, &world.scene, &world.assets)
                .expect("prepare");
            world.ctx.clear_calls();
            black_box(diagnostics);
        });
    });

    let mut world = setup_world();
    let mut lane = InstancedLane::new(&PipelineConfig::default());
    let uniforms = FrameUniforms::compute(&world.scene, world.camera, None, 16.0 / 9.0, LinearRgba::BLACK)
        .expect("camera");
    group.bench_function("Prepare and draw 10k instances / 8 batches", |b| {
        b.iter(|| {
            let diagnostics = lane
                .prepare(
                    &mut world.ctx,
                    &mut world.registry,
                    &mut world.resources,
                    &world.scene,
                    &world.assets,
                )
                .expect("prepare");
            let output = lane
                .pass(
                    &mut world.ctx,
                    &world.registry,
                    &mut world.resources,
                    &world.assets,
                    &uniforms,
                )
                .expect("pass");
            world.ctx.clear_calls();
            black_box((diagnostics, output));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_prepare);
criterion_main!(benches);
