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

//! Integration tests for batching and the instanced lane.

use prism_core::ecs::EntityId;
use prism_core::math::{LinearRgba, Vec3};
use prism_core::renderer::{
    ConfigurationError, GraphicsContext, PipelineConfig, RenderDiagnostic, RenderError, Severity,
    UniformValue, INSTANCE_FLOATS, INSTANCE_STRIDE,
};
use prism_data::assets::{AssetLibrary, Material, Mesh, Texture};
use prism_data::scene::{Camera, Renderable, Scene, SceneEntity, Transform};
use prism_infra::{GlCall, HeadlessContext};
use prism_lanes::render_lane::{
    BatchKey, FrameUniforms, GpuResources, InstanceRegistry, InstancedLane, Registration,
};

struct Fixture {
    ctx: HeadlessContext,
    resources: GpuResources,
    registry: InstanceRegistry,
    scene: Scene,
    assets: AssetLibrary,
}

impl Fixture {
    fn new() -> Self {
        let mut ctx = HeadlessContext::new();
        let resources = GpuResources::new(&mut ctx).expect("caches");
        Self {
            ctx,
            resources,
            registry: InstanceRegistry::new(),
            scene: Scene::new(),
            assets: AssetLibrary::new(),
        }
    }

    fn register(&mut self, entity: EntityId) -> Result<Registration, RenderError> {
        self.registry.register(
            &mut self.ctx,
            &mut self.resources,
            &self.scene,
            &self.assets,
            entity,
            "unlit",
        )
    }

    fn spawn_renderable(&mut self, renderable: Renderable, at: Vec3) -> EntityId {
        self.scene
            .spawn(SceneEntity::new(Transform::from_translation(at)).with_renderable(renderable))
    }

    fn prepare(&mut self) -> Vec<RenderDiagnostic> {
        self.registry
            .prepare(&mut self.ctx, &mut self.resources, &self.scene, &self.assets)
            .expect("prepare")
    }

    fn camera_uniforms(&mut self) -> FrameUniforms {
        let camera = self.scene.spawn(
            SceneEntity::new(Transform::from_translation(Vec3::Z * 5.0))
                .with_camera(Camera::default()),
        );
        FrameUniforms::compute(&self.scene, camera, None, 1.0, LinearRgba::BLACK).expect("camera")
    }

    /// Runs one lane frame and returns the diagnostics of both steps.
    fn render(
        &mut self,
        lane: &mut InstancedLane,
        uniforms: &FrameUniforms,
    ) -> Vec<RenderDiagnostic> {
        let mut diagnostics = lane
            .prepare(
                &mut self.ctx,
                &mut self.registry,
                &mut self.resources,
                &self.scene,
                &self.assets,
            )
            .expect("prepare");
        let output = lane
            .pass(
                &mut self.ctx,
                &self.registry,
                &mut self.resources,
                &self.assets,
                uniforms,
            )
            .expect("pass");
        diagnostics.extend(output.diagnostics);
        diagnostics
    }
}

#[test]
fn test_entities_sharing_material_and_mesh_share_a_batch() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let red = fx.assets.materials.add(Material::builtin("unlit"));
    let blue = fx.assets.materials.add(Material::builtin("unlit"));

    let a = fx.spawn_renderable(Renderable::new(quad, red), Vec3::ZERO);
    let b = fx.spawn_renderable(Renderable::new(quad, red), Vec3::X);
    let c = fx.spawn_renderable(Renderable::new(quad, blue), Vec3::Y);

    assert!(matches!(fx.register(a), Ok(Registration::Created(_))));
    assert!(matches!(fx.register(b), Ok(Registration::Joined(_))));
    assert!(matches!(fx.register(c), Ok(Registration::Created(_))));
    assert!(matches!(fx.register(a), Ok(Registration::Unchanged(_))));

    assert_eq!(fx.registry.len(), 2);
    let batch = fx
        .registry
        .batch(BatchKey {
            material: red,
            mesh: quad,
        })
        .expect("batch");
    assert_eq!(batch.members(), &[a, b]);
}

#[test]
fn test_instance_attributes_advance_once_per_instance() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);
    fx.register(entity).expect("register");

    let batch = fx.registry.batch_of(entity).expect("batch");
    let layout = fx.ctx.vertex_array(batch.vertex_array()).expect("vao");
    let instanced: Vec<_> = layout
        .attributes
        .values()
        .filter(|attribute| attribute.buffer == batch.instance_buffer())
        .collect();

    assert_eq!(instanced.len(), 5, "four transform columns and a color");
    for attribute in &instanced {
        assert_eq!(attribute.divisor, 1);
        assert_eq!(attribute.stride, INSTANCE_STRIDE);
        assert_eq!(attribute.components, 4);
    }
    let offsets: Vec<_> = instanced.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, [0, 16, 32, 48, 64]);
    assert!(layout
        .attributes
        .values()
        .filter(|attribute| attribute.buffer != batch.instance_buffer())
        .all(|attribute| attribute.divisor == 0));
    assert!(layout.index_buffer.is_some());
}

#[test]
fn test_prepare_stages_transform_columns_then_tint() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));
    let tint = LinearRgba::new(0.25, 0.5, 0.75, 1.0);
    let entity = fx.spawn_renderable(
        Renderable::new(quad, material).with_tint(tint),
        Vec3::new(1.0, 2.0, 3.0),
    );
    fx.register(entity).expect("register");

    assert!(fx.prepare().is_empty());
    let batch = fx.registry.batch_of(entity).expect("batch");
    let staging = batch.staging();
    assert_eq!(staging.len(), INSTANCE_FLOATS);
    assert_eq!(&staging[12..15], &[1.0, 2.0, 3.0]);
    assert_eq!(&staging[16..], &tint.to_array());
    assert_eq!(
        fx.ctx.buffer_data(batch.instance_buffer()).map(<[u8]>::len),
        Some(INSTANCE_STRIDE)
    );
}

#[test]
fn test_moved_entity_is_restaged_next_prepare() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);
    fx.register(entity).expect("register");
    fx.prepare();

    fx.scene.transform_mut(entity).expect("transform").translation = Vec3::new(5.0, 0.0, 0.0);
    fx.prepare();

    let staging = fx.registry.batch_of(entity).expect("batch").staging();
    assert_eq!(staging[12], 5.0);
}

#[test]
fn test_registration_errors_name_what_is_missing() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));

    let bare = fx.scene.spawn(SceneEntity::new(Transform::IDENTITY));
    assert_eq!(
        fx.register(bare),
        Err(ConfigurationError::NotRenderable { entity: bare }.into())
    );

    let no_material = fx.spawn_renderable(
        Renderable {
            material: None,
            ..Renderable::new(quad, material)
        },
        Vec3::ZERO,
    );
    assert_eq!(
        fx.register(no_material),
        Err(ConfigurationError::MissingMaterial {
            entity: no_material
        }
        .into())
    );

    let mut elsewhere = AssetLibrary::new();
    let unloaded = elsewhere.meshes.add(Mesh::triangle());
    let no_mesh = fx.spawn_renderable(Renderable::new(unloaded, material), Vec3::ZERO);
    assert_eq!(
        fx.register(no_mesh),
        Err(ConfigurationError::UnknownMesh {
            entity: no_mesh,
            mesh: unloaded.uuid(),
        }
        .into())
    );

    fx.scene.despawn(bare);
    assert_eq!(
        fx.register(bare),
        Err(ConfigurationError::UnknownEntity { entity: bare }.into())
    );
    assert!(fx.registry.is_empty());
}

#[test]
fn test_mismatched_material_property_is_rejected() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx
        .assets
        .materials
        .add(Material::builtin("unlit").with_property("u_base_color", 1.0f32));
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);

    assert!(matches!(
        fx.register(entity),
        Err(RenderError::UnsupportedValue(_))
    ));
}

#[test]
fn test_unregistered_entity_leaves_an_empty_batch_that_is_not_drawn() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);
    fx.register(entity).expect("register");

    assert!(fx.registry.unregister(entity));
    assert!(!fx.registry.unregister(entity));
    assert_eq!(fx.registry.len(), 1);
    fx.prepare();
    assert!(!fx.registry.batches()[0].is_ready());
}

#[test]
fn test_reregister_moves_an_entity_to_its_new_material() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let first = fx.assets.materials.add(Material::builtin("unlit"));
    let second = fx.assets.materials.add(Material::builtin("pbr"));
    let entity = fx.spawn_renderable(Renderable::new(quad, first), Vec3::ZERO);
    fx.register(entity).expect("register");

    fx.scene
        .get_mut(entity)
        .and_then(|e| e.renderable.as_mut())
        .expect("renderable")
        .material = Some(second);
    let registration = fx
        .registry
        .reregister(
            &mut fx.ctx,
            &mut fx.resources,
            &fx.scene,
            &fx.assets,
            entity,
            "unlit",
        )
        .expect("reregister");

    assert_eq!(registration.key().material, second);
    assert_eq!(fx.registry.len(), 2);
    assert!(fx.registry.batches()[0].is_empty());
}

#[test]
fn test_lane_issues_one_instanced_draw_per_batch() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let triangle = fx.assets.meshes.add(Mesh::triangle());
    let checker = fx.assets.textures.add(Texture::solid([255, 255, 255, 255]));
    let material = fx
        .assets
        .materials
        .add(Material::builtin("unlit").with_texture("u_base_map", checker));

    for x in 0..3 {
        let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::X * x as f32);
        fx.register(entity).expect("register");
    }
    let lone = fx.spawn_renderable(Renderable::new(triangle, material), Vec3::ZERO);
    fx.register(lone).expect("register");

    let camera = fx.scene.spawn(
        SceneEntity::new(Transform::from_translation(Vec3::Z * 5.0))
            .with_camera(Camera::default()),
    );
    let uniforms =
        FrameUniforms::compute(&fx.scene, camera, None, 16.0 / 9.0, LinearRgba::BLACK)
            .expect("camera");

    let config = PipelineConfig::default();
    let mut lane = InstancedLane::new(&config);
    let diagnostics = lane
        .prepare(
            &mut fx.ctx,
            &mut fx.registry,
            &mut fx.resources,
            &fx.scene,
            &fx.assets,
        )
        .expect("prepare");
    assert!(diagnostics.is_empty());

    fx.ctx.clear_calls();
    let output = lane
        .pass(
            &mut fx.ctx,
            &fx.registry,
            &mut fx.resources,
            &fx.assets,
            &uniforms,
        )
        .expect("pass");

    assert_eq!(output.batches_drawn, 2);
    assert_eq!(fx.ctx.draw_instances(), vec![3, 1]);
    assert!(matches!(
        fx.ctx.calls().iter().find(|call| call.is_draw()),
        Some(GlCall::DrawElementsInstanced { count: 6, .. })
    ));
    assert_eq!(
        fx.ctx.count(|call| matches!(call, GlCall::Clear { .. })),
        1
    );
}

#[test]
fn test_missing_texture_falls_back_and_is_reported_once() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let unloaded = AssetLibrary::new()
        .textures
        .add(Texture::solid([0, 0, 0, 255]));
    let material = fx
        .assets
        .materials
        .add(Material::builtin("unlit").with_texture("u_base_map", unloaded));
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);
    fx.register(entity).expect("register");
    let uniforms = fx.camera_uniforms();

    let mut lane = InstancedLane::new(&PipelineConfig::default());
    let mut reported = 0;
    for _ in 0..2 {
        fx.ctx.clear_calls();
        reported += fx
            .render(&mut lane, &uniforms)
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        assert_eq!(fx.ctx.draw_instances(), vec![1], "the batch still draws");
    }
    assert_eq!(reported, 1);
}

#[test]
fn test_unset_material_uniform_falls_back_to_the_shader_default() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let red_color = LinearRgba::rgb(1.0, 0.0, 0.0);
    let red = fx
        .assets
        .materials
        .add(Material::builtin("unlit").with_property("u_base_color", red_color));
    let plain = fx.assets.materials.add(Material::builtin("unlit"));
    let first = fx.spawn_renderable(Renderable::new(quad, red), Vec3::ZERO);
    let second = fx.spawn_renderable(Renderable::new(quad, plain), Vec3::X);
    fx.register(first).expect("register");
    fx.register(second).expect("register");
    let uniforms = fx.camera_uniforms();
    let mut lane = InstancedLane::new(&PipelineConfig::default());

    fx.ctx.clear_calls();
    assert!(fx.render(&mut lane, &uniforms).is_empty());

    let red_value = UniformValue::from(red_color);
    assert_eq!(
        fx.ctx.count(|call| matches!(call, GlCall::SetUniform { value, .. } if *value == red_value)),
        1
    );
    let batch = fx.registry.batch_of(second).expect("batch");
    let program = fx
        .resources
        .shaders
        .get(batch.shader())
        .expect("program")
        .program();
    assert_eq!(
        fx.ctx.uniform_value(program, "u_base_color"),
        Some(UniformValue::Vec4([1.0; 4])),
        "the plain batch draws with the declared default"
    );
}

#[test]
fn test_texture_sync_between_frames_keeps_every_unit_bound() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let albedo = fx.assets.textures.add(Texture::solid([255, 0, 0, 255]));
    let metal = fx.assets.textures.add(Texture::solid([0, 128, 0, 255]));
    let material = fx.assets.materials.add(
        Material::builtin("pbr")
            .with_texture("u_albedo_map", albedo)
            .with_texture("u_metallic_roughness_map", metal),
    );
    let entity = fx.spawn_renderable(Renderable::new(quad, material), Vec3::ZERO);
    fx.register(entity).expect("register");
    let uniforms = fx.camera_uniforms();
    let mut lane = InstancedLane::new(&PipelineConfig::default());

    assert!(fx.render(&mut lane, &uniforms).is_empty());
    let albedo_gpu = fx.resources.textures.record(albedo).map(|r| r.texture);
    let metal_gpu = fx.resources.textures.record(metal).map(|r| r.texture);
    assert!(albedo_gpu.is_some() && metal_gpu.is_some());
    assert_eq!((fx.ctx.bound_texture(0), fx.ctx.bound_texture(1)), (albedo_gpu, metal_gpu));

    fx.assets
        .textures
        .get_mut(metal)
        .expect("texture")
        .modify_pixels(|pixels| pixels[0] = 255);
    fx.ctx.clear_calls();
    assert!(fx.render(&mut lane, &uniforms).is_empty());

    let calls = fx.ctx.calls();
    let upload = calls
        .iter()
        .position(|call| matches!(call, GlCall::UploadTexture { .. }));
    let draw = calls.iter().position(GlCall::is_draw);
    assert!(upload.is_some() && upload < draw, "pixels sync before drawing");
    assert_eq!((fx.ctx.bound_texture(0), fx.ctx.bound_texture(1)), (albedo_gpu, metal_gpu));
}

#[test]
fn test_prepare_shrinks_instance_data_after_unregister() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let material = fx.assets.materials.add(Material::builtin("unlit"));
    let members: Vec<_> = (0..3)
        .map(|x| fx.spawn_renderable(Renderable::new(quad, material), Vec3::X * x as f32))
        .collect();
    for &entity in &members {
        fx.register(entity).expect("register");
    }
    fx.prepare();

    assert!(fx.registry.unregister(members[1]));
    fx.prepare();

    let batch = fx.registry.batch_of(members[0]).expect("batch");
    assert_eq!(batch.members(), &[members[0], members[2]]);
    assert_eq!(batch.staging().len(), 2 * INSTANCE_FLOATS);
    assert_eq!(batch.staging()[INSTANCE_FLOATS + 12], 2.0);
    assert_eq!(
        fx.ctx.buffer_data(batch.instance_buffer()).map(<[u8]>::len),
        Some(2 * INSTANCE_STRIDE)
    );
}

#[test]
fn test_failed_layout_bind_releases_the_new_batch_objects() {
    let mut fx = Fixture::new();
    let quad = fx.assets.meshes.add(Mesh::quad());
    let first = fx.assets.materials.add(Material::builtin("unlit"));
    let second = fx.assets.materials.add(Material::builtin("unlit"));
    let existing = fx.spawn_renderable(Renderable::new(quad, first), Vec3::ZERO);
    fx.register(existing).expect("register");

    let vertex_buffer = fx.resources.meshes.record(quad).expect("mesh").vertex_buffer;
    fx.ctx.delete_buffer(vertex_buffer).expect("delete");
    fx.ctx.clear_calls();

    let entity = fx.spawn_renderable(Renderable::new(quad, second), Vec3::X);
    assert!(matches!(fx.register(entity), Err(RenderError::Resource(_))));
    assert_eq!(fx.registry.len(), 1);
    assert!(fx.registry.batch_of(entity).is_none());

    let calls = fx.ctx.calls();
    let vertex_array = calls
        .iter()
        .find_map(|call| match call {
            GlCall::CreateVertexArray(id) => Some(*id),
            _ => None,
        })
        .expect("vertex array created");
    let instance_buffer = calls
        .iter()
        .find_map(|call| match call {
            GlCall::CreateBuffer(id) => Some(*id),
            _ => None,
        })
        .expect("instance buffer created");
    assert!(fx.ctx.vertex_array(vertex_array).is_none());
    assert!(fx.ctx.buffer_data(instance_buffer).is_none());
}
