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

//! Integration tests for the shader, texture and mesh caches.

use prism_core::renderer::{
    FilterMode, GraphicsContext, RenderError, SamplerParams, TextureFormat, UniformValue,
    VertexFormat, WrapMode,
};
use std::collections::BTreeMap;
use prism_data::assets::{Assets, Indices, Mesh, ShaderSource, Texture};
use prism_infra::{GlCall, HeadlessContext};
use prism_lanes::render_lane::{MeshCache, ShaderCache, ShaderKey, TextureCache};

const VERTEX: &str = "#version 330 core\nin vec3 a_position;\nuniform mat4 u_view;\nvoid main() {}\n";
const FRAGMENT: &str = "#version 330 core\nuniform vec4 u_base_color;\nvoid main() {}\n";
const BROKEN: &str = "#version 330 core\n#error missing semicolon\nvoid main() {}\n";

fn texture_uploads(ctx: &HeadlessContext) -> usize {
    ctx.count(|call| matches!(call, GlCall::UploadTexture { .. }))
}

fn sampler_updates(ctx: &HeadlessContext) -> usize {
    ctx.count(|call| matches!(call, GlCall::SetSampler { .. }))
}

#[test]
fn test_texture_is_uploaded_once_until_its_pixels_change() {
    let mut ctx = HeadlessContext::new();
    let mut cache = TextureCache::new(&mut ctx).expect("placeholders");
    let mut textures = Assets::new();
    let id = textures.add(Texture::solid([10, 20, 30, 255]));
    ctx.clear_calls();

    let first = cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("upload");
    let second = cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("hit");
    assert_eq!(first, second);
    assert_eq!(texture_uploads(&ctx), 1);
    assert_eq!(sampler_updates(&ctx), 1);

    textures
        .get_mut(id)
        .expect("texture")
        .modify_pixels(|pixels| pixels[0] = 200);
    cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("sync");
    assert_eq!(texture_uploads(&ctx), 2);
    assert_eq!(sampler_updates(&ctx), 1, "pixel edits leave the sampler alone");
}

#[test]
fn test_sampler_change_reapplies_parameters_without_reuploading() {
    let mut ctx = HeadlessContext::new();
    let mut cache = TextureCache::new(&mut ctx).expect("placeholders");
    let mut textures = Assets::new();
    let id = textures.add(Texture::solid([0, 0, 0, 255]));
    let handle = cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("upload");
    ctx.clear_calls();

    let linear = SamplerParams {
        wrap_u: WrapMode::Repeat,
        wrap_v: WrapMode::Repeat,
        min_filter: FilterMode::Linear,
        mag_filter: FilterMode::Linear,
    };
    textures.get_mut(id).expect("texture").set_sampler(linear);
    cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("sync");

    assert_eq!(texture_uploads(&ctx), 0);
    assert_eq!(sampler_updates(&ctx), 1);
    assert_eq!(ctx.texture_sampler(handle), Some(linear));
}

#[test]
fn test_resized_texture_updates_the_record() {
    let mut ctx = HeadlessContext::new();
    let mut cache = TextureCache::new(&mut ctx).expect("placeholders");
    let mut textures = Assets::new();
    let id = textures.add(Texture::solid([0, 0, 0, 255]));
    cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("upload");

    textures
        .get_mut(id)
        .expect("texture")
        .replace_pixels(2, 2, TextureFormat::R8, vec![1, 2, 3, 4])
        .expect("valid pixels");
    let handle = cache
        .get(&mut ctx, id, textures.get(id).expect("texture"))
        .expect("sync");

    let record = cache.record(id).expect("cached");
    assert_eq!((record.width, record.height), (2, 2));
    assert_eq!(ctx.texture_size(handle), Some((2, 2)));
}

#[test]
fn test_missing_texture_is_a_load_error() {
    let mut ctx = HeadlessContext::new();
    let mut cache = TextureCache::new(&mut ctx).expect("placeholders");
    let mut other = Assets::new();
    let id = other.add(Texture::solid([0, 0, 0, 255]));

    let err = cache
        .get_loaded(&mut ctx, id, &Assets::new())
        .expect_err("not loaded");
    assert!(matches!(err, RenderError::ResourceLoad(_)));
    assert!(cache.is_empty());
}

#[test]
fn test_mesh_sync_tracks_index_buffer_changes() {
    let mut ctx = HeadlessContext::new();
    let mut cache = MeshCache::new();
    let mut meshes = Assets::new();
    let id = meshes.add(Mesh::quad());

    let gpu = cache
        .get(&mut ctx, id, meshes.get(id).expect("mesh"))
        .expect("upload")
        .clone();
    assert!(gpu.index_buffer.is_some());
    assert_eq!((gpu.vertex_count, gpu.element_count), (4, 6));

    cache
        .get(&mut ctx, id, meshes.get(id).expect("mesh"))
        .expect("hit");
    assert_eq!(
        ctx.count(|call| matches!(call, GlCall::UploadBuffer { .. })),
        2,
        "an unchanged mesh is not uploaded again"
    );

    meshes
        .get_mut(id)
        .expect("mesh")
        .replace(
            VertexFormat::Position,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            None,
        )
        .expect("valid mesh");
    let synced = cache
        .get(&mut ctx, id, meshes.get(id).expect("mesh"))
        .expect("sync");

    assert_eq!(synced.vertex_buffer, gpu.vertex_buffer);
    assert_eq!(synced.index_buffer, None);
    assert_eq!(synced.vertex_count, 3);
    assert!(synced.layout_generation > gpu.layout_generation);
    assert_eq!(ctx.count(|call| matches!(call, GlCall::DeleteBuffer(_))), 1);
}

#[test]
fn test_mesh_index_width_follows_the_asset() {
    let mut ctx = HeadlessContext::new();
    let mut cache = MeshCache::new();
    let mut meshes = Assets::new();
    let mesh = Mesh::new(
        VertexFormat::Position,
        vec![0.0; 9],
        Some(Indices::U32(vec![0, 1, 2])),
    )
    .expect("valid mesh");
    let id = meshes.add(mesh);

    let gpu = cache
        .get(&mut ctx, id, meshes.get(id).expect("mesh"))
        .expect("upload");
    let index_buffer = gpu.index_buffer.expect("indexed");
    assert_eq!(ctx.buffer_data(index_buffer).map(<[u8]>::len), Some(12));
}

#[test]
fn test_unknown_builtin_shader_is_a_configuration_error() {
    let mut ctx = HeadlessContext::new();
    let mut cache = ShaderCache::new();

    let err = cache.builtin(&mut ctx, "toon").expect_err("no such shader");
    assert!(matches!(err, RenderError::Configuration(_)));
    assert!(cache.is_empty());
}

#[test]
fn test_builtin_shader_is_compiled_once() {
    let mut ctx = HeadlessContext::new();
    let mut cache = ShaderCache::new();

    let first = cache.builtin(&mut ctx, "pbr").expect("compile");
    let second = cache.builtin(&mut ctx, "pbr").expect("hit");
    assert_eq!(first, second);
    assert_eq!(ctx.program_count(), 1);
    assert_eq!(ctx.shader_object_count(), 0, "stage objects are released");
}

#[test]
fn test_failed_reload_keeps_the_previous_program() {
    let mut ctx = HeadlessContext::new();
    let mut cache = ShaderCache::new();
    let mut sources = Assets::new();
    let id = sources.add(ShaderSource::new("flat", VERTEX, FRAGMENT));

    let key = cache
        .asset(&mut ctx, id, sources.get(id).expect("source"))
        .expect("compile");
    let original = cache.get(&key).expect("cached").program();

    sources.get_mut(id).expect("source").replace(VERTEX, BROKEN);
    let errors = cache.refresh(&mut ctx, &sources);
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        RenderError::Compile(err) => {
            assert_eq!(err.label, "flat");
            assert!(err.fragment_log.is_some());
            assert!(err.vertex_log.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(cache.get(&key).expect("cached").program(), original);
    assert!(
        cache.refresh(&mut ctx, &sources).is_empty(),
        "a failed version is reported once"
    );

    sources.get_mut(id).expect("source").replace(VERTEX, FRAGMENT);
    assert!(cache.refresh(&mut ctx, &sources).is_empty());
    let reloaded = cache.get(&key).expect("cached");
    assert_ne!(reloaded.program(), original);
    assert_eq!(ctx.program_count(), 1, "the replaced program is deleted");
}

#[test]
fn test_uniform_writes_skip_unknown_names_and_unchanged_values() {
    let mut ctx = HeadlessContext::new();
    let mut cache = ShaderCache::new();
    let key = cache.builtin(&mut ctx, "unlit").expect("compile");
    let program = cache.get_mut(&key).expect("cached");
    ctx.use_program(Some(program.program())).expect("bind");

    let color = UniformValue::Vec4([0.5, 0.5, 0.5, 1.0]);
    assert!(!program
        .set(&mut ctx, "u_does_not_exist", &color)
        .expect("ignored"));
    assert!(program.set(&mut ctx, "u_base_color", &color).expect("write"));
    assert!(!program.set(&mut ctx, "u_base_color", &color).expect("cached"));

    let err = program
        .set(&mut ctx, "u_base_color", &1.0f32.into())
        .expect_err("kind mismatch");
    assert!(matches!(err, RenderError::UnsupportedValue(_)));
    assert_eq!(
        ctx.uniform_value(program.program(), "u_base_color"),
        Some(color)
    );
    assert_eq!(key, ShaderKey::Builtin("unlit".to_owned()));
}

#[test]
fn test_material_values_fall_back_to_link_time_defaults() {
    let mut ctx = HeadlessContext::new();
    let mut cache = ShaderCache::new();
    let key = cache.builtin(&mut ctx, "pbr").expect("compile");
    let program = cache.get_mut(&key).expect("cached");
    ctx.use_program(Some(program.program())).expect("bind");

    let mut properties = BTreeMap::new();
    properties.insert("u_roughness".to_owned(), UniformValue::Float(0.9));
    properties.insert("u_metallic".to_owned(), UniformValue::Vec3([1.0; 3]));
    ctx.clear_calls();
    let rejected = program
        .apply_material(&mut ctx, &properties, &["u_view"])
        .expect("apply");
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].uniform, "u_metallic");
    assert_eq!(
        ctx.count(|call| matches!(call, GlCall::SetUniform { .. })),
        1,
        "only the roughness differs from its declared value"
    );

    let program_id = program.program();
    program
        .apply_material(&mut ctx, &BTreeMap::new(), &[])
        .expect("apply");
    assert_eq!(
        ctx.uniform_value(program_id, "u_roughness"),
        Some(UniformValue::Float(0.5))
    );
    assert_eq!(
        ctx.uniform_value(program_id, "u_metallic"),
        Some(UniformValue::Float(0.0))
    );
}
