//! Frame submission against a recording context.

use glam::Vec2;
use sprig::prelude::*;
use sprig::render::Quad;
use sprig_test_utils::{MockRenderContext, RenderCall};
use std::sync::Arc;

const MONO: &[u8] = include_bytes!("../../sprig-text/assets/DejaVuSansMono.ttf");

const A: TextureId = TextureId(1_000);
const B: TextureId = TextureId(2_000);

fn renderer_with(config: Config) -> (Arc<MockRenderContext>, SpriteRenderer) {
    let mock = Arc::new(MockRenderContext::new());
    let renderer = SpriteRenderer::new(mock.clone(), &config).unwrap();
    mock.clear_calls();
    (mock, renderer)
}

#[test]
fn invalid_config_is_rejected_before_any_gpu_call() {
    let mock = Arc::new(MockRenderContext::new());
    let mut config = Config::default();
    config.text.cache_capacity = 0;

    let err = SpriteRenderer::new(mock.clone(), &config).err().unwrap();
    assert!(matches!(err, sprig::render::RenderError::Config(_)));
    assert!(err.to_string().contains("cache_capacity"));
    assert_eq!(mock.call_count(), 0);

    let err = SpriteRenderer::with_program(mock.clone(), sprig::render::ProgramId(7), &config)
        .err()
        .unwrap();
    assert!(matches!(err, sprig::render::RenderError::Config(_)));
    assert_eq!(mock.call_count(), 0);
}

fn renderer() -> (Arc<MockRenderContext>, SpriteRenderer) {
    renderer_with(Config::default())
}

fn scene_with_camera() -> Scene {
    let mut scene = Scene::new();
    scene.spawn_camera(Camera2D::new(Vec2::ZERO, 1.0, 100.0));
    scene
}

fn draw_textures(mock: &MockRenderContext) -> Vec<(TextureId, u32)> {
    mock.draw_calls()
        .iter()
        .map(|d| (d.texture, d.vertex_count / 6))
        .collect()
}

#[test]
fn missing_camera_fails_before_any_gpu_work() {
    let (mock, mut renderer) = renderer();
    let mut scene = Scene::new();
    scene.spawn_sprite(Sprite::new(A), Transform::default());

    let err = renderer.render_frame(&scene).unwrap_err();
    assert!(matches!(err, FrameError::NoCamera));
    assert_eq!(mock.call_count(), 0);
}

#[test]
fn view_projection_is_set_before_drawing() {
    let (mock, mut renderer) = renderer();
    let mut scene = Scene::new();
    let camera = Camera2D::new(Vec2::new(3.0, -2.0), 2.0, 40.0);
    scene.spawn_camera(camera);
    scene.spawn_sprite(Sprite::new(A), Transform::default());

    renderer.render_frame(&scene).unwrap();
    let calls = mock.calls();
    match &calls[0] {
        RenderCall::SetViewProjection { program, matrix } => {
            assert_eq!(*program, renderer.program());
            assert_eq!(*matrix, camera.view_projection().to_cols_array_2d());
        }
        other => panic!("expected view projection first, got {other:?}"),
    }
    assert!(mock.draw_calls().iter().all(|d| !d.depth_test));
}

#[test]
fn empty_scene_draws_nothing() {
    let (mock, mut renderer) = renderer();
    let stats = renderer.render_frame(&scene_with_camera()).unwrap();
    assert_eq!(stats, FrameStats::default());
    assert_eq!(mock.count_draws(), 0);
}

#[test]
fn consecutive_same_texture_sprites_share_a_draw() {
    let (mock, mut renderer) = renderer();
    let mut scene = scene_with_camera();
    for texture in [A, A, A, B, B, A] {
        scene.spawn_sprite(Sprite::new(texture), Transform::default());
    }

    let stats = renderer.render_frame(&scene).unwrap();
    assert_eq!(draw_textures(&mock), vec![(A, 3), (B, 2), (A, 1)]);
    assert_eq!(stats.sprites, 6);
    assert_eq!(stats.batch.draw_calls, 3);
    assert_eq!(stats.batch.texture_switch_flushes, 2);
}

#[test]
fn full_batch_flushes_and_trailing_remainder_is_drawn() {
    let mut config = Config::default();
    config.renderer.max_batch_size = 2;
    let (mock, mut renderer) = renderer_with(config);
    let mut scene = scene_with_camera();
    for _ in 0..3 {
        scene.spawn_sprite(Sprite::new(A), Transform::default());
    }

    let stats = renderer.render_frame(&scene).unwrap();
    assert_eq!(draw_textures(&mock), vec![(A, 2), (A, 1)]);
    assert_eq!(stats.batch.overflow_flushes, 1);
    assert!(renderer.batch().is_empty());
}

#[test]
fn hierarchy_order_and_offsets_reach_the_vertices() {
    let (mock, mut renderer) = renderer();
    let mut scene = scene_with_camera();
    let parent = scene.spawn_sprite(Sprite::new(A), Transform::from_xy(10.0, 0.0));
    scene.spawn_sprite(Sprite::new(B), Transform::from_xy(-50.0, 0.0));
    let child = scene.spawn_sprite(
        Sprite::new(A).with_color(Color::GREEN),
        Transform::from_xy(1.0, 1.0).with_layer(4.0),
    );
    scene.set_parent(child, Some(parent)).unwrap();

    renderer.render_frame(&scene).unwrap();
    assert_eq!(draw_textures(&mock), vec![(A, 2), (B, 1)]);

    let (_, _, first_upload) = &mock.buffer_writes()[0];
    let quads: Vec<Quad> = first_upload
        .chunks_exact(Quad::SIZE as usize)
        .map(bytemuck::pod_read_unaligned)
        .collect();
    let child_bl = quads[1].vertices[0];
    assert_eq!(child_bl.position, [11.0, 1.0, -4.0]);
    assert_eq!(child_bl.color, Color::GREEN.to_array());
}

#[test]
fn text_runs_bake_once_and_switch_to_the_atlas_texture() {
    let (mock, mut renderer) = renderer();
    let font = Font::from_bytes("mono", MONO).unwrap();
    let mut scene = scene_with_camera();
    scene.spawn_sprite(Sprite::new(A), Transform::default());
    scene.spawn_text(TextRun::new("Hi", font.clone(), 32.0), Transform::from_xy(0.0, 20.0));
    scene.spawn_text(TextRun::new("Bye", font, 32.0), Transform::from_xy(0.0, -20.0));

    let stats = renderer.render_frame(&scene).unwrap();
    assert_eq!(mock.count_texture_creates(), 1);
    assert_eq!(renderer.fonts().misses(), 1);
    assert_eq!(renderer.fonts().hits(), 1);

    let draws = draw_textures(&mock);
    assert_eq!(draws.len(), 2);
    assert_eq!(draws[0], (A, 1));
    assert_ne!(draws[1].0, A);
    assert_eq!(draws[1].1, 5);
    assert_eq!(stats.glyph_quads, 5);
    assert_eq!(stats.text_runs, 2);
}

#[test]
fn atlas_survives_across_frames() {
    let (mock, mut renderer) = renderer();
    let font = Font::from_bytes("mono", MONO).unwrap();
    let mut scene = scene_with_camera();
    scene.spawn_text(TextRun::new("frame", font, 18.0), Transform::default());

    for _ in 0..3 {
        renderer.render_frame(&scene).unwrap();
    }
    assert_eq!(mock.count_texture_creates(), 1);
    assert_eq!(renderer.frame_count(), 3);
    assert!(renderer.fonts().hit_rate() > 0.6);
}

#[test]
fn text_failure_still_flushes_staged_sprites() {
    let mut config = Config::default();
    config.text.min_atlas_size = 64;
    config.text.max_atlas_size = 64;
    let (mock, mut renderer) = renderer_with(config);
    let font = Font::from_bytes("mono", MONO).unwrap();
    let mut scene = scene_with_camera();
    scene.spawn_sprite(Sprite::new(A), Transform::default());
    scene.spawn_text(TextRun::new("huge", font, 96.0), Transform::default());
    scene.spawn_sprite(Sprite::new(B), Transform::default());

    let err = renderer.render_frame(&scene).unwrap_err();
    assert!(matches!(err, FrameError::Text(sprig::text::TextError::FontBakeOverflow { .. })));
    assert_eq!(draw_textures(&mock), vec![(A, 1)]);
    assert!(renderer.batch().is_empty());
}

#[test]
fn evicted_atlas_outlives_the_frame_that_used_it() {
    let mut config = Config::default();
    config.text.cache_capacity = 1;
    let (mock, mut renderer) = renderer_with(config);
    let font = Font::from_bytes("mono", MONO).unwrap();
    let mut scene = scene_with_camera();
    scene.spawn_text(TextRun::new("a", font.clone(), 12.0), Transform::default());
    scene.spawn_text(TextRun::new("b", font, 14.0), Transform::default());

    renderer.render_frame(&scene).unwrap();
    let calls = mock.calls();
    let first_destroy = calls
        .iter()
        .position(|c| matches!(c, RenderCall::DestroyTexture { .. }))
        .expect("evicted atlas released");
    let last_draw = calls
        .iter()
        .rposition(|c| matches!(c, RenderCall::Draw(_)))
        .unwrap();
    assert!(first_destroy > last_draw);
    assert_eq!(mock.live_textures().len(), 1);
}
