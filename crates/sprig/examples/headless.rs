//! Render one frame of sprites and text into an offscreen texture.
//!
//! Run with `cargo run -p sprig --example headless [config.toml]`.

use sprig::prelude::*;
use sprig::render::{GraphicsContext, TextureFilter, WgpuRenderContext};
use sprig_core::{logging, profiling};
use sprig_test_utils::TextureUpload;
use std::path::Path;
use std::sync::Arc;

const FONT: &[u8] = include_bytes!("../../sprig-text/assets/DejaVuSansMono.ttf");
const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;
const WIDTH: u32 = 640;
const HEIGHT: u32 = 360;

fn checker(ctx: &dyn RenderContext) -> TextureId {
    let pixels: Vec<u8> = (0..64u32)
        .flat_map(|i| {
            if (i % 8 + i / 8) % 2 == 0 {
                [240, 240, 240, 255]
            } else {
                [40, 90, 160, 255]
            }
        })
        .collect();
    ctx.create_texture(&TextureUpload {
        label: Some("checker"),
        width: 8,
        height: 8,
        pixels: &pixels,
        generate_mipmaps: true,
        filter: TextureFilter::SPRITE,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_from_path(Path::new(&path))?,
        None => Config::default(),
    };
    config.validate()?;
    logging::init_with_filter(&config.logging.filter);
    profiling::init_profiling(config.profiling.mode);

    let graphics = GraphicsContext::new_owned_sync()?;
    tracing::info!("using adapter {}", graphics.info().name);
    let wgpu_ctx = Arc::new(WgpuRenderContext::new(
        graphics.clone(),
        TARGET_FORMAT,
        config.renderer.gpu_error_checks,
    ));
    let ctx: Arc<dyn RenderContext> = wgpu_ctx.clone();
    let mut renderer = SpriteRenderer::new(ctx.clone(), &config)?;

    let mut scene = Scene::new();
    let mut camera = Camera2D::new(Vec2::ZERO, 1.0, 640.0);
    camera.set_viewport(WIDTH, HEIGHT);
    scene.spawn_camera(camera);

    let tile = checker(ctx.as_ref());
    let row = scene.spawn();
    scene.insert_transform(row, Transform::from_xy(-280.0, -100.0))?;
    for i in 0..8 {
        let sprite = Sprite::new(tile).with_color(Color::rgb(1.0, 1.0 - i as f32 * 0.1, 1.0));
        let child = scene.spawn_sprite(
            sprite,
            Transform::from_xy(i as f32 * 70.0, 0.0).with_scale(Vec2::splat(64.0)),
        );
        scene.set_parent(child, Some(row))?;
    }

    let font = Font::from_bytes("DejaVu Sans Mono", FONT)?;
    scene.spawn_text(
        TextRun::new("Hello from sprig!", font.clone(), 32.0),
        Transform::from_xy(-280.0, 80.0).with_layer(1.0),
    );
    scene.spawn_text(
        TextRun::new("batched sprites + glyph atlas", font, 18.0).with_color(Color::GREEN),
        Transform::from_xy(-280.0, 40.0).with_layer(1.0),
    );

    let target = graphics.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Headless Target"),
        size: wgpu::Extent3d {
            width: WIDTH,
            height: HEIGHT,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: TARGET_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });

    profiling::new_frame();
    wgpu_ctx.begin_frame(
        target.create_view(&wgpu::TextureViewDescriptor::default()),
        Some(Color::from(config.renderer.clear_color)),
    );
    let stats = renderer.render_frame(&scene)?;
    wgpu_ctx.end_frame();
    let _ = graphics.device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    });

    tracing::info!(
        "drew {} sprites and {} glyphs in {} draw calls ({} texture switches)",
        stats.sprites,
        stats.glyph_quads,
        stats.batch.draw_calls,
        stats.batch.texture_switch_flushes
    );
    Ok(())
}
