//! Throughput of sprite quad emission and batch submission.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::{Vec2, Vec3};
use sprig_core::world::Transform;
use sprig_render::{ProgramId, Sprite, SpriteBatch, TextureId, emit_sprite_quad};
use sprig_test_utils::MockRenderContext;
use std::sync::Arc;

fn bench_submit(c: &mut Criterion) {
    let mut group = c.benchmark_group("sprite_batch_submit");
    for textures in [1u64, 4, 64] {
        let sprites = 10_000u64;
        group.throughput(Throughput::Elements(sprites));
        group.bench_with_input(
            BenchmarkId::new("distinct_textures", textures),
            &textures,
            |b, &textures| {
                let mock = Arc::new(MockRenderContext::new());
                let mut batch = SpriteBatch::new(mock.clone(), ProgramId(1), 1000).unwrap();
                b.iter(|| {
                    for i in 0..sprites {
                        let texture = TextureId(i * textures / sprites);
                        let sprite = Sprite::centered(texture);
                        let transform =
                            Transform::new(Vec3::new(i as f32, 0.0, 0.0), Vec2::splat(16.0));
                        batch.submit(black_box(emit_sprite_quad(&sprite, &transform)), texture);
                    }
                    batch.flush();
                    mock.clear_calls();
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_submit);
criterion_main!(benches);
