use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::Vec3;
use sprig_core::config::TextConfig;
use sprig_test_utils::MockRenderContext;
use sprig_text::{Font, GlyphAtlas, TextRun, bake_glyphs, for_each_glyph_quad};
use std::sync::Arc;

const MONO: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

fn bench_bake(c: &mut Criterion) {
    let font = Font::from_bytes("mono", MONO).unwrap();
    let config = TextConfig::default();
    let mut group = c.benchmark_group("bake_glyphs");
    for size in [12.0f32, 32.0, 64.0] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| bake_glyphs(&font, black_box(size), &config).unwrap());
        });
    }
    group.finish();
}

fn bench_emit(c: &mut Criterion) {
    let font = Font::from_bytes("mono", MONO).unwrap();
    let baked = bake_glyphs(&font, 24.0, &TextConfig::default()).unwrap();
    let atlas = GlyphAtlas::upload(Arc::new(MockRenderContext::new()), baked);
    let run = TextRun::new("The quick brown fox jumps over the lazy dog.", font, 24.0);

    c.bench_function("emit_glyph_quads", |b| {
        b.iter(|| {
            let mut count = 0usize;
            for_each_glyph_quad(&run, &atlas, Vec3::ZERO, |quad| {
                black_box(quad);
                count += 1;
            });
            count
        });
    });
}

criterion_group!(benches, bench_bake, bench_emit);
criterion_main!(benches);
