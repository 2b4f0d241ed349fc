//! Text runs and their glyph quads.

use crate::{atlas::GlyphAtlas, font::Font};
use glam::{Vec2, Vec3};
use sprig_core::profiling::profile_function;
use sprig_render::{Color, Quad, Vertex};
use std::sync::Arc;

/// A single line of text drawn with one font at one size.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub font: Arc<Font>,
    pub point_size: f32,
    /// Baseline start relative to the owning entity's position.
    pub offset: Vec2,
    pub color: Color,
}

impl TextRun {
    pub fn new(text: impl Into<String>, font: Arc<Font>, point_size: f32) -> Self {
        Self {
            text: text.into(),
            font,
            point_size,
            offset: Vec2::ZERO,
            color: Color::WHITE,
        }
    }

    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Call `emit` with one quad per visible character of `run`, baseline
/// starting at `origin`.
///
/// Characters outside the atlas range are skipped without moving the pen;
/// blank glyphs such as space move the pen but emit nothing. Glyph space
/// grows downward, so y is negated into world space. Vertex z is
/// `-origin.z`, matching sprites.
pub fn for_each_glyph_quad(
    run: &TextRun,
    atlas: &GlyphAtlas,
    origin: Vec3,
    mut emit: impl FnMut(Quad),
) {
    profile_function!();
    let color = run.color.to_array();
    let z = -origin.z;
    let mut pen = Vec2::ZERO;

    for ch in run.text.chars() {
        let Some(q) = atlas.aligned_quad(ch, &mut pen) else {
            continue;
        };
        if q.x0 == q.x1 || q.y0 == q.y1 {
            continue;
        }
        let (left, right) = (origin.x + q.x0, origin.x + q.x1);
        let (top, bottom) = (origin.y - q.y0, origin.y - q.y1);
        let tl = Vertex::new([left, top, z], [q.s0, q.t0], color);
        let tr = Vertex::new([right, top, z], [q.s1, q.t0], color);
        let br = Vertex::new([right, bottom, z], [q.s1, q.t1], color);
        let bl = Vertex::new([left, bottom, z], [q.s0, q.t1], color);
        emit(Quad {
            vertices: [tl, tr, br, tl, br, bl],
        });
    }
}

/// Collecting form of [`for_each_glyph_quad`].
pub fn emit_glyph_quads(run: &TextRun, atlas: &GlyphAtlas, origin: Vec3) -> Vec<Quad> {
    let mut quads = Vec::with_capacity(run.text.len());
    for_each_glyph_quad(run, atlas, origin, |quad| quads.push(quad));
    quads
}
