//! Glyph atlas baking.
//!
//! Printable ASCII (`' '..='~'` plus DEL) is rasterized with `fontdue` and
//! packed left to right in rows into a square coverage bitmap. The layout is
//! computed in full before any pixel is written, so a glyph set that does not
//! fit is reported as [`TextError::FontBakeOverflow`] instead of spilling into
//! neighbouring cells.

use crate::{
    error::TextError,
    font::{Font, FontId},
};
use glam::Vec2;
use sprig_core::{config::TextConfig, profiling::profile_function};
use sprig_test_utils::{RenderContext, TextureFilter, TextureId, TextureUpload};
use std::ops::Range;
use std::sync::Arc;

/// Characters baked into every atlas.
pub const GLYPH_RANGE: Range<u32> = 32..128;

const GLYPH_COUNT: usize = (GLYPH_RANGE.end - GLYPH_RANGE.start) as usize;

/// Placement of one glyph in the atlas and its layout metrics.
///
/// Offsets are in pixels relative to the pen position on the baseline,
/// with y growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BakedGlyph {
    /// Bitmap rectangle in atlas texels, `x1`/`y1` exclusive.
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub xoff: f32,
    pub yoff: f32,
    pub xadvance: f32,
}

impl BakedGlyph {
    pub fn is_empty(&self) -> bool {
        self.x0 == self.x1 || self.y0 == self.y1
    }
}

/// Screen rectangle and texture rectangle of a glyph at some pen position.
///
/// `(x0, y0)` is the top-left corner in y-down glyph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedQuad {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

/// Starting atlas side length for `point_size`.
///
/// `max(min_atlas_size, ceil(point_size) * atlas_scale)`, capped at
/// `max_atlas_size`. Sizes that are not positive and finite are rejected.
pub fn atlas_side(point_size: f32, config: &TextConfig) -> Result<u32, TextError> {
    if !point_size.is_finite() || point_size <= 0.0 {
        return Err(TextError::InvalidPointSize(point_size));
    }
    let whole = point_size.ceil();
    if whole >= config.max_atlas_size as f32 {
        return Ok(config.max_atlas_size);
    }
    // 1..max_atlas_size, exact in u32
    let scaled = (whole as u32).saturating_mul(config.atlas_scale);
    Ok(scaled
        .max(config.min_atlas_size)
        .min(config.max_atlas_size))
}

/// Em size at which ascent to descent spans `point_size` pixels.
fn em_size_for_line_height(face: &fontdue::Font, point_size: f32) -> f32 {
    match face.horizontal_line_metrics(point_size) {
        Some(line) if line.ascent > line.descent => {
            point_size * point_size / (line.ascent - line.descent)
        }
        _ => point_size,
    }
}

/// Coverage bitmap and metrics produced by [`bake_glyphs`], not yet on the GPU.
#[derive(Debug, Clone)]
pub struct BakedAtlas {
    pub font: FontId,
    pub point_size: f32,
    pub size: u32,
    /// One byte of coverage per texel, row 0 at the top.
    pub coverage: Vec<u8>,
    pub glyphs: [BakedGlyph; GLYPH_COUNT],
}

impl BakedAtlas {
    /// Coverage replicated into all four channels, ready for upload.
    pub fn to_rgba(&self) -> Vec<u8> {
        self.coverage.iter().flat_map(|&c| [c; 4]).collect()
    }
}

/// Pack every glyph of [`GLYPH_RANGE`] into a `side` square.
///
/// On failure, returns the first glyph that does not fit.
fn layout(
    face: &fontdue::Font,
    px: f32,
    side: u32,
    pad: u32,
) -> Result<([BakedGlyph; GLYPH_COUNT], u32), char> {
    let mut glyphs = [BakedGlyph::default(); GLYPH_COUNT];
    let (mut x, mut y, mut row_bottom) = (pad, pad, pad);
    for (slot, code) in glyphs.iter_mut().zip(GLYPH_RANGE) {
        let ch = char::from_u32(code).unwrap_or(' ');
        let metrics = face.metrics(ch, px);
        let (Ok(w), Ok(h)) = (u32::try_from(metrics.width), u32::try_from(metrics.height))
        else {
            return Err(ch);
        };
        if w > side || h > side {
            return Err(ch);
        }

        if x + w + pad > side {
            x = pad;
            y = row_bottom;
        }
        if x + w + pad > side || y + h + pad > side {
            return Err(ch);
        }

        *slot = BakedGlyph {
            x0: x,
            y0: y,
            x1: x + w,
            y1: y + h,
            xoff: metrics.xmin as f32,
            yoff: -(metrics.ymin + h as i32) as f32,
            xadvance: metrics.advance_width,
        };
        x += w + pad;
        row_bottom = row_bottom.max(y + h + pad);
    }
    Ok((glyphs, row_bottom))
}

/// Rasterize [`GLYPH_RANGE`] of `font` so that a line of text is
/// `point_size` pixels tall.
///
/// Starts at [`atlas_side`] and doubles the side, up to `max_atlas_size`,
/// until every glyph fits.
pub fn bake_glyphs(
    font: &Font,
    point_size: f32,
    config: &TextConfig,
) -> Result<BakedAtlas, TextError> {
    profile_function!();
    let mut side = atlas_side(point_size, config)?;
    let pad = config.glyph_padding;
    let face = font.face();
    let px = em_size_for_line_height(face, point_size);
    if !px.is_finite() || px <= 0.0 {
        return Err(TextError::InvalidPointSize(point_size));
    }

    let (glyphs, row_bottom) = loop {
        match layout(face, px, side, pad) {
            Ok(packed) => break packed,
            Err(glyph) if side >= config.max_atlas_size => {
                return Err(TextError::FontBakeOverflow {
                    point_size,
                    atlas_size: side,
                    glyph,
                });
            }
            Err(glyph) => {
                tracing::trace!("glyph {glyph:?} does not fit {side}x{side} at {point_size}px");
                side = side.saturating_mul(2).min(config.max_atlas_size);
            }
        }
    };

    let stride = side as usize;
    let mut coverage = vec![0u8; stride * stride];
    for (glyph, code) in glyphs.iter().zip(GLYPH_RANGE) {
        if glyph.is_empty() {
            continue;
        }
        let ch = char::from_u32(code).unwrap_or(' ');
        let (metrics, bitmap) = face.rasterize(ch, px);
        for (row, src) in bitmap.chunks_exact(metrics.width).enumerate() {
            let start = (glyph.y0 as usize + row) * stride + glyph.x0 as usize;
            coverage[start..start + src.len()].copy_from_slice(src);
        }
    }

    tracing::debug!(
        "baked {} at {point_size}px into {side}x{side} atlas (rows used: {row_bottom})",
        font.name()
    );
    Ok(BakedAtlas {
        font: font.id(),
        point_size,
        size: side,
        coverage,
        glyphs,
    })
}

/// A baked glyph set living in a GPU texture.
///
/// The texture is destroyed when the last reference to the atlas is dropped.
pub struct GlyphAtlas {
    ctx: Arc<dyn RenderContext>,
    texture: TextureId,
    font: FontId,
    point_size: f32,
    size: u32,
    glyphs: [BakedGlyph; GLYPH_COUNT],
}

impl GlyphAtlas {
    /// Upload `baked` as an RGBA texture with mipmaps and linear filtering.
    pub fn upload(ctx: Arc<dyn RenderContext>, baked: BakedAtlas) -> Self {
        let label = format!("glyph atlas {:?} {}px", baked.font, baked.point_size);
        let texture = ctx.create_texture(&TextureUpload {
            label: Some(&label),
            width: baked.size,
            height: baked.size,
            pixels: &baked.to_rgba(),
            generate_mipmaps: true,
            filter: TextureFilter::GLYPH_ATLAS,
        });
        Self {
            ctx,
            texture,
            font: baked.font,
            point_size: baked.point_size,
            size: baked.size,
            glyphs: baked.glyphs,
        }
    }

    pub fn texture(&self) -> TextureId {
        self.texture
    }

    pub fn font(&self) -> FontId {
        self.font
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    /// Side length in texels.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Metrics for `ch`, or `None` outside [`GLYPH_RANGE`].
    pub fn glyph(&self, ch: char) -> Option<&BakedGlyph> {
        let code = ch as u32;
        GLYPH_RANGE
            .contains(&code)
            .then(|| &self.glyphs[(code - GLYPH_RANGE.start) as usize])
    }

    /// Position `ch` at `pen` and advance the pen past it.
    ///
    /// Corners are snapped to whole pixels. Returns `None` and leaves the pen
    /// untouched for characters outside [`GLYPH_RANGE`].
    pub fn aligned_quad(&self, ch: char, pen: &mut Vec2) -> Option<AlignedQuad> {
        let glyph = *self.glyph(ch)?;
        let inv = 1.0 / self.size as f32;
        let x0 = (pen.x + glyph.xoff + 0.5).floor();
        let y0 = (pen.y + glyph.yoff + 0.5).floor();
        pen.x += glyph.xadvance;
        Some(AlignedQuad {
            x0,
            y0,
            x1: x0 + (glyph.x1 - glyph.x0) as f32,
            y1: y0 + (glyph.y1 - glyph.y0) as f32,
            s0: glyph.x0 as f32 * inv,
            t0: glyph.y0 as f32 * inv,
            s1: glyph.x1 as f32 * inv,
            t1: glyph.y1 as f32 * inv,
        })
    }

    /// Horizontal advance of `text`, ignoring characters without glyphs.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .filter_map(|ch| self.glyph(ch))
            .map(|g| g.xadvance)
            .sum()
    }
}

impl Drop for GlyphAtlas {
    fn drop(&mut self) {
        tracing::trace!("releasing glyph atlas texture {:?}", self.texture);
        self.ctx.destroy_texture(self.texture);
    }
}

impl std::fmt::Debug for GlyphAtlas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphAtlas")
            .field("texture", &self.texture)
            .field("font", &self.font)
            .field("point_size", &self.point_size)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_test_utils::{MockRenderContext, RenderCall};

    const MONO: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

    fn mono() -> Arc<Font> {
        Font::from_bytes("mono", MONO).unwrap()
    }

    #[test]
    fn side_follows_point_size_within_bounds() {
        let config = TextConfig::default();
        assert_eq!(atlas_side(4.0, &config).unwrap(), 128);
        assert_eq!(atlas_side(32.0, &config).unwrap(), 256);
        assert_eq!(atlas_side(31.2, &config).unwrap(), 256);
        assert_eq!(atlas_side(10_000.0, &config).unwrap(), 4096);
        assert_eq!(atlas_side(1.0e30, &config).unwrap(), 4096);
        assert!(matches!(
            atlas_side(f32::INFINITY, &config),
            Err(TextError::InvalidPointSize(_))
        ));
    }

    #[test]
    fn every_small_size_bakes_with_defaults() {
        let font = mono();
        let config = TextConfig::default();
        for size in 1..=64 {
            let baked = bake_glyphs(&font, size as f32, &config)
                .unwrap_or_else(|err| panic!("{size}px: {err}"));
            assert!(baked.size >= atlas_side(size as f32, &config).unwrap());
        }
    }

    #[test]
    fn crowded_atlas_doubles_until_glyphs_fit() {
        let config = TextConfig {
            atlas_scale: 1,
            min_atlas_size: 16,
            ..TextConfig::default()
        };
        let baked = bake_glyphs(&mono(), 24.0, &config).unwrap();
        assert!(baked.size > 24);
        assert_eq!(baked.size % 24, 0);
        assert_eq!(baked.coverage.len(), (baked.size * baked.size) as usize);
    }

    #[test]
    fn huge_size_fails_without_panicking() {
        let font = mono();
        for size in [5_000.0, 1.0e12, f32::MAX] {
            let err = bake_glyphs(&font, size, &TextConfig::default()).unwrap_err();
            assert!(matches!(
                err,
                TextError::FontBakeOverflow { atlas_size: 4096, .. }
                    | TextError::InvalidPointSize(_)
            ));
        }
    }

    #[test]
    fn glyph_rects_stay_inside_and_apart() {
        let baked = bake_glyphs(&mono(), 32.0, &TextConfig::default()).unwrap();
        let rects: Vec<_> = baked.glyphs.iter().filter(|g| !g.is_empty()).collect();
        assert!(rects.len() > 90);
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x1 < baked.size && a.y1 < baked.size);
            for b in &rects[i + 1..] {
                let apart = a.x1 <= b.x0 || b.x1 <= a.x0 || a.y1 <= b.y0 || b.y1 <= a.y0;
                assert!(apart, "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn space_has_advance_but_no_bitmap() {
        let baked = bake_glyphs(&mono(), 24.0, &TextConfig::default()).unwrap();
        let space = baked.glyphs[0];
        assert!(space.is_empty());
        assert!(space.xadvance > 0.0);
    }

    #[test]
    fn oversized_glyph_set_is_rejected() {
        let config = TextConfig {
            min_atlas_size: 64,
            max_atlas_size: 64,
            ..TextConfig::default()
        };
        let err = bake_glyphs(&mono(), 48.0, &config).unwrap_err();
        assert!(matches!(
            err,
            TextError::FontBakeOverflow { atlas_size: 64, .. }
        ));
    }

    #[test]
    fn non_positive_sizes_are_rejected() {
        let font = mono();
        for size in [0.0, -3.0, f32::NAN, f32::INFINITY] {
            let err = bake_glyphs(&font, size, &TextConfig::default()).unwrap_err();
            assert!(matches!(err, TextError::InvalidPointSize(_)));
        }
    }

    #[test]
    fn upload_replicates_coverage_and_frees_on_drop() {
        let mock = Arc::new(MockRenderContext::new());
        let baked = bake_glyphs(&mono(), 16.0, &TextConfig::default()).unwrap();
        let coverage = baked.coverage.clone();
        let atlas = GlyphAtlas::upload(mock.clone(), baked);

        let pixels = mock.texture_pixels(atlas.texture()).unwrap();
        assert_eq!(pixels.len(), coverage.len() * 4);
        for (texel, &c) in pixels.chunks_exact(4).zip(&coverage) {
            assert_eq!(texel, [c; 4]);
        }
        assert!(mock.calls().iter().any(|c| matches!(
            c,
            RenderCall::CreateTexture { filter, mip_levels, .. }
                if *filter == TextureFilter::GLYPH_ATLAS && *mip_levels > 1
        )));

        drop(atlas);
        assert!(mock.live_textures().is_empty());
    }

    #[test]
    fn aligned_quad_advances_pen_only_for_known_glyphs() {
        let mock = Arc::new(MockRenderContext::new());
        let baked = bake_glyphs(&mono(), 20.0, &TextConfig::default()).unwrap();
        let atlas = GlyphAtlas::upload(mock, baked);

        let mut pen = Vec2::ZERO;
        let quad = atlas.aligned_quad('H', &mut pen).unwrap();
        assert!(pen.x > 0.0);
        assert!(quad.y0 < 0.0 && quad.y1 <= 1.0);
        assert!(quad.s0 < quad.s1 && quad.t0 < quad.t1);

        let before = pen;
        assert!(atlas.aligned_quad('\n', &mut pen).is_none());
        assert!(atlas.aligned_quad('é', &mut pen).is_none());
        assert_eq!(pen, before);
        assert_eq!(atlas.measure("HH"), 2.0 * before.x);
    }
}
