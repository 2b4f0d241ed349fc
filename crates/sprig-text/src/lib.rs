//! Text for sprig: fonts, baked glyph atlases and glyph quads.
//!
//! A [`TextRun`] is drawn by looking its `(font, size)` up in a [`FontCache`]
//! and feeding the resulting [`GlyphAtlas`] to [`emit_glyph_quads`]. Only
//! printable ASCII is baked; anything else in a run is skipped.

pub mod atlas;
pub mod cache;
pub mod error;
pub mod font;
pub mod text;

pub use atlas::{AlignedQuad, BakedAtlas, BakedGlyph, GLYPH_RANGE, GlyphAtlas, bake_glyphs};
pub use cache::{AtlasKey, FontCache};
pub use error::TextError;
pub use font::{Font, FontId};
pub use text::{TextRun, emit_glyph_quads, for_each_glyph_quad};
