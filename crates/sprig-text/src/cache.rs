//! Memoized glyph atlases keyed by font and point size.
//!
//! Baking an atlas rasterizes the full glyph range and uploads a texture, so
//! each `(font, size)` pair is baked once and reused until it falls out of
//! the least-recently-used window.

use crate::{
    atlas::{GlyphAtlas, bake_glyphs},
    error::TextError,
    font::{Font, FontId},
};
use sprig_core::{alloc::HashMap, config::TextConfig, profiling::profile_function};
use sprig_test_utils::RenderContext;
use std::sync::Arc;

/// Cache key: font identity and the exact bits of the point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtlasKey {
    pub font: FontId,
    pub point_size_bits: u32,
}

impl AtlasKey {
    pub fn new(font: FontId, point_size: f32) -> Self {
        Self {
            font,
            point_size_bits: point_size.to_bits(),
        }
    }
}

struct CacheEntry {
    atlas: Arc<GlyphAtlas>,
    last_used: u64,
}

/// LRU cache of [`GlyphAtlas`]es.
///
/// Evicted atlases are parked until [`FontCache::release_evicted`], since
/// quads staged earlier in the frame may still sample their texture.
pub struct FontCache {
    ctx: Arc<dyn RenderContext>,
    config: TextConfig,
    entries: HashMap<AtlasKey, CacheEntry>,
    evicted: Vec<Arc<GlyphAtlas>>,
    clock: u64,
    hits: u64,
    misses: u64,
}

impl FontCache {
    pub fn new(ctx: Arc<dyn RenderContext>, config: TextConfig) -> Self {
        Self {
            ctx,
            config,
            entries: HashMap::default(),
            evicted: Vec::new(),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Return the atlas for `font` at `point_size`, baking it on first use.
    pub fn get_glyph_atlas(
        &mut self,
        font: &Arc<Font>,
        point_size: f32,
    ) -> Result<Arc<GlyphAtlas>, TextError> {
        profile_function!();
        let key = AtlasKey::new(font.id(), point_size);
        self.clock += 1;

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.last_used = self.clock;
            self.hits += 1;
            return Ok(entry.atlas.clone());
        }

        self.misses += 1;
        let baked = bake_glyphs(font, point_size, &self.config)?;
        if self.entries.len() >= self.config.cache_capacity {
            self.evict_least_recent();
        }

        let atlas = Arc::new(GlyphAtlas::upload(self.ctx.clone(), baked));
        tracing::debug!(
            "cached glyph atlas for {} at {point_size}px ({} entries)",
            font.name(),
            self.entries.len() + 1
        );
        self.entries.insert(
            key,
            CacheEntry {
                atlas: atlas.clone(),
                last_used: self.clock,
            },
        );
        Ok(atlas)
    }

    fn evict_least_recent(&mut self) {
        let Some(key) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| *key)
        else {
            return;
        };
        if let Some(entry) = self.entries.remove(&key) {
            tracing::debug!(
                "evicting glyph atlas {:?} at {}px",
                key.font,
                entry.atlas.point_size()
            );
            self.evicted.push(entry.atlas);
        }
    }

    /// Drop atlases evicted since the last call.
    ///
    /// Call once nothing staged can reference them, i.e. after the frame's
    /// final flush. Their textures go away with the last outstanding `Arc`.
    pub fn release_evicted(&mut self) -> usize {
        let released = self.evicted.len();
        self.evicted.clear();
        released
    }

    pub fn contains(&self, font: &Font, point_size: f32) -> bool {
        self.entries
            .contains_key(&AtlasKey::new(font.id(), point_size))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.cache_capacity
    }

    /// Atlases evicted but not yet released.
    pub fn pending_release(&self) -> usize {
        self.evicted.len()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fraction of lookups served without baking, `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
