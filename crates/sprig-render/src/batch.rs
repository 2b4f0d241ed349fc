//! Bounded quad batch with flush-on-texture-change and flush-on-full.

use crate::{
    error::RenderError,
    vertex::{Quad, VERTICES_PER_QUAD},
};
use sprig_core::profiling::profile_function;
use sprig_test_utils::{
    BlendMode, BufferId, DrawCommand, ProgramId, RenderContext, TextureId,
};
use std::sync::Arc;

/// Outcome of [`SpriteBatch::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    /// The quad is staged and waits for a later flush.
    Accumulated,
    /// The quad filled the batch, which was flushed immediately.
    OverflowFlushed,
}

/// Counters accumulated since the last [`SpriteBatch::take_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub quads_submitted: u64,
    pub draw_calls: u64,
    pub texture_switch_flushes: u64,
    pub overflow_flushes: u64,
}

/// Accumulates quads that share a texture and draws each run with one call.
///
/// Staged quads `[0, count)` always belong to `bound_texture`: a submit with
/// a different texture flushes the staged run first, and the submit that
/// fills the last slot flushes right away, so `count` never exceeds the
/// capacity.
///
/// The staging memory and the GPU vertex buffer are sized once, at
/// construction; a flush rewrites only the used prefix of the buffer.
pub struct SpriteBatch {
    ctx: Arc<dyn RenderContext>,
    program: ProgramId,
    vertex_buffer: BufferId,
    staging: Box<[Quad]>,
    count: usize,
    bound_texture: Option<TextureId>,
    stats: BatchStats,
}

impl SpriteBatch {
    pub fn new(
        ctx: Arc<dyn RenderContext>,
        program: ProgramId,
        capacity: usize,
    ) -> Result<Self, RenderError> {
        if capacity == 0 {
            return Err(RenderError::InvalidBatchCapacity);
        }
        let vertex_buffer =
            ctx.create_vertex_buffer(Some("Sprite Batch Vertices"), capacity as u64 * Quad::SIZE);
        tracing::debug!("created sprite batch with capacity {capacity}");

        Ok(Self {
            ctx,
            program,
            vertex_buffer,
            staging: vec![Quad::default(); capacity].into_boxed_slice(),
            count: 0,
            bound_texture: None,
            stats: BatchStats::default(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.staging.len()
    }

    /// Quads staged and not yet drawn.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Texture of the staged run, or of the last flushed run when empty.
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.bound_texture
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Return the counters and reset them.
    pub fn take_stats(&mut self) -> BatchStats {
        std::mem::take(&mut self.stats)
    }

    /// Stage `quad`, to be drawn with `texture`.
    pub fn submit(&mut self, quad: Quad, texture: TextureId) -> SubmitStatus {
        profile_function!();
        if self.count > 0 && self.bound_texture != Some(texture) {
            self.stats.texture_switch_flushes += 1;
            self.flush();
        }
        if self.count == 0 {
            self.bound_texture = Some(texture);
        }

        self.staging[self.count] = quad;
        self.count += 1;
        self.stats.quads_submitted += 1;

        if self.count == self.capacity() {
            self.stats.overflow_flushes += 1;
            self.flush();
            SubmitStatus::OverflowFlushed
        } else {
            SubmitStatus::Accumulated
        }
    }

    /// Upload the staged quads and draw them with one call. No-op when empty.
    pub fn flush(&mut self) {
        profile_function!();
        if self.count == 0 {
            return;
        }
        let Some(texture) = self.bound_texture else {
            tracing::error!("{} staged quads without a bound texture; dropped", self.count);
            self.count = 0;
            return;
        };

        let bytes: &[u8] = bytemuck::cast_slice(&self.staging[..self.count]);
        self.ctx.write_buffer(self.vertex_buffer, 0, bytes);
        self.ctx.draw(&DrawCommand {
            program: self.program,
            vertex_buffer: self.vertex_buffer,
            texture,
            first_vertex: 0,
            vertex_count: self.count as u32 * VERTICES_PER_QUAD,
            blend: BlendMode::Alpha,
            depth_test: false,
        });
        tracing::trace!(quads = self.count, ?texture, "flushed sprite batch");

        self.stats.draw_calls += 1;
        self.count = 0;
    }
}

impl Drop for SpriteBatch {
    fn drop(&mut self) {
        if self.count > 0 {
            tracing::warn!("dropping sprite batch with {} unflushed quads", self.count);
        }
        self.ctx.destroy_buffer(self.vertex_buffer);
    }
}
