//! Per-frame draw submission.

use crate::scene::{DrawItem, Drawable, SceneView};
use sprig_core::{
    config::Config,
    profiling::{profile_function, profile_scope},
};
use sprig_render::{
    BatchStats, ProgramId, RenderContext, RenderError, SpriteBatch, emit_sprite_quad,
    sprite_program,
};
use sprig_text::{FontCache, TextError, for_each_glyph_quad};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("scene has no camera")]
    NoCamera,
    #[error(transparent)]
    Text(#[from] TextError),
}

/// What one [`SpriteRenderer::render_frame`] call submitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub sprites: u64,
    pub text_runs: u64,
    pub glyph_quads: u64,
    pub batch: BatchStats,
}

/// Walks a scene each frame and feeds its quads through one [`SpriteBatch`].
pub struct SpriteRenderer {
    ctx: Arc<dyn RenderContext>,
    program: ProgramId,
    batch: SpriteBatch,
    fonts: FontCache,
    frames: u64,
}

impl SpriteRenderer {
    /// Compile the built-in sprite program and size the batch from `config`.
    ///
    /// `config` is validated before any GPU resource is created.
    pub fn new(ctx: Arc<dyn RenderContext>, config: &Config) -> Result<Self, RenderError> {
        config.validate()?;
        let program = sprite_program(ctx.as_ref())?;
        Self::with_program(ctx, program, config)
    }

    /// Like [`new`](Self::new), drawing with an already compiled `program`.
    pub fn with_program(
        ctx: Arc<dyn RenderContext>,
        program: ProgramId,
        config: &Config,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        let batch = SpriteBatch::new(ctx.clone(), program, config.renderer.max_batch_size)?;
        let fonts = FontCache::new(ctx.clone(), config.text.clone());
        tracing::info!(
            "sprite renderer ready: batch capacity {}, font cache capacity {}",
            batch.capacity(),
            fonts.capacity()
        );
        Ok(Self {
            ctx,
            program,
            batch,
            fonts,
            frames: 0,
        })
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn batch(&self) -> &SpriteBatch {
        &self.batch
    }

    pub fn fonts(&self) -> &FontCache {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontCache {
        &mut self.fonts
    }

    /// Frames rendered so far, failed ones included.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Draw every drawable of `scene` through its camera.
    ///
    /// Fails with [`FrameError::NoCamera`] before submitting anything if the
    /// scene has no camera. If a text run cannot get its glyph atlas, the
    /// quads staged so far are still flushed and the error is returned.
    pub fn render_frame(&mut self, scene: &impl SceneView) -> Result<FrameStats, FrameError> {
        profile_function!();
        self.frames += 1;
        let camera = scene.find_camera().ok_or(FrameError::NoCamera)?;
        self.ctx.set_view_projection(
            self.program,
            camera.view_projection().to_cols_array_2d(),
        );

        let mut stats = FrameStats::default();
        let submitted = {
            profile_scope!("submit_drawables");
            scene
                .drawables()
                .try_for_each(|item| self.submit(item, &mut stats))
        };

        self.batch.flush();
        self.fonts.release_evicted();
        stats.batch = self.batch.take_stats();

        match submitted {
            Ok(()) => {
                tracing::trace!(
                    "frame {}: {} quads in {} draw calls",
                    self.frames,
                    stats.batch.quads_submitted,
                    stats.batch.draw_calls
                );
                Ok(stats)
            }
            Err(err) => {
                tracing::error!("frame {} aborted: {err}", self.frames);
                Err(err)
            }
        }
    }

    fn submit(&mut self, item: DrawItem<'_>, stats: &mut FrameStats) -> Result<(), FrameError> {
        match item.drawable {
            Drawable::Sprite(sprite) => {
                stats.sprites += 1;
                self.batch
                    .submit(emit_sprite_quad(sprite, &item.transform), sprite.texture);
            }
            Drawable::Text(run) => {
                stats.text_runs += 1;
                let atlas = self.fonts.get_glyph_atlas(&run.font, run.point_size)?;
                let texture = atlas.texture();
                let origin = item.transform.position + run.offset.extend(0.0);
                let batch = &mut self.batch;
                for_each_glyph_quad(run, &atlas, origin, |quad| {
                    stats.glyph_quads += 1;
                    batch.submit(quad, texture);
                });
            }
        }
        Ok(())
    }
}
