//! Sprig - batched 2D sprite and text rendering
//!
//! A [`Scene`] holds sprites, text runs and cameras. Each frame,
//! [`SpriteRenderer::render_frame`] walks the scene in hierarchy order,
//! turns every drawable into quads and pushes them through a
//! [`SpriteBatch`](render::SpriteBatch), which issues one draw call per run
//! of quads sharing a texture.
//!
//! # Quick Start
//!
//! ```
//! use sprig::prelude::*;
//! use sprig_test_utils::MockRenderContext;
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(MockRenderContext::new());
//! let mut renderer = SpriteRenderer::new(ctx.clone(), &Config::default()).unwrap();
//!
//! let mut scene = Scene::new();
//! scene.spawn_camera(Camera2D::new(Vec2::ZERO, 16.0 / 9.0, 20.0));
//! scene.spawn_sprite(Sprite::centered(TextureId(1)), Transform::from_xy(0.0, 0.0));
//!
//! let stats = renderer.render_frame(&scene).unwrap();
//! assert_eq!(stats.batch.draw_calls, 1);
//! ```

pub mod renderer;
pub mod scene;

pub use sprig_core as core;
pub use sprig_core::math;
pub use sprig_render as render;
pub use sprig_text as text;

pub use renderer::{FrameError, FrameStats, SpriteRenderer};
pub use scene::{DrawItem, Drawable, Scene, SceneError, SceneView};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::renderer::{FrameError, FrameStats, SpriteRenderer};
    pub use crate::scene::{Drawable, Scene, SceneView};

    pub use sprig_core::config::Config;
    pub use sprig_core::math::{Mat4, Vec2, Vec3, Vec4};
    pub use sprig_core::world::{Entity, Transform};

    pub use sprig_render::{
        Camera2D, Color, RenderContext, Sprite, SpriteBatch, TextureId, load_texture,
    };
    pub use sprig_text::{Font, FontCache, TextRun};
}
