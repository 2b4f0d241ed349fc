//! Sprite batching and draw submission.
//!
//! - [`emit_sprite_quad`] turns a [`Sprite`] and its transform into a [`Quad`]
//! - [`SpriteBatch`] stages quads per texture and draws each run with one call
//! - [`WgpuRenderContext`] executes those calls on a wgpu device
//!
//! Texture and shader providers ([`load_texture`], [`compile_program`]) sit on
//! the same [`RenderContext`](sprig_test_utils::RenderContext) seam, so
//! everything here runs against a mock context in tests.

pub mod batch;
pub mod camera;
pub mod color;
pub mod context;
pub mod context_impl;
pub mod error;
pub mod shader;
pub mod sprite;
pub mod texture;
pub mod vertex;

pub use batch::{BatchStats, SpriteBatch, SubmitStatus};
pub use camera::Camera2D;
pub use color::Color;
pub use context::{GraphicsContext, GraphicsContextDescriptor};
pub use context_impl::WgpuRenderContext;
pub use error::RenderError;
pub use shader::{SPRITE_SHADER, compile_program, load_program, sprite_program};
pub use sprite::{Sprite, emit_sprite_quad};
pub use texture::{Texture, free_texture, load_texture, load_texture_from_memory};
pub use vertex::{Quad, VERTICES_PER_QUAD, Vertex};

pub use sprig_test_utils::{
    BlendMode, BufferId, DrawCommand, ProgramId, RenderContext, TextureFilter, TextureId,
};
