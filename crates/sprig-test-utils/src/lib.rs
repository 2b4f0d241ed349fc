//! Render context seam for sprig.
//!
//! Everything above this crate talks to the GPU through [`RenderContext`]:
//! textures, shader programs, vertex buffers and draw calls, addressed by
//! opaque copyable handles. The wgpu backend lives in `sprig-render`; this
//! crate only defines the contract and, behind the `mock` feature, a
//! recording implementation.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use sprig_test_utils::{MockRenderContext, RenderContext};
//!
//! let mock = MockRenderContext::new();
//! let vbo = mock.create_vertex_buffer(Some("quads"), 1024);
//! mock.write_buffer(vbo, 0, &[0u8; 216]);
//!
//! assert_eq!(mock.count_buffer_writes(), 1);
//! # }
//! ```
//!
//! # Design
//!
//! - Methods take `&self`; implementations use interior mutability.
//! - Handles are plain integers, so no lifetimes leak out of the context.
//! - The trait is object-safe and shared as `Arc<dyn RenderContext>`.

pub mod gpu_types;
#[cfg(feature = "mock")]
pub mod mock_render;
pub mod render_context;

pub use gpu_types::*;
#[cfg(feature = "mock")]
pub use mock_render::*;
pub use render_context::*;
