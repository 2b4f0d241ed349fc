//! Trait abstracting the GPU operations the sprite pipeline needs.

use crate::gpu_types::*;

/// GPU resource creation and submission.
///
/// # Borrow Checking Pattern
///
/// Methods take `&self` and return copyable handles. This allows:
/// - Several owners (batch, font cache, texture loader) to share one context via `Arc`
/// - Mock implementations to record calls behind a `Mutex`
/// - No lifetime parameters propagating through the codebase
///
/// Handles that are unknown to the context (already destroyed, or from
/// another context) are ignored with a warning rather than panicking.
///
/// # Example
///
/// ```rust,no_run
/// use sprig_test_utils::{BufferId, RenderContext};
///
/// fn upload(ctx: &dyn RenderContext, vbo: BufferId, bytes: &[u8]) {
///     ctx.write_buffer(vbo, 0, bytes);
/// }
/// ```
pub trait RenderContext: Send + Sync {
    // Texture operations

    /// Upload an RGBA8 texture, generating mip levels when requested.
    fn create_texture(&self, upload: &TextureUpload<'_>) -> TextureId;

    /// Release a texture. Draws already submitted with it are unaffected.
    fn destroy_texture(&self, texture: TextureId);

    // Program operations

    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId, ContextError>;

    /// Set the program's `mat_view_proj` uniform (column-major).
    fn set_view_projection(&self, program: ProgramId, matrix: [[f32; 4]; 4]);

    // Buffer operations

    /// Allocate a vertex buffer of `size` bytes. Its storage is never reallocated.
    fn create_vertex_buffer(&self, label: Option<&str>, size: u64) -> BufferId;

    /// Overwrite `data.len()` bytes starting at `offset`.
    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]);

    fn destroy_buffer(&self, buffer: BufferId);

    // Submission

    /// Draw `vertex_count` vertices from the buffer with the given state.
    fn draw(&self, command: &DrawCommand);
}
