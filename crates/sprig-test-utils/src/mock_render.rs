//! Mock implementation of RenderContext for testing.
//!
//! Records every operation without touching a GPU, so batching and caching
//! behavior can be asserted from the call log.

use crate::{gpu_types::*, render_context::RenderContext};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Records a GPU operation call for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    CreateTexture {
        id: TextureId,
        label: Option<String>,
        width: u32,
        height: u32,
        mip_levels: u32,
        filter: TextureFilter,
        pixels: Vec<u8>,
    },
    DestroyTexture {
        id: TextureId,
    },
    CreateProgram {
        id: ProgramId,
        label: Option<String>,
    },
    SetViewProjection {
        program: ProgramId,
        matrix: [[f32; 4]; 4],
    },
    CreateVertexBuffer {
        id: BufferId,
        label: Option<String>,
        size: u64,
    },
    WriteBuffer {
        buffer: BufferId,
        offset: u64,
        data: Vec<u8>,
    },
    DestroyBuffer {
        id: BufferId,
    },
    Draw(DrawCommand),
}

/// Mock implementation of RenderContext for testing.
///
/// # Borrow Checking Pattern: Interior Mutability
///
/// Methods take `&self` but need to record calls, so the log sits behind a
/// `parking_lot::Mutex`, which keeps the mock `Send + Sync` like the trait
/// requires.
///
/// # Example
///
/// ```rust
/// use sprig_test_utils::{MockRenderContext, RenderContext, TextureFilter, TextureUpload};
///
/// let mock = MockRenderContext::new();
/// let texture = mock.create_texture(&TextureUpload {
///     label: Some("white"),
///     width: 1,
///     height: 1,
///     pixels: &[255; 4],
///     generate_mipmaps: false,
///     filter: TextureFilter::SPRITE,
/// });
///
/// assert_eq!(mock.count_texture_creates(), 1);
/// assert_eq!(mock.live_textures(), vec![texture]);
/// ```
pub struct MockRenderContext {
    calls: Mutex<Vec<RenderCall>>,
    next_id: AtomicU64,
    /// Message returned by the next `create_program`, if set.
    program_failure: Mutex<Option<String>>,
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderContext {
    /// Create a new mock render context.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            program_failure: Mutex::new(None),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn record(&self, call: RenderCall) {
        self.calls.lock().push(call);
    }

    /// Make the next `create_program` fail with `message`.
    pub fn fail_next_program(&self, message: impl Into<String>) {
        *self.program_failure.lock() = Some(message.into());
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn count_texture_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateTexture { .. }))
    }

    pub fn count_texture_destroys(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::DestroyTexture { .. }))
    }

    pub fn count_program_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateProgram { .. }))
    }

    pub fn count_buffer_creates(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::CreateVertexBuffer { .. }))
    }

    pub fn count_buffer_writes(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::WriteBuffer { .. }))
    }

    pub fn count_draws(&self) -> usize {
        self.count(|c| matches!(c, RenderCall::Draw(_)))
    }

    /// Draw commands in submission order.
    pub fn draw_calls(&self) -> Vec<DrawCommand> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RenderCall::Draw(cmd) => Some(*cmd),
                _ => None,
            })
            .collect()
    }

    /// Payloads of every buffer write, in order.
    pub fn buffer_writes(&self) -> Vec<(BufferId, u64, Vec<u8>)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                RenderCall::WriteBuffer {
                    buffer,
                    offset,
                    data,
                } => Some((*buffer, *offset, data.clone())),
                _ => None,
            })
            .collect()
    }

    /// Base level pixels uploaded for `texture`.
    pub fn texture_pixels(&self, texture: TextureId) -> Option<Vec<u8>> {
        self.calls.lock().iter().find_map(|c| match c {
            RenderCall::CreateTexture { id, pixels, .. } if *id == texture => Some(pixels.clone()),
            _ => None,
        })
    }

    /// Textures created and not yet destroyed.
    pub fn live_textures(&self) -> Vec<TextureId> {
        let calls = self.calls.lock();
        let mut live = Vec::new();
        for call in calls.iter() {
            match call {
                RenderCall::CreateTexture { id, .. } => live.push(*id),
                RenderCall::DestroyTexture { id } => live.retain(|t| t != id),
                _ => {}
            }
        }
        live
    }

    /// Buffers created and not yet destroyed.
    pub fn live_buffers(&self) -> Vec<BufferId> {
        let calls = self.calls.lock();
        let mut live = Vec::new();
        for call in calls.iter() {
            match call {
                RenderCall::CreateVertexBuffer { id, .. } => live.push(*id),
                RenderCall::DestroyBuffer { id } => live.retain(|b| b != id),
                _ => {}
            }
        }
        live
    }
}

impl RenderContext for MockRenderContext {
    fn create_texture(&self, upload: &TextureUpload<'_>) -> TextureId {
        let id = TextureId(self.next_id());
        self.record(RenderCall::CreateTexture {
            id,
            label: upload.label.map(str::to_string),
            width: upload.width,
            height: upload.height,
            mip_levels: upload.mip_level_count(),
            filter: upload.filter,
            pixels: upload.pixels.to_vec(),
        });
        id
    }

    fn destroy_texture(&self, texture: TextureId) {
        self.record(RenderCall::DestroyTexture { id: texture });
    }

    fn create_program(&self, source: &ProgramSource<'_>) -> Result<ProgramId, ContextError> {
        if let Some(message) = self.program_failure.lock().take() {
            return Err(ContextError::ShaderCompile {
                label: source.label.map(str::to_string),
                message,
            });
        }
        let id = ProgramId(self.next_id());
        self.record(RenderCall::CreateProgram {
            id,
            label: source.label.map(str::to_string),
        });
        Ok(id)
    }

    fn set_view_projection(&self, program: ProgramId, matrix: [[f32; 4]; 4]) {
        self.record(RenderCall::SetViewProjection { program, matrix });
    }

    fn create_vertex_buffer(&self, label: Option<&str>, size: u64) -> BufferId {
        let id = BufferId(self.next_id());
        self.record(RenderCall::CreateVertexBuffer {
            id,
            label: label.map(str::to_string),
            size,
        });
        id
    }

    fn write_buffer(&self, buffer: BufferId, offset: u64, data: &[u8]) {
        self.record(RenderCall::WriteBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    fn destroy_buffer(&self, buffer: BufferId) {
        self.record(RenderCall::DestroyBuffer { id: buffer });
    }

    fn draw(&self, command: &DrawCommand) {
        self.record(RenderCall::Draw(*command));
    }
}
