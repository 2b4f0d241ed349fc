//! Handles and descriptors exchanged with a [`RenderContext`](crate::RenderContext).

use thiserror::Error;

/// Handle of a texture owned by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub u64);

/// Handle of a vertex buffer owned by the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(pub u64);

/// Handle of a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Sampling applied when a texture is magnified, minified, and between mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFilter {
    pub mag: FilterMode,
    pub min: FilterMode,
    pub mipmap: FilterMode,
}

impl TextureFilter {
    /// Sprite images: linear magnification, nearest texel inside a mip
    /// level, linear blend between levels.
    pub const SPRITE: Self = Self {
        mag: FilterMode::Linear,
        min: FilterMode::Nearest,
        mipmap: FilterMode::Linear,
    };

    /// Glyph atlases: linear everywhere.
    pub const GLYPH_ATLAS: Self = Self {
        mag: FilterMode::Linear,
        min: FilterMode::Linear,
        mipmap: FilterMode::Linear,
    };
}

/// Tightly packed RGBA8 pixels to upload as a 2D texture.
///
/// Row 0 of `pixels` is sampled at texture coordinate `v = 0`.
#[derive(Debug, Clone, Copy)]
pub struct TextureUpload<'a> {
    pub label: Option<&'a str>,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
    pub generate_mipmaps: bool,
    pub filter: TextureFilter,
}

impl TextureUpload<'_> {
    /// Number of mip levels a full chain down to 1x1 needs.
    pub fn mip_level_count(&self) -> u32 {
        if self.generate_mipmaps {
            32 - self.width.max(self.height).max(1).leading_zeros()
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ShaderStage<'a> {
    pub source: &'a str,
    pub entry_point: &'a str,
}

/// Vertex and fragment stages of a program, in WGSL.
///
/// The program exposes one `mat4x4<f32>` uniform, `mat_view_proj`, at
/// group 0 binding 0, and samples its texture at group 1.
#[derive(Debug, Clone, Copy)]
pub struct ProgramSource<'a> {
    pub label: Option<&'a str>,
    pub vertex: ShaderStage<'a>,
    pub fragment: ShaderStage<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// `src * src_alpha + dst * (1 - src_alpha)`
    Alpha,
    Replace,
}

/// One non-indexed triangle-list draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub program: ProgramId,
    pub vertex_buffer: BufferId,
    pub texture: TextureId,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub blend: BlendMode,
    pub depth_test: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("shader program {label:?} failed to compile: {message}")]
    ShaderCompile {
        label: Option<String>,
        message: String,
    },
}
