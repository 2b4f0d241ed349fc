//! Shader programs for the sprite pipeline.

use crate::error::RenderError;
use sprig_test_utils::{ProgramId, ProgramSource, RenderContext, ShaderStage};
use std::path::Path;

/// Built-in WGSL program: textured, vertex-tinted, `mat_view_proj` transformed.
pub const SPRITE_SHADER: &str = include_str!("../shaders/sprite.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Compile a program from separate vertex and fragment WGSL sources.
///
/// Each source must define its stage's entry point (`vs_main` / `fs_main`).
pub fn compile_program(
    ctx: &dyn RenderContext,
    label: &str,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<ProgramId, RenderError> {
    let program = ctx.create_program(&ProgramSource {
        label: Some(label),
        vertex: ShaderStage {
            source: vertex_src,
            entry_point: VERTEX_ENTRY,
        },
        fragment: ShaderStage {
            source: fragment_src,
            entry_point: FRAGMENT_ENTRY,
        },
    })?;
    tracing::debug!("compiled shader program {label}");
    Ok(program)
}

/// Compile the built-in [`SPRITE_SHADER`].
pub fn sprite_program(ctx: &dyn RenderContext) -> Result<ProgramId, RenderError> {
    compile_program(ctx, "Sprite Shader", SPRITE_SHADER, SPRITE_SHADER)
}

/// Load a WGSL file that holds both `vs_main` and `fs_main`.
pub fn load_program(ctx: &dyn RenderContext, path: &Path) -> Result<ProgramId, RenderError> {
    let source = std::fs::read_to_string(path).map_err(|source| RenderError::ResourceLoad {
        path: path.to_path_buf(),
        source,
    })?;
    compile_program(ctx, &path.display().to_string(), &source, &source)
}
