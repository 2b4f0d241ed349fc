//! Texture loading from image files.

use crate::error::RenderError;
use image::DynamicImage;
use sprig_test_utils::{RenderContext, TextureFilter, TextureId, TextureUpload};
use std::path::Path;

/// A texture uploaded to a [`RenderContext`] with its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Decode an image file and upload it with a full mip chain.
///
/// Rows are flipped so that `v = 0` samples the bottom of the image, which
/// puts the picture upright on a sprite whose uv `(0, 0)` is its
/// bottom-left corner.
pub fn load_texture(ctx: &dyn RenderContext, path: &Path) -> Result<Texture, RenderError> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::ResourceLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| RenderError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;
    let texture = upload_image(ctx, &path.display().to_string(), image);
    tracing::debug!(
        "loaded texture {} ({}x{})",
        path.display(),
        texture.width,
        texture.height
    );
    Ok(texture)
}

/// Like [`load_texture`], for encoded image bytes already in memory.
pub fn load_texture_from_memory(
    ctx: &dyn RenderContext,
    label: &str,
    bytes: &[u8],
) -> Result<Texture, RenderError> {
    let image = image::load_from_memory(bytes).map_err(|source| RenderError::ImageDecode {
        path: label.into(),
        source,
    })?;
    Ok(upload_image(ctx, label, image))
}

fn upload_image(ctx: &dyn RenderContext, label: &str, image: DynamicImage) -> Texture {
    let rgba = image.flipv().into_rgba8();
    let (width, height) = rgba.dimensions();
    let id = ctx.create_texture(&TextureUpload {
        label: Some(label),
        width,
        height,
        pixels: rgba.as_raw(),
        generate_mipmaps: true,
        filter: TextureFilter::SPRITE,
    });
    Texture { id, width, height }
}

/// Release a texture obtained from [`load_texture`].
pub fn free_texture(ctx: &dyn RenderContext, texture: Texture) {
    ctx.destroy_texture(texture.id);
}
