use std::path::PathBuf;

/// Errors that can occur while loading fonts or baking glyph atlases.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// Font file missing or unreadable.
    #[error("failed to read font {}: {source}", path.display())]
    FontLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bytes were read but are not a usable font.
    #[error("invalid font data in {name}: {reason}")]
    InvalidFont { name: String, reason: String },

    /// The printable ASCII set does not fit the atlas bitmap at this size.
    #[error(
        "glyph {glyph:?} does not fit a {atlas_size}x{atlas_size} atlas at {point_size}px"
    )]
    FontBakeOverflow {
        point_size: f32,
        atlas_size: u32,
        glyph: char,
    },

    #[error("point size must be finite and positive, got {0}")]
    InvalidPointSize(f32),
}
