//! Font faces loaded from TrueType/OpenType bytes.

use crate::error::TextError;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_FONT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a loaded font.
///
/// Two loads of the same file yield two ids; the glyph cache keys on this,
/// not on the file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u64);

/// A parsed font face, shared by every text run that uses it.
pub struct Font {
    id: FontId,
    name: String,
    face: fontdue::Font,
}

impl Font {
    /// Parse font bytes. `name` is only used for diagnostics.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Arc<Self>, TextError> {
        let name = name.into();
        let face = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |reason| TextError::InvalidFont {
                name: name.clone(),
                reason: reason.to_string(),
            },
        )?;
        let id = FontId(NEXT_FONT_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!("parsed font {name} as {id:?} ({} glyphs)", face.glyph_count());
        Ok(Arc::new(Self { id, name, face }))
    }

    /// Read and parse a font file.
    pub fn load(path: &Path) -> Result<Arc<Self>, TextError> {
        let bytes = std::fs::read(path).map_err(|source| TextError::FontLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &bytes)
    }

    pub fn id(&self) -> FontId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn face(&self) -> &fontdue::Font {
        &self.face
    }
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
