//! Renderer configuration, loaded from TOML.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```toml
//! [renderer]
//! max_batch_size = 512
//!
//! [text]
//! cache_capacity = 8
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top level configuration for the sprig renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub text: TextConfig,
    pub logging: LoggingConfig,
    pub profiling: ProfilingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Quads staged before the batch flushes on its own.
    pub max_batch_size: usize,
    /// Capture and log GPU validation errors around each GPU call.
    pub gpu_error_checks: bool,
    /// Linear RGBA the frame target is cleared to.
    pub clear_color: [f32; 4],
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            gpu_error_checks: cfg!(debug_assertions),
            clear_color: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Atlas side length per point of font size.
    pub atlas_scale: u32,
    pub min_atlas_size: u32,
    pub max_atlas_size: u32,
    /// Empty texels kept between packed glyphs.
    pub glyph_padding: u32,
    /// Number of (font, size) atlases kept before the least recently used is evicted.
    pub cache_capacity: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            atlas_scale: 8,
            min_atlas_size: 128,
            max_atlas_size: 4096,
            glyph_padding: 1,
            cache_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: crate::logging::DEFAULT_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilingConfig {
    pub mode: ProfilingMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilingMode {
    /// Profiling scopes are disabled
    #[default]
    Off,
    /// Scopes are recorded and can be inspected in-process
    On,
    /// Scopes are recorded and served to `puffin_viewer` over HTTP
    WithServer,
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.renderer.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "renderer.max_batch_size must be at least 1".into(),
            ));
        }
        if self.text.cache_capacity == 0 {
            return Err(ConfigError::Invalid(
                "text.cache_capacity must be at least 1".into(),
            ));
        }
        if self.text.atlas_scale == 0 {
            return Err(ConfigError::Invalid(
                "text.atlas_scale must be at least 1".into(),
            ));
        }
        if self.text.min_atlas_size > self.text.max_atlas_size {
            return Err(ConfigError::Invalid(format!(
                "text.min_atlas_size ({}) exceeds text.max_atlas_size ({})",
                self.text.min_atlas_size, self.text.max_atlas_size
            )));
        }
        Ok(())
    }
}
