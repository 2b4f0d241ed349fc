//! Sprig Core
//!
//! Shared plumbing for the sprig renderer: logging, profiling, configuration,
//! generational storage and the entity primitives the scene is built from.

pub mod alloc;
pub mod config;
pub mod logging;
pub mod math;
pub mod profiling;
pub mod world;

pub use config::{Config, ConfigError};
