//! Profiling utilities based on the `puffin` crate.

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

use crate::config::ProfilingMode;

/// Address the puffin HTTP server listens on.
pub const SERVER_ADDR: &str = "0.0.0.0:8585";

#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Turn profiling on according to `mode`.
///
/// # Example
/// ```no_run
/// use sprig_core::config::ProfilingMode;
/// use sprig_core::profiling::init_profiling;
///
/// init_profiling(ProfilingMode::On);
/// ```
pub fn init_profiling(mode: ProfilingMode) {
    match mode {
        ProfilingMode::Off => puffin::set_scopes_on(false),
        ProfilingMode::On => puffin::set_scopes_on(true),
        ProfilingMode::WithServer => {
            puffin::set_scopes_on(true);
            start_server();
        }
    }
}

#[cfg(feature = "profiling")]
fn start_server() {
    if PROFILING_SERVER.get().is_some() {
        return;
    }
    match puffin_http::Server::new(SERVER_ADDR) {
        Ok(server) => {
            tracing::info!("puffin profiler server started on http://{SERVER_ADDR}");
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("failed to start puffin server: {e}");
        }
    }
}

#[cfg(not(feature = "profiling"))]
fn start_server() {
    tracing::warn!("puffin server requested but the `profiling` feature is disabled");
}

/// Mark the start of a new frame for profiling.
///
/// Call once per frame so scopes are grouped by frame in the viewer.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
