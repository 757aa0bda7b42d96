//! Tracing initialization.
//!
//! Logs go to **stderr**: in stdio mode stdout carries the MCP protocol and
//! must not contain anything else.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives, e.g.
//!   - `RUST_LOG=debug` - debug logging everywhere
//!   - `RUST_LOG=warn,gemini_image_mcp=debug` - warn by default, debug for the server

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    util::TryInitError,
    EnvFilter,
};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
///
/// # Example
///
/// ```no_run
/// use gemini_image_mcp_common::tracing::init_tracing;
///
/// init_tracing();
/// tracing::info!("Server starting");
/// ```
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Install the global subscriber with a custom default filter.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing_with_default(default_filter: &str) {
    if let Err(e) = try_init_tracing_with_default(default_filter) {
        panic!("Failed to install tracing subscriber: {}", e);
    }
}

/// Install the global subscriber, returning an error if one is already set.
pub fn try_init_tracing() -> Result<(), TryInitError> {
    try_init_tracing_with_default(DEFAULT_FILTER)
}

fn try_init_tracing_with_default(default_filter: &str) -> Result<(), TryInitError> {
    let env_filter = env_filter(default_filter);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}
