#![forbid(unsafe_code)]

//! JSON log output for hosts without their own `tracing` setup.

use tracing_subscriber::EnvFilter;

use crate::error::BoxError;

/// Install a global JSON subscriber writing to stdout.
///
/// The filter is read from `RUST_LOG`, defaulting to `gestalt_core=info`.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_json_subscriber() -> Result<(), BoxError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gestalt_core=info"));
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(filter)
        .try_init()
}
