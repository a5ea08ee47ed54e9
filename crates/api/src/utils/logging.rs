//! Tracing subscriber setup.

use hauth_domain::HauthError;
use tracing_subscriber::EnvFilter;

/// Filter directive used when neither `HAUTH_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from `HAUTH_LOG`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("HAUTH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, writing to stderr so command output on
/// stdout stays machine-readable.
///
/// # Errors
/// Returns `HauthError::Internal` if a global subscriber is already set.
pub fn init_tracing(json: bool) -> Result<(), HauthError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json { builder.json().try_init() } else { builder.try_init() };
    result.map_err(|e| HauthError::Internal(format!("failed to install tracing subscriber: {e}")))
}

/// Stable label for an error, for structured log fields.
#[inline]
pub fn error_label(error: &HauthError) -> &'static str {
    error.label()
}
