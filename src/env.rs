//! Environment variable helpers for the `from_env` config constructors.

use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Parse `key`, falling back to `default` when unset or unparseable.
pub(crate) fn var_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparseable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

/// Parse an optional `key`; unparseable values are ignored with a warning.
pub(crate) fn var_opt<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            None
        }
    }
}

/// Millisecond duration in `key`, or `default_ms`.
pub(crate) fn millis_or(key: &str, default_ms: u64) -> Duration {
    Duration::from_millis(var_or(key, default_ms))
}
