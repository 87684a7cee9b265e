//! Environment variable access with structured errors.

use thiserror::Error;

/// A required environment variable is not set (or not valid unicode).
#[derive(Debug, Error)]
#[error("missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, mapping absence to [`MissingEnvVarError`]
/// so callers can surface which variable the operator forgot to set.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an environment variable, falling back to `default` when unset.
pub fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
