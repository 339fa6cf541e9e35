//! Domain-specific error types for the enforcer engine.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`EnforcerError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! EnforcerError
//! ├── NotFound(String)        — base group lookup found nothing
//! ├── Match { path, segment } — a subgroup segment did not resolve
//! ├── Config(ConfigError)     — missing section, invalid config
//! └── Remote(ApiError)        — transport or API-level failure
//! ```

use thiserror::Error;

use crate::gitlab::ApiError;

/// Top-level error type for the reconciliation engine.
#[derive(Error, Debug)]
pub enum EnforcerError {
    /// The requested resource does not exist on the remote.
    #[error("not found: {0}")]
    NotFound(String),

    /// A segment of a nested group path matched no listed subgroup.
    #[error("no subgroup matches '{segment}' while resolving '{path}'")]
    Match {
        /// Full group path being resolved.
        path: String,
        /// The path prefix that could not be matched.
        segment: String,
    },

    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Transport or API-level failure talking to the remote.
    #[error("remote error: {0}")]
    Remote(#[from] ApiError),
}

/// Errors that arise from configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A section required by the invoked operation is absent.
    #[error("no {0} section provided in config")]
    MissingSection(String),

    /// Both the allow-list and the deny-list are populated.
    #[error("project_whitelist and project_blacklist are mutually exclusive")]
    ConflictingProjectLists,

    /// A field holds a value the engine cannot work with.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Name of the offending field.
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// A required environment variable is not set.
    #[error("environment variable {0} is not set")]
    MissingEnv(String),

    /// The config file contains invalid TOML or unknown keys.
    #[error("invalid config file {path}: {message}")]
    InvalidSyntax {
        /// Path of the file that failed to parse.
        path: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading the config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
