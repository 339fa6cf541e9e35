//! Errors raised by the GitLab transport.
use thiserror::Error;

/// A failed call to the GitLab API.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The API answered 404.
    #[error("{endpoint}: not found")]
    NotFound {
        /// Path of the request relative to the API root.
        endpoint: String,
    },

    /// The API answered with a non-success status other than 404.
    #[error("{endpoint}: HTTP {status}: {message}")]
    Status {
        /// Path of the request relative to the API root.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, as returned by GitLab.
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, I/O).
    #[error("{endpoint}: request failed: {message}")]
    Transport {
        /// Path of the request relative to the API root.
        endpoint: String,
        /// Underlying transport error.
        message: String,
    },

    /// The response body was not the JSON we expected.
    #[error("{endpoint}: unexpected response body: {source}")]
    Decode {
        /// Path of the request relative to the API root.
        endpoint: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A request body could not be serialized.
    #[error("{endpoint}: cannot encode request body: {source}")]
    Encode {
        /// Path of the request relative to the API root.
        endpoint: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// The configured endpoint is not a usable URL.
    #[error("invalid GitLab endpoint '{endpoint}': {message}")]
    InvalidEndpoint {
        /// The endpoint as configured.
        endpoint: String,
        /// Parser message.
        message: String,
    },
}

impl ApiError {
    /// Returns `true` if the remote reported the resource as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
