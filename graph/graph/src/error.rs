use thiserror::Error;

/// Unified error type for every fallible operation in the trellis graph
/// connectors.
///
/// Validation problems are reported before any request leaves the process;
/// transport and decode failures carry whatever detail the layer below
/// provided. An empty result set is never an error.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Malformed input to a statement builder, e.g. a property name present
    /// in more than one typed map of a [`PropertySpec`](crate::PropertySpec).
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    /// Network or HTTP-level failure while submitting a request. Propagated
    /// unchanged; the connector performs no retries.
    #[error("transport failed: {0}")]
    TransportFailed(String),

    /// The response body was not valid JSON or lacked the expected
    /// `results`/`data` shape. Only raised in strict decode mode.
    #[error("malformed response: {0}")]
    DecodeFailed(String),

    /// The database executed the request and reported a failure of its own.
    #[error("server error {code}: {message}")]
    ServerError { code: String, message: String },

    /// A required configuration key was absent from the environment.
    #[error("missing config key: {0}")]
    MissingConfig(String),
}

pub fn validation_failed(message: impl AsRef<str>) -> GraphError {
    GraphError::ValidationFailed(message.as_ref().to_string())
}

pub fn transport_failed(message: impl AsRef<str>) -> GraphError {
    GraphError::TransportFailed(message.as_ref().to_string())
}

pub fn decode_failed(message: impl AsRef<str>) -> GraphError {
    GraphError::DecodeFailed(message.as_ref().to_string())
}
