use thiserror::Error;

/// Errors that can occur while talking to the embedding provider.
///
/// Only client construction surfaces these to callers; at request time every
/// failure degrades to an empty vector for the affected texts.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The HTTP client could not be built.
    #[error("failed to initialize embedding client: {0}")]
    Initialization(String),

    /// The provider rejected the request or returned an error status.
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// The provider response did not match the expected shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure.
    #[error("embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
}
