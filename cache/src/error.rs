use thiserror::Error;

/// Errors surfaced by [`crate::CacheStore`] implementations.
///
/// These never propagate past [`crate::TtlCache`]: a failing store is treated
/// as a cache miss.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing store could not be reached.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),

    /// A stored payload could not be read or written.
    #[error("cache payload error: {0}")]
    Payload(String),
}
