//! # Sift Embeddings
//!
//! Client for an external, OpenAI-compatible embedding provider. Turns raw
//! text into fixed-length vectors with per-text caching, two-bound batching
//! (item count and character budget), and graceful degradation: a provider
//! failure, missing credential, or malformed response yields an empty vector
//! for the affected texts instead of an error. Callers distinguish "no
//! signal" (empty vector) from "irrelevant" (low score) explicitly.
//!
//! ## Example
//!
//! ```no_run
//! use sift_cache::TtlCache;
//! use sift_embeddings::{EmbeddingClient, EmbeddingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sift_embeddings::EmbeddingError> {
//!     let config = EmbeddingConfig {
//!         api_key: std::env::var("EMBEDDING_API_KEY").ok(),
//!         ..EmbeddingConfig::default()
//!     };
//!     let client = EmbeddingClient::new(config, TtlCache::disabled("emb"))?;
//!     let vector = client.embed("refund policy").await;
//!     println!("{} dimensions", vector.len());
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::{EmbeddingClient, EmbeddingConfig};
pub use error::EmbeddingError;

/// Default embedding dimension for the hosted provider models.
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;
