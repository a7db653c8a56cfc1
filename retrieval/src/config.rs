use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the hybrid retrieval pipeline.
///
/// All scoring knobs live here, enumerated once and passed by value into
/// each component; nothing reads the environment at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Multiplier applied to vector-similarity scores during fusion. Kept
    /// above 1 so semantic matches outweigh keyword matches by default.
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f32,

    /// Combined-score bar for the primary selection stage.
    #[serde(default = "default_primary_threshold")]
    pub primary_threshold: f32,

    /// Lower combined-score bar for the secondary selection stage.
    #[serde(default = "default_secondary_threshold")]
    pub secondary_threshold: f32,

    /// Additive bonus for chunks whose language matches the query's.
    #[serde(default = "default_language_boost")]
    pub language_boost: f32,

    /// Hard cap on the number of results forwarded downstream.
    #[serde(default = "default_rerank_limit")]
    pub rerank_limit: usize,

    /// Result cap for the recency fallback stage.
    #[serde(default = "default_fallback_limit")]
    pub fallback_limit: usize,

    /// ANN candidate pool is `candidate_multiplier * k`, floored at
    /// `min_candidate_pool`, to preserve recall before the store's top-k cut.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,

    #[serde(default = "default_min_candidate_pool")]
    pub min_candidate_pool: usize,

    /// Combine the keyword leg into fused scores. When off, fused ordering
    /// comes from the vector leg alone (the keyword stage of the selection
    /// waterfall is unaffected).
    #[serde(default = "default_true")]
    pub enable_fusion: bool,

    /// Run the keyword leg at all. When off it yields no candidates and the
    /// keyword selection stage is skipped.
    #[serde(default = "default_true")]
    pub enable_keyword: bool,

    /// Allow near-miss term matches (single-edit typos) in the keyword leg.
    #[serde(default = "default_true")]
    pub enable_fuzzy: bool,

    /// TTL for cached final retrieval responses.
    #[serde(default = "default_result_cache_ttl")]
    pub result_cache_ttl: Duration,

    /// Bounded maximum query time for each document-store call.
    #[serde(default = "default_store_timeout")]
    pub store_timeout: Duration,
}

fn default_vector_weight() -> f32 {
    10.0
}

fn default_primary_threshold() -> f32 {
    5.0
}

fn default_secondary_threshold() -> f32 {
    2.0
}

fn default_language_boost() -> f32 {
    0.5
}

fn default_rerank_limit() -> usize {
    5
}

fn default_fallback_limit() -> usize {
    3
}

fn default_candidate_multiplier() -> usize {
    10
}

fn default_min_candidate_pool() -> usize {
    100
}

fn default_true() -> bool {
    true
}

fn default_result_cache_ttl() -> Duration {
    Duration::from_secs(300)
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vector_weight: default_vector_weight(),
            primary_threshold: default_primary_threshold(),
            secondary_threshold: default_secondary_threshold(),
            language_boost: default_language_boost(),
            rerank_limit: default_rerank_limit(),
            fallback_limit: default_fallback_limit(),
            candidate_multiplier: default_candidate_multiplier(),
            min_candidate_pool: default_min_candidate_pool(),
            enable_fusion: true,
            enable_keyword: true,
            enable_fuzzy: true,
            result_cache_ttl: default_result_cache_ttl(),
            store_timeout: default_store_timeout(),
        }
    }
}

impl RetrievalConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.vector_weight <= 0.0 {
            return Err(format!(
                "vector_weight must be > 0, got {}",
                self.vector_weight
            ));
        }

        if self.language_boost < 0.0 {
            return Err(format!(
                "language_boost must be >= 0, got {}",
                self.language_boost
            ));
        }

        if self.secondary_threshold > self.primary_threshold {
            return Err(format!(
                "secondary_threshold ({}) cannot exceed primary_threshold ({})",
                self.secondary_threshold, self.primary_threshold
            ));
        }

        if self.rerank_limit == 0 {
            return Err("rerank_limit must be > 0".to_string());
        }

        if self.fallback_limit == 0 {
            return Err("fallback_limit must be > 0".to_string());
        }

        if self.candidate_multiplier == 0 {
            return Err("candidate_multiplier must be > 0".to_string());
        }

        if self.min_candidate_pool == 0 {
            return Err("min_candidate_pool must be > 0".to_string());
        }

        Ok(())
    }

    /// Preset with tighter thresholds for callers wanting high precision.
    pub fn strict() -> Self {
        Self {
            primary_threshold: 7.0,
            secondary_threshold: 5.0,
            rerank_limit: 3,
            ..Default::default()
        }
    }

    /// Preset favoring recall: looser thresholds and a bigger pool.
    pub fn recall() -> Self {
        Self {
            primary_threshold: 3.0,
            secondary_threshold: 1.0,
            min_candidate_pool: 200,
            rerank_limit: 8,
            ..Default::default()
        }
    }
}
