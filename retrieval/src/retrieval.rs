use crate::config::RetrievalConfig;
use crate::error::{Result, RetrievalError};
use crate::fusion::FusionEngine;
use crate::keyword::KeywordSearch;
use crate::language;
use crate::result::{Candidate, RetrievalMeta, RetrievalResponse, SelectionPath};
use crate::select::SelectionEngine;
use crate::vector::VectorSearch;
use log::info;
use sift_cache::{CacheStore, TtlCache, fingerprint};
use sift_embeddings::EmbeddingClient;
use sift_store::DocumentStore;
use std::sync::Arc;
use std::time::Instant;

const CACHE_NAMESPACE: &str = "retrieval";

/// One retrieval request against a tenant's knowledge base.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    pub query: String,
    pub tenant_id: Option<String>,
    /// Requested result count; the configured rerank limit still caps it.
    pub top_k: usize,
    /// Drop results scoring below this after selection. Zero keeps all.
    pub min_score: f32,
}

impl RetrievalRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            tenant_id: None,
            top_k: 5,
            min_score: 0.0,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    fn cache_key(&self) -> String {
        fingerprint(&[
            self.query.trim(),
            self.tenant_id.as_deref().unwrap_or(""),
            &self.top_k.to_string(),
            &self.min_score.to_string(),
        ])
    }
}

/// Hybrid retrieval orchestrator.
///
/// Runs the embedding, vector and keyword stages, fuses and selects
/// candidates, and memoizes whole responses per (query, tenant, limits).
/// The only errors callers see are invalid configuration and vector-store
/// failures; everything else degrades inside its own stage.
pub struct KnowledgeRetrieval {
    config: RetrievalConfig,
    embeddings: Arc<EmbeddingClient>,
    vector: VectorSearch,
    keyword: KeywordSearch,
    fusion: FusionEngine,
    selection: SelectionEngine,
    cache: TtlCache,
}

impl std::fmt::Debug for KnowledgeRetrieval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeRetrieval")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KnowledgeRetrieval {
    pub fn new(
        config: RetrievalConfig,
        embeddings: Arc<EmbeddingClient>,
        store: Arc<dyn DocumentStore>,
        cache_store: Option<Arc<dyn CacheStore>>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(RetrievalError::InvalidConfig)?;

        let cache = match cache_store {
            Some(store) => TtlCache::new(store, CACHE_NAMESPACE),
            None => TtlCache::disabled(CACHE_NAMESPACE),
        };

        Ok(Self {
            vector: VectorSearch::new(config.clone(), Arc::clone(&store)),
            keyword: KeywordSearch::new(config.clone(), Arc::clone(&store)),
            fusion: FusionEngine::new(config.clone()),
            selection: SelectionEngine::new(config.clone(), store),
            config,
            embeddings,
            cache,
        })
    }

    /// Retrieve the best-matching chunks for `request`.
    ///
    /// Responses are cached for the configured TTL; empty responses are
    /// recomputed every time so a corpus filling up becomes visible
    /// immediately.
    pub async fn retrieve(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        let key = request.cache_key();
        self.cache
            .wrap(&key, self.config.result_cache_ttl, || {
                self.retrieve_uncached(request)
            })
            .await
    }

    async fn retrieve_uncached(&self, request: &RetrievalRequest) -> Result<RetrievalResponse> {
        let started = Instant::now();
        let query = request.query.trim();
        let tenant_id = request.tenant_id.as_deref();

        if query.is_empty() {
            return Ok(self.empty_response(None));
        }

        let query_language = language::detect(query);
        let query_vector = self.embeddings.embed(query).await;

        let (vector_hits, keyword_hits) = tokio::join!(
            self.vector.search(tenant_id, &query_vector, request.top_k),
            self.keyword.search(tenant_id, query, request.top_k),
        );
        let vector_hits = vector_hits?;

        let fused = self.fusion.fuse(&vector_hits, &keyword_hits, query_language);
        let selection = self
            .selection
            .select(&fused, &keyword_hits, tenant_id, request.top_k)
            .await;

        let mut results = selection.results;
        if request.min_score > 0.0 {
            results.retain(|candidate| candidate.score >= request.min_score);
            for (rank, candidate) in results.iter_mut().enumerate() {
                candidate.rank = rank;
            }
        }

        let response = RetrievalResponse {
            results: results.iter().map(Candidate::from).collect(),
            meta: RetrievalMeta {
                path: selection.path,
                query_language: query_language.map(str::to_string),
                vector_count: vector_hits.len(),
                keyword_count: keyword_hits.len(),
                fused_count: fused.len(),
                primary_threshold: self.config.primary_threshold,
                secondary_threshold: self.config.secondary_threshold,
                cache_hit: false,
            },
        };

        info!(
            "retrieval finished: path={} results={} vector={} keyword={} elapsed_ms={}",
            response.meta.path,
            response.results.len(),
            response.meta.vector_count,
            response.meta.keyword_count,
            started.elapsed().as_millis()
        );
        Ok(response)
    }

    fn empty_response(&self, query_language: Option<&str>) -> RetrievalResponse {
        RetrievalResponse {
            results: Vec::new(),
            meta: RetrievalMeta {
                path: SelectionPath::Fallback,
                query_language: query_language.map(str::to_string),
                vector_count: 0,
                keyword_count: 0,
                fused_count: 0,
                primary_threshold: self.config.primary_threshold,
                secondary_threshold: self.config.secondary_threshold,
                cache_hit: false,
            },
        }
    }
}
