use crate::DEFAULT_EMBEDDING_DIM;
use crate::error::EmbeddingError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sift_cache::{TtlCache, fingerprint};
use std::time::Duration;

/// Configuration for the embedding client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the OpenAI-compatible provider API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Provider credential. When absent the client is a no-op that returns
    /// empty vectors.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Expected embedding dimension.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Per-text character budget; longer inputs are truncated before sending.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Maximum number of texts per provider request.
    #[serde(default = "default_max_batch_items")]
    pub max_batch_items: usize,

    /// Maximum total characters per provider request.
    #[serde(default = "default_max_batch_chars")]
    pub max_batch_chars: usize,

    /// Timeout applied to every provider call.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,

    /// TTL for cached per-text vectors.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: Duration,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimension() -> usize {
    DEFAULT_EMBEDDING_DIM
}

fn default_max_input_chars() -> usize {
    8000
}

fn default_max_batch_items() -> usize {
    64
}

fn default_max_batch_chars() -> usize {
    16_000
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(6 * 60 * 60)
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            dimension: default_dimension(),
            max_input_chars: default_max_input_chars(),
            max_batch_items: default_max_batch_items(),
            max_batch_chars: default_max_batch_chars(),
            request_timeout: default_request_timeout(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// A text awaiting a provider call, tied back to its slot in the output.
struct PendingText {
    idx: usize,
    text: String,
    key: String,
}

/// Client for the external embedding provider.
///
/// `embed_batch` is infallible by contract: it always returns one vector per
/// input, in order, degrading individual failures to empty vectors.
pub struct EmbeddingClient {
    http: reqwest::Client,
    config: EmbeddingConfig,
    cache: TtlCache,
}

impl EmbeddingClient {
    pub fn new(config: EmbeddingConfig, cache: TtlCache) -> Result<Self, EmbeddingError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EmbeddingError::Initialization(e.to_string()))?;
        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// Embed a single text. Empty input yields an empty vector without a
    /// provider call.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await;
        vectors.pop().unwrap_or_default()
    }

    /// Embed a batch of texts; the output always has `texts.len()` vectors in
    /// input order. Cached vectors are reused; only misses reach the provider;
    /// failed items come back as empty vectors.
    pub async fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let mut outputs: Vec<Vec<f32>> = vec![Vec::new(); texts.len()];

        let mut pending = Vec::new();
        for (idx, raw) in texts.iter().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            let text = truncate_chars(trimmed, self.config.max_input_chars).to_string();
            // Keyed by content hash only; callers needing model isolation
            // namespace the cache itself.
            let key = fingerprint(&[&text]);
            pending.push(PendingText { idx, text, key });
        }
        if pending.is_empty() {
            return outputs;
        }

        let keys: Vec<String> = pending.iter().map(|p| p.key.clone()).collect();
        let cached: Vec<Option<Vec<f32>>> = self.cache.get_many(&keys).await;

        let mut misses = Vec::new();
        for (item, hit) in pending.into_iter().zip(cached) {
            match hit {
                Some(vector) if !vector.is_empty() => outputs[item.idx] = vector,
                _ => misses.push(item),
            }
        }
        if misses.is_empty() {
            debug!("embedding batch fully served from cache");
            return outputs;
        }

        if self.config.api_key.is_none() {
            warn!(
                "no embedding credential configured; returning {} empty vectors",
                misses.len()
            );
            return outputs;
        }

        for batch in pack_batches(
            misses,
            self.config.max_batch_items,
            self.config.max_batch_chars,
        ) {
            let inputs: Vec<&str> = batch.iter().map(|p| p.text.as_str()).collect();
            match self.request_embeddings(&inputs).await {
                Ok(vectors) => {
                    for (item, vector) in batch.iter().zip(vectors) {
                        let vector = self.check_dimension(vector);
                        if !vector.is_empty() {
                            self.cache
                                .set(&item.key, &vector, self.config.cache_ttl)
                                .await;
                        }
                        outputs[item.idx] = vector;
                    }
                }
                // One attempt per batch; retry/backoff belongs to offline jobs.
                Err(err) => warn!(
                    "embedding batch of {} degraded to empty vectors: {err}",
                    batch.len()
                ),
            }
        }

        outputs
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// A returned vector of the wrong length is malformed provider data for
    /// that item; degrade it to empty so it is never cached or scored.
    fn check_dimension(&self, vector: Vec<f32>) -> Vec<f32> {
        if vector.len() == self.config.dimension {
            vector
        } else {
            warn!(
                "embedding of length {} does not match configured dimension {}; degrading to empty",
                vector.len(),
                self.config.dimension
            );
            Vec::new()
        }
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    async fn request_embeddings(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!("requesting embeddings for {} texts", inputs.len());
        let url = format!("{}/embeddings", self.config.endpoint.trim_end_matches('/'));
        let request = EmbeddingsRequest {
            model: &self.config.model,
            input: inputs,
        };

        let mut builder = self.http.post(url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Provider(format!("{status} - {body}")));
        }

        let payload: EmbeddingsResponse = response.json().await?;
        if payload.data.len() != inputs.len() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                payload.data.len()
            )));
        }
        Ok(payload.data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Pack items into batches bounded by item count and total character budget.
///
/// A batch that would exceed the character budget is closed before the
/// offending item (items are never split); a single item over the budget on
/// its own is sent alone.
fn pack_batches(
    items: Vec<PendingText>,
    max_items: usize,
    max_chars: usize,
) -> Vec<Vec<PendingText>> {
    let max_items = max_items.max(1);
    let mut batches = Vec::new();
    let mut current: Vec<PendingText> = Vec::new();
    let mut current_chars = 0usize;

    for item in items {
        let item_chars = item.text.chars().count();
        let over_items = current.len() >= max_items;
        let over_chars = !current.is_empty() && current_chars + item_chars > max_chars;
        if over_items || over_chars {
            batches.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current_chars += item_chars;
        current.push(item);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sift_cache::MemoryCacheStore;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Responds with one small vector per input item, encoding the item's
    /// batch position so tests can assert ordering.
    struct EchoEmbeddings;

    impl Respond for EchoEmbeddings {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
            let count = body["input"].as_array().map_or(0, Vec::len);
            let data: Vec<serde_json::Value> = (0..count)
                .map(|i| serde_json::json!({ "embedding": [i as f32 + 1.0, 0.25] }))
                .collect();
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": data }))
        }
    }

    fn test_config(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint: server.uri(),
            api_key: Some("test-key".to_string()),
            dimension: 2,
            ..EmbeddingConfig::default()
        }
    }

    fn client_with_cache(config: EmbeddingConfig) -> EmbeddingClient {
        let cache = TtlCache::new(Arc::new(MemoryCacheStore::new()), "emb");
        EmbeddingClient::new(config, cache).unwrap()
    }

    #[tokio::test]
    async fn test_empty_inputs_skip_the_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .expect(0)
            .mount(&server)
            .await;

        let client = client_with_cache(test_config(&server));
        let outputs = client
            .embed_batch(&["".to_string(), "   ".to_string()])
            .await;
        assert_eq!(outputs, vec![Vec::<f32>::new(), Vec::<f32>::new()]);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_cache(test_config(&server));
        let outputs = client
            .embed_batch(&["".to_string(), "hello".to_string(), "world".to_string()])
            .await;

        assert_eq!(outputs.len(), 3);
        assert!(outputs[0].is_empty());
        // Provider outputs land back in input order around the empty slot.
        assert_eq!(outputs[1], vec![1.0, 0.25]);
        assert_eq!(outputs[2], vec![2.0, 0.25]);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_empty_vectors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_with_cache(test_config(&server));
        let outputs = client
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;
        assert_eq!(outputs, vec![Vec::<f32>::new(), Vec::<f32>::new()]);
    }

    #[tokio::test]
    async fn test_short_response_degrades_whole_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({ "data": [{ "embedding": [1.0] }] }),
            ))
            .mount(&server)
            .await;

        let client = client_with_cache(test_config(&server));
        let outputs = client
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;
        assert!(outputs.iter().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_wrong_dimension_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            dimension: 3,
            ..test_config(&server)
        };
        let client = client_with_cache(config);
        let vector = client.embed("hello").await;
        assert!(vector.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_is_a_noop() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .expect(0)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            api_key: None,
            ..test_config(&server)
        };
        let client = client_with_cache(config);
        let vector = client.embed("hello").await;
        assert!(vector.is_empty());
    }

    #[tokio::test]
    async fn test_cache_short_circuits_repeat_requests() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .expect(1)
            .mount(&server)
            .await;

        let client = client_with_cache(test_config(&server));
        let first = client.embed("refund policy").await;
        let second = client.embed("refund policy").await;
        assert_eq!(first, second);
        assert!(!second.is_empty());
    }

    #[tokio::test]
    async fn test_long_input_is_truncated_before_sending() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            max_input_chars: 10,
            ..test_config(&server)
        };
        let client = client_with_cache(config);
        client.embed(&"x".repeat(50_000)).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["input"][0].as_str().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_item_count_bound_splits_batches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .respond_with(EchoEmbeddings)
            .expect(2)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            max_batch_items: 2,
            ..test_config(&server)
        };
        let client = client_with_cache(config);
        let outputs = client
            .embed_batch(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await;
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|v| !v.is_empty()));
    }

    fn pending(text: &str) -> PendingText {
        PendingText {
            idx: 0,
            text: text.to_string(),
            key: String::new(),
        }
    }

    #[test]
    fn test_pack_batches_char_budget() {
        let items = vec![pending("aaaa"), pending("bbbb"), pending("cc")];
        let batches = pack_batches(items, 10, 8);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 1]);
    }

    #[test]
    fn test_pack_batches_oversized_item_goes_alone() {
        let items = vec![pending("aa"), pending(&"x".repeat(100)), pending("bb")];
        let batches = pack_batches(items, 10, 8);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
