use serde::{Deserialize, Serialize};

/// A single indexed passage of knowledge-base text.
///
/// Chunks are stored and deduplicated upstream (by tenant and content hash);
/// this engine consumes them read-only and merges them by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeChunk {
    /// Opaque unique identifier.
    pub id: String,

    /// The text passage, non-empty after normalization.
    pub content: String,

    /// Fixed-length embedding vector (dimension fixed per deployment).
    #[serde(default)]
    pub embedding: Vec<f32>,

    /// Tenant scope; `None` makes the chunk part of the global corpus.
    pub tenant_id: Option<String>,

    /// Best-effort ISO-ish language tag.
    pub language: Option<String>,

    /// Unix seconds; used only as the last-resort ordering key.
    pub updated_at: i64,
}

impl KnowledgeChunk {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            embedding: Vec::new(),
            tenant_id: None,
            language: None,
            updated_at: 0,
        }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = embedding;
        self
    }

    pub fn with_updated_at(mut self, updated_at: i64) -> Self {
        self.updated_at = updated_at;
        self
    }

    /// Whether this chunk is visible to a query scoped to `tenant_id`.
    ///
    /// A scoped query sees that tenant's chunks plus the global corpus; an
    /// unscoped query sees everything.
    pub fn in_scope(&self, tenant_id: Option<&str>) -> bool {
        match tenant_id {
            Some(tenant) => self
                .tenant_id
                .as_deref()
                .is_none_or(|owner| owner == tenant),
            None => true,
        }
    }
}
