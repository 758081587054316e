pub mod text_search;
pub mod web;

pub use text_search::KnowledgeIndex;
pub use web::TavilySearch;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{Passage, SearchHit};

/// Read-only access to the pre-indexed knowledge base.
#[async_trait]
pub trait KnowledgeRetriever: Send + Sync {
    /// Up to `k` passages, most similar first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Passage>>;
}

/// Live web search.
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Ordered results; may be empty.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}
