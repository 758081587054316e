use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A passage handed back by a knowledge retriever, best match first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub body: String,
    /// File the passage was cut from, when the retriever knows it.
    pub source: Option<String>,
}

impl Passage {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            source: None,
        }
    }
}

/// One web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
}

impl SearchHit {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
            title: String::new(),
        }
    }
}

/// A chunk of a corpus document, ready to be indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    pub id: Uuid,
    pub text: String,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    KnowledgeBase,
    WebSearch,
}

/// Labeled evidence placed in front of the answer model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub source_kind: SourceKind,
    pub label: String,
    pub body: String,
    pub is_error: bool,
}

impl ContextBlock {
    pub fn knowledge(score: u8, rag_context: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::KnowledgeBase,
            label: format!(
                "**From Buffett's Knowledge Base:** (Relevance: {}/10)",
                score
            ),
            body: rag_context.into(),
            is_error: false,
        }
    }

    /// Fragments are already formatted by [`format_search_fragments`].
    pub fn web_results(fragments: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::WebSearch,
            label: "**Real-Time Web Search Results:**".to_string(),
            body: fragments.into(),
            is_error: false,
        }
    }

    pub fn retrieval_error(message: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::KnowledgeBase,
            label: "**RAG Retrieval Error:**".to_string(),
            body: message.into(),
            is_error: true,
        }
    }

    pub fn search_error(message: impl Into<String>) -> Self {
        Self {
            source_kind: SourceKind::WebSearch,
            label: "**Search Error:**".to_string(),
            body: message.into(),
            is_error: true,
        }
    }
}

impl fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_error, self.source_kind) {
            (true, _) => write!(f, "{} {}", self.label, self.body),
            (false, SourceKind::KnowledgeBase) => write!(f, "{}\n{}", self.label, self.body),
            (false, SourceKind::WebSearch) => write!(f, "{}\n\n{}", self.label, self.body),
        }
    }
}

/// Format search hits as numbered source fragments joined by blank lines.
///
/// Numbering follows the position in the provider's list, so a hit with empty
/// content leaves a gap. Returns `None` when no hit carries content.
pub fn format_search_fragments(hits: &[SearchHit]) -> Option<String> {
    let fragments: Vec<String> = hits
        .iter()
        .enumerate()
        .filter(|(_, hit)| !hit.content.trim().is_empty())
        .map(|(i, hit)| format!("**Source {}:** {}\n📎 URL: {}", i + 1, hit.content, hit.url))
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n\n"))
    }
}

/// Which sources a query was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub use_knowledge_base: bool,
    pub use_web_search: bool,
}
