//! Buffett's Brain: question answering over Buffett/Munger writings with a
//! live web search fallback for time-sensitive questions.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod processing;
pub mod rag;
pub mod search;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Re-export primary types for convenience
pub use chat::{ChatEngine, ChatSession, ChatTurn};
pub use config::BrainConfig;
pub use error::BrainError;
pub use llm::{create_provider, ApiProvider, GenerationConfig, LLMProvider};
pub use rag::{evaluate_relevance, is_time_sensitive, RouteOutcome, Router};
pub use search::{KnowledgeIndex, KnowledgeRetriever, TavilySearch, WebSearchProvider};
pub use types::{ContextBlock, Passage, RoutingDecision, SearchHit, SourceKind};

// Re-export common types
pub use anyhow::{Error, Result};
