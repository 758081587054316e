//! Deterministic provider doubles shared by the unit tests.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::llm::{GenerationConfig, LLMProvider, ProviderInfo};
use crate::search::{KnowledgeRetriever, WebSearchProvider};
use crate::types::{Passage, SearchHit};

fn test_info(name: &str) -> ProviderInfo {
    ProviderInfo {
        name: name.to_string(),
        model: "test".to_string(),
        is_local: true,
    }
}

/// Replies in order, then keeps repeating the last reply.
pub struct ScriptedLlm {
    replies: Vec<String>,
    calls: Mutex<Vec<(String, GenerationConfig)>>,
}

impl ScriptedLlm {
    pub fn new<'a>(replies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            replies: replies.into_iter().map(String::from).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, GenerationConfig)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let mut calls = self.calls.lock();
        let idx = calls.len().min(self.replies.len().saturating_sub(1));
        calls.push((prompt.to_string(), config.clone()));
        self.replies
            .get(idx)
            .cloned()
            .ok_or_else(|| anyhow!("no scripted reply"))
    }

    fn info(&self) -> ProviderInfo {
        test_info("scripted")
    }
}

pub struct FailingLlm;

#[async_trait]
impl LLMProvider for FailingLlm {
    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
        Err(anyhow!("503 Service Unavailable"))
    }

    fn info(&self) -> ProviderInfo {
        test_info("failing")
    }
}

pub struct SlowLlm {
    delay: Duration,
}

impl SlowLlm {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LLMProvider for SlowLlm {
    async fn generate(&self, _prompt: &str, _config: &GenerationConfig) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        Ok("9".to_string())
    }

    fn info(&self) -> ProviderInfo {
        test_info("slow")
    }
}

/// Returns fixed passages (truncated to `k`) and counts calls.
#[derive(Default)]
pub struct StaticRetriever {
    passages: Vec<Passage>,
    calls: AtomicUsize,
    last_k: AtomicUsize,
}

impl StaticRetriever {
    pub fn new<'a>(bodies: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            passages: bodies.into_iter().map(Passage::new).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_k(&self) -> usize {
        self.last_k.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeRetriever for StaticRetriever {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);
        Ok(self.passages.iter().take(k).cloned().collect())
    }
}

#[derive(Default)]
pub struct FailingRetriever {
    calls: AtomicUsize,
}

impl FailingRetriever {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeRetriever for FailingRetriever {
    async fn retrieve(&self, _query: &str, _k: usize) -> Result<Vec<Passage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("vector store unavailable"))
    }
}

#[derive(Default)]
pub struct StaticSearch {
    hits: Vec<SearchHit>,
    calls: AtomicUsize,
}

impl StaticSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearchProvider for StaticSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hits.clone())
    }
}

#[derive(Default)]
pub struct FailingSearch {
    calls: AtomicUsize,
}

impl FailingSearch {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebSearchProvider for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(anyhow!("Tavily error (401 Unauthorized)"))
    }
}
