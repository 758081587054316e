//! Source routing: knowledge base, live web search, or both.
//!
//! Time-sensitive questions skip the knowledge base entirely. Everything else
//! is retrieved, judged by the relevance evaluator, and only kept when the
//! score clears the threshold; otherwise the router falls back to web search.
//! A failing retriever also falls back to web search. A failing web search is
//! reported in the context and ends the procedure.

use serde::Serialize;
use std::sync::Arc;

use super::relevance::RelevanceEvaluator;
use super::time_sensitivity::is_time_sensitive;
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::llm::LLMProvider;
use crate::search::{KnowledgeRetriever, WebSearchProvider};
use crate::types::{format_search_fragments, ContextBlock, RoutingDecision};

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found.";
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Everything the router produced for one query.
#[derive(Debug, Serialize)]
pub struct RouteOutcome {
    pub time_sensitive: bool,
    pub decision: RoutingDecision,
    /// Judge score, absent for time-sensitive queries and failed retrievals.
    pub relevance: Option<u8>,
    pub blocks: Vec<ContextBlock>,
    #[serde(skip)]
    pub failures: Vec<BrainError>,
}

impl RouteOutcome {
    pub fn combined_context(&self) -> String {
        combine_blocks(&self.blocks)
    }

    /// True when the knowledge base was judged and rejected.
    pub fn fell_back_to_search(&self) -> bool {
        self.relevance.is_some() && !self.decision.use_knowledge_base
    }
}

/// Join blocks in production order; an empty list yields the fixed fallback text.
pub fn combine_blocks(blocks: &[ContextBlock]) -> String {
    if blocks.is_empty() {
        return NO_RELEVANT_INFORMATION.to_string();
    }
    blocks
        .iter()
        .map(|block| block.to_string())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Stateless across queries; share it behind an `Arc`.
pub struct Router {
    retriever: Arc<dyn KnowledgeRetriever>,
    web_search: Arc<dyn WebSearchProvider>,
    scorer: Arc<dyn LLMProvider>,
    evaluator: RelevanceEvaluator,
    k: usize,
    threshold: u8,
}

impl Router {
    pub fn new(
        retriever: Arc<dyn KnowledgeRetriever>,
        web_search: Arc<dyn WebSearchProvider>,
        scorer: Arc<dyn LLMProvider>,
        config: &BrainConfig,
    ) -> Self {
        Self {
            retriever,
            web_search,
            scorer,
            evaluator: RelevanceEvaluator::new(&config.retrieval, &config.llm),
            k: config.retrieval.k,
            threshold: config.retrieval.relevance_threshold,
        }
    }

    pub async fn route(&self, query: &str) -> RouteOutcome {
        let time_sensitive = is_time_sensitive(query);
        let mut decision = RoutingDecision::default();
        let mut relevance = None;
        let mut blocks = Vec::new();
        let mut failures = Vec::new();

        if time_sensitive {
            decision.use_web_search = true;
        } else {
            match self.retriever.retrieve(query, self.k).await {
                Ok(passages) => {
                    let rag_context = passages
                        .iter()
                        .map(|p| p.body.as_str())
                        .collect::<Vec<_>>()
                        .join("\n\n");
                    let score = self
                        .evaluator
                        .evaluate(query, &rag_context, self.scorer.as_ref())
                        .await;
                    relevance = Some(score);

                    if score >= self.threshold {
                        decision.use_knowledge_base = true;
                        blocks.push(ContextBlock::knowledge(score, rag_context));
                    } else {
                        tracing::info!(
                            score,
                            threshold = self.threshold,
                            "Knowledge base relevance too low, searching the web"
                        );
                        decision.use_web_search = true;
                    }
                }
                Err(e) => {
                    let message = BrainError::describe(&e);
                    tracing::warn!(error = %message, "Knowledge retrieval failed, searching the web");
                    blocks.push(ContextBlock::retrieval_error(message.clone()));
                    failures.push(BrainError::Retrieval(message));
                    decision.use_web_search = true;
                }
            }
        }

        if decision.use_web_search {
            match self.web_search.search(query).await {
                Ok(hits) => match format_search_fragments(&hits) {
                    Some(fragments) => blocks.push(ContextBlock::web_results(fragments)),
                    None => tracing::debug!(results = hits.len(), "Web search returned no content"),
                },
                Err(e) => {
                    let message = BrainError::describe(&e);
                    tracing::warn!(error = %message, "Web search failed");
                    blocks.push(ContextBlock::search_error(message.clone()));
                    failures.push(BrainError::Search(message));
                }
            }
        }

        tracing::info!(
            time_sensitive,
            relevance = ?relevance,
            knowledge_base = decision.use_knowledge_base,
            web_search = decision.use_web_search,
            blocks = blocks.len(),
            "Query routed"
        );

        RouteOutcome {
            time_sensitive,
            decision,
            relevance,
            blocks,
            failures,
        }
    }

    /// Route and return only the combined context.
    pub async fn route_context(&self, query: &str) -> String {
        self.route(query).await.combined_context()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FailingLlm, FailingRetriever, FailingSearch, ScriptedLlm, StaticRetriever, StaticSearch,
    };
    use crate::types::{SearchHit, SourceKind};

    const CIRCLE_PASSAGE: &str = "Warren Buffett emphasizes the importance of staying within one's \
        circle of competence. Investors should only invest in businesses they truly understand.";

    fn router(
        retriever: Arc<dyn KnowledgeRetriever>,
        search: Arc<dyn WebSearchProvider>,
        scorer: Arc<dyn LLMProvider>,
    ) -> Router {
        Router::new(retriever, search, scorer, &BrainConfig::default())
    }

    fn apple_hit() -> SearchHit {
        SearchHit::new("AAPL trades at $190", "https://example.com")
    }

    #[tokio::test]
    async fn test_relevant_knowledge_only() {
        let retriever = Arc::new(StaticRetriever::new([CIRCLE_PASSAGE]));
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let router = router(retriever.clone(), search.clone(), Arc::new(ScriptedLlm::new(["8"])));

        let outcome = router
            .route("What is Buffett's circle of competence principle?")
            .await;

        assert!(!outcome.time_sensitive);
        assert_eq!(outcome.relevance, Some(8));
        assert_eq!(
            outcome.decision,
            RoutingDecision {
                use_knowledge_base: true,
                use_web_search: false
            }
        );
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].source_kind, SourceKind::KnowledgeBase);
        assert_eq!(
            outcome.combined_context(),
            format!("**From Buffett's Knowledge Base:** (Relevance: 8/10)\n{}", CIRCLE_PASSAGE)
        );
        assert_eq!(search.calls(), 0);
        assert_eq!(retriever.calls(), 1);
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_time_sensitive_goes_straight_to_search() {
        let retriever = Arc::new(StaticRetriever::new([CIRCLE_PASSAGE]));
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let scorer = Arc::new(ScriptedLlm::new(["10"]));
        let router = router(retriever.clone(), search.clone(), scorer.clone());

        let outcome = router.route("What is the current price of Apple?").await;

        assert!(outcome.time_sensitive);
        assert_eq!(outcome.relevance, None);
        assert_eq!(retriever.calls(), 0);
        assert!(scorer.calls().is_empty());
        assert_eq!(search.calls(), 1);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].source_kind, SourceKind::WebSearch);
        assert_eq!(
            outcome.combined_context(),
            "**Real-Time Web Search Results:**\n\n**Source 1:** AAPL trades at $190\n📎 URL: https://example.com"
        );
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let router = router(
            Arc::new(StaticRetriever::new([CIRCLE_PASSAGE])),
            search.clone(),
            Arc::new(ScriptedLlm::new(["5"])),
        );

        let outcome = router.route("Explain the circle of competence principle").await;
        assert!(outcome.decision.use_knowledge_base);
        assert!(!outcome.decision.use_web_search);
        assert!(!outcome.fell_back_to_search());
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_below_threshold_falls_back_to_search() {
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let router = router(
            Arc::new(StaticRetriever::new([CIRCLE_PASSAGE])),
            search.clone(),
            Arc::new(ScriptedLlm::new(["4"])),
        );

        let outcome = router.route("Who runs Berkshire's insurance arm?").await;
        assert_eq!(outcome.relevance, Some(4));
        assert!(!outcome.decision.use_knowledge_base);
        assert!(outcome.decision.use_web_search);
        assert!(outcome.fell_back_to_search());
        assert_eq!(search.calls(), 1);

        // The rejected score is not placed in the answer context
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.blocks[0].source_kind, SourceKind::WebSearch);
        assert!(!outcome.combined_context().contains("4/10"));
    }

    #[tokio::test]
    async fn test_retrieval_failure_forces_search() {
        let retriever = Arc::new(FailingRetriever::default());
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let scorer = Arc::new(ScriptedLlm::new(["9"]));
        let router = router(retriever.clone(), search.clone(), scorer.clone());

        let outcome = router.route("What is an economic moat?").await;

        assert_eq!(retriever.calls(), 1);
        assert_eq!(search.calls(), 1);
        assert!(scorer.calls().is_empty());
        assert_eq!(outcome.relevance, None);
        assert!(outcome.decision.use_web_search);
        assert!(!outcome.decision.use_knowledge_base);
        assert!(outcome.blocks[0].is_error);
        assert!(matches!(outcome.failures.as_slice(), [BrainError::Retrieval(_)]));
        assert_eq!(
            outcome.combined_context(),
            "**RAG Retrieval Error:** vector store unavailable\n\n---\n\n\
             **Real-Time Web Search Results:**\n\n**Source 1:** AAPL trades at $190\n📎 URL: https://example.com"
        );
    }

    #[tokio::test]
    async fn test_search_failure_is_reported_without_further_fallback() {
        let retriever = Arc::new(StaticRetriever::new([CIRCLE_PASSAGE]));
        let search = Arc::new(FailingSearch::default());
        let router = router(retriever.clone(), search.clone(), Arc::new(ScriptedLlm::new(["9"])));

        let outcome = router.route("Latest Berkshire news").await;

        assert_eq!(search.calls(), 1);
        assert_eq!(retriever.calls(), 0);
        assert!(matches!(outcome.failures.as_slice(), [BrainError::Search(_)]));
        assert_eq!(
            outcome.combined_context(),
            "**Search Error:** Tavily error (401 Unauthorized)"
        );
    }

    #[tokio::test]
    async fn test_both_failures_produce_two_error_blocks() {
        let router = router(
            Arc::new(FailingRetriever::default()),
            Arc::new(FailingSearch::default()),
            Arc::new(ScriptedLlm::new(["9"])),
        );

        let outcome = router.route("What is float?").await;
        assert_eq!(outcome.blocks.len(), 2);
        assert!(outcome.blocks.iter().all(|b| b.is_error));
        assert_eq!(outcome.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_search_yields_fallback_text() {
        let router = router(
            Arc::new(StaticRetriever::new([CIRCLE_PASSAGE])),
            Arc::new(StaticSearch::new(vec![SearchHit::new("", "https://only-a-link.example")])),
            Arc::new(ScriptedLlm::new(["9"])),
        );

        let outcome = router.route("Stock split history today").await;
        assert!(outcome.blocks.is_empty());
        assert_eq!(outcome.combined_context(), NO_RELEVANT_INFORMATION);
    }

    #[tokio::test]
    async fn test_passages_joined_and_k_forwarded() {
        let retriever = Arc::new(StaticRetriever::new(["one", "two", "three", "four", "five"]));
        let router = router(
            retriever.clone(),
            Arc::new(StaticSearch::default()),
            Arc::new(ScriptedLlm::new(["9"])),
        );

        let outcome = router.route("What did Munger say about envy?").await;
        assert_eq!(retriever.last_k(), 4);
        assert_eq!(outcome.blocks[0].body, "one\n\ntwo\n\nthree\n\nfour");
    }

    #[tokio::test]
    async fn test_evaluator_failure_trusts_knowledge_base() {
        let search = Arc::new(StaticSearch::new(vec![apple_hit()]));
        let router = router(
            Arc::new(StaticRetriever::new([CIRCLE_PASSAGE])),
            search.clone(),
            Arc::new(FailingLlm),
        );

        let outcome = router.route("Explain the circle of competence principle").await;
        assert_eq!(outcome.relevance, Some(7));
        assert!(outcome.decision.use_knowledge_base);
        assert!(outcome.failures.is_empty());
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn test_same_inputs_same_context() {
        let router = router(
            Arc::new(StaticRetriever::new([CIRCLE_PASSAGE, "Margin of safety."])),
            Arc::new(StaticSearch::new(vec![apple_hit()])),
            Arc::new(ScriptedLlm::new(["6"])),
        );

        let first = router.route_context("Explain margin of safety").await;
        let second = router.route_context("Explain margin of safety").await;
        assert_eq!(first, second);

        let first = router.route_context("Apple price today").await;
        let second = router.route_context("Apple price today").await;
        assert_eq!(first, second);
    }

    #[test]
    fn test_combine_blocks_separator() {
        let blocks = vec![
            ContextBlock::retrieval_error("boom"),
            ContextBlock::search_error("bang"),
        ];
        assert_eq!(
            combine_blocks(&blocks),
            "**RAG Retrieval Error:** boom\n\n---\n\n**Search Error:** bang"
        );
        assert_eq!(combine_blocks(&[]), NO_RELEVANT_INFORMATION);
    }
}
