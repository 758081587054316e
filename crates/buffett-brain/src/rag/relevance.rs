//! LLM relevance judge for retrieved knowledge-base context.
//!
//! The judge answers with a bare 1-10 integer. Anything that goes wrong
//! (provider error, timeout, no number in the reply) yields
//! [`FAIL_OPEN_RELEVANCE_SCORE`]: the evaluator fails open and trusts the
//! knowledge base rather than blocking the answer.

use std::sync::LazyLock;
use std::time::Duration;

use crate::config::{LlmSettings, RetrievalConfig};
use crate::llm::{GenerationConfig, LLMProvider};

pub const MIN_RELEVANCE_SCORE: u8 = 1;
pub const MAX_RELEVANCE_SCORE: u8 = 10;

/// Score used when the judge cannot produce one.
pub const FAIL_OPEN_RELEVANCE_SCORE: u8 = 7;

/// Number of leading reply characters searched for the score.
const SCORE_REPLY_WINDOW: usize = 3;

static SCORE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"-?\d+").expect("score regex is valid"));

pub fn build_evaluation_prompt(query: &str, context: &str, max_context_chars: usize) -> String {
    let excerpt: String = context.chars().take(max_context_chars).collect();
    format!(
        "You are a STRICT evaluator. Decide whether the context can DIRECTLY answer the EXACT question asked.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\n\
         Rate relevance from 1 to 10:\n\
         - 1-2: Context is irrelevant to the question\n\
         - 3-4: Context covers related topics but does NOT answer the question\n\
         - 5-6: Context is partially relevant but misses key information\n\
         - 7-8: Context has most of the information needed but may lack specifics\n\
         - 9-10: Context fully and directly answers the question\n\n\
         CRITICAL: If the question asks for CURRENT, RECENT or YESTERDAY's data and the context only \
         holds HISTORICAL information, the score is at most 3.\n\n\
         Respond ONLY with a number from 1 to 10.",
        excerpt, query
    )
}

/// Pull the first integer out of the leading characters of the judge's reply.
///
/// Leading whitespace and markdown emphasis are skipped. A leading minus sign
/// is kept so that negative replies clamp to the minimum.
pub fn parse_relevance_reply(reply: &str) -> Option<i64> {
    let head: String = reply
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '"' | '`' | '\''))
        .chars()
        .take(SCORE_REPLY_WINDOW)
        .collect();
    SCORE_RE
        .find(&head)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

pub fn clamp_relevance(raw: i64) -> u8 {
    raw.clamp(MIN_RELEVANCE_SCORE as i64, MAX_RELEVANCE_SCORE as i64) as u8
}

/// Settings for one relevance judgement.
#[derive(Debug, Clone)]
pub struct RelevanceEvaluator {
    generation: GenerationConfig,
    max_context_chars: usize,
    timeout: Duration,
}

impl RelevanceEvaluator {
    pub fn new(retrieval: &RetrievalConfig, llm: &LlmSettings) -> Self {
        Self {
            generation: GenerationConfig::scoring(llm),
            max_context_chars: retrieval.evaluation_context_chars,
            timeout: Duration::from_secs(retrieval.evaluation_timeout_secs.max(1)),
        }
    }

    /// Score `context` against `query`, always in `[1, 10]`.
    pub async fn evaluate(&self, query: &str, context: &str, scorer: &dyn LLMProvider) -> u8 {
        let prompt = build_evaluation_prompt(query, context, self.max_context_chars);

        let reply = match tokio::time::timeout(self.timeout, scorer.generate(&prompt, &self.generation)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    fallback = FAIL_OPEN_RELEVANCE_SCORE,
                    "Relevance evaluation failed, trusting knowledge base"
                );
                return FAIL_OPEN_RELEVANCE_SCORE;
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.timeout.as_secs(),
                    fallback = FAIL_OPEN_RELEVANCE_SCORE,
                    "Relevance evaluation timed out, trusting knowledge base"
                );
                return FAIL_OPEN_RELEVANCE_SCORE;
            }
        };

        match parse_relevance_reply(&reply) {
            Some(raw) => {
                let score = clamp_relevance(raw);
                tracing::debug!(raw, score, "Relevance reply parsed");
                score
            }
            None => {
                tracing::warn!(
                    reply = %reply.chars().take(80).collect::<String>(),
                    fallback = FAIL_OPEN_RELEVANCE_SCORE,
                    "No score in relevance reply, trusting knowledge base"
                );
                FAIL_OPEN_RELEVANCE_SCORE
            }
        }
    }
}

impl Default for RelevanceEvaluator {
    fn default() -> Self {
        Self::new(&RetrievalConfig::default(), &LlmSettings::default())
    }
}

/// Score with default evaluator settings.
pub async fn evaluate_relevance(query: &str, context: &str, scorer: &dyn LLMProvider) -> u8 {
    RelevanceEvaluator::default().evaluate(query, context, scorer).await
}
