//! Question in, answer out: routes the query, then synthesizes over the combined context.

use std::sync::Arc;

use super::ChatSession;
use crate::config::BrainConfig;
use crate::error::BrainError;
use crate::llm::{GenerationConfig, LLMProvider};
use crate::rag::router::{RouteOutcome, Router};
use crate::rag::synthesis::{synthesis_error_message, synthesize_answer};

/// Result of one assistant turn.
#[derive(Debug)]
pub struct ChatTurn {
    /// Model answer, or the formatted error message when synthesis failed.
    pub answer: String,
    pub outcome: RouteOutcome,
    pub synthesis_error: Option<BrainError>,
}

pub struct ChatEngine {
    router: Arc<Router>,
    llm: Arc<dyn LLMProvider>,
    generation: GenerationConfig,
}

impl ChatEngine {
    pub fn new(router: Arc<Router>, llm: Arc<dyn LLMProvider>, config: &BrainConfig) -> Self {
        Self {
            router,
            llm,
            generation: GenerationConfig::from(&config.llm),
        }
    }

    /// Answer one question. Never fails: synthesis errors become the answer text.
    pub async fn answer(&self, query: &str) -> ChatTurn {
        let outcome = self.router.route(query).await;
        let context = outcome.combined_context();

        match synthesize_answer(self.llm.as_ref(), &self.generation, &context, query).await {
            Ok(answer) => ChatTurn {
                answer,
                outcome,
                synthesis_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Answer synthesis failed");
                ChatTurn {
                    answer: synthesis_error_message(&e),
                    outcome,
                    synthesis_error: Some(BrainError::Synthesis(BrainError::describe(&e))),
                }
            }
        }
    }

    /// Answer and record both turns in `session`.
    pub async fn respond(&self, session: &mut ChatSession, query: &str) -> ChatTurn {
        session.push_user(query);
        let turn = self.answer(query).await;
        session.push_assistant(turn.answer.clone());
        turn
    }
}
