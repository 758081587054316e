use anyhow::Result;

use crate::llm::{GenerationConfig, LLMProvider};

const ANSWER_INSTRUCTIONS: &str = r#"You are 'Buffett's Brain', an expert financial analyst and patient value investor.

Answer the user's question thoroughly and accurately using the information below.

IMPORTANT:
1. Start by briefly restating the question.
2. If web search results contain specific data (numbers, prices, dates), use that data directly.
3. If web search results only provide links without actual data, say so and list the links.
4. Never invent data that is not present in the search results.
5. When drawing on the knowledge base, cite Buffett's or Munger's words and where they come from."#;

pub fn build_answer_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\n{}\n\nQuestion: {}\n\nAnswer:",
        ANSWER_INSTRUCTIONS, context, question
    )
}

/// Ask the model for the final answer; the reply is returned untouched.
pub async fn synthesize_answer(
    llm: &dyn LLMProvider,
    generation: &GenerationConfig,
    context: &str,
    question: &str,
) -> Result<String> {
    let prompt = build_answer_prompt(context, question);
    tracing::debug!(prompt_len = prompt.len(), "Synthesizing answer");
    llm.generate(&prompt, generation).await
}

/// Text shown in place of an answer when synthesis fails.
pub fn synthesis_error_message(err: &anyhow::Error) -> String {
    format!("⚠️ **Error generating response:** {:#}", err)
}
