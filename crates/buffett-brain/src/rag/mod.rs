//! Routing core: time-sensitivity check, relevance judge, source router, answer prompt.

pub mod relevance;
pub mod router;
pub mod synthesis;
pub mod time_sensitivity;

pub use relevance::{
    evaluate_relevance, parse_relevance_reply, RelevanceEvaluator, FAIL_OPEN_RELEVANCE_SCORE,
};
pub use router::{combine_blocks, RouteOutcome, Router, BLOCK_SEPARATOR, NO_RELEVANT_INFORMATION};
pub use synthesis::{build_answer_prompt, synthesis_error_message, synthesize_answer};
pub use time_sensitivity::{is_time_sensitive, TIME_SENSITIVE_KEYWORDS};
