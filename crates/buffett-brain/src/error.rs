use thiserror::Error;

/// Failures the assistant absorbs and turns into visible, degraded output.
///
/// Relevance evaluation has no variant here: it fails open to a fixed score
/// and is only ever logged.
#[derive(Debug, Error)]
pub enum BrainError {
    #[error("knowledge retrieval failed: {0}")]
    Retrieval(String),

    #[error("web search failed: {0}")]
    Search(String),

    #[error("answer synthesis failed: {0}")]
    Synthesis(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

impl BrainError {
    /// Render an `anyhow` chain on one line (`outer: inner: root`).
    pub(crate) fn describe(err: &anyhow::Error) -> String {
        format!("{:#}", err)
    }
}
