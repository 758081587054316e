use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BrainError;
use crate::llm::ApiProvider;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "BRAIN_CONFIG";
pub const TAVILY_API_KEY_ENV: &str = "TAVILY_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrainConfig {
    pub retrieval: RetrievalConfig,
    pub search: WebSearchConfig,
    pub llm: LlmSettings,
    pub corpus: CorpusConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages fetched from the knowledge base per query.
    pub k: usize,
    /// Minimum relevance score (1-10) for the knowledge base to be trusted.
    pub relevance_threshold: u8,
    /// How much of the retrieved context the relevance judge gets to see.
    pub evaluation_context_chars: usize,
    pub evaluation_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    pub endpoint: String,
    pub max_results: usize,
    pub search_depth: String,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ApiProvider,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    /// Output budget for the relevance score reply.
    pub scoring_max_tokens: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub docs_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub min_chunk_size: usize,
}

impl BrainConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<(), BrainError> {
        let invalid = |msg: &str| -> Result<(), BrainError> {
            Err(BrainError::Config(msg.to_string()))
        };

        if self.retrieval.k == 0 {
            return invalid("retrieval.k must be > 0");
        }
        if !(1..=10).contains(&self.retrieval.relevance_threshold) {
            return invalid("retrieval.relevance_threshold must be in [1, 10]");
        }
        if self.retrieval.evaluation_context_chars == 0 {
            return invalid("retrieval.evaluation_context_chars must be > 0");
        }
        if self.search.max_results == 0 {
            return invalid("search.max_results must be > 0");
        }
        if !matches!(self.search.search_depth.as_str(), "basic" | "advanced") {
            return invalid("search.search_depth must be \"basic\" or \"advanced\"");
        }
        if self.llm.model.trim().is_empty() {
            return invalid("llm.model must not be empty");
        }
        if self.llm.max_tokens == 0 || self.llm.scoring_max_tokens == 0 {
            return invalid("llm token budgets must be > 0");
        }
        if self.corpus.chunk_size < 50 {
            return invalid("corpus.chunk_size must be >= 50");
        }
        if self.corpus.chunk_overlap >= self.corpus.chunk_size {
            return invalid("corpus.chunk_overlap must be < chunk_size");
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self, BrainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BrainError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BrainError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$BRAIN_CONFIG` when set, otherwise use validated defaults.
    pub fn load() -> Result<Self, BrainError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(&path)),
            _ => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

/// Read a required secret from the environment.
pub fn require_env(name: &'static str) -> Result<String, BrainError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BrainError::MissingEnv(name)),
    }
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            retrieval: RetrievalConfig::default(),
            search: WebSearchConfig::default(),
            llm: LlmSettings::default(),
            corpus: CorpusConfig::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 4,
            relevance_threshold: 5,
            evaluation_context_chars: 1500,
            evaluation_timeout_secs: 20,
        }
    }
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.tavily.com/search".to_string(),
            max_results: 3,
            search_depth: "advanced".to_string(),
            include_answer: true,
            include_raw_content: false,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ApiProvider::Groq,
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            scoring_max_tokens: 8,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        let docs_dir = if Path::new("knowledge_base/docs").exists() {
            PathBuf::from("knowledge_base/docs")
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("buffett-brain")
                .join("docs")
        };

        Self {
            docs_dir,
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 50,
        }
    }
}
