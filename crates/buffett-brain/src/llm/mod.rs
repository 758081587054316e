//! LLM Module - text generation behind a single provider trait
//! Used twice per query: a short relevance score and the long-form answer.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{require_env, LlmSettings};

pub mod simple_external;

pub use simple_external::SimpleExternalProvider;

/// OpenAI-compatible chat completion APIs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApiProvider {
    Groq,
    OpenAI,
    OpenRouter,
    Together,
    Ollama,
    Custom { endpoint: String },
}

impl ApiProvider {
    pub fn endpoint(&self) -> String {
        match self {
            Self::Groq => "https://api.groq.com/openai/v1/chat/completions".to_string(),
            Self::OpenAI => "https://api.openai.com/v1/chat/completions".to_string(),
            Self::OpenRouter => "https://openrouter.ai/api/v1/chat/completions".to_string(),
            Self::Together => "https://api.together.xyz/v1/chat/completions".to_string(),
            Self::Ollama => "http://localhost:11434/v1/chat/completions".to_string(),
            Self::Custom { endpoint } => endpoint.clone(),
        }
    }

    /// Environment variable holding the API key. Local Ollama needs none.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Groq => Some("GROQ_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Together => Some("TOGETHER_API_KEY"),
            Self::Custom { .. } => Some("LLM_API_KEY"),
            Self::Ollama => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Groq => "Groq",
            Self::OpenAI => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::Together => "Together",
            Self::Ollama => "Ollama",
            Self::Custom { .. } => "Custom",
        }
    }
}

/// Core trait for LLM providers
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    /// Get provider info
    fn info(&self) -> ProviderInfo;

    /// Check if provider is ready
    async fn is_ready(&self) -> bool {
        true
    }
}

/// Generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl GenerationConfig {
    /// Settings for the relevance judge: deterministic and tiny.
    pub fn scoring(settings: &LlmSettings) -> Self {
        Self {
            max_tokens: settings.scoring_max_tokens,
            temperature: 0.0,
            top_p: 1.0,
            stop_sequences: vec![],
        }
    }
}

impl From<&LlmSettings> for GenerationConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: 1.0,
            stop_sequences: vec![],
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::from(&LlmSettings::default())
    }
}

/// Provider information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
    pub is_local: bool,
}

/// Build the configured provider, reading its API key from the environment.
pub fn create_provider(settings: &LlmSettings) -> Result<Arc<dyn LLMProvider>> {
    let api_key = match settings.provider.api_key_env() {
        Some(var) => require_env(var)?,
        None => String::new(),
    };
    let provider = SimpleExternalProvider::new(
        settings.provider.clone(),
        api_key,
        settings.model.clone(),
    )?;
    Ok(Arc::new(provider))
}
