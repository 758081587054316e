//! OpenAI-compatible chat completions client (Groq, OpenAI, OpenRouter, Together, Ollama)

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ApiProvider, GenerationConfig, LLMProvider, ProviderInfo};

/// External API provider speaking the `/chat/completions` dialect.
pub struct SimpleExternalProvider {
    provider: ApiProvider,
    api_key: String,
    model: String,
    client: Client,
}

impl SimpleExternalProvider {
    pub fn new(provider: ApiProvider, api_key: String, model: String) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(120))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()?;

        tracing::info!(
            provider = provider.name(),
            model = %model,
            "Creating SimpleExternalProvider (connect_timeout=15s)"
        );

        Ok(Self {
            provider,
            api_key,
            model,
            client,
        })
    }

    fn request_body(&self, prompt: &str, config: &GenerationConfig) -> Value {
        let mut request = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "top_p": config.top_p,
            "stream": false
        });
        if !config.stop_sequences.is_empty() {
            request["stop"] = json!(config.stop_sequences);
        }
        request
    }

    /// Parse a response body as JSON, returning a clear error if the server returned HTML
    /// (e.g. a gateway error page) instead of valid JSON.
    fn parse_completion(body: &str, endpoint: &str) -> Result<String> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('<') {
            let preview: String = trimmed.chars().take(200).collect();
            return Err(anyhow!(
                "Endpoint {} returned HTML instead of JSON, the service may be down: {}",
                endpoint,
                preview
            ));
        }

        let result: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            let preview: String = body.chars().take(300).collect();
            anyhow!("Failed to parse JSON from {}: {}. Response body: {}", endpoint, e, preview)
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("No choices returned from {}", endpoint))
    }
}

#[async_trait]
impl LLMProvider for SimpleExternalProvider {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let endpoint = self.provider.endpoint();
        tracing::debug!(
            endpoint = %endpoint,
            model = %self.model,
            max_tokens = config.max_tokens,
            prompt_len = prompt.len(),
            "Sending OpenAI-compatible request"
        );

        let mut request = self.client.post(&endpoint).json(&self.request_body(prompt, config));
        if !self.api_key.is_empty() {
            request = request.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                anyhow!("Request to {} timed out", endpoint)
            } else if e.is_connect() {
                anyhow!("Failed to connect to {}: {}", endpoint, e)
            } else {
                anyhow!("Request to {} failed: {}", endpoint, e)
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", endpoint, e))?;

        if !status.is_success() {
            tracing::error!(endpoint = %endpoint, status = %status, "API returned error");
            return Err(anyhow!("API error ({}): {}", status, body));
        }

        let content = Self::parse_completion(&body, &endpoint)?;
        tracing::debug!("API response received, {} chars", content.len());
        Ok(content)
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.provider.name().to_string(),
            model: self.model.clone(),
            is_local: matches!(self.provider, ApiProvider::Ollama),
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}
