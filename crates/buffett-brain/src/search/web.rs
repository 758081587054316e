//! Tavily web search client.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::WebSearchProvider;
use crate::config::WebSearchConfig;
use crate::types::SearchHit;

pub struct TavilySearch {
    api_key: String,
    config: WebSearchConfig,
    client: Client,
}

impl TavilySearch {
    pub fn new(api_key: String, config: WebSearchConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(15))
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        tracing::info!(
            endpoint = %config.endpoint,
            max_results = config.max_results,
            depth = %config.search_depth,
            "Creating Tavily search client"
        );

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    fn request_body(&self, query: &str) -> Value {
        json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": self.config.max_results,
            "search_depth": self.config.search_depth,
            "include_answer": self.config.include_answer,
            "include_raw_content": self.config.include_raw_content,
        })
    }

    fn parse_results(body: &str) -> Result<Vec<SearchHit>> {
        let response: TavilyResponse =
            serde_json::from_str(body).context("Failed to parse Tavily response")?;
        Ok(response.results)
    }
}

#[async_trait]
impl WebSearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let endpoint = &self.config.endpoint;
        let response = self
            .client
            .post(endpoint)
            .json(&self.request_body(query))
            .send()
            .await
            .map_err(|e| anyhow!("Request to {} failed: {}", endpoint, e))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let preview: String = body.chars().take(300).collect();
            return Err(anyhow!("Tavily error ({}): {}", status, preview));
        }

        let hits = Self::parse_results(&body)?;
        tracing::debug!(results = hits.len(), "Tavily search returned");
        Ok(hits)
    }
}

#[derive(Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}
