//! Terminal chat front end
//!
//! Run with: cargo run -p buffett-brain --bin buffett-chat
//! Needs GROQ_API_KEY (or the key for the configured provider) and TAVILY_API_KEY.

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use buffett_brain::config::{require_env, BrainConfig, TAVILY_API_KEY_ENV};
use buffett_brain::processing::{load_corpus, TextChunker};
use buffett_brain::{create_provider, ChatEngine, ChatSession, KnowledgeIndex, Router, TavilySearch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BrainConfig::load()?;
    let tavily_key = require_env(TAVILY_API_KEY_ENV)?;

    let llm = create_provider(&config.llm).context("Failed to create LLM provider")?;
    let search = Arc::new(TavilySearch::new(tavily_key, config.search.clone())?);

    let chunker = TextChunker::from_config(&config.corpus);
    let chunks = match load_corpus(&config.corpus.docs_dir, &chunker) {
        Ok(chunks) => chunks,
        Err(e) => {
            tracing::warn!(error = %e, "No knowledge base loaded, answers will rely on web search");
            Vec::new()
        }
    };
    let index = Arc::new(KnowledgeIndex::from_chunks(&chunks)?);

    let router = Arc::new(Router::new(index, search, llm.clone(), &config));
    let engine = ChatEngine::new(router, llm, &config);
    let mut session = ChatSession::new();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(greeting) = session.last() {
        stdout
            .write_all(format!("{}\n\n(/clear resets the chat, /quit exits)\n", greeting.content).as_bytes())
            .await?;
    }

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();

        match query {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear();
                if let Some(message) = session.last() {
                    stdout.write_all(format!("{}\n", message.content).as_bytes()).await?;
                }
                continue;
            }
            _ => {}
        }

        let turn = engine.respond(&mut session, query).await;
        stdout.write_all(format!("\n{}\n", turn.answer).as_bytes()).await?;
    }

    Ok(())
}
