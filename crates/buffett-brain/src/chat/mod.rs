pub mod engine;

pub use engine::{ChatEngine, ChatTurn};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "Hello! I am **Buffett's Brain**.\n\n\
I know Warren Buffett's and Charlie Munger's investment philosophy from fifty years of their writings, \
and I can search the web for anything current.\n\n\
Try asking:\n\
- \"What is Buffett's circle of competence principle?\"\n\
- \"What would Charlie Munger say about cryptocurrency?\"\n\
- \"Explain the concept of economic moats\"\n\
- \"What are recent developments with Berkshire Hathaway?\" (web search)";

pub const CLEARED_GREETING: &str = "Chat cleared! Ask me anything.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only conversation history for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::starting_with(GREETING)
    }

    fn starting_with(greeting: &str) -> Self {
        let mut session = Self {
            messages: Vec::new(),
        };
        session.push(ChatRole::Assistant, greeting.to_string());
        session
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.messages.push(ChatMessage {
            role,
            content,
            timestamp: Utc::now(),
        });
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ChatRole::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Assistant, content.into());
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Start over with a fresh history.
    pub fn clear(&mut self) {
        *self = Self::starting_with(CLEARED_GREETING);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
