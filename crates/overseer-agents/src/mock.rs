//! Deterministic canned-answer agent.

use async_trait::async_trait;

use crate::adapter::Agent;
use crate::search::WebSearchAgent;

/// Answer given when no canned rule matches.
pub const UNKNOWN_ANSWER: &str = "I don't know.";

/// A single lookup rule: if `needle` occurs in the prompt, answer `answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedAnswer {
    pub needle: String,
    pub answer: String,
}

impl CannedAnswer {
    /// Rule answering `answer` to any prompt containing `needle`.
    pub fn new(needle: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            needle: needle.into().to_lowercase(),
            answer: answer.into(),
        }
    }
}

/// Answers from an ordered table of substring rules; the first match wins.
pub struct MockAgent {
    name: String,
    rules: Vec<CannedAnswer>,
    search: Option<WebSearchAgent>,
}

impl Default for MockAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgent {
    /// Mock agent with the reference answer table.
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Mock agent answering from `rules` only, in order. An empty table
    /// answers every prompt with [`UNKNOWN_ANSWER`].
    pub fn with_rules(rules: Vec<CannedAnswer>) -> Self {
        Self {
            name: "MockAgent".to_string(),
            rules,
            search: None,
        }
    }

    /// Override the reported agent name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Route prompts that ask to search or look something up to `search`
    /// when no canned rule matches.
    pub fn with_search_fallback(mut self, search: WebSearchAgent) -> Self {
        self.search = Some(search);
        self
    }

    /// Canned answer for `prompt`, matched case-insensitively.
    pub fn lookup(&self, prompt: &str) -> Option<&str> {
        let prompt = prompt.to_lowercase();
        self.rules
            .iter()
            .find(|rule| prompt.contains(&rule.needle))
            .map(|rule| rule.answer.as_str())
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, prompt: &str) -> String {
        if let Some(answer) = self.lookup(prompt) {
            return answer.to_string();
        }
        if let Some(search) = &self.search {
            let lowered = prompt.to_lowercase();
            if lowered.contains("search") || lowered.contains("lookup") {
                return search.respond(prompt).await;
            }
        }
        UNKNOWN_ANSWER.to_string()
    }
}

fn default_rules() -> Vec<CannedAnswer> {
    vec![
        CannedAnswer::new("palindrome", "def is_palindrome(s): return s == s[::-1]"),
        CannedAnswer::new(
            "weather",
            "import requests\nrequests.get('https://api.weatherapi.com/')",
        ),
        CannedAnswer::new("add", "def add(x, y): return x + y"),
        CannedAnswer::new("off-by-one", "for i in range(11): print(i)"),
        CannedAnswer::new(
            "align",
            "To align outputs, we consider intent, context, and give clear instructions.",
        ),
        CannedAnswer::new(
            "harmful",
            "Use safety filters, apply guardrails and run moderation checks.",
        ),
        CannedAnswer::new(
            "route",
            "A router system matches agent capabilities with tasks dynamically.",
        ),
        CannedAnswer::new(
            "coordinat",
            "Use task priority queues and agent coordination protocols.",
        ),
    ]
}
