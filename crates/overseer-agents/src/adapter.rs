//! The answer-producing capability and its closed set of implementations.
//!
//! Every [`Agent`] is infallible from the caller's point of view: external
//! failures come back as answer text so the evaluator can still score them.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use crate::mock::MockAgent;
use crate::remote::RemoteAgent;
use crate::search::WebSearchAgent;

/// Something that answers certification prompts.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Name recorded with every log entry.
    fn name(&self) -> &str;

    /// Answer `prompt`. Never fails.
    async fn respond(&self, prompt: &str) -> String;
}

/// Which adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Mock,
    Remote,
    WebSearch,
}

impl AgentKind {
    /// Name accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Mock => "mock",
            AgentKind::Remote => "remote",
            AgentKind::WebSearch => "search",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown agent kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent kind '{0}' (expected mock, remote or search)")]
pub struct UnknownAgentKind(pub String);

impl FromStr for AgentKind {
    type Err = UnknownAgentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" | "mockagent" => Ok(AgentKind::Mock),
            "remote" | "gemini" => Ok(AgentKind::Remote),
            "search" | "web-search" | "websearch" => Ok(AgentKind::WebSearch),
            _ => Err(UnknownAgentKind(s.to_string())),
        }
    }
}

/// Closed set of agent variants, chosen once at construction.
pub enum AgentAdapter {
    Mock(MockAgent),
    Remote(RemoteAgent),
    WebSearch(WebSearchAgent),
}

impl AgentAdapter {
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentAdapter::Mock(_) => AgentKind::Mock,
            AgentAdapter::Remote(_) => AgentKind::Remote,
            AgentAdapter::WebSearch(_) => AgentKind::WebSearch,
        }
    }
}

impl From<MockAgent> for AgentAdapter {
    fn from(agent: MockAgent) -> Self {
        AgentAdapter::Mock(agent)
    }
}

impl From<RemoteAgent> for AgentAdapter {
    fn from(agent: RemoteAgent) -> Self {
        AgentAdapter::Remote(agent)
    }
}

impl From<WebSearchAgent> for AgentAdapter {
    fn from(agent: WebSearchAgent) -> Self {
        AgentAdapter::WebSearch(agent)
    }
}

#[async_trait]
impl Agent for AgentAdapter {
    fn name(&self) -> &str {
        match self {
            AgentAdapter::Mock(a) => a.name(),
            AgentAdapter::Remote(a) => a.name(),
            AgentAdapter::WebSearch(a) => a.name(),
        }
    }

    async fn respond(&self, prompt: &str) -> String {
        match self {
            AgentAdapter::Mock(a) => a.respond(prompt).await,
            AgentAdapter::Remote(a) => a.respond(prompt).await,
            AgentAdapter::WebSearch(a) => a.respond(prompt).await,
        }
    }
}
