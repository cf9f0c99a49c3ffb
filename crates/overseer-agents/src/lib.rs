//! Overseer-Agents: answer sources for certification runs
//!
//! Provides the [`Agent`] capability and its three implementations:
//!
//! - [`MockAgent`]: canned answers keyed by prompt substrings
//! - [`RemoteAgent`]: a language model behind a [`ModelBackend`]
//! - [`WebSearchAgent`]: snippets from one or more [`RetrievalBackend`]s
//!
//! ## Layer 1 - Answer Sources
//!
//! Every agent answers; none of them fail. External errors and timeouts are
//! reported in the answer text.

pub mod adapter;
pub mod error;
pub mod mock;
pub mod remote;
pub mod search;

pub use adapter::{Agent, AgentAdapter, AgentKind, UnknownAgentKind};
pub use error::BackendError;
pub use mock::{CannedAnswer, MockAgent, UNKNOWN_ANSWER};
pub use remote::{GeminiBackend, GeminiConfig, ModelBackend, RemoteAgent, DEFAULT_GEMINI_ENDPOINT};
pub use search::{
    first_paragraph, HttpSearchBackend, RetrievalBackend, SearchConfig, WebSearchAgent,
    SEARCH_FAILED,
};
