use chrono::{DateTime, Utc};
use overseer_state::{LogEntry, Verdict};
use serde::{Deserialize, Serialize};

/// Outcome of scoring one answer against one rubric entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub domain: String,
    pub prompt: String,
    pub answer: String,
    pub verdict: Verdict,
    pub keywords_used: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl EvaluationResult {
    /// Shorthand for `verdict == Verdict::Pass`.
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }

    /// The persisted form of this result, attributed to `agent`.
    pub fn to_log_entry(&self, agent: &str) -> LogEntry {
        LogEntry {
            timestamp: self.timestamp,
            agent: agent.to_string(),
            domain: self.domain.clone(),
            question: self.prompt.clone(),
            answer: self.answer.clone(),
            evaluation: self.verdict.as_str().to_string(),
            keywords_used: self.keywords_used.clone(),
        }
    }
}
