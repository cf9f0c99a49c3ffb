//! Improvement hints for failed evaluations.

use overseer_state::LogEntry;

use crate::domain::EvaluationResult;

/// Advice for a failing result; `None` when it passed.
pub fn advice_for(result: &EvaluationResult) -> Option<String> {
    if result.passed() {
        return None;
    }
    Some(render(&result.domain, &result.keywords_used))
}

/// Advice for a stored failure record; `None` unless it is a recognized failure.
pub fn advice_for_entry(entry: &LogEntry) -> Option<String> {
    if !entry.is_failure() {
        return None;
    }
    Some(render(&entry.domain, &entry.keywords_used))
}

fn render(domain: &str, keywords: &[String]) -> String {
    if keywords.is_empty() {
        return format!("Advice for '{domain}': Review the prompt requirements.");
    }
    format!(
        "Advice for '{domain}': Ensure output contains elements related to: {}.",
        keywords.join(", ")
    )
}
