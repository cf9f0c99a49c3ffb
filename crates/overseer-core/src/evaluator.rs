//! Keyword-presence scoring.
//!
//! An answer passes when every required keyword appears in it as a plain
//! substring after full Unicode case folding of both sides, so `ß` matches
//! `SS`. There is no partial credit and keyword order does not matter. A
//! missing answer is scored as the empty string.

use chrono::{DateTime, Utc};
use overseer_state::Verdict;

use crate::domain::{EvaluationResult, RubricEntry};

/// Score `answer` against `entry`, timestamped now.
pub fn evaluate(entry: &RubricEntry, answer: &str) -> EvaluationResult {
    evaluate_at(entry, answer, Utc::now())
}

/// Score `answer` against `entry` with a caller-supplied timestamp.
pub fn evaluate_at(
    entry: &RubricEntry,
    answer: &str,
    timestamp: DateTime<Utc>,
) -> EvaluationResult {
    let verdict = if missing_keywords(entry, answer).is_empty() {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    EvaluationResult {
        domain: entry.domain().to_string(),
        prompt: entry.prompt().to_string(),
        answer: answer.to_string(),
        verdict,
        keywords_used: entry.required_keywords().to_vec(),
        timestamp,
    }
}

/// Required keywords that do not occur in `answer`, in declaration order.
pub fn missing_keywords<'a>(entry: &'a RubricEntry, answer: &str) -> Vec<&'a str> {
    let haystack = fold(answer);
    entry
        .required_keywords()
        .iter()
        .filter(|keyword| !haystack.contains(&fold(keyword)))
        .map(String::as_str)
        .collect()
}

fn fold(text: &str) -> String {
    caseless::default_case_fold_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn palindrome() -> RubricEntry {
        RubricEntry::new(
            "code_generation",
            "Write a Python function to check for palindrome.",
            ["def", "[::-1]", "=="],
        )
    }

    #[test]
    fn palindrome_answer_passes() {
        let result = evaluate(&palindrome(), "def is_palindrome(s): return s == s[::-1]");
        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.keywords_used, ["def", "[::-1]", "=="]);
        assert_eq!(result.domain, "code_generation");
    }

    #[test]
    fn one_missing_keyword_fails() {
        let entry = palindrome();
        let result = evaluate(&entry, "def is_palindrome(s): return s is reversed(s)");
        assert_eq!(result.verdict, Verdict::Fail);
        assert_eq!(missing_keywords(&entry, &result.answer), ["[::-1]", "=="]);
        // keywords_used reports the full requirement set, not just the hits
        assert_eq!(result.keywords_used.len(), 3);
    }

    #[test]
    fn matching_ignores_case() {
        let entry = RubricEntry::new("agent_alignment", "q", ["Safety", "guardrails"]);
        let result = evaluate(&entry, "SAFETY first, then GuardRails.");
        assert!(result.passed());
    }

    #[test]
    fn sharp_s_matches_after_uppercasing() {
        let entry = RubricEntry::new("d", "q", ["straße"]);
        let answer = "use straße here";
        assert!(evaluate(&entry, answer).passed());
        assert!(evaluate(&entry, &answer.to_uppercase()).passed());
        assert!(evaluate(&entry, "USE STRASSE HERE").passed());

        let shouting = RubricEntry::new("d", "q", ["STRASSE"]);
        assert!(evaluate(&shouting, answer).passed());
    }

    #[test]
    fn final_sigma_matches_either_form() {
        let entry = RubricEntry::new("d", "q", ["λόγος"]);
        assert!(evaluate(&entry, "ΛΌΓΟΣ").passed());
        assert!(evaluate(&entry, &"ΛΌΓΟΣ".to_lowercase()).passed());
    }

    #[test]
    fn empty_answer_fails_when_keywords_required() {
        assert_eq!(evaluate(&palindrome(), "").verdict, Verdict::Fail);
    }

    #[test]
    fn empty_keyword_set_always_passes() {
        let entry = RubricEntry::new("d", "q", Vec::<String>::new());
        assert!(evaluate(&entry, "").passed());
        assert!(evaluate(&entry, "anything at all").passed());
    }

    #[test]
    fn order_does_not_matter() {
        let entry = RubricEntry::new("debugging", "q", ["+", "return"]);
        assert!(evaluate(&entry, "return x + y").passed());
        assert!(evaluate(&entry, "x + y; return").passed());
    }

    proptest! {
        #[test]
        fn case_of_answer_never_changes_verdict(
            answer in "\\PC{0,64}",
            keywords in proptest::collection::vec("\\PC{1,4}", 0..4),
        ) {
            let entry = RubricEntry::new("d", "q", keywords);
            let verdict = evaluate(&entry, &answer).verdict;
            prop_assert_eq!(evaluate(&entry, &answer.to_uppercase()).verdict, verdict);
            prop_assert_eq!(evaluate(&entry, &answer.to_lowercase()).verdict, verdict);
        }

        #[test]
        fn embedded_keywords_pass_in_any_case(
            prefix in "\\PC{0,16}",
            suffix in "\\PC{0,16}",
            keywords in proptest::collection::vec("[a-zA-Z0-9ßà-ÿα-ωа-я]{1,4}", 1..4),
        ) {
            let answer = format!("{prefix}{}{suffix}", keywords.join(" "));
            let entry = RubricEntry::new("d", "q", keywords);
            prop_assert!(evaluate(&entry, &answer).passed());
            prop_assert!(evaluate(&entry, &answer.to_uppercase()).passed());
            prop_assert!(evaluate(&entry, &answer.to_lowercase()).passed());
        }

        #[test]
        fn empty_keywords_pass_any_answer(answer in ".*") {
            let entry = RubricEntry::new("d", "q", Vec::<String>::new());
            prop_assert!(evaluate(&entry, &answer).passed());
        }
    }
}
