use serde::{Deserialize, Serialize};

/// One certification prompt with the keywords a passing answer must contain.
///
/// `required_keywords` holds each keyword once, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricEntry {
    domain: String,
    prompt: String,
    required_keywords: Vec<String>,
}

impl RubricEntry {
    /// Build an entry. Duplicate keywords are dropped, first occurrence wins.
    pub fn new<I, K>(domain: impl Into<String>, prompt: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let mut required_keywords: Vec<String> = Vec::new();
        for keyword in keywords {
            let keyword = keyword.into();
            if !required_keywords.contains(&keyword) {
                required_keywords.push(keyword);
            }
        }
        Self {
            domain: domain.into(),
            prompt: prompt.into(),
            required_keywords,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Keywords an answer must contain, in declaration order.
    pub fn required_keywords(&self) -> &[String] {
        &self.required_keywords
    }
}
