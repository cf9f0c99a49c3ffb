//! On-disk record schema for the certification log.
//!
//! One [`LogEntry`] is serialized per line. Field names match the historical
//! log format (`question`, `evaluation`, `keywords_used`) so existing log
//! files stay readable.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Pass/fail outcome of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Lowercase label used in log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
        }
    }

    /// `true` for [`Verdict::Pass`].
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Verdict::Pass),
            "fail" => Ok(Verdict::Fail),
            other => Err(StorageError::UnknownVerdict(other.to_string())),
        }
    }
}

/// A single persisted evaluation result.
///
/// `evaluation` keeps the raw label instead of a [`Verdict`] so a record with
/// an unrecognized label is still readable; consumers decide what to do with
/// it via [`LogEntry::verdict`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    pub agent: String,
    pub domain: String,
    pub question: String,
    pub answer: String,
    pub evaluation: String,
    #[serde(default)]
    pub keywords_used: Vec<String>,
}

impl LogEntry {
    /// Create an entry stamped with the current time.
    pub fn new(
        agent: impl Into<String>,
        domain: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        verdict: Verdict,
        keywords_used: Vec<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            agent: agent.into(),
            domain: domain.into(),
            question: question.into(),
            answer: answer.into(),
            evaluation: verdict.as_str().to_string(),
            keywords_used,
        }
    }

    /// Parsed verdict, or `None` for an unrecognized label.
    pub fn verdict(&self) -> Option<Verdict> {
        self.evaluation.parse().ok()
    }

    /// Whether the stored label is a recognized `fail`.
    pub fn is_failure(&self) -> bool {
        self.verdict() == Some(Verdict::Fail)
    }
}

/// RFC 3339 on write; on read also accepts naive ISO-8601 timestamps
/// (no offset), which are taken as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|_| de::Error::custom(format!("invalid timestamp: {raw}")))
    }
}
