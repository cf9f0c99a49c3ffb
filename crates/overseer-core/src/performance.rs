//! Per-domain pass/fail aggregation over the result log.
//!
//! Summaries are derived from a fresh scan on every call and never persisted.
//! Entries whose verdict label is not recognized are ignored.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use overseer_state::{LogEntry, LogStore, StorageResult, Verdict};
use serde::Serialize;

/// Pass and fail counts for one domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainTally {
    pub pass_count: u64,
    pub fail_count: u64,
}

impl DomainTally {
    /// Passes plus failures.
    pub fn total(&self) -> u64 {
        self.pass_count + self.fail_count
    }

    /// Fraction of passes, or `None` when nothing was recorded.
    pub fn pass_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.pass_count as f64 / total as f64)
    }

    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Pass => self.pass_count += 1,
            Verdict::Fail => self.fail_count += 1,
        }
    }
}

/// Ordered `domain -> tally` mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PerformanceSummary {
    domains: BTreeMap<String, DomainTally>,
}

impl PerformanceSummary {
    /// Tally `entries` by domain. Entries without a domain or with an
    /// unrecognized verdict label are ignored.
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> Self {
        let mut domains: BTreeMap<String, DomainTally> = BTreeMap::new();
        for entry in entries {
            if entry.domain.is_empty() {
                continue;
            }
            if let Some(verdict) = entry.verdict() {
                domains
                    .entry(entry.domain.clone())
                    .or_default()
                    .record(verdict);
            }
        }
        Self { domains }
    }

    /// Tally for `domain`, if anything was recorded for it.
    pub fn get(&self, domain: &str) -> Option<&DomainTally> {
        self.domains.get(domain)
    }

    /// Domains in sorted order with their tallies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainTally)> {
        self.domains.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Sum over all domains.
    pub fn totals(&self) -> DomainTally {
        self.domains
            .values()
            .fold(DomainTally::default(), |acc, t| DomainTally {
                pass_count: acc.pass_count + t.pass_count,
                fail_count: acc.fail_count + t.fail_count,
            })
    }

    /// Plain-text table, one row per domain plus a total row.
    pub fn render_table(&self) -> String {
        if self.domains.is_empty() {
            return "No certification results recorded.\n".to_string();
        }

        let width = self
            .domains
            .keys()
            .map(String::len)
            .chain(std::iter::once("domain".len()))
            .max()
            .unwrap_or(6);

        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:<width$}  {:>6}  {:>6}  {:>6}",
            "domain", "pass", "fail", "rate"
        );
        let rows = self
            .domains
            .iter()
            .map(|(d, t)| (d.as_str(), *t))
            .chain(std::iter::once(("total", self.totals())));
        for (domain, tally) in rows {
            let rate = tally
                .pass_rate()
                .map(|r| format!("{:.0}%", r * 100.0))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<width$}  {:>6}  {:>6}  {:>6}",
                domain, tally.pass_count, tally.fail_count, rate
            );
        }
        out
    }
}

/// Summarize every result in `store`.
pub async fn summarize(store: &dyn LogStore) -> StorageResult<PerformanceSummary> {
    let entries = store.read_all().await?;
    Ok(PerformanceSummary::from_entries(&entries))
}

/// Summarize only the results recorded for `agent`.
pub async fn summarize_agent(
    store: &dyn LogStore,
    agent: &str,
) -> StorageResult<PerformanceSummary> {
    let entries = store.read_all().await?;
    Ok(PerformanceSummary::from_entries(
        entries.iter().filter(|e| e.agent == agent),
    ))
}
