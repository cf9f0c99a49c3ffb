//! Storage trait definitions for the certification log
//!
//! The log is split into two append-only streams:
//! - `LogStream::All`: every evaluation result
//! - `LogStream::Failures`: the subset whose verdict is `fail`
//!
//! The trait is async and backend-agnostic. `JsonlLogStore` persists to
//! line-oriented files; `fakes::MemoryLogStore` keeps lines in memory for
//! testing.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::schema::LogEntry;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Which of the two log streams an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogStream {
    All,
    Failures,
}

impl LogStream {
    /// File name used by line-oriented backends.
    pub fn file_name(&self) -> &'static str {
        match self {
            LogStream::All => "training_logs.jsonl",
            LogStream::Failures => "failure_memory.jsonl",
        }
    }
}

/// Outcome of reading a whole stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogScan {
    /// Valid entries, oldest first.
    pub entries: Vec<LogEntry>,
    /// Lines that could not be decoded and were skipped.
    pub malformed: usize,
}

/// Decode newline-separated records, skipping blank lines and isolating
/// each undecodable line.
pub fn decode_lines(bytes: &[u8]) -> LogScan {
    let mut scan = LogScan::default();
    for line in bytes.split(|b| *b == b'\n') {
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<LogEntry>(line) {
            Ok(entry) => scan.entries.push(entry),
            Err(_) => scan.malformed += 1,
        }
    }
    scan
}

/// Append-only certification result log.
///
/// Guarantees:
/// - Entries are returned in append order.
/// - A corrupt record only hides itself, never its neighbours.
/// - Appends and full scans on the same backing store are serialized.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Append to the all-results stream.
    async fn append(&self, entry: &LogEntry) -> StorageResult<()>;

    /// Append to the failures-only stream.
    async fn append_failure(&self, entry: &LogEntry) -> StorageResult<()>;

    /// Read a whole stream, reporting how many lines were skipped.
    async fn scan(&self, stream: LogStream) -> StorageResult<LogScan>;

    /// All results, oldest first.
    async fn read_all(&self) -> StorageResult<Vec<LogEntry>> {
        Ok(self.scan(LogStream::All).await?.entries)
    }

    /// Failures only, oldest first.
    async fn read_failures(&self) -> StorageResult<Vec<LogEntry>> {
        Ok(self.scan(LogStream::Failures).await?.entries)
    }
}
