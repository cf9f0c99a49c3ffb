//! In-memory fake for the log store (testing only)
//!
//! `MemoryLogStore` keeps raw lines per stream and decodes them with the same
//! routine as the file backend, so corruption can be injected with
//! [`MemoryLogStore::push_raw`]. Writes can be made to fail with
//! [`MemoryLogStore::set_fail_writes`], or for one stream only with
//! [`MemoryLogStore::set_fail_stream`], to exercise I/O failure paths.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::schema::LogEntry;
use crate::storage_traits::*;

/// In-memory log store backed by a `HashMap<LogStream, lines>`.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    streams: Mutex<HashMap<LogStream, Vec<String>>>,
    fail_writes: AtomicBool,
    fail_streams: Mutex<HashSet<LogStream>>,
}

impl MemoryLogStore {
    /// Empty store with writes enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail with an I/O error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make appends to `stream` fail while the other stream keeps working.
    pub fn set_fail_stream(&self, stream: LogStream, fail: bool) {
        let mut failing = self.fail_streams.lock().unwrap();
        if fail {
            failing.insert(stream);
        } else {
            failing.remove(&stream);
        }
    }

    /// Append a raw line, bypassing serialization.
    pub fn push_raw(&self, stream: LogStream, line: impl Into<String>) {
        let mut streams = self.streams.lock().unwrap();
        streams.entry(stream).or_default().push(line.into());
    }

    /// Number of raw lines held for `stream`.
    pub fn line_count(&self, stream: LogStream) -> usize {
        let streams = self.streams.lock().unwrap();
        streams.get(&stream).map_or(0, Vec::len)
    }

    fn push_entry(&self, stream: LogStream, entry: &LogEntry) -> StorageResult<()> {
        let stream_failing = self.fail_streams.lock().unwrap().contains(&stream);
        if stream_failing || self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::io(
                format!("memory://{}", stream.file_name()),
                std::io::Error::new(std::io::ErrorKind::Other, "writes disabled"),
            ));
        }
        let line = serde_json::to_string(entry)?;
        self.push_raw(stream, line);
        Ok(())
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, entry: &LogEntry) -> StorageResult<()> {
        self.push_entry(LogStream::All, entry)
    }

    async fn append_failure(&self, entry: &LogEntry) -> StorageResult<()> {
        self.push_entry(LogStream::Failures, entry)
    }

    async fn scan(&self, stream: LogStream) -> StorageResult<LogScan> {
        let joined = {
            let streams = self.streams.lock().unwrap();
            streams
                .get(&stream)
                .map(|lines| lines.join("\n"))
                .unwrap_or_default()
        };
        Ok(decode_lines(joined.as_bytes()))
    }
}
