//! Line-oriented file backend for the certification log.
//!
//! Layout: `<dir>/training_logs.jsonl` and `<dir>/failure_memory.jsonl`, one
//! JSON record per line. Every store opened on the same directory shares one
//! process-wide async mutex, so appends never interleave and scans never
//! observe a half-written line.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError};

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::schema::LogEntry;
use crate::storage_traits::{decode_lines, LogScan, LogStore, LogStream, StorageResult};

type DirLock = Arc<Mutex<()>>;

static DIR_LOCKS: OnceLock<std::sync::Mutex<HashMap<PathBuf, DirLock>>> = OnceLock::new();

fn lock_for(dir: &Path) -> DirLock {
    let registry = DIR_LOCKS.get_or_init(Default::default);
    let mut locks = registry.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(dir.to_path_buf()).or_default())
}

/// File-backed [`LogStore`].
#[derive(Debug, Clone)]
pub struct JsonlLogStore {
    dir: PathBuf,
    lock: DirLock,
}

impl JsonlLogStore {
    /// Open (creating if needed) the log directory at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;
        let dir = dir.canonicalize().map_err(|e| StorageError::io(dir, e))?;
        Ok(Self {
            lock: lock_for(&dir),
            dir,
        })
    }

    /// Canonical log directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `stream`.
    pub fn path_for(&self, stream: LogStream) -> PathBuf {
        self.dir.join(stream.file_name())
    }

    async fn append_line(&self, stream: LogStream, entry: &LogEntry) -> StorageResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let path = self.path_for(stream);

        let _guard = self.lock.lock().await;
        let io = |e| StorageError::io(&path, e);

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io)?;

        // A crash mid-write leaves a tail without a newline; start a fresh
        // line so only the torn record is lost.
        if ends_without_newline(&mut file).await.map_err(io)? {
            debug!(path = %path.display(), "repairing torn log tail");
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes()).await.map_err(io)?;
        file.flush().await.map_err(io)?;
        file.sync_data().await.map_err(io)?;
        Ok(())
    }
}

async fn ends_without_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata().await?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

#[async_trait]
impl LogStore for JsonlLogStore {
    async fn append(&self, entry: &LogEntry) -> StorageResult<()> {
        self.append_line(LogStream::All, entry).await
    }

    async fn append_failure(&self, entry: &LogEntry) -> StorageResult<()> {
        self.append_line(LogStream::Failures, entry).await
    }

    async fn scan(&self, stream: LogStream) -> StorageResult<LogScan> {
        let path = self.path_for(stream);
        let bytes = {
            let _guard = self.lock.lock().await;
            match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(LogScan::default())
                }
                Err(e) => return Err(StorageError::io(&path, e)),
            }
        };

        let scan = decode_lines(&bytes);
        if scan.malformed > 0 {
            warn!(
                path = %path.display(),
                malformed = scan.malformed,
                "skipped malformed log records"
            );
        }
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Verdict;

    fn entry(domain: &str, verdict: Verdict) -> LogEntry {
        LogEntry::new("MockAgent", domain, "q", "a", verdict, vec!["k".to_string()])
    }

    fn make_store() -> (tempfile::TempDir, JsonlLogStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlLogStore::open(dir.path().join("logs")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let (dir, store) = make_store();
        assert!(dir.path().join("logs").is_dir());
        assert!(store.path_for(LogStream::All).ends_with("training_logs.jsonl"));
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let (_dir, store) = make_store();
        let scan = store.scan(LogStream::Failures).await.unwrap();
        assert!(scan.entries.is_empty());
        assert_eq!(scan.malformed, 0);
    }

    #[tokio::test]
    async fn streams_are_separate_files() {
        let (_dir, store) = make_store();
        store.append(&entry("a", Verdict::Fail)).await.unwrap();
        store.append_failure(&entry("a", Verdict::Fail)).await.unwrap();
        store.append(&entry("b", Verdict::Pass)).await.unwrap();

        assert_eq!(store.read_all().await.unwrap().len(), 2);
        assert_eq!(store.read_failures().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn each_record_is_one_line() {
        let (_dir, store) = make_store();
        let mut e = entry("a", Verdict::Pass);
        e.answer = "line one\nline two".to_string();
        store.append(&e).await.unwrap();

        let text = std::fs::read_to_string(store.path_for(LogStream::All)).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.ends_with('\n'));
        assert_eq!(store.read_all().await.unwrap()[0].answer, "line one\nline two");
    }

    #[tokio::test]
    async fn stores_on_same_dir_share_lock() {
        let (dir, a) = make_store();
        let b = JsonlLogStore::open(dir.path().join("logs")).unwrap();
        assert!(Arc::ptr_eq(&a.lock, &b.lock));
    }

    #[tokio::test]
    async fn unwritable_dir_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let err = JsonlLogStore::open(&blocker).unwrap_err();
        assert!(err.is_io());
    }
}
