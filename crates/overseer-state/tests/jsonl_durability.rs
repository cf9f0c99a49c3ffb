//! Durability tests for the file-backed log: torn tails, legacy records and
//! concurrent writers.

use std::io::Write;
use std::sync::Arc;

use overseer_state::storage_traits::*;
use overseer_state::{JsonlLogStore, LogEntry, Verdict};

fn entry(domain: &str, verdict: Verdict) -> LogEntry {
    LogEntry::new("MockAgent", domain, "q", "a", verdict, vec![])
}

/// Test: a torn final line does not hide earlier records
#[tokio::test]
async fn truncated_trailing_line_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlLogStore::open(dir.path()).unwrap();
    store.append(&entry("a", Verdict::Pass)).await.unwrap();
    store.append(&entry("b", Verdict::Fail)).await.unwrap();

    // Simulate a crash halfway through the third record.
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .open(store.path_for(LogStream::All))
        .unwrap();
    file.write_all(br#"{"timestamp":"2026-01-01T00:00:00Z","agent":"Mo"#)
        .unwrap();
    drop(file);

    let scan = store.scan(LogStream::All).await.unwrap();
    assert_eq!(scan.malformed, 1);
    let domains: Vec<_> = scan.entries.iter().map(|e| e.domain.as_str()).collect();
    assert_eq!(domains, vec!["a", "b"]);
}

/// Test: appending after a torn tail starts a fresh line
#[tokio::test]
async fn append_after_torn_tail_keeps_new_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlLogStore::open(dir.path()).unwrap();
    store.append(&entry("a", Verdict::Pass)).await.unwrap();

    let path = store.path_for(LogStream::All);
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(b"{\"timestamp\":").unwrap();
    drop(file);

    store.append(&entry("c", Verdict::Fail)).await.unwrap();

    let scan = store.scan(LogStream::All).await.unwrap();
    assert_eq!(scan.malformed, 1);
    let domains: Vec<_> = scan.entries.iter().map(|e| e.domain.as_str()).collect();
    assert_eq!(domains, vec!["a", "c"]);
}

/// Test: timestamps without an offset are read as UTC
#[tokio::test]
async fn legacy_naive_timestamps_are_readable() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlLogStore::open(dir.path()).unwrap();
    std::fs::write(
        store.path_for(LogStream::All),
        concat!(
            r#"{"timestamp": "2025-06-30T08:15:42.918273", "agent": "MockAgent", "domain": "debugging", "question": "Find the bug", "answer": "def add(x, y): return x + y", "evaluation": "pass", "keywords_used": ["+", "return"]}"#,
            "\n"
        ),
    )
    .unwrap();

    let entries = store.read_all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].verdict(), Some(Verdict::Pass));
    assert_eq!(entries[0].keywords_used, vec!["+", "return"]);
}

/// Test: concurrent appends through two handles never interleave
#[tokio::test]
async fn concurrent_writers_never_tear_lines() {
    let dir = tempfile::tempdir().unwrap();
    // Two handles on the same directory share the same lock.
    let a = Arc::new(JsonlLogStore::open(dir.path()).unwrap());
    let b = Arc::new(JsonlLogStore::open(dir.path()).unwrap());

    let mut tasks = Vec::new();
    for n in 0..40 {
        let store = if n % 2 == 0 { Arc::clone(&a) } else { Arc::clone(&b) };
        tasks.push(tokio::spawn(async move {
            let mut e = entry(&format!("d{}", n % 4), Verdict::Pass);
            e.answer = "x".repeat(2048);
            store.append(&e).await.unwrap();
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }

    let scan = a.scan(LogStream::All).await.unwrap();
    assert_eq!(scan.entries.len(), 40);
    assert_eq!(scan.malformed, 0);
}
