//! Overseer-State: durable certification result log
//!
//! This crate is the persistence layer for Overseer. Every evaluation result
//! is appended as one JSON line to an all-results stream, and failures are
//! additionally appended to a failures-only stream.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: append ordering, per-record corruption isolation, serialized access.
//!
//! ## Key Components
//!
//! - `LogStore`: backend-agnostic async contract
//! - `JsonlLogStore`: line-oriented files guarded by a per-directory mutex
//! - `LogEntry`: on-disk record schema

mod error;
pub mod fakes;
pub mod jsonl;
mod schema;
pub mod storage_traits;

pub use error::StorageError;
pub use jsonl::JsonlLogStore;
pub use schema::{LogEntry, Verdict};
pub use storage_traits::{decode_lines, LogScan, LogStore, LogStream, StorageResult};
