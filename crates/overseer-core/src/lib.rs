//! Overseer Core Library
//!
//! Scores agent answers against keyword rubrics, records every result through
//! an [`overseer_state::LogStore`], and aggregates per-domain pass rates.
//!
//! ## Layer 2 - Certification
//!
//! - [`RubricBank`]: the prompts and their required keywords
//! - [`evaluate`]: keyword-presence scoring
//! - [`CertificationRunner`]: one background run at a time, single-shot or looped
//! - [`PerformanceSummary`]: pass/fail counts per domain, derived on demand

pub mod advice;
pub mod config;
pub mod domain;
pub mod evaluator;
pub mod metrics;
pub mod obs;
pub mod performance;
pub mod rubric_bank;
pub mod runner;
pub mod telemetry;

pub use advice::{advice_for, advice_for_entry};
pub use config::OverseerConfig;
pub use domain::{EvaluationResult, OverseerError, Result, RubricEntry};
pub use evaluator::{evaluate, evaluate_at, missing_keywords};
pub use metrics::{Metrics, MetricsSnapshot, METRICS};
pub use performance::{summarize, summarize_agent, DomainTally, PerformanceSummary};
pub use rubric_bank::RubricBank;
pub use runner::{
    CertificationRunner, CycleScope, RunEvent, RunHandle, RunReport, RunnerConfig, RunnerState,
    DEFAULT_LOOP_DELAY,
};
pub use telemetry::init_tracing;

pub use overseer_agents::{Agent, AgentAdapter, AgentKind};
pub use overseer_state::{JsonlLogStore, LogEntry, LogStore, Verdict};
