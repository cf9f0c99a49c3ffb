//! Lifecycle tracing for certification runs.

use std::sync::Arc;

use overseer_agents::MockAgent;
use overseer_core::obs::{
    emit_cycle_completed, emit_log_write_failed, emit_run_finished, emit_run_started, run_span,
};
use overseer_core::{CertificationRunner, RubricBank, RunnerConfig};
use overseer_state::fakes::MemoryLogStore;
use tracing_test::traced_test;

/// Test: emit_run_started logs the agent name and loop mode
#[traced_test]
#[test]
fn run_started_carries_agent_and_mode() {
    emit_run_started("run-123", "MockAgent", true);
    assert!(logs_contain("run.started"));
    assert!(logs_contain("MockAgent"));
    assert!(logs_contain("loop_mode=true"));
}

/// Test: emit_run_finished logs duration, cycles and the cancelled flag
#[traced_test]
#[test]
fn run_finished_carries_counts() {
    emit_run_finished("run-456", 5000, 3, false);
    assert!(logs_contain("run.finished"));
    assert!(logs_contain("cycles=3"));
}

/// Test: emit_cycle_completed creates an info-level event
#[traced_test]
#[test]
fn cycle_completed_is_emitted() {
    emit_cycle_completed(2, 4);
    assert!(logs_contain("cycle.completed"));
}

/// Test: emit_log_write_failed is a warning carrying the error
#[traced_test]
#[test]
fn log_write_failure_is_a_warning() {
    emit_log_write_failed("debugging", &"disk full");
    assert!(logs_contain("WARN"));
    assert!(logs_contain("log.write_failed"));
    assert!(logs_contain("disk full"));
}

/// Test: events inside run_span carry the run id
#[traced_test]
#[test]
fn run_span_wraps_events() {
    let span = run_span("span-run", "MockAgent");
    span.in_scope(|| emit_cycle_completed(1, 1));
    assert!(logs_contain("span-run"));
}

/// Test: a one-shot run emits started, recorded, completed and finished events
#[traced_test]
#[tokio::test]
async fn runner_emits_full_lifecycle() {
    let runner = CertificationRunner::new(
        Arc::new(RubricBank::builtin()),
        Arc::new(MemoryLogStore::new()),
        RunnerConfig::default(),
    );
    let handle = runner.start(Arc::new(MockAgent::new()), false).unwrap();
    let run_id = handle.run_id().to_string();
    handle.wait().await.unwrap();

    assert!(logs_contain("run.started"));
    assert!(logs_contain("evaluation.recorded"));
    assert!(logs_contain("cycle.completed"));
    assert!(logs_contain("run.finished"));
    assert!(logs_contain(&run_id));
}
