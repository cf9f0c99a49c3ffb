//! Structured lifecycle events for certification runs.
//!
//! Every event carries a stable `event` field so log pipelines can filter on
//! it regardless of the output format. Run-scoped events are emitted inside
//! the span returned by [`run_span`].

use tracing::{info, warn, Span};

/// Span covering one run. Attach it to the run task with
/// `tracing::Instrument::instrument`.
pub fn run_span(run_id: &str, agent_name: &str) -> Span {
    tracing::info_span!("overseer.run", run_id = %run_id, agent = %agent_name)
}

/// Run task started.
pub fn emit_run_started(run_id: &str, agent_name: &str, loop_mode: bool) {
    info!(
        event = "run.started",
        run_id = %run_id,
        agent_name = %agent_name,
        loop_mode = loop_mode,
    );
}

/// One prompt answered and scored.
pub fn emit_evaluation_recorded(domain: &str, passed: bool) {
    info!(event = "evaluation.recorded", domain = %domain, passed = passed);
}

pub fn emit_cycle_completed(cycle: u64, evaluations: usize) {
    info!(event = "cycle.completed", cycle = cycle, evaluations = evaluations);
}

/// A result could not be written to one of the logs.
pub fn emit_log_write_failed(domain: &str, error: &dyn std::fmt::Display) {
    warn!(event = "log.write_failed", domain = %domain, error = %error);
}

/// `stop()` accepted for the active run.
pub fn emit_stop_requested() {
    info!(event = "run.stop_requested");
}

/// Run ended, either naturally or after a stop request.
pub fn emit_run_finished(run_id: &str, duration_ms: u64, cycles: u64, cancelled: bool) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        duration_ms = duration_ms,
        cycles = cycles,
        cancelled = cancelled,
    );
}
