//! Background certification runs.
//!
//! A [`CertificationRunner`] owns the lifecycle of at most one run at a time:
//! `Idle -> Running -> Stopping -> Idle`. [`CertificationRunner::start`]
//! spawns the run on the tokio runtime and hands back a [`RunHandle`] that
//! streams [`RunEvent`]s. [`CertificationRunner::stop`] signals cancellation
//! through a watch channel; the run finishes the cycle in progress and never
//! starts another one.
//!
//! Storage failures inside a cycle are reported as [`RunEvent::LogWarning`],
//! one per failed write, and do not end the run. A failed write to the main
//! log does not prevent the failure-memory write.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use overseer_agents::Agent;
use overseer_state::{LogEntry, LogStore, StorageError};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use crate::advice::advice_for;
use crate::domain::{EvaluationResult, OverseerError, Result, RubricEntry};
use crate::evaluator::evaluate;
use crate::metrics::METRICS;
use crate::obs;
use crate::rubric_bank::RubricBank;

/// Reference pause between loop cycles.
pub const DEFAULT_LOOP_DELAY: Duration = Duration::from_secs(5);

/// Which prompts one cycle asks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleScope {
    /// One random prompt, optionally restricted to a domain.
    #[default]
    Single,
    /// One random prompt from every domain.
    Sweep,
}

/// Settings for a [`CertificationRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Pause between cycles in loop mode.
    pub delay: Duration,
    pub scope: CycleScope,
    /// Restrict single-prompt cycles to this domain.
    pub domain: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_LOOP_DELAY,
            scope: CycleScope::Single,
            domain: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Idle,
    Running,
    Stopping,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub agent: String,
    pub cycles: u64,
    pub results: u64,
    pub failures: u64,
    pub log_failures: u64,
    pub cancelled: bool,
    pub duration_ms: u64,
}

#[derive(Debug, Clone)]
pub enum RunEvent {
    /// One prompt answered and scored; `advice` is set on failure.
    Result {
        agent: String,
        result: EvaluationResult,
        advice: Option<String>,
    },
    /// The result could not be persisted.
    LogWarning { domain: String, error: String },
    /// Always the last event of a run.
    Finished(RunReport),
}

/// Receiving side of a started run.
pub struct RunHandle {
    run_id: String,
    events: mpsc::UnboundedReceiver<RunEvent>,
    task: JoinHandle<RunReport>,
}

impl RunHandle {
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Next event, or `None` once the run has ended and every event was read.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Wait for the run to end. Unread events are discarded.
    pub async fn wait(self) -> Result<RunReport> {
        self.task
            .await
            .map_err(|e| OverseerError::RunTask(e.to_string()))
    }
}

struct Control {
    state: RunnerState,
    cancel: Option<watch::Sender<bool>>,
}

/// Drives certification cycles against a shared bank and log store.
#[derive(Clone)]
pub struct CertificationRunner {
    bank: Arc<RubricBank>,
    store: Arc<dyn LogStore>,
    config: RunnerConfig,
    control: Arc<Mutex<Control>>,
}

impl CertificationRunner {
    /// Idle runner drawing prompts from `bank` and recording to `store`.
    pub fn new(bank: Arc<RubricBank>, store: Arc<dyn LogStore>, config: RunnerConfig) -> Self {
        Self {
            bank,
            store,
            config,
            control: Arc::new(Mutex::new(Control {
                state: RunnerState::Idle,
                cancel: None,
            })),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunnerState {
        self.control().state
    }

    /// Start a run. With `loop_mode` unset exactly one cycle runs.
    ///
    /// Fails with [`OverseerError::AlreadyRunning`] unless the runner is idle,
    /// and with [`OverseerError::UnknownDomain`] when the configured domain is
    /// not in the bank. Nothing is spawned on failure.
    pub fn start(&self, agent: Arc<dyn Agent>, loop_mode: bool) -> Result<RunHandle> {
        if let Some(domain) = &self.config.domain {
            if !self.bank.contains_domain(domain) {
                return Err(OverseerError::UnknownDomain(domain.clone()));
            }
        }

        let cancel_rx = {
            let mut control = self.control();
            if control.state != RunnerState::Idle {
                return Err(OverseerError::AlreadyRunning);
            }
            let (cancel_tx, cancel_rx) = watch::channel(false);
            control.state = RunnerState::Running;
            control.cancel = Some(cancel_tx);
            cancel_rx
        };

        let run_id = uuid::Uuid::new_v4().to_string();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let span = obs::run_span(&run_id, agent.name());
        let runner = self.clone();
        let id = run_id.clone();
        let task = tokio::spawn(
            async move { runner.drive(id, agent, loop_mode, cancel_rx, events_tx).await }
                .instrument(span),
        );

        Ok(RunHandle {
            run_id,
            events: events_rx,
            task,
        })
    }

    /// Ask the active run to stop after its current cycle.
    ///
    /// Returns `false` when there is no running run to signal.
    pub fn stop(&self) -> bool {
        let mut control = self.control();
        if control.state != RunnerState::Running {
            return false;
        }
        if let Some(cancel) = &control.cancel {
            let _ = cancel.send(true);
        }
        control.state = RunnerState::Stopping;
        obs::emit_stop_requested();
        true
    }

    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn drive(
        self,
        run_id: String,
        agent: Arc<dyn Agent>,
        loop_mode: bool,
        mut cancel: watch::Receiver<bool>,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> RunReport {
        let started = Instant::now();
        obs::emit_run_started(&run_id, agent.name(), loop_mode);

        let mut report = RunReport {
            run_id,
            agent: agent.name().to_string(),
            cycles: 0,
            results: 0,
            failures: 0,
            log_failures: 0,
            cancelled: false,
            duration_ms: 0,
        };

        loop {
            if report.cycles > 0 {
                let stop_requested = *cancel.borrow();
                if stop_requested {
                    report.cancelled = true;
                    break;
                }
            }

            let evaluations = self.run_cycle(agent.as_ref(), &events, &mut report).await;
            report.cycles += 1;
            METRICS.inc_cycles();
            obs::emit_cycle_completed(report.cycles, evaluations);

            if !loop_mode {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.delay) => {}
                _ = cancelled(&mut cancel) => {
                    report.cancelled = true;
                    break;
                }
            }
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        {
            let mut control = self.control();
            control.state = RunnerState::Idle;
            control.cancel = None;
        }

        obs::emit_run_finished(
            &report.run_id,
            report.duration_ms,
            report.cycles,
            report.cancelled,
        );
        METRICS.flush();
        let _ = events.send(RunEvent::Finished(report.clone()));
        report
    }

    /// Ask, score and record the prompts of one cycle. Returns how many
    /// prompts were evaluated.
    async fn run_cycle(
        &self,
        agent: &dyn Agent,
        events: &mpsc::UnboundedSender<RunEvent>,
        report: &mut RunReport,
    ) -> usize {
        let prompts = self.pick_prompts();
        let count = prompts.len();

        for entry in prompts {
            let answer = agent.respond(entry.prompt()).await;
            let result = evaluate(&entry, &answer);
            let passed = result.passed();

            for e in self.persist(&result.to_log_entry(agent.name())).await {
                report.log_failures += 1;
                METRICS.inc_log_write_failures();
                obs::emit_log_write_failed(&result.domain, &e);
                let _ = events.send(RunEvent::LogWarning {
                    domain: result.domain.clone(),
                    error: e.to_string(),
                });
            }

            report.results += 1;
            if !passed {
                report.failures += 1;
            }
            METRICS.record_verdict(passed);
            obs::emit_evaluation_recorded(&result.domain, passed);

            let advice = advice_for(&result);
            if events
                .send(RunEvent::Result {
                    agent: agent.name().to_string(),
                    result,
                    advice,
                })
                .is_err()
            {
                debug!("event receiver dropped");
            }
        }
        count
    }

    fn pick_prompts(&self) -> Vec<RubricEntry> {
        let mut rng = rand::thread_rng();
        match self.config.scope {
            CycleScope::Sweep => self
                .bank
                .pick_per_domain_with(&mut rng)
                .into_iter()
                .cloned()
                .collect(),
            CycleScope::Single => self
                .bank
                .pick_prompt_with(&mut rng, self.config.domain.as_deref())
                .map(|entry| vec![entry.clone()])
                .unwrap_or_default(),
        }
    }

    /// Write `entry` to every stream it belongs to. Each stream is attempted
    /// even when an earlier write failed; one error is returned per failed
    /// write.
    async fn persist(&self, entry: &LogEntry) -> Vec<StorageError> {
        let mut errors = Vec::new();
        if let Err(e) = self.store.append(entry).await {
            errors.push(e);
        }
        if entry.is_failure() {
            if let Err(e) = self.store.append_failure(entry).await {
                errors.push(e);
            }
        }
        errors
    }
}

/// Resolves once cancellation is requested or the sender is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
