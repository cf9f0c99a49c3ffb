//! Overseer - AI agent certification CLI
//!
//! The `overseer` command asks an agent certification prompts, scores each
//! answer by keyword presence and keeps a JSON-lines record of every attempt.
//!
//! ## Commands
//!
//! - `certify`: run one cycle, or loop until Ctrl-C
//! - `summary`: per-domain pass/fail table
//! - `failures`: most recent failures with advice
//! - `rubrics`: list the certification prompts

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use overseer_agents::AgentKind;
use overseer_core::{
    advice_for_entry, summarize, summarize_agent, CertificationRunner, CycleScope,
    EvaluationResult, OverseerConfig, PerformanceSummary, RubricBank, RunEvent, RunReport, RunnerConfig,
};
use overseer_state::{LogEntry, LogStore};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "overseer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Certify AI agents against keyword rubrics", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Directory holding the result logs
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Rubric file to use instead of the built-in prompts
    #[arg(long, global = true)]
    rubrics: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the agent certification prompts and record the results
    Certify(CertifyArgs),

    /// Show per-domain pass/fail counts
    Summary {
        /// Only count results recorded for this agent name
        #[arg(long)]
        agent: Option<String>,
    },

    /// Show the most recent failures with advice
    Failures {
        /// Maximum number of failures to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List domains and prompts
    Rubrics,
}

#[derive(Args, Debug)]
struct CertifyArgs {
    /// Agent to certify: mock, remote or search
    #[arg(short, long, default_value = "mock")]
    agent: AgentKind,

    /// Keep certifying until interrupted
    #[arg(long = "loop")]
    loop_mode: bool,

    /// Only ask prompts from this domain
    #[arg(short, long, conflicts_with = "sweep")]
    domain: Option<String>,

    /// Ask one prompt from every domain per cycle
    #[arg(long)]
    sweep: bool,

    /// Pause between cycles in loop mode
    #[arg(long)]
    delay_secs: Option<u64>,
}

impl CertifyArgs {
    fn runner_config(&self, config: &OverseerConfig) -> RunnerConfig {
        RunnerConfig {
            delay: self
                .delay_secs
                .map(Duration::from_secs)
                .unwrap_or(config.loop_delay),
            scope: if self.sweep {
                CycleScope::Sweep
            } else {
                CycleScope::Single
            },
            domain: self.domain.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    overseer_core::init_tracing(cli.json, level);

    let mut config = OverseerConfig::from_env().context("Invalid environment configuration")?;
    if let Some(dir) = cli.log_dir {
        config.log_dir = dir;
    }
    if let Some(file) = cli.rubrics {
        config.rubric_file = Some(file);
    }

    match cli.command {
        Commands::Certify(args) => cmd_certify(&config, args).await,
        Commands::Summary { agent } => cmd_summary(&config, agent.as_deref()).await,
        Commands::Failures { limit } => cmd_failures(&config, limit).await,
        Commands::Rubrics => cmd_rubrics(&config),
    }
}

/// Run certification until the run ends or Ctrl-C is pressed, then print the
/// historical summary. A second Ctrl-C exits immediately.
async fn cmd_certify(config: &OverseerConfig, args: CertifyArgs) -> Result<()> {
    let agent = config
        .build_agent(args.agent)
        .with_context(|| format!("Cannot build the {} agent", args.agent))?;
    let bank = config.load_rubrics().context("Failed to load rubrics")?;
    let store = Arc::new(
        config
            .open_store()
            .with_context(|| format!("Cannot open log directory {}", config.log_dir.display()))?,
    );

    let runner = CertificationRunner::new(
        Arc::new(bank),
        store.clone(),
        args.runner_config(config),
    );
    let mut handle = runner.start(Arc::new(agent), args.loop_mode)?;
    info!(run_id = %handle.run_id(), agent = %args.agent, "certification started");

    let stopper = runner.clone();
    let interrupt = tokio::spawn(async move {
        let mut presses = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            match interrupt_action(presses) {
                InterruptAction::Stop => {
                    eprintln!("Stopping after the current cycle... (Ctrl-C again to quit)");
                    stopper.stop();
                }
                InterruptAction::Exit => {
                    eprintln!("Interrupted.");
                    std::process::exit(130);
                }
            }
        }
    });

    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::Result {
                agent,
                result,
                advice,
            } => {
                println!("{}", format_result(&agent, &result, advice.as_deref()));
            }
            RunEvent::LogWarning { domain, error } => {
                eprintln!("warning: could not record '{domain}' result: {error}");
            }
            RunEvent::Finished(report) => println!("{}", format_report(&report)),
        }
    }
    interrupt.abort();
    handle.wait().await?;

    let summary = summarize(store.as_ref())
        .await
        .context("Failed to read result log")?;
    print!("{}", format_summary(&summary));
    Ok(())
}

/// What a Ctrl-C press does during `certify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Let the current cycle finish, then end the run.
    Stop,
    /// Quit without waiting.
    Exit,
}

fn interrupt_action(presses: u32) -> InterruptAction {
    if presses <= 1 {
        InterruptAction::Stop
    } else {
        InterruptAction::Exit
    }
}

/// Print the performance table
async fn cmd_summary(config: &OverseerConfig, agent: Option<&str>) -> Result<()> {
    let store = config
        .open_store()
        .with_context(|| format!("Cannot open log directory {}", config.log_dir.display()))?;
    let summary = match agent {
        Some(name) => summarize_agent(&store, name).await?,
        None => summarize(&store).await?,
    };

    print!("{}", summary.render_table());
    Ok(())
}

/// Print the newest failures, newest first
async fn cmd_failures(config: &OverseerConfig, limit: usize) -> Result<()> {
    let store = config
        .open_store()
        .with_context(|| format!("Cannot open log directory {}", config.log_dir.display()))?;
    let failures = store
        .read_failures()
        .await
        .context("Failed to read failure log")?;

    if failures.is_empty() {
        println!("No failures recorded.");
        return Ok(());
    }

    for entry in failures.iter().rev().take(limit) {
        println!("{}", format_failure(entry));
    }
    Ok(())
}

fn cmd_rubrics(config: &OverseerConfig) -> Result<()> {
    let bank = config.load_rubrics().context("Failed to load rubrics")?;
    print!("{}", format_rubrics(&bank));
    Ok(())
}

/// Console block for one scored answer.
fn format_result(agent: &str, result: &EvaluationResult, advice: Option<&str>) -> String {
    let mut out = format!(
        "[{}] {} | {}\n  Q: {}\n  A: {}",
        result.verdict.as_str().to_uppercase(),
        result.domain,
        agent,
        result.prompt,
        result.answer
    );
    if let Some(advice) = advice {
        out.push_str("\n  ");
        out.push_str(advice);
    }
    out
}

fn format_report(report: &RunReport) -> String {
    format!(
        "Run {} finished{}: {} cycle(s), {} result(s), {} failure(s), {} unrecorded",
        report.run_id,
        if report.cancelled { " (stopped)" } else { "" },
        report.cycles,
        report.results,
        report.failures,
        report.log_failures
    )
}

fn format_summary(summary: &PerformanceSummary) -> String {
    format!("\nTraining summary\n{}", summary.render_table())
}

fn format_failure(entry: &LogEntry) -> String {
    let mut out = format!(
        "{} {} | {}\n  Q: {}\n  A: {}",
        entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.domain,
        entry.agent,
        entry.question,
        entry.answer
    );
    if let Some(advice) = advice_for_entry(entry) {
        out.push_str("\n  ");
        out.push_str(&advice);
    }
    out
}

fn format_rubrics(bank: &RubricBank) -> String {
    let mut out = String::new();
    for domain in bank.domains() {
        out.push_str(domain);
        out.push('\n');
        for entry in bank.entries(domain).unwrap_or_default() {
            out.push_str(&format!(
                "  - {} [{}]\n",
                entry.prompt(),
                entry.required_keywords().join(", ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use overseer_core::{evaluate, RubricEntry};

    fn config_in(dir: &std::path::Path) -> OverseerConfig {
        OverseerConfig {
            log_dir: dir.to_path_buf(),
            ..OverseerConfig::default()
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn certify_flags_parse() {
        let cli = Cli::try_parse_from([
            "overseer",
            "--log-dir",
            "/tmp/x",
            "certify",
            "--agent",
            "search",
            "--loop",
            "--delay-secs",
            "1",
            "--domain",
            "debugging",
        ])
        .unwrap();
        assert_eq!(cli.log_dir, Some(PathBuf::from("/tmp/x")));
        let Commands::Certify(args) = cli.command else {
            panic!("expected certify");
        };
        assert_eq!(args.agent, AgentKind::WebSearch);
        assert!(args.loop_mode);

        let runner = args.runner_config(&OverseerConfig::default());
        assert_eq!(runner.delay, Duration::from_secs(1));
        assert_eq!(runner.domain.as_deref(), Some("debugging"));
        assert_eq!(runner.scope, CycleScope::Single);
    }

    #[test]
    fn unknown_agent_is_rejected() {
        assert!(Cli::try_parse_from(["overseer", "certify", "--agent", "oracle"]).is_err());
    }

    #[test]
    fn sweep_conflicts_with_domain() {
        assert!(
            Cli::try_parse_from(["overseer", "certify", "--sweep", "--domain", "debugging"])
                .is_err()
        );
    }

    #[test]
    fn failing_result_shows_advice() {
        let entry = RubricEntry::new("debugging", "Fix it", ["range", "11"]);
        let result = evaluate(&entry, "no idea");
        let text = format_result("MockAgent", &result, Some("Advice for 'debugging': x"));
        assert!(text.starts_with("[FAIL] debugging | MockAgent"));
        assert!(text.ends_with("Advice for 'debugging': x"));
    }

    #[test]
    fn first_interrupt_stops_second_exits() {
        assert_eq!(interrupt_action(1), InterruptAction::Stop);
        assert_eq!(interrupt_action(2), InterruptAction::Exit);
        assert_eq!(interrupt_action(5), InterruptAction::Exit);
    }

    #[test]
    fn rubric_listing_covers_every_prompt() {
        let listing = format_rubrics(&RubricBank::builtin());
        assert_eq!(listing.lines().filter(|l| l.starts_with("  - ")).count(), 8);
        assert!(listing.contains("[def, [::-1], ==]"));
    }

    #[tokio::test]
    async fn certify_then_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let args = CertifyArgs {
            agent: AgentKind::Mock,
            loop_mode: false,
            domain: None,
            sweep: true,
            delay_secs: None,
        };

        cmd_certify(&config, args).await.unwrap();
        let after_run = summarize(&config.open_store().unwrap()).await.unwrap();
        assert_eq!(after_run.totals().total(), 4);
        assert!(format_summary(&after_run).starts_with("\nTraining summary\n"));

        cmd_summary(&config, None).await.unwrap();
        cmd_summary(&config, Some("MockAgent")).await.unwrap();
        cmd_failures(&config, 5).await.unwrap();

        let store = config.open_store().unwrap();
        assert_eq!(store.read_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn remote_without_key_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let args = CertifyArgs {
            agent: AgentKind::Remote,
            loop_mode: false,
            domain: None,
            sweep: false,
            delay_secs: None,
        };
        let err = cmd_certify(&config_in(dir.path()), args).await.unwrap_err();
        assert!(err.to_string().contains("remote"));
    }
}
