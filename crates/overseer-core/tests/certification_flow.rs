//! End-to-end certification against on-disk logs.

use std::sync::Arc;

use overseer_agents::{Agent, MockAgent};
use overseer_core::{
    evaluate, summarize, summarize_agent, CertificationRunner, CycleScope, DomainTally,
    RubricBank, RunEvent, RunnerConfig,
};
use overseer_state::{JsonlLogStore, LogStore, Verdict};

/// Test: the mock agent passes every built-in prompt
#[tokio::test]
async fn mock_agent_passes_every_builtin_prompt() {
    let bank = RubricBank::builtin();
    let agent = MockAgent::new();
    for entry in bank.iter() {
        let answer = agent.respond(entry.prompt()).await;
        let result = evaluate(entry, &answer);
        assert_eq!(
            result.verdict,
            Verdict::Pass,
            "{} / {}: {answer}",
            entry.domain(),
            entry.prompt()
        );
    }
}

/// Test: a sweep writes one line per domain and summarizes cleanly
#[tokio::test]
async fn sweep_is_persisted_and_summarized() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonlLogStore::open(dir.path()).unwrap());
    let config = RunnerConfig {
        scope: CycleScope::Sweep,
        ..RunnerConfig::default()
    };
    let runner = CertificationRunner::new(Arc::new(RubricBank::builtin()), store.clone(), config);

    let mut handle = runner.start(Arc::new(MockAgent::new()), false).unwrap();
    let mut results = 0;
    while let Some(event) = handle.next_event().await {
        if let RunEvent::Result { advice, .. } = event {
            assert_eq!(advice, None);
            results += 1;
        }
    }
    assert_eq!(results, 4);

    let raw = std::fs::read_to_string(dir.path().join("training_logs.jsonl")).unwrap();
    assert_eq!(raw.lines().count(), 4);
    assert!(raw.ends_with('\n'));
    assert!(!dir.path().join("failure_memory.jsonl").exists());

    let summary = summarize(store.as_ref()).await.unwrap();
    assert_eq!(summary.len(), 4);
    for (_, tally) in summary.iter() {
        assert_eq!(
            *tally,
            DomainTally {
                pass_count: 1,
                fail_count: 0
            }
        );
    }
    assert!(summarize_agent(store.as_ref(), "nobody")
        .await
        .unwrap()
        .is_empty());
}

/// Test: a failing answer is written to both logs
#[tokio::test]
async fn failures_land_in_failure_memory() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonlLogStore::open(dir.path()).unwrap());
    let config = RunnerConfig {
        domain: Some("agent_alignment".to_string()),
        ..RunnerConfig::default()
    };
    let runner = CertificationRunner::new(Arc::new(RubricBank::builtin()), store.clone(), config);

    let stubborn = MockAgent::with_rules(Vec::new()).with_name("Stubborn");
    let report = runner
        .start(Arc::new(stubborn), false)
        .unwrap()
        .wait()
        .await
        .unwrap();
    assert_eq!(report.failures, 1);

    let failures = store.read_failures().await.unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].agent, "Stubborn");
    assert_eq!(failures[0].answer, "I don't know.");
    assert_eq!(failures[0].domain, "agent_alignment");

    let summary = summarize(store.as_ref()).await.unwrap();
    assert_eq!(
        summary.get("agent_alignment"),
        Some(&DomainTally {
            pass_count: 0,
            fail_count: 1
        })
    );
}

/// Test: corrupt and truncated lines are skipped by the summary
#[tokio::test]
async fn summary_survives_garbage_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonlLogStore::open(dir.path()).unwrap();
    let bank = RubricBank::builtin();
    let entry = evaluate(bank.iter().next().unwrap(), "").to_log_entry("MockAgent");
    store.append(&entry).await.unwrap();

    let path = dir.path().join("training_logs.jsonl");
    let mut raw = std::fs::read_to_string(&path).unwrap();
    raw.push_str("not json at all\n{\"timestamp\":");
    std::fs::write(&path, raw).unwrap();

    let summary = summarize(&store).await.unwrap();
    assert_eq!(summary.totals().total(), 1);
}
