mod common;

use std::time::Duration;

use common::{ping_then_hang_up, ImdbFixture, Scripted, ScriptedClient};

use graphbench::sdk::{ConnectOptions, EmbeddedClient, RemoteClient};
use graphbench::workload::queries::{q1, q3};
use graphbench::{
    BenchmarkEngine, EngineOptions, FailureKind, HarnessError, IterationOutcome, Phase,
    QueryDefinition, QueryState, ResultShape,
};

fn options(warmup: usize, measure: usize) -> EngineOptions {
    EngineOptions {
        warmup_iterations: warmup,
        measurement_iterations: measure,
        warmup_retries: 0,
        timeout: Duration::from_secs(5),
    }
}

fn titles_query() -> QueryDefinition {
    QueryDefinition::new("Q1", "titles a given actor is known for", q1)
        .with_expected(ResultShape::Unbounded)
}

async fn scripted(script: Vec<Scripted>) -> (ImdbFixture, ScriptedClient) {
    let fx = ImdbFixture::new().await;
    let inner = EmbeddedClient::with_store(fx.client.store().clone());
    let client = ScriptedClient::new(inner).with_script(script);
    (fx, client)
}

#[tokio::test]
async fn test_warmup_then_measurement_counts() {
    let (fx, client) = scripted(vec![]).await;
    let engine = BenchmarkEngine::new(&client, options(2, 3));
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();

    assert_eq!(client.executed().len(), 5);
    assert_eq!(run.state, QueryState::Done);
    assert_eq!(run.results.len(), 3);
    let numbers: Vec<usize> = run.results.iter().map(|r| r.iteration).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    for result in &run.results {
        assert_eq!(result.query, "Q1");
        assert_eq!(result.outcome, IterationOutcome::Success { cardinality: 3 });
    }
}

#[tokio::test]
async fn test_zero_warmup_measures_immediately() {
    let (fx, client) = scripted(vec![]).await;
    let engine = BenchmarkEngine::new(&client, options(0, 1));
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();
    assert_eq!(client.executed().len(), 1);
    assert_eq!(run.results.len(), 1);
}

#[tokio::test]
async fn test_warmup_failure_is_retried() {
    let (fx, client) = scripted(vec![Scripted::Fail("transient")]).await;
    let mut opts = options(1, 1);
    opts.warmup_retries = 1;
    let engine = BenchmarkEngine::new(&client, opts);
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();

    // failed attempt, retried attempt, one measurement
    assert_eq!(client.executed().len(), 3);
    assert!(run.results[0].is_success());
}

#[tokio::test]
async fn test_warmup_failure_without_retries_continues() {
    let (fx, client) = scripted(vec![Scripted::Fail("transient")]).await;
    let engine = BenchmarkEngine::new(&client, options(1, 2));
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();
    assert_eq!(client.executed().len(), 3);
    assert_eq!(run.state, QueryState::Done);
    assert!(run.results.iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn test_measurement_failures_are_recorded() {
    let (fx, client) = scripted(vec![Scripted::Fail("bad step")]).await;
    let engine = BenchmarkEngine::new(&client, options(0, 2));
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();

    assert_eq!(run.state, QueryState::Done);
    match &run.results[0].outcome {
        IterationOutcome::Failure { kind, message } => {
            assert_eq!(*kind, FailureKind::Execution);
            assert!(message.contains("bad step"));
        }
        other => panic!("expected a failure, got {:?}", other),
    }
    assert!(run.results[1].is_success());
}

#[tokio::test]
async fn test_all_measurements_failing_marks_query_failed() {
    let (fx, client) = scripted(vec![Scripted::Fail("a"), Scripted::Fail("b")]).await;
    let engine = BenchmarkEngine::new(&client, options(0, 2));
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();
    assert_eq!(run.state, QueryState::Failed);
    assert_eq!(run.results.len(), 2);
}

#[tokio::test]
async fn test_measurement_timeout_is_a_failed_iteration() {
    let (fx, client) = scripted(vec![Scripted::Sleep(Duration::from_millis(500))]).await;
    let mut opts = options(0, 2);
    opts.timeout = Duration::from_millis(20);
    let engine = BenchmarkEngine::new(&client, opts);
    let run = engine.run(&titles_query(), &fx.params()).await.unwrap();

    match &run.results[0].outcome {
        IterationOutcome::Failure { kind, .. } => assert_eq!(*kind, FailureKind::Timeout),
        other => panic!("expected a timeout, got {:?}", other),
    }
    assert!(run.results[0].elapsed < Duration::from_millis(500));
    assert!(run.results[1].is_success());
}

#[tokio::test]
async fn test_warmup_timeout_is_fatal() {
    let (fx, client) = scripted(vec![Scripted::Sleep(Duration::from_millis(500))]).await;
    let mut opts = options(1, 1);
    opts.timeout = Duration::from_millis(20);
    let engine = BenchmarkEngine::new(&client, opts);
    let err = engine.run(&titles_query(), &fx.params()).await.unwrap_err();

    assert!(matches!(err, HarnessError::WarmupTimeout { ref query, .. } if query == "Q1"));
    assert_eq!(err.phase(), Phase::WarmUp);
    assert!(err.is_fatal());
    // measurement never started
    assert_eq!(client.executed().len(), 1);
}

#[tokio::test]
async fn test_connection_loss_during_measurement_aborts() {
    let (fx, client) = scripted(vec![Scripted::Pass, Scripted::Disconnect]).await;
    let engine = BenchmarkEngine::new(&client, options(0, 3));
    let err = engine.run(&titles_query(), &fx.params()).await.unwrap_err();

    assert_eq!(err.phase(), Phase::Measurement);
    assert_eq!(err.query(), Some("Q1"));
    assert_eq!(client.executed().len(), 2);
}

#[tokio::test]
async fn test_unexpected_shape_is_a_failed_iteration() {
    let (fx, client) = scripted(vec![]).await;
    // Q1 returns three titles for the fixture actor
    let strict = QueryDefinition::new("Q1-strict", "titles, wrongly declared single", q1)
        .with_expected(ResultShape::Single);
    let engine = BenchmarkEngine::new(&client, options(0, 1));
    let run = engine.run(&strict, &fx.params()).await.unwrap();

    assert_eq!(run.state, QueryState::Failed);
    match &run.results[0].outcome {
        IterationOutcome::Failure { kind, message } => {
            assert_eq!(*kind, FailureKind::UnexpectedShape);
            assert!(message.contains("exactly 1"));
        }
        other => panic!("expected a shape failure, got {:?}", other),
    }

    let director = QueryDefinition::new("Q3", "top director", q3).with_expected(ResultShape::Single);
    let run = engine.run(&director, &fx.params()).await.unwrap();
    assert_eq!(run.state, QueryState::Done);
}

#[tokio::test]
async fn test_remote_store_hanging_up_aborts_measurement() {
    let fx = ImdbFixture::new().await;
    let port = ping_then_hang_up().await;
    let client = RemoteClient::connect(ConnectOptions {
        port,
        ..ConnectOptions::default()
    })
    .await
    .unwrap();

    let engine = BenchmarkEngine::new(&client, options(0, 3));
    let err = engine.run(&titles_query(), &fx.params()).await.unwrap_err();
    assert!(
        matches!(
            err,
            HarnessError::Connection {
                phase: Phase::Measurement,
                ..
            }
        ),
        "{:?}",
        err
    );
    assert!(err.is_fatal());
}
