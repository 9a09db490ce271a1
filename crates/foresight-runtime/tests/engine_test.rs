use std::sync::Arc;
use std::time::{Duration, Instant};

use foresight_core::models::ShutdownOutcome;
use foresight_core::{
    Action, ConfigError, EngineError, ExecutionError, ForesightConfig, TaskExecutor,
};
use foresight_model::NullPerturbation;
use foresight_runtime::{DispatchOutcome, SpeculationState, SpeculativeEngine};
use test_fixtures::{load_session, GatedExecutor, RecordingExecutor};

fn config() -> ForesightConfig {
    let mut config = ForesightConfig::default();
    config.prediction.perturbation_amplitude = 0.0;
    config
}

fn engine<E: TaskExecutor>(config: ForesightConfig, executor: E) -> SpeculativeEngine<E> {
    SpeculativeEngine::builder(executor)
        .config(config)
        .perturbation(Arc::new(NullPerturbation))
        .build()
        .unwrap()
}

async fn wait_for_state<E: TaskExecutor>(
    engine: &SpeculativeEngine<E>,
    action: &str,
    expected: SpeculationState,
) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while engine.speculation_state(action) != Some(expected) {
        assert!(Instant::now() < deadline, "{action} never reached {expected:?}");
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}

// ── Hit path ──

#[tokio::test]
async fn seeded_prediction_is_served_from_cache() {
    let executor = RecordingExecutor::new();
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);

    let predictions = engine.observe("A");
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].action, Action::from("B"));

    wait_for_state(&engine, "B", SpeculationState::Ready).await;
    assert_eq!(engine.handle("B").await.unwrap(), "result:B");

    let stats = engine.stats();
    assert_eq!(executor.calls("B"), 1);
    assert_eq!((stats.predictions, stats.hits, stats.misses), (1, 1, 0));
    assert_eq!(stats.cache_size, 0);
}

#[tokio::test]
async fn speculative_result_is_consumed_at_most_once() {
    let executor = RecordingExecutor::new();
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;

    engine.handle("B").await.unwrap();
    assert_eq!(executor.calls("B"), 1);
    engine.handle("B").await.unwrap();
    assert_eq!(executor.calls("B"), 2);

    let stats = engine.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[tokio::test]
async fn hits_do_not_reinforce_by_default() {
    let engine = engine(config(), RecordingExecutor::new());
    engine.seed("A", "B", 0.7);
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;
    engine.handle("B").await.unwrap();

    assert_eq!(engine.model().weight(&"A".into(), &"B".into()), Some(0.7));
}

#[tokio::test]
async fn hits_reinforce_when_enabled() {
    let mut cfg = config();
    cfg.learning.reinforce_on_hit = true;
    let engine = engine(cfg, RecordingExecutor::new());
    engine.seed("A", "B", 0.7);
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;
    engine.handle("B").await.unwrap();

    let weight = engine.model().weight(&"A".into(), &"B".into()).unwrap();
    assert!((weight - 0.8).abs() < 1e-9);
}

// ── Miss path and learning ──

#[tokio::test]
async fn unseen_action_predicts_nothing_and_miss_teaches_the_model() {
    let executor = RecordingExecutor::new();
    let engine = engine(config(), executor.clone());

    assert!(engine.observe("X").is_empty());
    assert_eq!(engine.stats().speculative_dispatches, 0);

    assert_eq!(engine.handle("Y").await.unwrap(), "result:Y");
    assert_eq!(executor.calls("Y"), 1);
    let weight = engine.model().weight(&"X".into(), &"Y".into()).unwrap();
    assert!((weight - 0.1).abs() < 1e-12);
}

#[tokio::test]
async fn repeated_misses_strengthen_monotonically() {
    let engine = engine(config(), RecordingExecutor::new());
    let mut previous = 0.0;
    for _ in 0..15 {
        engine.observe("FROM");
        engine.clear_cache();
        engine.handle("TO").await.unwrap();
        let weight = engine.model().weight(&"FROM".into(), &"TO".into()).unwrap();
        assert!(weight >= previous);
        assert!(weight <= 1.0);
        previous = weight;
    }
    assert_eq!(previous, 1.0);
}

#[tokio::test]
async fn miss_without_history_or_on_repeat_learns_nothing() {
    let engine = engine(config(), RecordingExecutor::new());
    engine.handle("FIRST").await.unwrap();
    assert!(engine.model().is_empty());

    engine.observe("SAME");
    engine.handle("SAME").await.unwrap();
    assert!(engine.model().is_empty());
}

#[tokio::test]
async fn synchronous_failure_is_returned_and_still_learned() {
    let executor = RecordingExecutor::new().failing_on(["BROKEN"]);
    let engine = engine(config(), executor);
    engine.observe("A");

    let err = engine.handle("BROKEN").await.unwrap_err();
    assert_eq!(err, ExecutionError::failed(&"BROKEN".into(), "configured to fail"));
    assert!(engine.model().weight(&"A".into(), &"BROKEN".into()).is_some());
}

// ── Expiry ──

#[tokio::test]
async fn result_past_ttl_is_a_miss() {
    let mut cfg = config();
    cfg.speculation.ttl_ms = 50;
    let executor = RecordingExecutor::new();
    let engine = engine(cfg, executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(engine.speculation_state("B"), None);

    engine.handle("B").await.unwrap();
    let stats = engine.stats();
    assert_eq!(executor.calls("B"), 2);
    assert_eq!((stats.hits, stats.misses, stats.expirations), (0, 1, 1));
}

#[tokio::test]
async fn purge_counts_entries_whose_timer_has_not_run() {
    let mut cfg = config();
    cfg.speculation.ttl_ms = 20;
    let engine = engine(cfg, RecordingExecutor::new());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    // Blocks the single runtime thread, so the TTL timer cannot fire first.
    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(engine.purge_expired(), 1);
    assert_eq!(engine.stats().cache_size, 0);

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(engine.purge_expired(), 0);
    assert_eq!(engine.stats().expirations, 1);
}

// ── Dispatch ──

#[tokio::test]
async fn dispatch_is_idempotent_while_in_flight() {
    let executor = GatedExecutor::new();
    let engine = engine(config(), executor.clone());

    assert!(matches!(engine.dispatch("B"), DispatchOutcome::Launched(_)));
    assert_eq!(engine.dispatch("B"), DispatchOutcome::AlreadyLive);
    assert_eq!(engine.speculation_state("B"), Some(SpeculationState::InFlight));

    executor.wait_started(1).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(executor.started(), 1);
    assert_eq!(engine.stats().speculative_dispatches, 1);
    executor.open();
}

#[tokio::test]
async fn speculative_failure_falls_back_to_synchronous_execution() {
    let executor = RecordingExecutor::new().failing_first(1, ["B"]);
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Failed).await;

    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    let stats = engine.stats();
    assert_eq!(executor.calls("B"), 2);
    assert_eq!(stats.speculative_failures, 1);
    assert_eq!((stats.hits, stats.misses), (0, 1));
}

#[tokio::test]
async fn speculative_panic_is_counted_and_falls_back() {
    let executor = RecordingExecutor::new().panicking_first(1, ["B"]);
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Failed).await;
    assert_eq!(engine.stats().speculative_failures, 1);

    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    let stats = engine.stats();
    assert_eq!(executor.calls("B"), 2);
    assert_eq!((stats.hits, stats.misses), (0, 1));
}

#[tokio::test]
async fn failed_entry_can_be_speculated_again() {
    let executor = RecordingExecutor::new().failing_first(1, ["B"]);
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Failed).await;
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;

    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    assert_eq!(engine.stats().hits, 1);
}

// ── In-flight path ──

#[tokio::test]
async fn request_waits_for_in_flight_speculation() {
    let executor = GatedExecutor::new();
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    executor.wait_started(1).await;
    let releaser = {
        let executor = executor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            executor.release(1);
        })
    };

    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    releaser.await.unwrap();
    assert_eq!(executor.started(), 1);
    assert_eq!(engine.stats().hits, 1);
}

#[tokio::test]
async fn slow_speculation_times_out_into_a_miss() {
    let mut cfg = config();
    cfg.speculation.in_flight_wait_ms = 50;
    let executor = GatedExecutor::new();
    let engine = engine(cfg, executor.clone());
    engine.seed("A", "B", 0.7);

    engine.observe("A");
    executor.wait_started(1).await;
    let opener = {
        let executor = executor.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            executor.open();
        })
    };

    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    opener.await.unwrap();
    assert_eq!(executor.started(), 2);
    let stats = engine.stats();
    assert_eq!((stats.hits, stats.misses), (0, 1));
}

// ── Observe never blocks ──

#[tokio::test]
async fn observe_never_blocks_and_cache_stays_bounded() {
    let mut cfg = config();
    cfg.prediction.max_candidates = 2;
    let executor = GatedExecutor::new();
    let engine = engine(cfg, executor.clone());
    engine.seed("A", "B", 0.5);
    engine.seed("A", "C", 0.5);

    let started = Instant::now();
    for _ in 0..200 {
        engine.observe("A");
        assert!(engine.stats().cache_size <= 2);
    }
    assert!(started.elapsed() < Duration::from_secs(1));

    let stats = engine.stats();
    assert_eq!(stats.predictions, 400);
    assert_eq!(stats.speculative_dispatches, 2);
    executor.open();
}

// ── Concurrency ──

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_consume_exactly_once() {
    let executor = RecordingExecutor::new();
    let engine = engine(config(), executor.clone());
    engine.seed("A", "B", 0.7);
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.handle("B").await })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "result:B");
    }

    let stats = engine.stats();
    assert_eq!((stats.hits, stats.misses), (1, 7));
    assert_eq!(executor.calls("B"), 8);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_observers_share_one_model() {
    let engine = engine(config(), RecordingExecutor::new());
    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..25 {
                    engine.observe(format!("S{i}"));
                    engine.handle(format!("T{i}")).await.unwrap();
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
    assert_eq!(engine.stats().hits + engine.stats().misses, 100);
    assert!(engine.model().len() >= 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_observers_log_the_true_sequence() {
    let mut cfg = config();
    cfg.trajectory.capacity = 1_000;
    let engine = engine(cfg, RecordingExecutor::new());

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    engine.observe(format!("O{t}-{i}"));
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let mut order = engine.trajectory();
    order.reverse();
    let mut expected: Vec<(Action, Action)> = order
        .windows(2)
        .map(|pair| (pair[0].clone(), pair[1].clone()))
        .collect();
    let mut logged: Vec<(Action, Action)> = engine
        .top_sequences(usize::MAX)
        .into_iter()
        .map(|seq| (seq.from, seq.to))
        .collect();
    expected.sort();
    logged.sort();
    assert_eq!(logged, expected);
}

#[tokio::test]
async fn engines_are_independent() {
    let first = engine(config(), RecordingExecutor::new());
    let second = engine(config(), RecordingExecutor::new());
    first.seed("A", "B", 0.7);

    assert_eq!(first.observe("A").len(), 1);
    assert!(second.observe("A").is_empty());
    assert!(second.model().is_empty());
    assert_eq!(second.stats().speculative_dispatches, 0);
}

// ── Shutdown ──

#[tokio::test]
async fn shutdown_drains_and_discards_unconsumed_results() {
    let engine = engine(config(), RecordingExecutor::new());
    engine.seed("A", "B", 0.7);
    engine.observe("A");
    wait_for_state(&engine, "B", SpeculationState::Ready).await;

    let report = engine.shutdown().await;
    assert!(report.is_clean());
    assert_eq!(report.discarded_results, 1);
    assert_eq!(engine.dispatch("B"), DispatchOutcome::Rejected);

    // Requests still work synchronously.
    assert_eq!(engine.handle("B").await.unwrap(), "result:B");
}

#[tokio::test]
async fn shutdown_cancels_work_past_the_grace_period() {
    let mut cfg = config();
    cfg.speculation.shutdown_grace_ms = 20;
    let executor = GatedExecutor::new();
    let engine = engine(cfg, executor.clone());

    engine.dispatch("STUCK");
    executor.wait_started(1).await;
    let report = engine.shutdown().await;

    assert_eq!(report.outcome, ShutdownOutcome::TimedOut { cancelled: 1 });
    assert_eq!(report.cancelled(), 1);
    assert_eq!(executor.finished(), 0);
}

// ── Construction ──

#[test]
fn building_outside_a_runtime_fails() {
    let result = SpeculativeEngine::new(config(), RecordingExecutor::new());
    assert!(matches!(result, Err(EngineError::NoRuntime)));
}

#[test]
fn explicit_runtime_handle_allows_observe_from_plain_threads() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let executor = RecordingExecutor::new();
    let engine = SpeculativeEngine::builder(executor.clone())
        .config(config())
        .runtime(runtime.handle().clone())
        .build()
        .unwrap();
    engine.seed("A", "B", 0.7);

    let observer = {
        let engine = engine.clone();
        std::thread::spawn(move || engine.observe("A").len())
    };
    assert_eq!(observer.join().unwrap(), 1);

    runtime.block_on(async {
        wait_for_state(&engine, "B", SpeculationState::Ready).await;
        assert_eq!(engine.handle("B").await.unwrap(), "result:B");
    });
    assert_eq!(executor.calls("B"), 1);
}

#[tokio::test]
async fn invalid_configuration_is_rejected() {
    let mut cfg = config();
    cfg.prediction.confidence_threshold = 0.0;
    let err = SpeculativeEngine::new(cfg, RecordingExecutor::new()).err().unwrap();
    match err {
        EngineError::Config(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "prediction.confidence_threshold");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn default_workflows_can_be_seeded_at_construction() {
    let mut cfg = config();
    cfg.learning.seed_default_workflows = true;
    let engine = engine(cfg, RecordingExecutor::new());

    let predictions = engine.observe("OPEN_PDF");
    assert_eq!(predictions[0].action, Action::from("SUMMARIZE_TEXT"));
    assert_eq!(engine.stats().model_size, 9);
}

// ── Diagnostics ──

#[tokio::test]
async fn trajectory_and_sequences_track_observations() {
    let engine = engine(config(), RecordingExecutor::new());
    for name in ["A", "B", "A", "B", "C"] {
        engine.observe(name);
    }

    assert_eq!(engine.trajectory()[0], Action::from("C"));
    let top = engine.top_sequences(1);
    assert_eq!((top[0].from.as_str(), top[0].to.as_str(), top[0].count), ("A", "B", 2));
    assert_eq!(engine.trending_action(), Some((Action::from("A"), 2)));
}

#[tokio::test]
async fn model_survives_export_and_import() {
    let source = engine(config(), RecordingExecutor::new());
    source.seed_default_workflows();
    let json = source.export_model().to_json().unwrap();

    let target = engine(config(), RecordingExecutor::new());
    let snapshot = foresight_core::ModelSnapshot::from_json(&json).unwrap();
    assert_eq!(target.import_model(&snapshot).unwrap(), snapshot.len());
    assert_eq!(target.observe("TYPE_IMPORT")[0].action, Action::from("LOAD_LIBRARY"));

    assert_eq!(target.decay_model(0.1), 0);
    assert!(target.observe("TYPE_IMPORT").is_empty());
}

// ── Recorded sessions ──

#[tokio::test]
async fn coding_session_learns_its_loop() {
    let session = load_session("coding_session");
    let engine = engine(config(), RecordingExecutor::new());

    for action in &session.actions {
        let value = engine.handle(action).await.unwrap();
        assert_eq!(value, RecordingExecutor::output_for(action.as_str()));
        engine.observe(action);
    }

    // Each edge reaches the 0.3 threshold after three misses; the loop
    // closing edge FIX_ERROR → WRITE_CODE starts one iteration later.
    let stats = engine.stats();
    assert_eq!((stats.hits, stats.misses), (11, 19));
    assert!(stats.time_saved <= Duration::from_secs(1));
}

#[tokio::test]
async fn seeded_research_session_hits_from_the_start() {
    let session = load_session("research_session");
    let mut cfg = config();
    cfg.learning.seed_default_workflows = true;
    let engine = engine(cfg, RecordingExecutor::new());

    for action in &session.actions {
        engine.handle(action).await.unwrap();
        engine.observe(action);
    }

    let stats = engine.stats();
    assert_eq!((stats.hits, stats.misses), (14, 4));
    assert!(stats.hit_rate() > 0.75);
}
