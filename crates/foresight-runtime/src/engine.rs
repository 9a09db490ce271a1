//! SpeculativeEngine: the host-facing facade.
//!
//! One engine owns its model, trajectory, cache and worker pool; nothing
//! is process-global, so independent engines (one per session, say) can
//! coexist. Clones share the same engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use foresight_core::models::{EngineStats, ModelSnapshot, Prediction, ShutdownReport};
use foresight_core::{
    Action, EngineError, EngineResult, ExecutionError, ForesightConfig, Perturbation, TaskExecutor,
};
use foresight_model::perturbation;
use foresight_model::seeds::{self, Workflow};
use foresight_model::{LearnedSequence, SequenceLog, TrajectoryTracker, TransitionModel};
use foresight_observability::tracing_setup::events;
use foresight_observability::{observe_span, SpeculationMetrics};
use foresight_prediction::PredictionEngine;
use tokio::runtime::Handle;
use tracing::info;

use crate::cache::{ResultCache, SpeculationState};
use crate::pool::WorkerPool;
use crate::scheduler::{DispatchOutcome, Scheduler};

pub(crate) struct EngineInner<E: TaskExecutor> {
    pub(crate) config: ForesightConfig,
    pub(crate) executor: Arc<E>,
    pub(crate) model: Arc<TransitionModel>,
    pub(crate) predictor: PredictionEngine,
    pub(crate) trajectory: TrajectoryTracker,
    pub(crate) sequences: SequenceLog,
    pub(crate) cache: Arc<ResultCache<E::Output>>,
    pub(crate) pool: Arc<WorkerPool>,
    pub(crate) scheduler: Scheduler<E>,
    pub(crate) metrics: Arc<SpeculationMetrics>,
}

/// Predictive speculative execution over a host [`TaskExecutor`].
pub struct SpeculativeEngine<E: TaskExecutor> {
    inner: Arc<EngineInner<E>>,
}

impl<E: TaskExecutor> Clone for SpeculativeEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Builder for [`SpeculativeEngine`].
pub struct EngineBuilder<E: TaskExecutor> {
    executor: E,
    config: ForesightConfig,
    model: Option<Arc<TransitionModel>>,
    perturbation: Option<Arc<dyn Perturbation>>,
    runtime: Option<Handle>,
}

impl<E: TaskExecutor> EngineBuilder<E> {
    pub fn config(mut self, config: ForesightConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a TOML file plus `FORESIGHT_*` overrides.
    pub fn config_file(mut self, path: &Path) -> EngineResult<Self> {
        self.config = ForesightConfig::load(Some(path))?;
        Ok(self)
    }

    /// Start from an existing model instead of an empty one.
    pub fn model(mut self, model: Arc<TransitionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Override the configured exploration noise.
    pub fn perturbation(mut self, perturbation: Arc<dyn Perturbation>) -> Self {
        self.perturbation = Some(perturbation);
        self
    }

    /// Runtime that speculative work is spawned onto. Defaults to the
    /// runtime current at [`build`](Self::build).
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> EngineResult<SpeculativeEngine<E>> {
        self.config.validate()?;
        let handle = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| EngineError::NoRuntime)?,
        };

        let config = self.config;
        let model = self.model.unwrap_or_default();
        if config.learning.seed_default_workflows {
            seeds::seed_model(&model, seeds::default_workflows());
        }
        let perturbation = self
            .perturbation
            .unwrap_or_else(|| perturbation::from_config(&config.prediction));
        let predictor = PredictionEngine::with_perturbation(
            Arc::clone(&model),
            perturbation,
            config.prediction.clone(),
        );

        let executor = Arc::new(self.executor);
        let cache = Arc::new(ResultCache::new());
        let pool = Arc::new(WorkerPool::new(handle, config.speculation.max_workers));
        let metrics = Arc::new(SpeculationMetrics::new());
        let scheduler = Scheduler::new(
            Arc::clone(&executor),
            Arc::clone(&cache),
            Arc::clone(&pool),
            Arc::clone(&metrics),
            config.speculation.ttl(),
        );

        info!(
            threshold = config.prediction.confidence_threshold,
            ttl_ms = config.speculation.ttl_ms,
            max_workers = config.speculation.max_workers,
            model_size = model.len(),
            "speculative engine started"
        );

        Ok(SpeculativeEngine {
            inner: Arc::new(EngineInner {
                trajectory: TrajectoryTracker::new(config.trajectory.capacity),
                sequences: SequenceLog::new(),
                config,
                executor,
                model,
                predictor,
                cache,
                pool,
                scheduler,
                metrics,
            }),
        })
    }
}

impl<E: TaskExecutor> SpeculativeEngine<E> {
    pub fn builder(executor: E) -> EngineBuilder<E> {
        EngineBuilder {
            executor,
            config: ForesightConfig::default(),
            model: None,
            perturbation: None,
            runtime: None,
        }
    }

    /// Build with `config` on the current tokio runtime.
    pub fn new(config: ForesightConfig, executor: E) -> EngineResult<Self> {
        Self::builder(executor).config(config).build()
    }

    /// Record that `action` happened and speculate its likely successors.
    ///
    /// Never blocks on speculative work and never fails. Returns the
    /// predictions that cleared the confidence threshold.
    pub fn observe(&self, action: impl Into<Action>) -> Vec<Prediction> {
        let action = action.into();
        let inner = &self.inner;
        let _span = observe_span!(action).entered();

        let (previous, pattern) = inner.trajectory.advance(action.clone());
        inner.sequences.record(previous.as_ref(), &action);

        let predictions = inner.predictor.candidates(&action, pattern.as_ref());
        for prediction in &predictions {
            inner.metrics.record_prediction();
            events::prediction_made(
                action.as_str(),
                prediction.action.as_str(),
                prediction.confidence,
            );
            if inner.scheduler.dispatch(&prediction.action) == DispatchOutcome::Rejected {
                break;
            }
        }
        predictions
    }

    /// Serve a real request for `action`.
    ///
    /// Returns the speculative result when one is ready (or becomes ready
    /// within the in-flight wait), otherwise executes synchronously. Only
    /// the synchronous path can fail.
    pub async fn handle(&self, action: impl Into<Action>) -> Result<E::Output, ExecutionError> {
        self.inner.handle(&action.into()).await
    }

    /// Start speculating `action` directly, bypassing prediction.
    pub fn dispatch(&self, action: impl Into<Action>) -> DispatchOutcome {
        self.inner.scheduler.dispatch(&action.into())
    }

    pub fn stats(&self) -> EngineStats {
        self.inner
            .metrics
            .snapshot(self.inner.cache.len(), self.inner.model.len())
    }

    /// Stop accepting speculation, drain workers for the configured grace
    /// period, then abort the rest and discard unconsumed results.
    ///
    /// `handle` keeps working afterwards on the synchronous path.
    pub async fn shutdown(&self) -> ShutdownReport {
        let started = Instant::now();
        let outcome = self
            .inner
            .pool
            .shutdown(self.inner.config.speculation.shutdown_grace())
            .await;
        let discarded_results = self.inner.cache.clear();
        let report = ShutdownReport {
            outcome,
            discarded_results,
            elapsed: started.elapsed(),
        };
        events::shutdown_completed(report.cancelled(), discarded_results, report.elapsed);
        report
    }

    /// Reinforce `from → to` by `weight`.
    pub fn seed(&self, from: impl Into<Action>, to: impl Into<Action>, weight: f64) -> f64 {
        self.inner.model.reinforce(&from.into(), &to.into(), weight)
    }

    /// Reinforce every row of `workflows`.
    pub fn seed_workflows(&self, workflows: &[Workflow]) -> usize {
        seeds::seed_model(&self.inner.model, workflows)
    }

    /// Pre-train with the built-in workflow table.
    pub fn seed_default_workflows(&self) -> usize {
        self.seed_workflows(seeds::default_workflows())
    }

    pub fn export_model(&self) -> ModelSnapshot {
        self.inner.model.export()
    }

    /// Overwrite the edges listed in `snapshot`.
    pub fn import_model(&self, snapshot: &ModelSnapshot) -> EngineResult<usize> {
        Ok(self.inner.model.import(snapshot)?)
    }

    /// Scale every learned weight by `factor`; returns pruned edge count.
    pub fn decay_model(&self, factor: f64) -> usize {
        self.inner.model.decay(factor)
    }

    /// Drop speculative results whose TTL passed before their timer ran.
    /// Each one counts as an expiration; the timers then find nothing.
    pub fn purge_expired(&self) -> usize {
        let purged = self.inner.cache.purge_expired();
        self.inner.metrics.record_expirations(purged as u64);
        purged
    }

    /// Discard every speculative result. Running computations finish and
    /// are dropped.
    pub fn clear_cache(&self) -> usize {
        self.inner.cache.clear()
    }

    /// Peek at the speculative entry for `action` without consuming it.
    pub fn speculation_state(&self, action: impl Into<Action>) -> Option<SpeculationState> {
        self.inner.cache.state(&action.into())
    }

    /// Observed actions, most recent first.
    pub fn trajectory(&self) -> Vec<Action> {
        self.inner.trajectory.recent()
    }

    pub fn top_sequences(&self, limit: usize) -> Vec<LearnedSequence> {
        self.inner.sequences.top_sequences(limit)
    }

    /// Most frequently observed action.
    pub fn trending_action(&self) -> Option<(Action, u64)> {
        self.inner.sequences.trending()
    }

    pub fn model(&self) -> &Arc<TransitionModel> {
        &self.inner.model
    }

    pub fn config(&self) -> &ForesightConfig {
        &self.inner.config
    }

    /// Zero the statistics counters.
    pub fn reset_stats(&self) {
        self.inner.metrics.reset();
    }

    /// Speculative computations queued or running.
    pub fn active_speculations(&self) -> usize {
        self.inner.pool.active_workers()
    }
}
