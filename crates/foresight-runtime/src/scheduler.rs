//! Speculative dispatch of predicted actions.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use foresight_core::{Action, TaskExecutor};
use foresight_observability::tracing_setup::events;
use foresight_observability::{speculation_span, SpeculationMetrics};
use tracing::Instrument;

use crate::cache::{ResultCache, SlotState};
use crate::pool::WorkerPool;

/// Result of [`Scheduler::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A computation was started under this entry id.
    Launched(u64),
    /// A live entry already exists for the action.
    AlreadyLive,
    /// The engine is shutting down.
    Rejected,
}

/// Places a pending entry in the cache, then hands the computation and its
/// TTL timer to the worker pool.
pub struct Scheduler<E: TaskExecutor> {
    executor: Arc<E>,
    cache: Arc<ResultCache<E::Output>>,
    pool: Arc<WorkerPool>,
    metrics: Arc<SpeculationMetrics>,
    ttl: Duration,
}

impl<E: TaskExecutor> Scheduler<E> {
    pub fn new(
        executor: Arc<E>,
        cache: Arc<ResultCache<E::Output>>,
        pool: Arc<WorkerPool>,
        metrics: Arc<SpeculationMetrics>,
        ttl: Duration,
    ) -> Self {
        Self {
            executor,
            cache,
            pool,
            metrics,
            ttl,
        }
    }

    /// Start speculating `action` unless a live entry already exists.
    ///
    /// The entry is visible as in-flight before this returns. Never blocks.
    pub fn dispatch(&self, action: &Action) -> DispatchOutcome {
        if self.pool.is_closed() {
            return DispatchOutcome::Rejected;
        }
        let Some(reservation) = self.cache.insert_if_absent(action, self.ttl) else {
            return DispatchOutcome::AlreadyLive;
        };
        let entry_id = reservation.entry_id;
        if reservation.displaced_expired {
            self.metrics.record_expiration();
        }

        let executor = Arc::clone(&self.executor);
        let metrics = Arc::clone(&self.metrics);
        let sender = reservation.sender;
        let target = action.clone();
        let work = async move {
            let started = Instant::now();
            let state = match CatchPanic::new(executor.execute(&target)).await {
                Ok(Ok(value)) => SlotState::Ready {
                    value,
                    computed_in: started.elapsed(),
                },
                Ok(Err(err)) => fail(&metrics, &target, err.to_string()),
                Err(panic) => fail(&metrics, &target, format!("executor panicked: {panic}")),
            };
            // No receivers left means the entry was expired or consumed and abandoned.
            let _ = sender.send(state);
        }
        .instrument(speculation_span!(action, entry_id));

        let cache = Arc::clone(&self.cache);
        let metrics = Arc::clone(&self.metrics);
        let target = action.clone();
        let ttl = self.ttl;
        let timer = async move {
            tokio::time::sleep(ttl).await;
            if cache.expire_entry(&target, entry_id) {
                metrics.record_expiration();
                events::speculation_expired(target.as_str(), entry_id);
            }
        };

        if !self.pool.spawn_speculation(work, timer) {
            self.cache.expire_entry(action, entry_id);
            return DispatchOutcome::Rejected;
        }

        self.metrics.record_dispatch();
        events::speculation_launched(action.as_str(), entry_id);
        DispatchOutcome::Launched(entry_id)
    }
}

fn fail<T>(metrics: &SpeculationMetrics, action: &Action, reason: String) -> SlotState<T> {
    metrics.record_failure();
    events::speculation_failed(action.as_str(), &reason);
    SlotState::Failed(reason)
}

/// Resolves to `Err(message)` instead of unwinding when the inner future
/// panics, so a panicking executor fails its entry like any other error.
struct CatchPanic<F> {
    inner: Pin<Box<F>>,
}

impl<F: Future> CatchPanic<F> {
    fn new(inner: F) -> Self {
        Self {
            inner: Box::pin(inner),
        }
    }
}

impl<F: Future> Future for CatchPanic<F> {
    type Output = Result<F::Output, String>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = self.inner.as_mut();
        match panic::catch_unwind(AssertUnwindSafe(|| inner.poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Err(payload) => Poll::Ready(Err(panic_message(payload.as_ref()))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
