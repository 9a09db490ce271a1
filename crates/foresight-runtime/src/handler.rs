//! Request handling: CHECK_CACHE → HIT | MISS → EXECUTE_SYNC → LEARN.

use std::time::{Duration, Instant};

use foresight_core::{Action, ExecutionError, TaskExecutor};
use foresight_observability::handle_span;
use foresight_observability::tracing_setup::events;
use tracing::Instrument;

use crate::cache::{Consumption, MissReason, ReadyResult};
use crate::engine::EngineInner;

impl<E: TaskExecutor> EngineInner<E> {
    pub(crate) async fn handle(&self, action: &Action) -> Result<E::Output, ExecutionError> {
        async {
            let reason = match self.cache.try_consume(action) {
                Consumption::Hit(ready) => return Ok(self.serve_hit(action, ready, None)),
                Consumption::InFlight(pending) => {
                    let started = Instant::now();
                    match pending.wait(self.config.speculation.in_flight_wait()).await {
                        Ok(ready) => {
                            return Ok(self.serve_hit(action, ready, Some(started.elapsed())))
                        }
                        Err(reason) => reason,
                    }
                }
                Consumption::Miss(reason) => reason,
            };
            self.serve_miss(action, reason).await
        }
        .instrument(handle_span!(action))
        .await
    }

    fn serve_hit(
        &self,
        action: &Action,
        ready: ReadyResult<E::Output>,
        waited: Option<Duration>,
    ) -> E::Output {
        let saved = ready
            .computed_in
            .saturating_sub(waited.unwrap_or(Duration::ZERO));
        self.metrics.record_hit(saved);
        events::cache_hit(action.as_str(), saved, waited.is_some());
        if self.config.learning.reinforce_on_hit {
            self.learn(action);
        }
        ready.value
    }

    async fn serve_miss(
        &self,
        action: &Action,
        reason: MissReason,
    ) -> Result<E::Output, ExecutionError> {
        self.metrics.record_miss();
        if reason == MissReason::Expired {
            self.metrics.record_expiration();
        }
        events::cache_miss(action.as_str(), reason.as_str());

        let previous = self.trajectory.last();
        let result = self.executor.execute(action).await;
        if let Some(previous) = previous {
            self.reinforce(&previous, action);
        }
        result
    }

    /// Strengthen `last trajectory action → action`.
    fn learn(&self, action: &Action) {
        if let Some(previous) = self.trajectory.last() {
            self.reinforce(&previous, action);
        }
    }

    fn reinforce(&self, previous: &Action, action: &Action) {
        if previous == action {
            return;
        }
        let weight = self
            .model
            .reinforce(previous, action, self.config.learning.learning_rate);
        events::transition_learned(previous.as_str(), action.as_str(), weight);
    }
}
