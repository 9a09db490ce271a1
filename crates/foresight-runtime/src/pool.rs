//! WorkerPool: bounded speculative computations plus their TTL timers.

use std::future::Future;
use std::mem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use foresight_core::models::ShutdownOutcome;
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

/// Spawns onto a captured runtime handle so callers need not be inside
/// the runtime. At most `max_workers` computations run at once; the rest
/// queue on the semaphore.
#[derive(Debug)]
pub struct WorkerPool {
    handle: Handle,
    permits: Arc<Semaphore>,
    workers: Mutex<JoinSet<()>>,
    timers: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl WorkerPool {
    pub fn new(handle: Handle, max_workers: usize) -> Self {
        Self {
            handle,
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            workers: Mutex::new(JoinSet::new()),
            timers: Mutex::new(JoinSet::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Queue a computation together with its TTL timer. Both are
    /// registered under one lock, so either both run or, once the pool is
    /// shut down, neither does and this returns `false`.
    pub fn spawn_speculation<W, T>(&self, work: W, timer: T) -> bool
    where
        W: Future<Output = ()> + Send + 'static,
        T: Future<Output = ()> + Send + 'static,
    {
        let mut workers = lock(&self.workers);
        let mut timers = lock(&self.timers);
        if self.is_closed() {
            return false;
        }
        reap(&mut workers);
        reap(&mut timers);
        let permits = Arc::clone(&self.permits);
        workers.spawn_on(
            async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return;
                };
                work.await;
            },
            &self.handle,
        );
        // Timers are aborted, not drained, on shutdown.
        timers.spawn_on(timer, &self.handle);
        true
    }

    /// Computations queued or running.
    pub fn active_workers(&self) -> usize {
        let mut workers = lock(&self.workers);
        reap(&mut workers);
        workers.len()
    }

    /// Refuse new work, abort timers, and wait up to `grace` for running
    /// computations. Whatever is still running afterwards is aborted.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        let (mut workers, timers) = {
            let mut workers = lock(&self.workers);
            let mut timers = lock(&self.timers);
            self.closed.store(true, Ordering::Release);
            (mem::take(&mut *workers), mem::take(&mut *timers))
        };
        drop(timers);

        let drained = tokio::time::timeout(grace, async {
            while workers.join_next().await.is_some() {}
        })
        .await
        .is_ok();

        if drained {
            return ShutdownOutcome::Drained;
        }
        let cancelled = workers.len();
        warn!(
            cancelled,
            grace_ms = grace.as_millis() as u64,
            "worker pool did not drain in time"
        );
        workers.shutdown().await;
        ShutdownOutcome::TimedOut { cancelled }
    }
}

fn lock(set: &Mutex<JoinSet<()>>) -> MutexGuard<'_, JoinSet<()>> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

fn reap(set: &mut JoinSet<()>) {
    while set.try_join_next().is_some() {}
}
