//! Instrumented [`TaskExecutor`]s for engine tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use foresight_core::{Action, ExecutionError, TaskExecutor};
use tokio::sync::{watch, Semaphore};

/// Counts calls per action, optionally sleeps, and fails or panics on
/// request.
///
/// Successful output is `"result:<action>"`. Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct RecordingExecutor {
    calls: Arc<Mutex<HashMap<Action, usize>>>,
    total: Arc<AtomicUsize>,
    delay: Duration,
    failing: Arc<HashSet<Action>>,
    fail_limit: Option<usize>,
    panicking: Arc<HashSet<Action>>,
    panic_limit: usize,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps `delay` before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Calls for any of `actions` return [`ExecutionError::Failed`].
    pub fn failing_on<I, A>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.failing = Arc::new(actions.into_iter().map(Into::into).collect());
        self
    }

    /// Like [`failing_on`](Self::failing_on), but only the first `n` calls
    /// for each action fail.
    pub fn failing_first<I, A>(self, n: usize, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        let mut executor = self.failing_on(actions);
        executor.fail_limit = Some(n);
        executor
    }

    /// The first `n` calls for each of `actions` panic.
    pub fn panicking_first<I, A>(mut self, n: usize, actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Action>,
    {
        self.panicking = Arc::new(actions.into_iter().map(Into::into).collect());
        self.panic_limit = n;
        self
    }

    /// Calls made for `action`, speculative and synchronous alike.
    pub fn calls(&self, action: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(action)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn output_for(action: &str) -> String {
        format!("result:{action}")
    }
}

#[async_trait]
impl TaskExecutor for RecordingExecutor {
    type Output = String;

    async fn execute(&self, action: &Action) -> Result<String, ExecutionError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(action.clone()).or_insert(0);
            *count += 1;
            *count
        };
        self.total.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if call <= self.panic_limit && self.panicking.contains(action) {
            panic!("configured to panic on {action}");
        }
        let within_limit = self.fail_limit.map_or(true, |limit| call <= limit);
        if self.failing.contains(action) && within_limit {
            return Err(ExecutionError::failed(action, "configured to fail"));
        }
        Ok(Self::output_for(action.as_str()))
    }
}

/// Holds every computation until the test releases it.
///
/// Lets tests observe a speculation while it is still in flight.
#[derive(Debug, Clone)]
pub struct GatedExecutor {
    gate: Arc<Semaphore>,
    started_tx: Arc<watch::Sender<usize>>,
    started_rx: watch::Receiver<usize>,
    finished: Arc<AtomicUsize>,
}

impl Default for GatedExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl GatedExecutor {
    pub fn new() -> Self {
        let (started_tx, started_rx) = watch::channel(0);
        Self {
            gate: Arc::new(Semaphore::new(0)),
            started_tx: Arc::new(started_tx),
            started_rx,
            finished: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Let `n` held computations complete.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    /// Let every current and future computation complete.
    pub fn open(&self) {
        self.gate.close();
    }

    /// Wait until at least `n` computations have started.
    pub async fn wait_started(&self, n: usize) {
        let mut rx = self.started_rx.clone();
        let _ = rx.wait_for(|started| *started >= n).await;
    }

    pub fn started(&self) -> usize {
        *self.started_rx.borrow()
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskExecutor for GatedExecutor {
    type Output = String;

    async fn execute(&self, action: &Action) -> Result<String, ExecutionError> {
        self.started_tx.send_modify(|started| *started += 1);
        if let Ok(permit) = self.gate.acquire().await {
            permit.forget();
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(RecordingExecutor::output_for(action.as_str()))
    }
}
