use async_trait::async_trait;

use crate::action::Action;
use crate::errors::ExecutionError;

/// Host-supplied computation behind every action.
///
/// The engine may call `execute` speculatively and, if that result is
/// discarded, again synchronously for the same action. Implementations
/// must therefore be safe to call concurrently and repeatedly.
#[async_trait]
pub trait TaskExecutor: Send + Sync + 'static {
    /// Result of a computation. Cloned out of the speculative cache on a hit.
    type Output: Clone + Send + Sync + 'static;

    /// Compute the result of `action`.
    async fn execute(&self, action: &Action) -> Result<Self::Output, ExecutionError>;
}
