//! Operation forwarding for passed proposals
//!
//! The engine forwards each `(target, value, calldata)` operation of a
//! passed proposal through this seam. Collaborator ledgers (reputation,
//! treasury) sit behind dispatcher implementations; the engine itself never
//! interprets a payload.

use async_trait::async_trait;
use tracing::info;

use crate::proposal::Operation;

/// Forwards one proposal operation to its external target
#[async_trait]
pub trait OperationDispatcher: Send + Sync {
    /// Dispatch a single operation
    ///
    /// An error aborts the whole batch: the engine discards the execution
    /// and leaves the proposal retryable.
    async fn dispatch(&self, operation: &Operation) -> anyhow::Result<()>;
}

/// A dispatcher that logs operations but doesn't forward them anywhere
pub struct LoggingDispatcher;

impl LoggingDispatcher {
    /// Create a new logging dispatcher
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperationDispatcher for LoggingDispatcher {
    async fn dispatch(&self, operation: &Operation) -> anyhow::Result<()> {
        info!(
            "would forward {} bytes to {} (value {})",
            operation.calldata.len(),
            operation.target,
            operation.value
        );
        Ok(())
    }
}
