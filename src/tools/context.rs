//! Per-invocation context.

use tokio_util::sync::CancellationToken;

/// Carries the caller's cancellation into a tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    cancellation: CancellationToken,
}

impl ToolContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
