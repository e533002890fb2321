//! Shared failure classification for all Seq tools.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::error::ToolError;
use super::output::ToolOutput;
use crate::{Error, ErrorCategory, Result};

/// Map a failure to its outward form. `None` means the call was cancelled or
/// timed out and should report an empty result.
pub fn classify(error: &Error) -> Option<ToolError> {
    let classified = match error.category() {
        ErrorCategory::Cancelled => return None,
        ErrorCategory::Authorization => ToolError::Authentication,
        ErrorCategory::Configuration => match error {
            Error::InvalidRequest(message) => ToolError::invalid_input(message.clone()),
            Error::Config(message) => ToolError::configuration(message.clone()),
            other => ToolError::configuration(other.to_string()),
        },
        ErrorCategory::Transport => ToolError::transport(error.to_string()),
        ErrorCategory::Internal => match error {
            Error::Json(_) => ToolError::transport(error.to_string()),
            other => ToolError::unknown(other.to_string()),
        },
    };
    Some(classified)
}

/// Classify and log a failed tool call.
pub(crate) fn failure(tool: &str, error: &Error) -> ToolOutput {
    match classify(error) {
        None => {
            tracing::debug!(tool, reason = %error, "Tool call ended without results");
            ToolOutput::empty()
        }
        Some(classified) => {
            tracing::warn!(tool, error = %error, kind = ?classified, "Tool call failed");
            classified.into()
        }
    }
}

/// Run `fut` unless `token` fires first.
pub(crate) async fn until_cancelled<T>(
    token: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
