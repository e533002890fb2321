//! Tool output.

use serde_json::Value;

use super::error::ToolError;
use crate::client::{EventEntity, SignalEntity};

/// Result of one tool invocation: a list of JSON items, or a classified error.
///
/// Cancellation produces an empty item list, never an error.
#[derive(Debug, Clone)]
pub enum ToolOutput {
    Items(Vec<Value>),
    Error(ToolError),
}

impl ToolOutput {
    pub fn empty() -> Self {
        Self::Items(Vec::new())
    }

    pub fn events(events: &[EventEntity]) -> Self {
        Self::Items(events.iter().map(EventEntity::to_value).collect())
    }

    pub fn signals(signals: &[SignalEntity]) -> Self {
        Self::Items(signals.iter().map(SignalEntity::to_value).collect())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn as_error(&self) -> Option<&ToolError> {
        match self {
            Self::Error(e) => Some(e),
            Self::Items(_) => None,
        }
    }

    pub fn items(&self) -> &[Value] {
        match self {
            Self::Items(items) => items,
            Self::Error(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Items(items) if items.is_empty())
    }

    /// One compact JSON document per line, or the error message.
    pub fn text(&self) -> String {
        match self {
            Self::Items(items) => items
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Error(e) => e.to_string(),
        }
    }
}

impl From<ToolError> for ToolOutput {
    fn from(error: ToolError) -> Self {
        Self::Error(error)
    }
}
