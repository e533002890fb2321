//! Logging setup and spans.
//!
//! The library only emits `tracing` events. Binaries that want output enable
//! the `subscriber` feature and call `init_tracing`; it writes to stderr
//! because stdout carries the tool protocol.

#[cfg(feature = "subscriber")]
mod subscriber;

#[cfg(feature = "subscriber")]
pub use subscriber::{TracingInitError, init_tracing};

use tracing::Span;

/// Span covering one tool invocation.
pub fn tool_span(tool_name: &str) -> Span {
    tracing::info_span!("tool.execute", tool_name = tool_name)
}
