//! Seq tools: historical search, live capture and signal listing.
//!
//! Every tool resolves a connection through the shared
//! [`ConnectionFactory`](crate::client::ConnectionFactory) and reports
//! failures through one classification ([`classify()`]). Cancellation yields
//! an empty result.

mod classify;
mod context;
mod definition;
mod error;
mod flood;
mod output;
mod registry;
mod search;
mod signals;
mod traits;
mod wait;

pub use classify::classify;
pub use context::ToolContext;
pub use definition::ToolDefinition;
pub use error::{AUTHENTICATION_FAILED, ToolError};
pub use flood::collapse_auth_flood;
pub use output::ToolOutput;
pub use registry::ToolRegistry;
pub use search::{MAX_SEARCH_COUNT, SearchInput, SearchTool};
pub use signals::{SignalListInput, SignalListTool};
pub use traits::{SchemaTool, Tool};
pub use wait::{MAX_WAIT_COUNT, WaitForEventsTool, WaitInput};
