//! Seq HTTP API client.
//!
//! [`ConnectionFactory`] resolves a workspace's API key, builds a
//! [`SeqConnection`] and probes it before handing it out.

mod connection;
mod factory;
mod streaming;
mod types;

pub use connection::{API_KEY_HEADER, EventStream, SeqConnection, parse_base_url};
pub use factory::{ConnectionFactory, EVENTS_LINK};
pub use streaming::EventStreamParser;
pub use types::{EventEntity, EventProperty, EventQuery, RootEntity, SignalEntity};
