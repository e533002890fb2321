//! Collapse of self-generated authentication failure floods.
//!
//! When this server's own logs are shipped to the Seq instance it queries, a
//! bad key produces a stream of "Authentication failed" records that would
//! otherwise fill every result.

use chrono::Utc;
use serde_json::Value;

use super::error::AUTHENTICATION_FAILED;
use crate::client::{EventEntity, EventProperty};

const AUTH_FAILURE_MARKER: &str = "Authentication failed";

fn is_own_auth_failure(event: &EventEntity, application: &str) -> bool {
    event.property_str("Application") == Some(application)
        && event.message().contains(AUTH_FAILURE_MARKER)
}

/// Replace a result made up entirely of this server's own authentication
/// failures with one synthetic event carrying the collapsed count.
pub fn collapse_auth_flood(events: Vec<EventEntity>, application: &str) -> Vec<EventEntity> {
    if events.is_empty() || !events.iter().all(|e| is_own_auth_failure(e, application)) {
        return events;
    }

    let collapsed = events.len();
    let timestamp = events
        .iter()
        .filter_map(|e| e.timestamp)
        .max()
        .unwrap_or_else(Utc::now);

    tracing::debug!(collapsed, application, "Collapsed authentication failure flood");

    vec![EventEntity {
        timestamp: Some(timestamp),
        level: Some("Error".to_string()),
        rendered_message: Some(format!(
            "{} ({} similar events collapsed)",
            AUTHENTICATION_FAILED, collapsed
        )),
        properties: vec![
            EventProperty::new("Application", application),
            EventProperty::new("CollapsedCount", Value::from(collapsed)),
        ],
        ..EventEntity::default()
    }]
}
