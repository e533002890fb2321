//! Seq API entities.
//!
//! Only the fields the tools inspect are typed; everything else the server
//! sends is kept in `extra` and written back out unchanged.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root document returned by `GET api/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RootEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Resource links. The server omits links the caller has no permission for.
    #[serde(default)]
    pub links: HashMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RootEntity {
    pub fn has_link(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventProperty {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl EventProperty {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A log event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default)]
    pub properties: Vec<EventProperty>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventEntity {
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }

    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(Value::as_str)
    }

    /// Rendered message, or an empty string when the server did not render one.
    pub fn message(&self) -> &str {
        self.rendered_message.as_deref().unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A saved, named filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SignalEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignalEntity {
    /// Shared signals have no owner.
    pub fn is_shared(&self) -> bool {
        self.owner_id.as_deref().is_none_or(str::is_empty)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Parameters for a historical search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub filter: Option<String>,
    pub count: u32,
    pub render: bool,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            filter: None,
            count: 100,
            render: true,
        }
    }
}

impl EventQuery {
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            ..Self::default()
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(filter) = self.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            pairs.push(("filter", filter.to_string()));
        }
        pairs.push(("count", self.count.to_string()));
        pairs.push(("render", self.render.to_string()));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_preserves_unknown_fields() {
        let raw = json!({
            "Id": "event-1",
            "Timestamp": "2025-01-15T10:30:00.1234567Z",
            "Level": "Error",
            "RenderedMessage": "Disk full",
            "Properties": [{ "Name": "Application", "Value": "api" }],
            "MessageTemplateTokens": [{ "Text": "Disk full" }],
            "Links": { "Self": "api/events/event-1" }
        });

        let event: EventEntity = serde_json::from_value(raw).unwrap();
        assert_eq!(event.id.as_deref(), Some("event-1"));
        assert_eq!(event.property_str("Application"), Some("api"));
        assert_eq!(event.message(), "Disk full");
        assert!(event.extra.contains_key("MessageTemplateTokens"));

        let out = event.to_value();
        assert_eq!(out["Links"]["Self"], "api/events/event-1");
        assert_eq!(out["Level"], "Error");
    }

    #[test]
    fn test_root_links() {
        let root: RootEntity = serde_json::from_value(json!({
            "Product": "Seq",
            "Version": "2024.3.13000",
            "Links": { "Events": "api/events/", "Signals": "api/signals/" },
            "InstanceName": null
        }))
        .unwrap();
        assert!(root.has_link("Events"));
        assert!(!root.has_link("Users"));
        assert_eq!(root.version.as_deref(), Some("2024.3.13000"));
    }

    #[test]
    fn test_signal_shared() {
        let shared: SignalEntity =
            serde_json::from_value(json!({ "Id": "signal-1", "Title": "Errors", "OwnerId": null }))
                .unwrap();
        let personal: SignalEntity =
            serde_json::from_value(json!({ "Id": "signal-2", "OwnerId": "user-7" })).unwrap();
        assert!(shared.is_shared());
        assert!(!personal.is_shared());
    }

    #[test]
    fn test_query_pairs_skip_blank_filter() {
        let pairs = EventQuery::default().count(5).query_pairs();
        assert_eq!(
            pairs,
            vec![("count", "5".to_string()), ("render", "true".to_string())]
        );

        let pairs = EventQuery::new("@Level = 'Error'").query_pairs();
        assert_eq!(pairs[0], ("filter", "@Level = 'Error'".to_string()));
    }
}
