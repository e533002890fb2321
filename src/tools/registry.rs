//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::Instrument;

use super::context::ToolContext;
use super::definition::ToolDefinition;
use super::error::ToolError;
use super::output::ToolOutput;
use super::traits::Tool;
use super::{SearchTool, SignalListTool, WaitForEventsTool};
use crate::client::ConnectionFactory;
use crate::config::ServerSettings;

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// `SeqSearch`, `SeqWaitForEvents` and `SignalList` sharing one factory.
    pub fn seq_tools(factory: Arc<ConnectionFactory>, settings: &ServerSettings) -> Self {
        let mut registry = Self::new();
        let application = settings.application_name.as_str();

        registry.register(Arc::new(SearchTool::new(Arc::clone(&factory), application)));
        registry.register(Arc::new(
            WaitForEventsTool::new(Arc::clone(&factory), application)
                .deadline(settings.capture_deadline),
        ));
        registry.register(Arc::new(SignalListTool::new(factory)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub async fn execute(
        &self,
        name: &str,
        input: serde_json::Value,
        context: &ToolContext,
    ) -> ToolOutput {
        match self.tools.get(name) {
            Some(tool) => {
                tool.execute(input, context)
                    .instrument(crate::observability::tool_span(name))
                    .await
            }
            None => ToolError::invalid_input(format!("Unknown tool: {}", name)).into(),
        }
    }

    /// Definitions sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<_> = self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
