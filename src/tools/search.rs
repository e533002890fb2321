//! SeqSearch - bounded historical search.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::classify::{failure, until_cancelled};
use super::context::ToolContext;
use super::flood::collapse_auth_flood;
use super::output::ToolOutput;
use super::traits::SchemaTool;
use crate::client::{ConnectionFactory, EventQuery};
use crate::{Error, Result};

pub const MAX_SEARCH_COUNT: u32 = 1000;

fn default_count() -> u32 {
    100
}

/// Input for the SeqSearch tool
#[derive(Debug, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct SearchInput {
    /// Seq filter expression, e.g. `@Level = 'Error'`
    pub filter: String,
    /// Maximum number of events to return (1-1000)
    #[serde(default = "default_count")]
    #[schemars(range(min = 1, max = 1000))]
    pub count: u32,
    /// Workspace whose API key to use. Omit for the default workspace.
    #[serde(default)]
    pub workspace: Option<String>,
}

impl SearchInput {
    fn validate(&self) -> Result<()> {
        if self.filter.trim().is_empty() {
            return Err(Error::InvalidRequest("filter must not be empty".into()));
        }
        if !(1..=MAX_SEARCH_COUNT).contains(&self.count) {
            return Err(Error::InvalidRequest(format!(
                "count must be between 1 and {}",
                MAX_SEARCH_COUNT
            )));
        }
        Ok(())
    }
}

pub struct SearchTool {
    factory: Arc<ConnectionFactory>,
    application: String,
}

impl SearchTool {
    pub fn new(factory: Arc<ConnectionFactory>, application: impl Into<String>) -> Self {
        Self {
            factory,
            application: application.into(),
        }
    }
}

#[async_trait]
impl SchemaTool for SearchTool {
    type Input = SearchInput;

    const NAME: &'static str = "SeqSearch";
    const DESCRIPTION: &'static str =
        "Search Seq events with filters, returning up to the specified count";

    async fn handle(&self, input: SearchInput, context: &ToolContext) -> ToolOutput {
        if let Err(e) = input.validate() {
            return failure(Self::NAME, &e);
        }

        let query = EventQuery::new(input.filter).count(input.count);
        let result = until_cancelled(context.cancellation(), async {
            let conn = self.factory.create(input.workspace.as_deref()).await?;
            conn.search(&query).await
        })
        .await;

        match result {
            Ok(events) => ToolOutput::events(&collapse_auth_flood(events, &self.application)),
            Err(e) => failure(Self::NAME, &e),
        }
    }
}
