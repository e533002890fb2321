//! SignalList - shared signals, read-only.

use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;

use super::classify::{failure, until_cancelled};
use super::context::ToolContext;
use super::output::ToolOutput;
use super::traits::SchemaTool;
use crate::client::ConnectionFactory;

/// Input for the SignalList tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct SignalListInput {
    /// Workspace whose API key to use. Omit for the default workspace.
    #[serde(default)]
    pub workspace: Option<String>,
}

pub struct SignalListTool {
    factory: Arc<ConnectionFactory>,
}

impl SignalListTool {
    pub fn new(factory: Arc<ConnectionFactory>) -> Self {
        Self { factory }
    }
}

#[async_trait]
impl SchemaTool for SignalListTool {
    type Input = SignalListInput;

    const NAME: &'static str = "SignalList";
    const DESCRIPTION: &'static str =
        "List available signals in Seq (read-only access to shared signals)";

    async fn handle(&self, input: SignalListInput, context: &ToolContext) -> ToolOutput {
        let result = until_cancelled(context.cancellation(), async {
            let conn = self.factory.create(input.workspace.as_deref()).await?;
            conn.list_signals().await
        })
        .await;

        match result {
            Ok(signals) => ToolOutput::signals(&signals),
            Err(e) => failure(Self::NAME, &e),
        }
    }
}
