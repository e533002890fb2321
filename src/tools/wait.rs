//! SeqWaitForEvents - time-bounded live capture.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use schemars::JsonSchema;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::classify::{failure, until_cancelled};
use super::context::ToolContext;
use super::flood::collapse_auth_flood;
use super::output::ToolOutput;
use super::traits::SchemaTool;
use crate::client::{ConnectionFactory, EventEntity};
use crate::config::settings::DEFAULT_CAPTURE_DEADLINE;
use crate::{Error, Result};

pub const MAX_WAIT_COUNT: u32 = 100;

fn default_count() -> u32 {
    10
}

/// Input for the SeqWaitForEvents tool
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[schemars(deny_unknown_fields)]
pub struct WaitInput {
    /// Optional Seq filter expression applied to the live stream
    #[serde(default)]
    pub filter: Option<String>,
    /// Maximum number of events to capture (1-100)
    #[serde(default = "default_count")]
    #[schemars(range(min = 1, max = 100))]
    pub count: u32,
    /// Workspace whose API key to use. Omit for the default workspace.
    #[serde(default)]
    pub workspace: Option<String>,
}

impl WaitInput {
    fn validate(&self) -> Result<()> {
        if !(1..=MAX_WAIT_COUNT).contains(&self.count) {
            return Err(Error::InvalidRequest(format!(
                "count must be between 1 and {}",
                MAX_WAIT_COUNT
            )));
        }
        Ok(())
    }
}

pub struct WaitForEventsTool {
    factory: Arc<ConnectionFactory>,
    application: String,
    deadline: Duration,
}

impl WaitForEventsTool {
    pub fn new(factory: Arc<ConnectionFactory>, application: impl Into<String>) -> Self {
        Self {
            factory,
            application: application.into(),
            deadline: DEFAULT_CAPTURE_DEADLINE,
        }
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Connect, open the stream and read until `count` events arrived or the
    /// stream ended. Fails with [`Error::Cancelled`] once `capture` fires, even
    /// if some events were already read.
    async fn capture(&self, input: &WaitInput, capture: &CancellationToken) -> Result<Vec<EventEntity>> {
        let conn = until_cancelled(capture, self.factory.create(input.workspace.as_deref())).await?;
        let mut stream = until_cancelled(capture, conn.stream(input.filter.as_deref())).await?;

        let mut events = Vec::with_capacity(input.count as usize);
        while events.len() < input.count as usize {
            tokio::select! {
                biased;
                _ = capture.cancelled() => {
                    tracing::debug!(
                        tool = Self::NAME,
                        discarded = events.len(),
                        "Capture deadline reached"
                    );
                    return Err(Error::Cancelled);
                }
                next = stream.next() => match next {
                    Some(Ok(event)) => events.push(event),
                    Some(Err(e)) => return Err(e),
                    None => break,
                },
            }
        }
        Ok(events)
    }
}

#[async_trait]
impl SchemaTool for WaitForEventsTool {
    type Input = WaitInput;

    const NAME: &'static str = "SeqWaitForEvents";
    const DESCRIPTION: &'static str = "Wait for and capture live events from Seq (times out after \
         5 seconds with an empty result unless the requested count arrived first)";

    async fn handle(&self, input: WaitInput, context: &ToolContext) -> ToolOutput {
        if let Err(e) = input.validate() {
            return failure(Self::NAME, &e);
        }

        let capture = context.cancellation().child_token();
        let timer = tokio::spawn({
            let capture = capture.clone();
            let deadline = self.deadline;
            async move {
                tokio::time::sleep(deadline).await;
                capture.cancel();
            }
        });

        let result = self.capture(&input, &capture).await;
        timer.abort();

        if context.is_cancelled() {
            tracing::debug!(tool = Self::NAME, "Capture cancelled by caller");
            return ToolOutput::empty();
        }

        match result {
            Ok(events) => {
                tracing::debug!(tool = Self::NAME, captured = events.len(), "Capture finished");
                ToolOutput::events(&collapse_auth_flood(events, &self.application))
            }
            Err(e) => failure(Self::NAME, &e),
        }
    }
}
