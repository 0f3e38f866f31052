use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use uuid::Uuid;

use crate::agent::{AgentRuntime, InvokeRequest, StreamEvent};
use crate::errors::{AgentError, AgentResult};
use crate::trace::{classify, parse_trace, DisplayAction};

pub const THROTTLED_MESSAGE: &str = "[Error] The AI model seems to be under heavy load. Wait a minute, \
reload the page and try again. If that does not help, switch to another model or request a \
service quota increase: https://aws.amazon.com/jp/blogs/news/generative-ai-amazon-bedrock-handling-quota-problems/";

pub const UNEXPECTED_MESSAGE: &str =
    "[Error] An unexpected error occurred. Please contact the developer.";

/// What the user is told when a run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorNotice {
    Throttled,
    Unexpected,
}

impl ErrorNotice {
    pub fn message(&self) -> &'static str {
        match self {
            ErrorNotice::Throttled => THROTTLED_MESSAGE,
            ErrorNotice::Unexpected => UNEXPECTED_MESSAGE,
        }
    }
}

impl From<&AgentError> for ErrorNotice {
    fn from(err: &AgentError) -> Self {
        if err.is_throttling() {
            ErrorNotice::Throttled
        } else {
            ErrorNotice::Unexpected
        }
    }
}

/// Where a run is shown. Trace actions go to single-slot surfaces, so each
/// call replaces what its surface showed before.
#[async_trait]
pub trait Renderer: Send {
    async fn render_trace(&mut self, action: DisplayAction);
    async fn render_answer(&mut self, answer: &str);
    async fn render_error(&mut self, notice: ErrorNotice);
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Input was empty or only whitespace; nothing was sent. Both front-ends
    /// already drop blank prompts, so the two are treated alike here.
    Skipped,
    Completed,
    Failed(ErrorNotice),
}

/// One conversation with the agent, identified by a random session id.
pub struct Session {
    id: String,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Send `input` to the agent and render the response stream as it arrives.
    ///
    /// Errors never escape: they are logged, rendered as an [`ErrorNotice`]
    /// and end the run.
    pub async fn run(
        &self,
        runtime: &dyn AgentRuntime,
        input: &str,
        renderer: &mut dyn Renderer,
    ) -> RunOutcome {
        if input.trim().is_empty() {
            return RunOutcome::Skipped;
        }

        match self.consume(runtime, input, renderer).await {
            Ok(()) => RunOutcome::Completed,
            Err(err) => {
                tracing::error!(session_id = %self.id, error = %err, "agent run failed");
                let notice = ErrorNotice::from(&err);
                renderer.render_error(notice).await;
                RunOutcome::Failed(notice)
            }
        }
    }

    async fn consume(
        &self,
        runtime: &dyn AgentRuntime,
        input: &str,
        renderer: &mut dyn Renderer,
    ) -> AgentResult<()> {
        let request = InvokeRequest {
            session_id: self.id.clone(),
            input_text: input.to_string(),
            enable_trace: true,
        };
        let mut stream = runtime.invoke(request).await?;

        while let Some(event) = stream.next().await {
            match event? {
                StreamEvent::Trace(part) => {
                    for trace_event in parse_trace(&part)? {
                        if let Some(action) = classify(&trace_event) {
                            renderer.render_trace(action).await;
                        }
                    }
                }
                StreamEvent::Chunk(bytes) => {
                    let answer = String::from_utf8(bytes)?;
                    renderer.render_answer(&answer).await;
                }
                StreamEvent::Other(kind) => {
                    tracing::debug!(%kind, "ignoring stream event");
                }
            }
        }

        Ok(())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
