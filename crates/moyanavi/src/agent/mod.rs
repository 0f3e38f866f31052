pub mod bedrock;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::errors::AgentResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeRequest {
    pub session_id: String,
    pub input_text: String,
    pub enable_trace: bool,
}

/// One element of an agent response stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A trace part in the runtime's JSON shape, see [`crate::trace::parse_trace`].
    Trace(Value),
    /// A piece of the final answer.
    Chunk(Vec<u8>),
    /// Anything the front-ends do not render (return-control requests, files).
    Other(String),
}

pub type EventStream = BoxStream<'static, AgentResult<StreamEvent>>;

/// A hosted agent that plans, calls tools and streams back its work.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> AgentResult<EventStream>;
}
