use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream;

use super::{AgentRuntime, EventStream, InvokeRequest, StreamEvent};
use crate::errors::{AgentError, AgentResult};

enum Step {
    Event(StreamEvent),
    Fail { code: Option<String>, message: String },
}

/// A runtime that replays a scripted response stream for testing
#[derive(Clone, Default)]
pub struct MockRuntime {
    steps: Arc<Mutex<Vec<Step>>>,
    requests: Arc<Mutex<Vec<InvokeRequest>>>,
    reject: Option<(Option<String>, String)>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(self, event: StreamEvent) -> Self {
        self.steps.lock().unwrap().push(Step::Event(event));
        self
    }

    pub fn with_trace(self, trace: serde_json::Value) -> Self {
        self.with_event(StreamEvent::Trace(trace))
    }

    pub fn with_chunk(self, text: &str) -> Self {
        self.with_event(StreamEvent::Chunk(text.as_bytes().to_vec()))
    }

    /// Fail the stream at this point with the given error code and message.
    pub fn with_failure(self, code: Option<&str>, message: &str) -> Self {
        self.steps.lock().unwrap().push(Step::Fail {
            code: code.map(str::to_string),
            message: message.to_string(),
        });
        self
    }

    /// Fail the invocation itself before any event is produced.
    pub fn rejecting(mut self, code: Option<&str>, message: &str) -> Self {
        self.reject = Some((code.map(str::to_string), message.to_string()));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<InvokeRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRuntime for MockRuntime {
    async fn invoke(&self, request: InvokeRequest) -> AgentResult<EventStream> {
        self.requests.lock().unwrap().push(request);

        if let Some((code, message)) = &self.reject {
            return Err(AgentError::from_runtime(code.as_deref(), message.clone()));
        }

        let steps: Vec<Step> = self.steps.lock().unwrap().drain(..).collect();
        let items = steps.into_iter().map(|step| match step {
            Step::Event(event) => Ok(event),
            Step::Fail { code, message } => Err(AgentError::from_runtime(code.as_deref(), message)),
        });
        Ok(Box::pin(stream::iter(items.collect::<Vec<_>>())))
    }
}
