//! Reasoning trace emitted by the agent runtime while it works on a request.
//!
//! Traces arrive as loosely shaped JSON. [`parse_trace`] validates them once at
//! the stream boundary and turns them into [`TraceEvent`]s; [`classify`] then
//! decides what, if anything, is shown for each event.

mod classify;

pub use classify::{classify, extract_thinking_text, DisplayAction, Surface, PLACEHOLDER};

use serde_json::{Map, Value};

use crate::errors::TraceError;

/// The kind of tool the agent invoked. Only collaborator agents are displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolKind {
    AgentCollaborator,
    Other(String),
}

impl ToolKind {
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "AGENT_COLLABORATOR" => ToolKind::AgentCollaborator,
            other => ToolKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// The prompt sent to the model. Its content is never shown.
    ModelInput,
    ModelOutput {
        raw: Option<String>,
    },
    Rationale {
        text: Option<String>,
    },
    ToolInvocation {
        kind: ToolKind,
        agent_name: Option<String>,
        text: Option<String>,
    },
    ToolObservation {
        kind: ToolKind,
        agent_name: Option<String>,
        text: Option<String>,
    },
    /// A well-formed trace this application does not display, e.g. a
    /// pre-processing trace. `kind` names the trace key.
    Skipped {
        kind: String,
    },
}

const ORCHESTRATION: &str = "orchestrationTrace";

/// Parse one trace part from the response stream.
///
/// Accepts either the whole trace part (`{"trace": {...}, "agentId": ...}`) or
/// the inner trace object. An orchestration trace yields one event per populated
/// step, in the order model input, model output, rationale, invocation,
/// observation.
pub fn parse_trace(part: &Value) -> Result<Vec<TraceEvent>, TraceError> {
    let trace = part.get("trace").unwrap_or(part);
    let trace = as_object(trace, "trace")?;

    let orchestration = match trace.get(ORCHESTRATION) {
        Some(orchestration) => as_object(orchestration, ORCHESTRATION)?,
        None => {
            let kind = trace
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| "empty".to_string());
            tracing::debug!(%kind, "skipping non-orchestration trace");
            return Ok(vec![TraceEvent::Skipped { kind }]);
        }
    };

    let mut events = Vec::new();

    if orchestration.contains_key("modelInvocationInput") {
        events.push(TraceEvent::ModelInput);
    }

    if let Some(output) = orchestration.get("modelInvocationOutput") {
        let raw = output.get("rawResponse").ok_or_else(|| {
            TraceError::Malformed("modelInvocationOutput has no rawResponse".to_string())
        })?;
        events.push(TraceEvent::ModelOutput {
            raw: string_at(raw, &["content"]),
        });
    }

    if let Some(rationale) = orchestration.get("rationale") {
        events.push(TraceEvent::Rationale {
            text: string_at(rationale, &["text"]),
        });
    }

    if let Some(invocation) = orchestration.get("invocationInput") {
        let collaborator = "agentCollaboratorInvocationInput";
        events.push(TraceEvent::ToolInvocation {
            kind: tool_kind(invocation, "invocationType"),
            agent_name: string_at(invocation, &[collaborator, "agentCollaboratorName"]),
            text: string_at(invocation, &[collaborator, "input", "text"]),
        });
    }

    if let Some(observation) = orchestration.get("observation") {
        let collaborator = "agentCollaboratorInvocationOutput";
        events.push(TraceEvent::ToolObservation {
            kind: tool_kind(observation, "type"),
            agent_name: string_at(observation, &[collaborator, "agentCollaboratorName"]),
            text: string_at(observation, &[collaborator, "output", "text"]),
        });
    }

    if events.is_empty() {
        let kind = orchestration
            .keys()
            .next()
            .map(|step| format!("{}.{}", ORCHESTRATION, step))
            .unwrap_or_else(|| ORCHESTRATION.to_string());
        tracing::warn!(%kind, "orchestration trace has no displayable step");
        events.push(TraceEvent::Skipped { kind });
    }

    Ok(events)
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, TraceError> {
    value
        .as_object()
        .ok_or_else(|| TraceError::Malformed(format!("{} is not an object", what)))
}

fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    path.iter()
        .try_fold(value, |current, key| current.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn tool_kind(value: &Value, key: &str) -> ToolKind {
    ToolKind::from_wire(value.get(key).and_then(Value::as_str).unwrap_or_default())
}
