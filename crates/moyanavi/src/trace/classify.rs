use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::{ToolKind, TraceEvent};

/// Shown while a step has no text of its own yet.
pub const PLACEHOLDER: &str = "Preparing the results. Please wait a moment.";

const MODEL_INPUT_TEXT: &str = "Formulating the analysis approach.";

lazy_static! {
    static ref THINKING: Regex = Regex::new(r"(?s)<thinking>\s*(.*?)\s*</thinking>").unwrap();
}

/// A display region. Each surface holds one item; a new action replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Search,
    Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayAction {
    pub surface: Surface,
    pub title: String,
    pub body: String,
}

impl DisplayAction {
    fn new(surface: Surface, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            surface,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Text between the first `<thinking>` and the first `</thinking>` after it,
/// trimmed. Empty when there is no such pair.
pub fn extract_thinking_text(raw: &str) -> String {
    THINKING
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|inner| inner.as_str().to_string())
        .unwrap_or_default()
}

/// Decide what to show for one trace event, if anything.
pub fn classify(event: &TraceEvent) -> Option<DisplayAction> {
    match event {
        TraceEvent::ModelInput => Some(DisplayAction::new(
            Surface::Analysis,
            "🤔 Thinking…",
            MODEL_INPUT_TEXT,
        )),
        TraceEvent::ModelOutput { raw } => Some(DisplayAction::new(
            Surface::Analysis,
            "💡 Thoughts collected",
            raw.as_deref().map(extract_thinking_text).unwrap_or_default(),
        )),
        TraceEvent::Rationale { text } => Some(DisplayAction::new(
            Surface::Analysis,
            "✅ Decided the next action",
            text.as_deref().unwrap_or(PLACEHOLDER),
        )),
        TraceEvent::ToolInvocation {
            kind: ToolKind::AgentCollaborator,
            agent_name: Some(name),
            text,
        } if !name.is_empty() => Some(DisplayAction::new(
            Surface::Search,
            format!("🤖 Calling agent “{}”…", name),
            text.as_deref().unwrap_or(PLACEHOLDER),
        )),
        TraceEvent::ToolObservation {
            kind: ToolKind::AgentCollaborator,
            agent_name: Some(name),
            text,
        } if !name.is_empty() => Some(DisplayAction::new(
            Surface::Search,
            format!("🤖 Agent “{}” responded", name),
            text.as_deref().unwrap_or(PLACEHOLDER),
        )),
        TraceEvent::ToolInvocation { .. }
        | TraceEvent::ToolObservation { .. }
        | TraceEvent::Skipped { .. } => None,
    }
}
