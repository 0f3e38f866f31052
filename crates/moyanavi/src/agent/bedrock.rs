use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockagentruntime::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_bedrockagentruntime::types::{OrchestrationTrace, ResponseStream, Trace, TracePart};
use aws_sdk_bedrockagentruntime::Client;
use serde_json::{json, Value};

use super::{AgentRuntime, EventStream, InvokeRequest, StreamEvent};
use crate::config::AgentSettings;
use crate::errors::{AgentError, AgentResult};

/// Agents for Amazon Bedrock runtime client.
pub struct BedrockAgentRuntime {
    client: Client,
    settings: AgentSettings,
}

impl BedrockAgentRuntime {
    pub fn new(client: Client, settings: AgentSettings) -> Self {
        Self { client, settings }
    }

    /// Build a client from the standard AWS credential and region chain.
    pub async fn from_env(settings: AgentSettings) -> Self {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(Client::new(&sdk_config), settings)
    }
}

#[async_trait]
impl AgentRuntime for BedrockAgentRuntime {
    async fn invoke(&self, request: InvokeRequest) -> AgentResult<EventStream> {
        tracing::info!(
            agent_id = %self.settings.agent_id,
            agent_alias_id = %self.settings.agent_alias_id,
            session_id = %request.session_id,
            "invoking agent"
        );

        let output = self
            .client
            .invoke_agent()
            .agent_id(&self.settings.agent_id)
            .agent_alias_id(&self.settings.agent_alias_id)
            .session_id(request.session_id)
            .input_text(request.input_text)
            .enable_trace(request.enable_trace)
            .send()
            .await
            .map_err(|err| runtime_error(&err))?;

        let mut completion = output.completion;
        let stream = async_stream::stream! {
            loop {
                match completion.recv().await {
                    Ok(Some(event)) => yield Ok::<_, AgentError>(to_stream_event(event)),
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(runtime_error(&err));
                        break;
                    }
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

fn runtime_error<E>(err: &E) -> AgentError
where
    E: ProvideErrorMetadata + std::error::Error,
{
    AgentError::from_runtime(err.code(), DisplayErrorContext(err).to_string())
}

fn to_stream_event(event: ResponseStream) -> StreamEvent {
    match event {
        ResponseStream::Chunk(part) => StreamEvent::Chunk(
            part.bytes()
                .map(|bytes| bytes.as_ref().to_vec())
                .unwrap_or_default(),
        ),
        ResponseStream::Trace(part) => StreamEvent::Trace(trace_part_to_json(&part)),
        ResponseStream::ReturnControl(_) => StreamEvent::Other("returnControl".to_string()),
        _ => StreamEvent::Other("unknown".to_string()),
    }
}

/// Render a trace part in the JSON shape the runtime documents, which is what
/// [`crate::trace::parse_trace`] validates.
fn trace_part_to_json(part: &TracePart) -> Value {
    let trace = match part.trace() {
        Some(Trace::OrchestrationTrace(orchestration)) => {
            json!({ "orchestrationTrace": orchestration_to_json(orchestration) })
        }
        Some(Trace::PreProcessingTrace(_)) => json!({ "preProcessingTrace": {} }),
        Some(Trace::PostProcessingTrace(_)) => json!({ "postProcessingTrace": {} }),
        Some(Trace::FailureTrace(failure)) => {
            json!({ "failureTrace": { "failureReason": failure.failure_reason() } })
        }
        Some(Trace::GuardrailTrace(_)) => json!({ "guardrailTrace": {} }),
        Some(_) => json!({ "unknownTrace": {} }),
        None => json!({}),
    };

    json!({
        "agentId": part.agent_id(),
        "sessionId": part.session_id(),
        "trace": trace,
    })
}

fn orchestration_to_json(trace: &OrchestrationTrace) -> Value {
    match trace {
        OrchestrationTrace::ModelInvocationInput(_) => json!({ "modelInvocationInput": {} }),
        OrchestrationTrace::ModelInvocationOutput(output) => {
            let mut value = json!({});
            if let Some(raw) = output.raw_response() {
                value["rawResponse"] = json!({ "content": raw.content() });
            }
            json!({ "modelInvocationOutput": value })
        }
        OrchestrationTrace::Rationale(rationale) => {
            json!({ "rationale": { "text": rationale.text() } })
        }
        OrchestrationTrace::InvocationInput(invocation) => {
            let collaborator = invocation.agent_collaborator_invocation_input().map(|input| {
                json!({
                    "agentCollaboratorName": input.agent_collaborator_name(),
                    "input": { "text": input.input().and_then(|payload| payload.text()) },
                })
            });
            json!({ "invocationInput": {
                "invocationType": invocation.invocation_type().map(|kind| kind.as_str()),
                "agentCollaboratorInvocationInput": collaborator,
            }})
        }
        OrchestrationTrace::Observation(observation) => {
            let collaborator = observation
                .agent_collaborator_invocation_output()
                .map(|output| {
                    json!({
                        "agentCollaboratorName": output.agent_collaborator_name(),
                        "output": { "text": output.output().and_then(|payload| payload.text()) },
                    })
                });
            json!({ "observation": {
                "type": observation.r#type().map(|kind| kind.as_str()),
                "agentCollaboratorInvocationOutput": collaborator,
            }})
        }
        _ => json!({ "unknown": {} }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{classify, parse_trace, DisplayAction, Surface, TraceEvent, PLACEHOLDER};
    use aws_sdk_bedrockagentruntime::primitives::Blob;
    use aws_sdk_bedrockagentruntime::types::{
        AgentCollaboratorInputPayload, AgentCollaboratorInvocationInput,
        AgentCollaboratorInvocationOutput, AgentCollaboratorOutputPayload, InvocationInput,
        InvocationType, Observation, OrchestrationModelInvocationOutput, PayloadPart, Rationale,
        RawResponse, Type,
    };

    fn orchestration_part(trace: OrchestrationTrace) -> TracePart {
        TracePart::builder()
            .agent_id("AGENT")
            .session_id("session-1")
            .trace(Trace::OrchestrationTrace(trace))
            .build()
    }

    fn displayed(part: &TracePart) -> Vec<DisplayAction> {
        parse_trace(&trace_part_to_json(part))
            .unwrap()
            .iter()
            .filter_map(classify)
            .collect()
    }

    fn collaborator_call(name: &str, text: Option<&str>) -> TracePart {
        let mut input = AgentCollaboratorInvocationInput::builder().agent_collaborator_name(name);
        if let Some(text) = text {
            input = input.input(AgentCollaboratorInputPayload::builder().text(text).build());
        }
        orchestration_part(OrchestrationTrace::InvocationInput(
            InvocationInput::builder()
                .invocation_type(InvocationType::AgentCollaborator)
                .agent_collaborator_invocation_input(input.build())
                .build(),
        ))
    }

    fn collaborator_reply(name: &str, text: Option<&str>) -> TracePart {
        let mut output = AgentCollaboratorInvocationOutput::builder().agent_collaborator_name(name);
        if let Some(text) = text {
            output = output.output(AgentCollaboratorOutputPayload::builder().text(text).build());
        }
        orchestration_part(OrchestrationTrace::Observation(
            Observation::builder()
                .r#type(Type::AgentCollaborator)
                .agent_collaborator_invocation_output(output.build())
                .build(),
        ))
    }

    #[test]
    fn test_chunk_bytes() {
        let event = ResponseStream::Chunk(
            PayloadPart::builder()
                .bytes(Blob::new("Answer: 42".as_bytes()))
                .build(),
        );
        assert_eq!(
            to_stream_event(event),
            StreamEvent::Chunk(b"Answer: 42".to_vec())
        );
    }

    #[test]
    fn test_rationale_round_trips_through_parser() {
        let part = orchestration_part(OrchestrationTrace::Rationale(
            Rationale::builder().text("search first").build(),
        ));

        let events = parse_trace(&trace_part_to_json(&part)).unwrap();
        assert_eq!(
            events,
            vec![TraceEvent::Rationale {
                text: Some("search first".to_string())
            }]
        );
    }

    #[test]
    fn test_model_output_keeps_raw_content() {
        let part = orchestration_part(OrchestrationTrace::ModelInvocationOutput(
            OrchestrationModelInvocationOutput::builder()
                .raw_response(
                    RawResponse::builder()
                        .content("<thinking>plan</thinking>")
                        .build(),
                )
                .build(),
        ));

        let value = trace_part_to_json(&part);
        assert_eq!(value["sessionId"], "session-1");
        assert_eq!(
            parse_trace(&value).unwrap(),
            vec![TraceEvent::ModelOutput {
                raw: Some("<thinking>plan</thinking>".to_string())
            }]
        );
    }

    #[test]
    fn test_model_output_without_raw_response_is_rejected() {
        let part = orchestration_part(OrchestrationTrace::ModelInvocationOutput(
            OrchestrationModelInvocationOutput::builder().build(),
        ));
        assert!(parse_trace(&trace_part_to_json(&part)).is_err());
    }

    #[test]
    fn test_collaborator_invocation_reaches_search_surface() {
        let actions = displayed(&collaborator_call("search-agent", Some("find")));
        assert_eq!(
            actions,
            vec![DisplayAction {
                surface: Surface::Search,
                title: "🤖 Calling agent “search-agent”…".to_string(),
                body: "find".to_string(),
            }]
        );
    }

    #[test]
    fn test_collaborator_observation_reaches_search_surface() {
        let actions = displayed(&collaborator_reply("search-agent", Some("three articles")));
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].surface, Surface::Search);
        assert!(actions[0].title.contains("search-agent"));
        assert_eq!(actions[0].body, "three articles");
    }

    #[test]
    fn test_collaborator_without_payload_shows_placeholder() {
        for part in [
            collaborator_call("search-agent", None),
            collaborator_reply("search-agent", None),
        ] {
            let actions = displayed(&part);
            assert_eq!(actions.len(), 1);
            assert_eq!(actions[0].surface, Surface::Search);
            assert!(actions[0].title.contains("search-agent"));
            assert_eq!(actions[0].body, PLACEHOLDER);
        }
    }

    #[test]
    fn test_action_group_invocation_is_not_displayed() {
        let part = orchestration_part(OrchestrationTrace::InvocationInput(
            InvocationInput::builder()
                .invocation_type(InvocationType::ActionGroup)
                .build(),
        ));
        let events = parse_trace(&trace_part_to_json(&part)).unwrap();
        assert!(matches!(events.as_slice(), [TraceEvent::ToolInvocation { .. }]));
        assert!(displayed(&part).is_empty());
    }
}
