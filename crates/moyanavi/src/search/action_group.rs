use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SearchError;

pub const QUERY_PARAMETER: &str = "query";

/// A function invocation sent by the agent runtime to an action group.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupRequest {
    pub message_version: String,
    pub action_group: String,
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
}

impl ActionGroupRequest {
    /// Value of the first parameter called `name`.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    pub fn query(&self) -> Result<&str, SearchError> {
        self.parameter(QUERY_PARAMETER)
            .ok_or_else(|| SearchError::MissingParameter(QUERY_PARAMETER.to_string()))
    }

    /// Wrap `body` in a response addressed back to this invocation.
    pub fn respond(&self, body: String) -> ActionGroupResponse {
        ActionGroupResponse {
            message_version: self.message_version.clone(),
            response: FunctionResult {
                action_group: self.action_group.clone(),
                function: self.function.clone(),
                function_response: FunctionResponse {
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub message_version: String,
    pub response: FunctionResult,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResult {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TextBody {
    pub body: String,
}
