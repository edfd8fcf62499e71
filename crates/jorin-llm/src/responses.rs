//! Stateful adapter: the backend keeps the conversation and each call resumes
//! from the last `previous_response_id`, sending only what came after it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::types::arguments_text;
use crate::{
    BackendConfig, HttpTransport, LlmError, Message, ProtocolAdapter, Role, ToolCallRequest,
    ToolDefinition,
};

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ResponsesTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_response_id: Option<&'a str>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum InputItem {
    Message {
        role: &'static str,
        content: Vec<ContentPart>,
    },
    FunctionCall {
        name: String,
        arguments: String,
        call_id: String,
    },
    FunctionCallOutput {
        call_id: String,
        output: String,
    },
}

#[derive(Debug, PartialEq, Serialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct ResponsesTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ResponsesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OutputItem {
    Message {
        #[serde(default)]
        content: Vec<OutputContent>,
    },
    FunctionCall {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        call_id: Option<String>,
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Index of the newest assistant message carrying a continuation token.
fn continuation_anchor(transcript: &[Message]) -> Option<(usize, &str)> {
    transcript
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, message)| {
            (message.role == Role::Assistant)
                .then_some(message.continuation_token.as_deref())
                .flatten()
                .map(|token| (index, token))
        })
}

/// System messages go out as `instructions` on every call, never as input.
fn instructions(transcript: &[Message]) -> Option<String> {
    let text: String = transcript
        .iter()
        .filter(|message| message.role == Role::System)
        .map(|message| format!("{}\n", message.content))
        .collect();
    (!text.trim().is_empty()).then_some(text)
}

fn input_items(messages: &[Message]) -> Vec<InputItem> {
    let mut items = Vec::new();
    for message in messages {
        match message.role {
            Role::System => {}
            Role::Tool => items.push(InputItem::FunctionCallOutput {
                call_id: message.tool_call_id.clone().unwrap_or_default(),
                output: message.content.clone(),
            }),
            Role::User | Role::Assistant => {
                if !message.content.is_empty() {
                    let kind = if message.role == Role::Assistant {
                        "output_text"
                    } else {
                        "input_text"
                    };
                    items.push(InputItem::Message {
                        role: message.role.as_str(),
                        content: vec![ContentPart {
                            kind,
                            text: message.content.clone(),
                        }],
                    });
                }
                items.extend(message.tool_calls.iter().map(|call| InputItem::FunctionCall {
                    name: call.tool_name.clone(),
                    arguments: call.raw_arguments.clone(),
                    call_id: call.id.clone(),
                }));
            }
        }
    }
    items
}

#[derive(Clone)]
pub struct ResponsesAdapter {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

impl ResponsesAdapter {
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Value, LlmError> {
        let (new_messages, previous_response_id) = match continuation_anchor(transcript) {
            Some((index, token)) => (&transcript[index + 1..], Some(token)),
            None => (transcript, None),
        };
        let request = ResponsesRequest {
            model: &self.config.model,
            input: input_items(new_messages),
            instructions: instructions(transcript),
            tools: tools
                .iter()
                .map(|tool| ResponsesTool {
                    kind: "function",
                    name: &tool.name,
                    description: &tool.description,
                    parameters: &tool.parameters,
                })
                .collect(),
            previous_response_id,
        };
        Ok(serde_json::to_value(request)?)
    }
}

#[async_trait]
impl ProtocolAdapter for ResponsesAdapter {
    fn name(&self) -> &str {
        "responses"
    }

    async fn complete(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, LlmError> {
        let body = self.build_request(transcript, tools)?;
        debug!(
            input_items = body["input"].as_array().map_or(0, Vec::len),
            resumed = body.get("previous_response_id").is_some(),
            "sending responses request"
        );
        let raw = self
            .transport
            .post_json(&self.config.endpoint(), &self.config.api_key, &body)
            .await?;
        let response: ResponsesResponse = serde_json::from_value(raw)?;

        let mut text = String::new();
        let mut tool_calls = Vec::new();
        let mut answered = false;
        for item in response.output {
            match item {
                OutputItem::Message { content } => {
                    answered = true;
                    for part in content {
                        if part.kind == "output_text" || part.kind == "text" {
                            text.push_str(&part.text);
                        }
                    }
                }
                OutputItem::FunctionCall {
                    id,
                    call_id,
                    name,
                    arguments,
                } => {
                    answered = true;
                    let call_id = call_id.or(id).unwrap_or_default();
                    let arguments = arguments_text(arguments);
                    tool_calls.push(ToolCallRequest::new(call_id, name, arguments));
                }
                OutputItem::Other => {}
            }
        }
        // reasoning or other bookkeeping items alone carry no answer
        if !answered {
            return Err(LlmError::EmptyResponse("output"));
        }

        let message = Message::assistant_with_tool_calls(text, tool_calls);
        Ok(match response.id {
            Some(id) => message.with_continuation_token(id),
            None => message,
        })
    }
}
