//! Stateless adapter: the whole transcript goes out on every call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::types::arguments_text;
use crate::{
    BackendConfig, HttpTransport, LlmError, Message, ProtocolAdapter, ToolCallRequest,
    ToolDefinition,
};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: ChatFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct ChatTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ChatToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn function_type() -> String {
    "function".to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            tool_call_id: message.tool_call_id.clone(),
            name: message.name.clone(),
            tool_calls: message
                .tool_calls
                .iter()
                .map(|call| ChatToolCall {
                    id: call.id.clone(),
                    kind: function_type(),
                    function: ChatFunctionCall {
                        name: call.tool_name.clone(),
                        arguments: Value::String(call.raw_arguments.clone()),
                    },
                })
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct CompletionsAdapter {
    config: BackendConfig,
    transport: Arc<dyn HttpTransport>,
}

impl CompletionsAdapter {
    pub fn new(config: BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    fn build_request(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Value, LlmError> {
        let tools: Vec<ChatTool<'_>> = tools
            .iter()
            .map(|tool| ChatTool {
                kind: "function",
                function: ChatToolFunction {
                    name: &tool.name,
                    description: &tool.description,
                    parameters: &tool.parameters,
                },
            })
            .collect();
        let tool_choice = (!tools.is_empty()).then_some("auto");
        let request = ChatRequest {
            model: &self.config.model,
            messages: transcript.iter().map(ChatMessage::from).collect(),
            tools,
            tool_choice,
        };
        Ok(serde_json::to_value(request)?)
    }
}

#[async_trait]
impl ProtocolAdapter for CompletionsAdapter {
    fn name(&self) -> &str {
        "completions"
    }

    async fn complete(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, LlmError> {
        let body = self.build_request(transcript, tools)?;
        debug!(messages = transcript.len(), "sending chat completions request");
        let raw = self
            .transport
            .post_json(&self.config.endpoint(), &self.config.api_key, &body)
            .await?;
        let response: ChatResponse = serde_json::from_value(raw)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse("choices"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                let arguments = arguments_text(call.function.arguments);
                ToolCallRequest::new(call.id, call.function.name, arguments)
            })
            .collect();
        Ok(Message::assistant_with_tool_calls(
            choice.message.content,
            tool_calls,
        ))
    }
}
