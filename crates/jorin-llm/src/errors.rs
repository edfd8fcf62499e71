use thiserror::Error;

/// Failures talking to the backend. All of them end the session.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("API {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode backend response: {0}")]
    Decode(String),
    #[error("backend returned no {0}")]
    EmptyResponse(&'static str),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decode(error.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TranscriptError {
    #[error("tool message is missing a tool_call_id")]
    MissingToolCallId,
    #[error("tool result '{call_id}' has no preceding assistant tool calls")]
    NoPendingToolCalls { call_id: String },
    #[error("tool result '{call_id}' does not match any call of the preceding assistant message")]
    UnknownToolCallId { call_id: String },
    #[error("tool call '{call_id}' was already answered")]
    DuplicateToolResult { call_id: String },
}
