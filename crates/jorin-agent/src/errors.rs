use thiserror::Error;

/// Fatal session outcomes. Anything recoverable is written into the transcript instead.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Llm(#[from] jorin_llm::LlmError),
    #[error("max turns reached ({max_turns}) without a final answer")]
    TurnBudgetExhausted { max_turns: usize },
    #[error("session cancelled")]
    Cancelled,
    #[error(transparent)]
    Transcript(#[from] jorin_llm::TranscriptError),
}

/// Failures inside a tool body. The registry turns these into `{"error": ...}` results.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing {0}")]
    MissingArgument(String),
    #[error("argument '{name}' must be {expected}")]
    InvalidArgument { name: String, expected: &'static str },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Http(String),
    #[error("failed to start command: {0}")]
    Spawn(String),
}

impl From<reqwest::Error> for ToolError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
