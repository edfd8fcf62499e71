//! Protocol adapter contract.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    BackendConfig, CompletionsAdapter, HttpTransport, LlmError, Message, Protocol,
    ResponsesAdapter, ToolDefinition,
};

/// Completes one turn: sends the transcript (or the part the backend has not seen)
/// and returns the assistant message the backend produced.
///
/// Every implementation returns the same message shape, so callers never need to
/// know which wire protocol is active.
#[async_trait]
pub trait ProtocolAdapter: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, LlmError>;
}

/// Picks the adapter for `config.protocol`.
pub fn build_adapter(
    config: &BackendConfig,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn ProtocolAdapter> {
    match config.protocol {
        Protocol::Completions => Arc::new(CompletionsAdapter::new(config.clone(), transport)),
        Protocol::Responses => Arc::new(ResponsesAdapter::new(config.clone(), transport)),
    }
}
