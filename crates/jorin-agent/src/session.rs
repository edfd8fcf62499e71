//! The turn loop: ask the backend, run whatever tools it asks for, append the
//! results, repeat until it answers without tool calls or the budget runs out.

use jorin_llm::{Message, ProtocolAdapter, ToolCallRequest, Transcript};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{CancelHandle, Policy, SessionConfig, SessionError, ToolRegistry, preview};

const ARGUMENT_PREVIEW_CHARS: usize = 200;

/// The transcript is returned on every path, including failures.
#[derive(Debug)]
pub struct SessionOutcome {
    pub transcript: Transcript,
    pub result: Result<String, SessionError>,
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Clone)]
pub struct SessionDriver {
    adapter: Arc<dyn ProtocolAdapter>,
    registry: Arc<ToolRegistry>,
    policy: Policy,
    config: SessionConfig,
}

impl SessionDriver {
    pub fn new(
        adapter: Arc<dyn ProtocolAdapter>,
        registry: Arc<ToolRegistry>,
        policy: Policy,
        config: SessionConfig,
    ) -> Self {
        Self {
            adapter,
            registry,
            policy,
            config,
        }
    }

    pub async fn run(&self, mut transcript: Transcript, cancel: &CancelHandle) -> SessionOutcome {
        let result = self.drive(&mut transcript, cancel).await;
        if let Err(error) = &result {
            warn!(%error, messages = transcript.len(), "session ended without a final answer");
        }
        SessionOutcome { transcript, result }
    }

    async fn drive(
        &self,
        transcript: &mut Transcript,
        cancel: &CancelHandle,
    ) -> Result<String, SessionError> {
        let tools = self.registry.definitions();

        for turn in 1..=self.config.max_turns {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }

            info!(
                adapter = self.adapter.name(),
                turn,
                messages = transcript.len(),
                "requesting completion"
            );
            let mut reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SessionError::Cancelled),
                reply = self.adapter.complete(transcript.messages(), &tools) => reply?,
            };

            assign_unique_call_ids(&mut reply.tool_calls, turn);
            let text = reply.content.clone();
            let tool_calls = reply.tool_calls.clone();
            transcript.push(reply)?;
            if tool_calls.is_empty() {
                return Ok(text);
            }

            // a started batch always finishes so every call gets its result
            for call in &tool_calls {
                info!(
                    tool = %call.tool_name,
                    call_id = %call.id,
                    arguments = %preview(&call.raw_arguments, ARGUMENT_PREVIEW_CHARS),
                    "running tool"
                );
                let output = self
                    .registry
                    .execute(&call.tool_name, &call.raw_arguments, &self.policy, &self.config)
                    .await;
                transcript.push(Message::tool_result(
                    call.id.as_str(),
                    call.tool_name.as_str(),
                    output.to_json(),
                ))?;
            }
        }

        Err(SessionError::TurnBudgetExhausted {
            max_turns: self.config.max_turns,
        })
    }
}

/// Blank or repeated call ids get a fresh `call_<turn>_<index>` id before
/// anything runs, so every call in a batch can be answered exactly once.
fn assign_unique_call_ids(calls: &mut [ToolCallRequest], turn: usize) {
    let mut seen = HashSet::new();
    for (index, call) in calls.iter_mut().enumerate() {
        if call.id.is_empty() || !seen.insert(call.id.clone()) {
            let mut fresh = format!("call_{turn}_{index}");
            while seen.contains(&fresh) {
                fresh.push('_');
            }
            warn!(
                tool = %call.tool_name,
                original = %call.id,
                assigned = %fresh,
                "replacing blank or duplicate tool call id"
            );
            call.id = fresh.clone();
            seen.insert(fresh);
        }
    }
}

/// One-shot form of [`SessionDriver::run`] with default limits and no cancellation.
pub async fn run_session(
    adapter: Arc<dyn ProtocolAdapter>,
    registry: Arc<ToolRegistry>,
    policy: Policy,
    transcript: Transcript,
    max_turns: usize,
) -> SessionOutcome {
    let config = SessionConfig::default().with_max_turns(max_turns);
    SessionDriver::new(adapter, registry, policy, config)
        .run(transcript, &CancelHandle::new())
        .await
}
