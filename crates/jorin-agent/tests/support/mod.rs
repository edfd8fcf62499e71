#![allow(dead_code)]

use async_trait::async_trait;
use jorin_agent::{
    CancelHandle, CommandOutput, CommandRunner, Policy, SessionConfig, SessionDriver, ToolError,
    ToolRegistry, ToolServices,
};
use jorin_llm::{LlmError, Message, ProtocolAdapter, ToolCallRequest, ToolDefinition, Transcript};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays queued replies and records the transcript seen on every call.
#[derive(Clone, Default)]
pub struct SequenceAdapter {
    pub responses: Arc<Mutex<VecDeque<Result<Message, LlmError>>>>,
    pub requests: Arc<Mutex<Vec<Vec<Message>>>>,
    pub tools_seen: Arc<Mutex<Vec<Vec<String>>>>,
}

impl SequenceAdapter {
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<Result<Message, LlmError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().expect("requests mutex").clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("requests mutex").len()
    }
}

#[async_trait]
impl ProtocolAdapter for SequenceAdapter {
    fn name(&self) -> &str {
        "sequence"
    }

    async fn complete(
        &self,
        transcript: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, LlmError> {
        self.requests
            .lock()
            .expect("requests mutex")
            .push(transcript.to_vec());
        self.tools_seen
            .lock()
            .expect("tools mutex")
            .push(tools.iter().map(|tool| tool.name.clone()).collect());
        self.responses
            .lock()
            .expect("responses mutex")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Configuration("no response queued".to_string())))
    }
}

/// Never answers; used to cancel an in-flight call.
#[derive(Clone, Default)]
pub struct PendingAdapter {
    pub calls: Arc<Mutex<usize>>,
}

#[async_trait]
impl ProtocolAdapter for PendingAdapter {
    fn name(&self) -> &str {
        "pending"
    }

    async fn complete(
        &self,
        _transcript: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<Message, LlmError> {
        *self.calls.lock().expect("calls mutex") += 1;
        std::future::pending().await
    }
}

/// Records commands instead of spawning them; optionally cancels a session on first use.
#[derive(Default)]
pub struct SpyRunner {
    pub commands: Mutex<Vec<(String, Option<PathBuf>)>>,
    pub cancel_on_run: Option<CancelHandle>,
}

impl SpyRunner {
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .expect("commands mutex")
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for SpyRunner {
    async fn run(
        &self,
        command: &str,
        working_dir: Option<&Path>,
        _timeout: Duration,
        _output_limit: usize,
    ) -> Result<CommandOutput, ToolError> {
        self.commands
            .lock()
            .expect("commands mutex")
            .push((command.to_string(), working_dir.map(Path::to_path_buf)));
        if let Some(cancel) = &self.cancel_on_run {
            cancel.cancel();
        }
        Ok(CommandOutput {
            stdout: format!("ran: {command}\n"),
            ..CommandOutput::default()
        })
    }
}

pub fn registry_with_runner(runner: Arc<SpyRunner>) -> Arc<ToolRegistry> {
    Arc::new(ToolRegistry::with_builtins(ToolServices {
        runner,
        ..ToolServices::default()
    }))
}

pub fn driver(
    adapter: Arc<dyn ProtocolAdapter>,
    registry: Arc<ToolRegistry>,
    policy: Policy,
    max_turns: usize,
) -> SessionDriver {
    SessionDriver::new(
        adapter,
        registry,
        policy,
        SessionConfig::default().with_max_turns(max_turns),
    )
}

pub fn start(prompt: &str) -> Transcript {
    Transcript::new("You are a test agent.", Some(prompt.to_string()))
}

pub fn tool_call(id: &str, tool: &str, arguments: &str) -> Message {
    Message::assistant_with_tool_calls("", vec![ToolCallRequest::new(id, tool, arguments)])
}

pub fn tool_calls(calls: &[(&str, &str, &str)]) -> Message {
    Message::assistant_with_tool_calls(
        "",
        calls
            .iter()
            .map(|(id, tool, arguments)| ToolCallRequest::new(*id, *tool, *arguments))
            .collect(),
    )
}

pub fn tool_body(message: &Message) -> serde_json::Value {
    serde_json::from_str(&message.content).expect("tool message content should be JSON")
}
