mod http_get;
mod read_file;
mod registry;
mod shell;
mod write_file;

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::{CommandRunner, HttpFetcher, LocalCommandRunner, Policy, ReqwestFetcher, SessionConfig};

pub use registry::{RegisteredTool, ToolEffect, ToolExecutor, ToolFuture, ToolRegistry};

pub const SHELL_TOOL: &str = "shell";
pub const READ_FILE_TOOL: &str = "read_file";
pub const WRITE_FILE_TOOL: &str = "write_file";
pub const HTTP_GET_TOOL: &str = "http_get";

/// Result map returned to the model as the body of a `tool` message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolOutput(Map<String, Value>);

impl ToolOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new().with("error", message.into())
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

/// Per-call view of the session handed to tool executors.
#[derive(Clone, Debug, Default)]
pub struct ToolContext {
    pub policy: Policy,
    pub config: SessionConfig,
}

/// Side-effecting collaborators the built-in tools close over.
#[derive(Clone)]
pub struct ToolServices {
    pub runner: Arc<dyn CommandRunner>,
    pub fetcher: Arc<dyn HttpFetcher>,
}

impl Default for ToolServices {
    fn default() -> Self {
        Self {
            runner: Arc::new(LocalCommandRunner),
            fetcher: Arc::new(ReqwestFetcher::default()),
        }
    }
}

impl ToolRegistry {
    /// Registry holding `shell`, `read_file`, `write_file` and `http_get`.
    pub fn with_builtins(services: ToolServices) -> Self {
        let mut registry = Self::default();
        registry.register(shell::shell_tool(services.runner));
        registry.register(read_file::read_file_tool());
        registry.register(write_file::write_file_tool());
        registry.register(http_get::http_get_tool(services.fetcher));
        registry
    }
}
