use jorin_llm::ToolDefinition;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, warn};

use super::{ToolContext, ToolOutput};
use crate::{CommandVerdict, Policy, SessionConfig, ToolArgs, ToolError, recover_arguments};

pub type ToolFuture = Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send>>;
pub type ToolExecutor = Arc<dyn Fn(ToolArgs, ToolContext) -> ToolFuture + Send + Sync>;

/// What a tool touches, which decides the policy checks applied before it runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolEffect {
    ReadOnly,
    /// Blocked in readonly sessions.
    Mutating,
    /// Subject to allow/deny lists and dry-run on its `cmd` argument.
    Shell,
    Network,
}

#[derive(Clone)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub effect: ToolEffect,
    /// Field that bare, non-JSON arguments are wrapped into. Only set for tools
    /// with exactly one required field.
    pub fallback_field: Option<&'static str>,
    pub executor: ToolExecutor,
}

#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl ToolRegistry {
    pub fn register(&mut self, tool: RegisteredTool) {
        self.tools.insert(tool.definition.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| tool.definition.clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Runs one tool call. Never fails: unknown tools, policy refusals and tool
    /// errors all come back as a result map with an `error` key.
    pub async fn execute(
        &self,
        tool_name: &str,
        raw_arguments: &str,
        policy: &Policy,
        config: &SessionConfig,
    ) -> ToolOutput {
        let Some(tool) = self.tools.get(tool_name) else {
            warn!(tool = tool_name, "model requested an unknown tool");
            return ToolOutput::error("unknown tool");
        };

        let arguments = recover_arguments(tool_name, raw_arguments, tool.fallback_field);
        if let Some(refusal) = check_policy(tool.effect, &arguments, policy) {
            warn!(tool = tool_name, result = %refusal.to_json(), "tool call stopped by policy");
            return refusal;
        }

        let context = ToolContext {
            policy: policy.clone(),
            config: config.clone(),
        };
        match (tool.executor)(arguments, context).await {
            Ok(output) => output,
            Err(error) => {
                debug!(tool = tool_name, %error, "tool reported an error");
                ToolOutput::error(error.to_string())
            }
        }
    }
}

fn check_policy(effect: ToolEffect, arguments: &ToolArgs, policy: &Policy) -> Option<ToolOutput> {
    match effect {
        ToolEffect::Shell => {
            // a missing command is left for the tool to report
            let command = arguments.str_field("cmd").filter(|cmd| !cmd.is_empty())?;
            match policy.check_command(command) {
                CommandVerdict::Denied => Some(ToolOutput::error("denied by policy")),
                CommandVerdict::NotAllowed => Some(ToolOutput::error("not allowed by policy")),
                CommandVerdict::Allowed if policy.dry_run => {
                    Some(ToolOutput::new().with("dry_run", true).with("cmd", command))
                }
                CommandVerdict::Allowed => None,
            }
        }
        ToolEffect::Mutating if policy.readonly => Some(ToolOutput::error("readonly session")),
        ToolEffect::Mutating | ToolEffect::ReadOnly | ToolEffect::Network => None,
    }
}
