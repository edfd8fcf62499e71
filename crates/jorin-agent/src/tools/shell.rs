use jorin_llm::ToolDefinition;
use serde_json::json;
use std::sync::Arc;

use super::{RegisteredTool, SHELL_TOOL, ToolEffect, ToolOutput};
use crate::{CommandRunner, TruncationMode, truncate_bytes};

pub(super) fn shell_tool(runner: Arc<dyn CommandRunner>) -> RegisteredTool {
    RegisteredTool {
        definition: ToolDefinition {
            name: SHELL_TOOL.to_string(),
            description: "Execute a shell command; returns stdout, stderr and returncode. \
                          Use cautiously if commands may be destructive."
                .to_string(),
            parameters: json!({
                "type": "object",
                "required": ["cmd"],
                "properties": {
                    "cmd": { "type": "string" }
                }
            }),
        },
        effect: ToolEffect::Shell,
        fallback_field: Some("cmd"),
        executor: Arc::new(move |args, context| {
            let runner = runner.clone();
            Box::pin(async move {
                let command = args.require_str("cmd")?;
                let limit = context.config.command_output_max_bytes;
                let output = runner
                    .run(
                        command,
                        context.policy.working_directory.as_deref(),
                        context.config.command_timeout,
                        limit,
                    )
                    .await?;

                let stdout = truncate_bytes(&output.stdout, limit, TruncationMode::Tail);
                let stderr = truncate_bytes(&output.stderr, limit, TruncationMode::Tail);
                let mut result = ToolOutput::new()
                    .with("returncode", output.exit_code)
                    .with("stdout", stdout.text)
                    .with("stderr", stderr.text)
                    .with(
                        "truncated",
                        output.truncated || stdout.truncated || stderr.truncated,
                    );
                if output.timed_out {
                    result = result.with("timed_out", true);
                }
                Ok(result)
            })
        }),
    }
}
