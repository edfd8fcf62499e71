use jorin_llm::ToolDefinition;
use serde_json::json;
use std::sync::Arc;

use super::{RegisteredTool, ToolEffect, ToolOutput, WRITE_FILE_TOOL};

pub(super) fn write_file_tool() -> RegisteredTool {
    RegisteredTool {
        definition: ToolDefinition {
            name: WRITE_FILE_TOOL.to_string(),
            description: "Write UTF-8 text to a file, creating or overwriting it. \
                          Parent directories are created as needed."
                .to_string(),
            parameters: json!({
                "type": "object",
                "required": ["path", "text"],
                "properties": {
                    "path": { "type": "string" },
                    "text": { "type": "string" }
                }
            }),
        },
        effect: ToolEffect::Mutating,
        fallback_field: None,
        executor: Arc::new(|args, context| {
            Box::pin(async move {
                let path = context.policy.resolve_path(args.require_str("path")?);
                let text = args.require_str_allow_empty("text")?;
                if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, text).await?;
                Ok(ToolOutput::new().with("ok", true).with("bytes", text.len()))
            })
        }),
    }
}
