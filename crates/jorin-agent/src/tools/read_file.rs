use jorin_llm::ToolDefinition;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use super::{READ_FILE_TOOL, RegisteredTool, ToolEffect, ToolOutput};
use crate::{ToolError, TruncationMode, truncate_bytes};

/// Room for one more full UTF-8 character past the limit, so the cut can land
/// on a character boundary.
const MAX_CHAR_BYTES: u64 = 4;

pub(super) fn read_file_tool() -> RegisteredTool {
    RegisteredTool {
        definition: ToolDefinition {
            name: READ_FILE_TOOL.to_string(),
            description: "Read a UTF-8 text file and return its contents. \
                          Very long files are truncated."
                .to_string(),
            parameters: json!({
                "type": "object",
                "required": ["path"],
                "properties": {
                    "path": { "type": "string" }
                }
            }),
        },
        effect: ToolEffect::ReadOnly,
        fallback_field: Some("path"),
        executor: Arc::new(|args, context| {
            Box::pin(async move {
                let path = context.policy.resolve_path(args.require_str("path")?);
                let limit = context.config.read_max_bytes;
                let bytes = read_head(&path, limit).await?;
                let decoded = String::from_utf8_lossy(&bytes);
                let text = truncate_bytes(&decoded, limit, TruncationMode::Head);
                Ok(ToolOutput::new()
                    .with("text", text.text)
                    .with("truncated", text.truncated))
            })
        }),
    }
}

/// Reads no more of the file than is needed to fill `limit` bytes of text.
async fn read_head(path: &Path, limit: usize) -> Result<Vec<u8>, ToolError> {
    let file = tokio::fs::File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(limit as u64 + MAX_CHAR_BYTES)
        .read_to_end(&mut bytes)
        .await?;
    Ok(bytes)
}
