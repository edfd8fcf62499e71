use jorin_llm::ToolDefinition;
use serde_json::json;
use std::sync::Arc;

use super::{HTTP_GET_TOOL, RegisteredTool, ToolEffect, ToolOutput};
use crate::HttpFetcher;

pub(super) fn http_get_tool(fetcher: Arc<dyn HttpFetcher>) -> RegisteredTool {
    RegisteredTool {
        definition: ToolDefinition {
            name: HTTP_GET_TOOL.to_string(),
            description: "Fetch a URL and return the status and body text.".to_string(),
            parameters: json!({
                "type": "object",
                "required": ["url"],
                "properties": {
                    "url": { "type": "string" }
                }
            }),
        },
        effect: ToolEffect::Network,
        fallback_field: Some("url"),
        executor: Arc::new(move |args, context| {
            let fetcher = fetcher.clone();
            Box::pin(async move {
                let url = args.require_str("url")?;
                let fetched = fetcher
                    .get(
                        url,
                        context.config.http_body_max_bytes,
                        context.config.http_timeout,
                    )
                    .await?;
                Ok(ToolOutput::new()
                    .with("status", fetched.status)
                    .with("body", fetched.body)
                    .with("truncated", fetched.truncated))
            })
        }),
    }
}
