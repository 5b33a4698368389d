//! Tagged tool-call extraction
//!
//! Small, local models can't emit structured tool calls over the wire, so the
//! prompt asks them to wrap invocations in `<tool_call>...</tool_call>` tags.
//! This module scans generated text for those tags and decodes each body into
//! a [`ToolCall`]. Individual malformed bodies are dropped, never fatal.

use crate::core::constants::tool;
use crate::models::openai::{FunctionCall, ToolCall};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

static TOOL_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<tool_call>(.*?)</tool_call>").expect("valid regex"));

/// Extract tool calls from generated text.
///
/// Returns `None` when no tag body parses, which callers treat exactly like
/// tools never having been requested.
pub fn extract_tool_calls(text: &str) -> Option<Vec<ToolCall>> {
    let calls: Vec<ToolCall> = TOOL_CALL_RE
        .captures_iter(text)
        .filter_map(|capture| {
            let body = capture.get(1)?.as_str();
            match serde_json::from_str::<FunctionCall>(body) {
                Ok(function) => Some(ToolCall {
                    id: new_call_id(),
                    call_type: tool::FUNCTION.to_string(),
                    function,
                }),
                Err(e) => {
                    warn!("Failed to parse tool call body {:?}: {}", body, e);
                    None
                }
            }
        })
        .collect();

    if calls.is_empty() { None } else { Some(calls) }
}

fn new_call_id() -> String {
    format!(
        "call_{}",
        &uuid::Uuid::new_v4().simple().to_string()[..8]
    )
}
