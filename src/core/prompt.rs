//! Prompt construction
//!
//! Flattens a structured chat request into the single prompt string the
//! on-device runtime consumes. Pure and deterministic: identical requests
//! always produce byte-identical prompts.

use crate::core::constants::role;
use crate::models::openai::ChatCompletionRequest;

/// Build the flat prompt for a chat completion request.
///
/// The first system message leads, the remaining messages follow in
/// conversation order, tool definitions (when present) are appended as an
/// instruction block, and the prompt ends with a trailing `assistant: ` cue
/// so the engine continues as the assistant turn.
pub fn build_prompt(request: &ChatCompletionRequest) -> String {
    let mut prompt = String::new();

    if let Some(system) = request.messages.iter().find(|m| m.role == role::SYSTEM) {
        prompt.push_str(&format!(
            "system: {}\n",
            system.content.as_deref().unwrap_or_default()
        ));
    }

    for message in request.messages.iter().filter(|m| m.role != role::SYSTEM) {
        prompt.push_str(&format!(
            "{}: {}\n",
            message.role,
            message.content.as_deref().unwrap_or_default()
        ));
    }

    if let Some(tools) = &request.tools {
        prompt.push_str(
            "\nYou have access to the following tools. If you need to use a tool, \
             respond with <tool_call>{\"name\": \"function_name\", \"arguments\": \"{...}\"}</tool_call>.\n",
        );
        for tool in tools {
            prompt.push_str(&format!(
                "- {}: {}\n",
                tool.function.name,
                tool.function.description.as_deref().unwrap_or_default()
            ));
            let parameters = tool
                .function
                .parameters
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_default();
            prompt.push_str(&format!("  Parameters: {}\n", parameters));
        }
    }

    prompt.push_str("assistant: ");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::openai::{ChatMessage, FunctionDefinition, Tool};
    use serde_json::json;

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            role: role.to_string(),
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
            name: None,
        }
    }

    fn request(messages: Vec<ChatMessage>, tools: Option<Vec<Tool>>) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gemma".to_string(),
            messages,
            stream: false,
            temperature: None,
            top_p: None,
            max_tokens: None,
            tools,
            tool_choice: None,
        }
    }

    #[test]
    fn test_system_message_leads() {
        let req = request(
            vec![
                message("user", "hi"),
                message("system", "be brief"),
                message("assistant", "hello"),
            ],
            None,
        );
        let prompt = build_prompt(&req);
        assert_eq!(
            prompt,
            "system: be brief\nuser: hi\nassistant: hello\nassistant: "
        );
    }

    #[test]
    fn test_trailing_cue_has_no_newline() {
        let req = request(vec![message("user", "hi")], None);
        assert!(build_prompt(&req).ends_with("assistant: "));
    }

    #[test]
    fn test_tool_block_appended() {
        let tools = vec![Tool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: "get_weather".to_string(),
                description: Some("Look up current weather".to_string()),
                parameters: Some(json!({"type": "object"})),
            },
        }];
        let req = request(vec![message("user", "weather in Paris?")], Some(tools));
        let prompt = build_prompt(&req);
        assert!(prompt.contains("<tool_call>"));
        assert!(prompt.contains("- get_weather: Look up current weather"));
        assert!(prompt.contains("  Parameters: {\"type\":\"object\"}"));
    }

    #[test]
    fn test_deterministic() {
        let req = request(
            vec![message("system", "s"), message("user", "u")],
            Some(vec![Tool {
                tool_type: "function".to_string(),
                function: FunctionDefinition {
                    name: "f".to_string(),
                    description: None,
                    parameters: None,
                },
            }]),
        );
        assert_eq!(build_prompt(&req), build_prompt(&req));
    }
}
