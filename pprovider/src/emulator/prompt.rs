//! Builds the instructional system prompt that stands in for native
//! tool-calling.
//!
//! The wording is part of the output-parsing contract: models tuned against
//! this template answer with a bare JSON object or array, which
//! [`parser`](super::parser) then recovers. Changing it changes what comes
//! back.

use crate::{Message, ToolDefinition};

const PROMPT_INSTRUCTIONS: &str = r#"When you need to call a function, respond with a JSON object in the following format:
{
  "name": "function_name",
  "arguments": {
    "param1": "value1",
    "param2": "value2"
  }
}

If you need to call multiple functions, respond with a JSON array:
[
  {"name": "func1", "arguments": {}},
  {"name": "func2", "arguments": {}}
]

IMPORTANT:
- Only respond with the JSON object/array when you need to call a function
- Do NOT wrap the JSON in code blocks or markdown
- Do NOT add any text before or after the JSON
- If you don't need to call a function, respond normally with natural language"#;

/// Renders each tool as `- <name>: <description>` with its parameter schema
/// pretty-printed underneath, unmodified.
pub(super) fn tool_descriptions(tools: &[ToolDefinition]) -> String {
    let mut lines = Vec::new();

    for tool in tools {
        let spec = &tool.function;
        lines.push(format!("- {}: {}", spec.name, spec.description));
        let schema = serde_json::to_string_pretty(&spec.parameters)
            .unwrap_or_else(|_| spec.parameters.to_string());
        lines.push(format!("  Parameters: {schema}"));
    }

    lines.join("\n")
}

/// Prepends the synthesized tool-instruction system message to `messages`.
pub(super) fn with_tool_instructions(
    messages: &[Message],
    tools: &[ToolDefinition],
) -> Vec<Message> {
    let system_text = format!(
        "You are an AI assistant that can call functions to help users.\n\n\
         Available functions:\n{}\n\n{}",
        tool_descriptions(tools),
        PROMPT_INSTRUCTIONS,
    );

    let mut prompted = Vec::with_capacity(messages.len() + 1);
    prompted.push(Message::system(system_text));
    prompted.extend(messages.iter().cloned());
    prompted
}
