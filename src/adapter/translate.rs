// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Schema translation between the canonical conversation model and the
//! OpenAI-compatible wire format.
//!
//! Every function here is pure and stateless: identical input yields
//! byte-identical wire output. The only lossy spot is tool-result content,
//! which travels as a string on the wire; translation back attempts a JSON
//! parse first and falls back to the raw string.

use crate::types::{
    GenerationResponse, Message, Role, TokenUsage, ToolDeclaration, ToolInvocation, ToolResult,
};

use super::wire::{
    ChatResponse, WireFunction, WireMessage, WireTool, WireToolCall, WireToolFunction,
};

/// Convert canonical tool declarations to wire form.
///
/// Name, description, and the parameter schema pass through unchanged.
pub fn declarations_to_wire(tools: &[ToolDeclaration]) -> Vec<WireTool> {
    tools
        .iter()
        .map(|tool| WireTool {
            tool_type: "function".to_string(),
            function: WireToolFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        })
        .collect()
}

/// Convert a canonical tool invocation to wire form.
pub fn invocation_to_wire(invocation: &ToolInvocation) -> WireToolCall {
    WireToolCall {
        index: None,
        id: Some(invocation.id.clone()),
        call_type: Some("function".to_string()),
        function: Some(WireFunction {
            name: Some(invocation.name.clone()),
            arguments: Some(invocation.arguments.clone()),
        }),
    }
}

/// Derive a canonical tool invocation from a wire tool call.
///
/// Returns `None` when the call carries no function name at all. A missing
/// identifier is replaced with a generated one; arguments that are absent or
/// not valid JSON become the empty object so the canonical invariant holds.
pub fn invocation_from_wire(call: &WireToolCall) -> Option<ToolInvocation> {
    let function = call.function.as_ref()?;
    let name = function.name.clone()?;

    let id = call
        .id
        .clone()
        .unwrap_or_else(generate_invocation_id);

    let arguments = match function.arguments.as_deref() {
        Some(raw) if serde_json::from_str::<serde_json::Value>(raw).is_ok() => raw.to_string(),
        _ => "{}".to_string(),
    };

    Some(ToolInvocation {
        id,
        name,
        arguments,
    })
}

/// Generate a locally unique invocation identifier.
///
/// Millisecond timestamp plus a random suffix. Uniqueness only needs to hold
/// within one conversation.
pub fn generate_invocation_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("call-{}-{}", millis, &suffix[..8])
}

/// Convert a canonical tool result into its wire `tool` message.
///
/// String contents are embedded verbatim; anything else is rendered as JSON
/// text.
pub fn result_to_wire(result: &ToolResult) -> WireMessage {
    let content = match &result.content {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    WireMessage {
        role: "tool".to_string(),
        content: Some(content),
        tool_calls: None,
        tool_call_id: Some(result.invocation_id.clone()),
    }
}

/// Recover tool-result content from its wire string render.
///
/// Attempts a JSON parse first and falls back to the raw string, so the
/// round trip is lossy-tolerant rather than failing.
pub fn result_content_from_wire(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Convert a canonical message list to wire form.
///
/// One canonical message expands to zero or more wire messages: an assistant
/// message holding only tool invocations still yields a wire assistant
/// message with empty text and `tool_calls` populated, a canonical `tool`
/// message yields exactly one wire `tool` message, and a message with no
/// content at all yields nothing.
pub fn messages_to_wire(messages: &[Message]) -> Vec<WireMessage> {
    messages.iter().flat_map(message_to_wire).collect()
}

fn message_to_wire(message: &Message) -> Vec<WireMessage> {
    match message.role {
        Role::System | Role::User => vec![WireMessage {
            role: role_name(message.role).to_string(),
            content: Some(message.text.clone()),
            tool_calls: None,
            tool_call_id: None,
        }],
        Role::Assistant => {
            if message.tool_invocations.is_empty() && message.text.is_empty() {
                return Vec::new();
            }
            let tool_calls = if message.tool_invocations.is_empty() {
                None
            } else {
                Some(
                    message
                        .tool_invocations
                        .iter()
                        .map(invocation_to_wire)
                        .collect(),
                )
            };
            vec![WireMessage {
                role: "assistant".to_string(),
                content: Some(message.text.clone()),
                tool_calls,
                tool_call_id: None,
            }]
        }
        Role::Tool => match &message.tool_result {
            Some(result) => vec![result_to_wire(result)],
            None => Vec::new(),
        },
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
}

/// Derive a canonical generation response from a parsed wire message.
///
/// Structural validation (first choice present, message present) happens in
/// the client before this runs.
pub fn response_from_wire(message: WireMessage, usage: Option<TokenUsage>) -> GenerationResponse {
    let tool_invocations = message
        .tool_calls
        .unwrap_or_default()
        .iter()
        .filter_map(invocation_from_wire)
        .collect();

    GenerationResponse {
        text: message.content.unwrap_or_default(),
        tool_invocations,
        usage,
    }
}

/// Extract token usage from a wire response, when the server supplies it.
pub fn usage_from_wire(response: &ChatResponse) -> Option<TokenUsage> {
    response.usage.map(|u| TokenUsage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    })
}
