// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types for the Quill assistant core.
//!
//! This module defines the canonical, provider-agnostic conversation model:
//! messages, tool declarations, tool invocations and results, and the
//! generation contract the rest of the assistant consumes. Wire-format
//! concerns live in [`crate::adapter::wire`]; nothing here knows about JSON
//! shapes on the network.

use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A structured tool invocation requested by the model.
///
/// `arguments` is always JSON text. The streaming assembler guarantees it is
/// syntactically valid by the time an invocation leaves the adapter, falling
/// back to `{}` when the server never closed the fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Unique per invocation; provider-assigned or locally generated.
    pub id: String,
    pub name: String,
    /// JSON-encoded argument object.
    pub arguments: String,
}

impl ToolInvocation {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument string into a JSON value.
    pub fn parsed_arguments(&self) -> serde_json::Value {
        serde_json::from_str(&self.arguments)
            .unwrap_or(serde_json::Value::Object(Default::default()))
    }
}

/// Result from executing a tool, fed back into the conversation.
///
/// `invocation_id` must reference a [`ToolInvocation::id`] issued earlier in
/// the same conversation; the adapter preserves it verbatim but does not
/// enforce the pairing (caller responsibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub invocation_id: String,
    pub name: String,
    pub content: serde_json::Value,
}

impl ToolResult {
    pub fn new(
        invocation_id: impl Into<String>,
        name: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            invocation_id: invocation_id.into(),
            name: name.into(),
            content,
        }
    }
}

/// A message in a conversation.
///
/// Messages are immutable once constructed; a conversation is an ordered
/// sequence of messages and that order is the model's only memory. Role
/// `tool` carries exactly one [`ToolResult`]; role `assistant` may carry zero
/// or more [`ToolInvocation`]s alongside text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_invocations: Vec<ToolInvocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_result: Option<ToolResult>,
}

impl Message {
    /// Create a user message with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            tool_invocations: Vec::new(),
            tool_result: None,
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            tool_invocations: Vec::new(),
            tool_result: None,
        }
    }

    /// Create a system message with text content.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            tool_invocations: Vec::new(),
            tool_result: None,
        }
    }

    /// Create an assistant message carrying tool invocations (and possibly text).
    pub fn assistant_with_invocations(
        text: impl Into<String>,
        invocations: Vec<ToolInvocation>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            tool_invocations: invocations,
            tool_result: None,
        }
    }

    /// Create a tool message carrying a single tool result.
    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::Tool,
            text: String::new(),
            tool_invocations: Vec::new(),
            tool_result: Some(result),
        }
    }

    /// Check whether this message carries any tool invocations.
    pub fn has_invocations(&self) -> bool {
        !self.tool_invocations.is_empty()
    }
}

// ============================================================================
// Tool Declarations
// ============================================================================

/// Declaration of a tool the model may invoke.
///
/// `parameters` is a JSON Schema object passed through to the wire format
/// unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the parameter schema for this tool.
    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

// ============================================================================
// Discovered Model
// ============================================================================

/// The model identity discovered from the server at initialization.
///
/// `display_name` is a best-effort cosmetic transform of `raw_identifier`
/// (path components and known file extensions stripped); it carries no
/// correctness weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredModel {
    pub raw_identifier: String,
    pub display_name: String,
}

// ============================================================================
// Token Usage & Generation Contract
// ============================================================================

/// Token usage counters reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Get total tokens (input + output).
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// A canonical generation request: ordered history plus sampling knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclaration>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max: u32) -> Self {
        self.max_output_tokens = Some(max);
        self
    }
}

/// A canonical generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Main text content (possibly empty).
    pub text: String,
    /// Tool invocations requested by the model.
    pub tool_invocations: Vec<ToolInvocation>,
    /// Token usage when the server supplies it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    /// Check if this response contains tool invocations.
    pub fn has_invocations(&self) -> bool {
        !self.tool_invocations.is_empty()
    }
}

// ============================================================================
// Streaming Events
// ============================================================================

/// Events yielded by a streaming generation call.
///
/// A single event never carries both text and tool invocations. When a stream
/// produces a `ToolInvocations` batch it is always the final event of the
/// sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A chunk of text content, emitted in decode order.
    Text(String),
    /// All completed tool invocations for the turn, emitted at most once.
    ToolInvocations(Vec<ToolInvocation>),
}

impl StreamEvent {
    /// Check if this is a text event.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Get the text content if this is a text event.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

// ============================================================================
// Content Generator Trait
// ============================================================================

use crate::error::AdapterError;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

/// A finite, non-restartable stream of generation events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, AdapterError>> + Send>>;

/// The generation contract consumed by the rest of the assistant
/// (history manager, UI).
///
/// Implementations adapt a concrete wire protocol to the canonical model.
/// Token counting is a cheap length estimate, never authoritative, and
/// embedding is a declared capability gap.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Perform a single-shot generation call.
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdapterError>;

    /// Perform a streaming generation call.
    ///
    /// Consuming the returned stream drives the underlying HTTP read;
    /// dropping it releases the connection.
    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<EventStream, AdapterError>;

    /// Cheap token estimate over all textual content in the request.
    fn count_tokens(&self, request: &GenerationRequest) -> u32;

    /// Compute embeddings. Always unsupported for this backend.
    async fn embed(&self, input: &str) -> Result<Vec<f32>, AdapterError>;

    /// The discovered model identity backing this generator.
    fn model(&self) -> &DiscoveredModel;
}

impl std::fmt::Debug for dyn ContentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentGenerator")
            .field("model", self.model())
            .finish()
    }
}

/// A boxed generator for dynamic dispatch.
pub type BoxedGenerator = Box<dyn ContentGenerator>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello, world!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.text, "Hello, world!");
        assert!(!msg.has_invocations());
    }

    #[test]
    fn test_assistant_with_invocations() {
        let inv = ToolInvocation::new("call-1", "read_file", r#"{"path":"a.txt"}"#);
        let msg = Message::assistant_with_invocations("", vec![inv]);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.has_invocations());
        assert!(msg.text.is_empty());
    }

    #[test]
    fn test_tool_result_message() {
        let result = ToolResult::new("call-1", "read_file", serde_json::json!({"ok": true}));
        let msg = Message::tool_result(result);
        assert_eq!(msg.role, Role::Tool);
        assert!(msg.tool_result.is_some());
    }

    #[test]
    fn test_invocation_parsed_arguments_fallback() {
        let inv = ToolInvocation::new("c1", "f", "not json");
        assert_eq!(
            inv.parsed_arguments(),
            serde_json::Value::Object(Default::default())
        );

        let inv = ToolInvocation::new("c2", "f", r#"{"x":1}"#);
        assert_eq!(inv.parsed_arguments()["x"], 1);
    }

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_generation_request_builder() {
        let req = GenerationRequest::new(vec![Message::user("hi")])
            .with_temperature(0.2)
            .with_max_output_tokens(512);
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.max_output_tokens, Some(512));
        assert!(req.tools.is_none());
    }

    #[test]
    fn test_stream_event_accessors() {
        let ev = StreamEvent::Text("hi".to_string());
        assert!(ev.is_text());
        assert_eq!(ev.as_text(), Some("hi"));

        let batch = StreamEvent::ToolInvocations(vec![]);
        assert!(!batch.is_text());
        assert_eq!(batch.as_text(), None);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("test");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"text\":\"test\""));
        // Empty invocation list and absent result are omitted entirely.
        assert!(!json.contains("tool_invocations"));
        assert!(!json.contains("tool_result"));
    }
}
