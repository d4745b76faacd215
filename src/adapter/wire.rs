// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Wire schema for the OpenAI-compatible chat-completions API.
//!
//! Passive serde definitions only; no behavior lives here. Inbound JSON is
//! loose (several optional and alternate fields), so every field that can be
//! absent is modeled as an `Option` or a defaulted collection and resolved
//! explicitly by the caller, rather than letting loosely-typed maps leak
//! inward.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request
// ============================================================================

/// Request body for the chat-completions endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
}

/// A message in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A tool call attached to an assistant message, or a streamed fragment of
/// one. In streaming deltas every field may be partial or absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub call_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<WireFunction>,
}

/// Function name/arguments pair within a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFunction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
}

/// Tool declaration in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: WireToolFunction,
}

/// Function definition within a tool declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

// ============================================================================
// Non-streaming Response
// ============================================================================

/// Chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Option<WireMessage>,
}

/// Token usage counters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

// ============================================================================
// Streaming Chunks
// ============================================================================

/// One decoded streaming chunk.
#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

/// Choice in a streaming chunk.
#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: StreamDelta,
}

/// Incremental delta carried by a streaming choice.
#[derive(Debug, Default, Deserialize)]
pub struct StreamDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

// ============================================================================
// Model Listing
// ============================================================================

/// Models list in either of the two recognized shapes:
/// `{ "models": [{"name": ...}] }` or `{ "data": [{"id": ...}] }`.
///
/// Both collections default to empty; the client prefers `models` when both
/// are populated.
#[derive(Debug, Default, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<NamedModel>,
    #[serde(default)]
    pub data: Vec<IdentifiedModel>,
}

/// Entry in the `models` list shape.
#[derive(Debug, Deserialize)]
pub struct NamedModel {
    pub name: String,
}

/// Entry in the `data` list shape.
#[derive(Debug, Deserialize)]
pub struct IdentifiedModel {
    pub id: String,
}
