// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Quill - assistant client core for locally hosted language models.
//!
//! Quill talks to a locally hosted model server through its OpenAI-compatible
//! HTTP API and hands the rest of the assistant a canonical,
//! provider-agnostic view of the conversation: text, structured tool
//! invocations, and tool results. The interesting part is the protocol
//! adapter, which discovers the active model, translates between the
//! canonical model and the wire schema, and reassembles complete tool calls
//! out of fragmented server-sent-event streams.
//!
//! # Architecture
//!
//! - [`types`] - Canonical conversation model and the generation contract
//! - [`error`] - Error taxonomy and result aliases
//! - [`config`] - Settings loading and merging
//! - [`adapter`] - Wire schema, translation, streaming assembler, HTTP client
//! - [`generator`] - Content generator facade over the adapter
//! - [`telemetry`] - Tracing and metrics infrastructure
//!
//! # Example
//!
//! ```rust,ignore
//! use quill::adapter::{create_generator, AuthMethod};
//! use quill::config::load_settings;
//! use quill::types::{GenerationRequest, Message, StreamEvent};
//! use futures::StreamExt;
//!
//! let settings = load_settings(std::path::Path::new("."))?;
//! let generator = create_generator(AuthMethod::LocalServer, &settings).await?;
//!
//! let request = GenerationRequest::new(vec![Message::user("List the files here")]);
//! let mut stream = generator.generate_stream(&request).await?;
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         StreamEvent::Text(chunk) => print!("{chunk}"),
//!         StreamEvent::ToolInvocations(calls) => { /* dispatch tools */ }
//!     }
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod generator;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use adapter::{create_generator, AuthMethod, LocalClient, ToolCallAssembler};
pub use error::{AdapterError, ConfigError, Result};
pub use generator::LocalContentGenerator;
pub use types::{
    BoxedGenerator, ContentGenerator, DiscoveredModel, GenerationRequest, GenerationResponse,
    Message, Role, StreamEvent, TokenUsage, ToolDeclaration, ToolInvocation, ToolResult,
};
