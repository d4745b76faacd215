// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Content generator facade over the local protocol adapter.
//!
//! Bridges the canonical generation contract ([`ContentGenerator`]) to
//! [`LocalClient`]: single-shot and streaming generation pass through the
//! adapter, token counting is a cheap character heuristic, and embedding is
//! a declared capability gap.

use async_trait::async_trait;

use crate::adapter::LocalClient;
use crate::config::Settings;
use crate::error::AdapterError;
use crate::types::{
    ContentGenerator, DiscoveredModel, EventStream, GenerationRequest, GenerationResponse,
};

/// Generator backed by a locally hosted OpenAI-compatible server.
pub struct LocalContentGenerator {
    client: LocalClient,
    model: DiscoveredModel,
}

impl LocalContentGenerator {
    /// Connect to the configured server and discover its active model.
    ///
    /// Discovery failure prevents any conversation from starting; the error
    /// names the unreachable server rather than a credential problem.
    pub async fn connect(settings: &Settings) -> Result<Self, AdapterError> {
        let client = match settings.request_timeout_ms {
            Some(ms) => LocalClient::with_timeout(&settings.base_url, ms),
            None => LocalClient::new(&settings.base_url),
        };
        let model = client.initialize().await?.clone();
        Ok(Self { client, model })
    }

    /// Access the underlying adapter client.
    pub fn client(&self) -> &LocalClient {
        &self.client
    }
}

#[async_trait]
impl ContentGenerator for LocalContentGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdapterError> {
        self.client.completion(request).await
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<EventStream, AdapterError> {
        self.client.completion_stream(request).await
    }

    fn count_tokens(&self, request: &GenerationRequest) -> u32 {
        estimate_tokens(request)
    }

    async fn embed(&self, _input: &str) -> Result<Vec<f32>, AdapterError> {
        Err(AdapterError::UnsupportedOperation(
            "embeddings are not supported by the local-server backend".to_string(),
        ))
    }

    fn model(&self) -> &DiscoveredModel {
        &self.model
    }
}

/// Estimate token count as `ceil(total_characters / 4)` over all textual
/// content in the request. Deliberately approximate; never authoritative.
fn estimate_tokens(request: &GenerationRequest) -> u32 {
    let mut characters = 0usize;

    for message in &request.messages {
        characters += message.text.chars().count();
        for invocation in &message.tool_invocations {
            characters += invocation.name.chars().count();
            characters += invocation.arguments.chars().count();
        }
        if let Some(result) = &message.tool_result {
            characters += result.content.to_string().chars().count();
        }
    }

    characters.div_ceil(4) as u32
}
