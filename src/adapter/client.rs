// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Protocol adapter client for a locally hosted OpenAI-compatible server.
//!
//! Owns the server base address and the discovered model identity, and
//! performs the actual HTTP exchange: one-time model discovery, single-shot
//! completions, and streaming completions. Requests are bounded by a timeout
//! and make exactly one attempt; retry policy belongs to callers.
//!
//! Streaming responses hold the underlying connection only as long as the
//! returned stream is alive. Dropping the stream, at any point, drops the
//! response body and releases the connection.

use std::time::Duration;

#[cfg(feature = "telemetry")]
use std::time::Instant;

use futures::StreamExt;
use reqwest::Client;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::GLOBAL_METRICS;

use crate::error::AdapterError;
use crate::types::{
    DiscoveredModel, EventStream, GenerationRequest, GenerationResponse, StreamEvent,
};

use super::assembler::ToolCallAssembler;
use super::translate;
use super::wire::{ChatRequest, ChatResponse, ModelsResponse, StreamChunk};

/// Default timeout for the model-discovery call.
const DISCOVERY_TIMEOUT_SECS: u64 = 10;

/// Default timeout for completion calls. Local models can be slow to fill a
/// long context, so this is generous.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// SSE payload marking the end of a stream.
const DONE_MARKER: &str = "[DONE]";

/// Client for one locally hosted OpenAI-compatible server.
///
/// The discovered model is cached write-once for the lifetime of the client;
/// [`LocalClient::initialize`] must complete before any completion call.
pub struct LocalClient {
    http: Client,
    base_url: String,
    request_timeout_ms: u64,
    model: OnceCell<DiscoveredModel>,
}

impl LocalClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT_SECS * 1000)
    }

    /// Create a client with an explicit completion timeout in milliseconds.
    pub fn with_timeout(base_url: impl Into<String>, request_timeout_ms: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            http,
            base_url,
            request_timeout_ms,
            model: OnceCell::new(),
        }
    }

    /// Get the configured base URL (trailing slash stripped).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Discover the active model from the server and cache it.
    ///
    /// Selects the first listed model and derives its display name. The
    /// `OnceCell` doubles as a single-flight guard: concurrent callers share
    /// one discovery request, and the cached fields are never rewritten.
    pub async fn initialize(&self) -> Result<&DiscoveredModel, AdapterError> {
        self.model.get_or_try_init(|| self.discover()).await
    }

    /// Get the discovered model, failing if `initialize` has not completed.
    pub fn active_model(&self) -> Result<&DiscoveredModel, AdapterError> {
        self.model.get().ok_or_else(|| {
            AdapterError::Discovery("model discovery has not completed".to_string())
        })
    }

    async fn discover(&self) -> Result<DiscoveredModel, AdapterError> {
        let url = format!("{}/v1/models", self.base_url);
        debug!(url = %url, "Discovering active model");

        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(DISCOVERY_TIMEOUT_SECS))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdapterError::Timeout(DISCOVERY_TIMEOUT_SECS * 1000)
                } else {
                    AdapterError::Discovery(format!("server unreachable at {}: {}", url, e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Discovery(format!(
                "model listing returned HTTP {}",
                status.as_u16()
            )));
        }

        let listing: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::Discovery(format!("invalid model listing: {}", e)))?;

        let raw_identifier = select_model_identifier(listing)
            .ok_or_else(|| AdapterError::Discovery("server reports no models".to_string()))?;

        let display_name = derive_display_name(&raw_identifier);
        debug!(model = %raw_identifier, display = %display_name, "Model discovered");

        Ok(DiscoveredModel {
            raw_identifier,
            display_name,
        })
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<ChatRequest, AdapterError> {
        let model = self.active_model()?;

        Ok(ChatRequest {
            model: model.raw_identifier.clone(),
            messages: translate::messages_to_wire(&request.messages),
            tools: request
                .tools
                .as_deref()
                .map(translate::declarations_to_wire),
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            stream,
        })
    }

    /// Perform a single-shot completion call.
    pub async fn completion(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, AdapterError> {
        let body = self.build_request(request, false)?;
        #[cfg(feature = "telemetry")]
        let start = Instant::now();

        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(e, self.request_timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdapterError::upstream(status.as_u16(), error_text));
        }

        let wire: ChatResponse = response
            .json()
            .await
            .map_err(|e| AdapterError::MalformedResponse(e.to_string()))?;

        let usage = translate::usage_from_wire(&wire);
        let message = wire
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .ok_or_else(|| {
                AdapterError::MalformedResponse("response carries no message".to_string())
            })?;

        let canonical = translate::response_from_wire(message, usage);

        #[cfg(feature = "telemetry")]
        {
            GLOBAL_METRICS.record_operation("local.completion", start.elapsed());
            if let Some(usage) = &canonical.usage {
                GLOBAL_METRICS.record_tokens(usage.input_tokens as u64, usage.output_tokens as u64);
            }
        }

        Ok(canonical)
    }

    /// Perform a streaming completion call.
    ///
    /// The returned sequence is finite and non-restartable: text fragments
    /// arrive in decode order, and if any tool calls were reconstructed a
    /// single batch event closes the sequence. Abandoning the stream early
    /// releases the connection.
    pub async fn completion_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<EventStream, AdapterError> {
        let body = self.build_request(request, true)?;
        #[cfg(feature = "telemetry")]
        let start = Instant::now();

        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "Sending streaming completion request"
        );

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| AdapterError::from_transport(e, self.request_timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AdapterError::upstream(status.as_u16(), error_text));
        }

        let request_timeout_ms = self.request_timeout_ms;

        let stream = async_stream::try_stream! {
            let mut assembler = ToolCallAssembler::new();
            let mut body = response.bytes_stream();
            let mut lines = LineBuffer::default();
            let mut transport_open = true;
            #[cfg(feature = "telemetry")]
            let mut last_usage = None;

            // Reading until [DONE] or transport close; either way the
            // assembler is finalized, so a dropped terminal marker never
            // loses an in-flight tool call.
            'transport: loop {
                let line = if let Some(line) = lines.next_line() {
                    line
                } else if transport_open {
                    match body.next().await {
                        Some(chunk) => {
                            let bytes = chunk.map_err(|e| {
                                if e.is_timeout() {
                                    AdapterError::Timeout(request_timeout_ms)
                                } else {
                                    AdapterError::Stream(e.to_string())
                                }
                            })?;
                            lines.extend(&bytes);
                            continue;
                        }
                        None => {
                            transport_open = false;
                            continue;
                        }
                    }
                } else if let Some(line) = lines.take_residual() {
                    // A final line the server never terminated still counts.
                    line
                } else {
                    break 'transport;
                };

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data.trim() == DONE_MARKER {
                    break 'transport;
                }

                let chunk: StreamChunk = match serde_json::from_str(data) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        // Degraded stream beats an aborted one.
                        warn!(error = %e, "Discarding malformed streaming chunk");
                        continue;
                    }
                };

                #[cfg(feature = "telemetry")]
                if let Some(usage) = chunk.usage {
                    last_usage = Some(usage);
                }

                for choice in chunk.choices {
                    if let Some(content) = choice.delta.content {
                        if !content.is_empty() {
                            yield StreamEvent::Text(content);
                        }
                    }
                    if let Some(calls) = choice.delta.tool_calls {
                        assembler.apply(&calls);
                    }
                }
            }

            let batch = assembler.finish();
            if !batch.is_empty() {
                yield StreamEvent::ToolInvocations(batch);
            }

            #[cfg(feature = "telemetry")]
            {
                GLOBAL_METRICS.record_operation("local.completion_stream", start.elapsed());
                if let Some(usage) = last_usage {
                    GLOBAL_METRICS.record_tokens(
                        usage.prompt_tokens as u64,
                        usage.completion_tokens as u64,
                    );
                }
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Accumulates raw transport bytes and hands back complete SSE lines.
///
/// Transport chunk boundaries carry no meaning: a UTF-8 sequence or an SSE
/// line can be split anywhere. Bytes stay bytes until a full line is
/// available, so a multibyte character straddling two chunks decodes intact.
#[derive(Debug, Default)]
struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.bytes.extend_from_slice(chunk);
    }

    /// Pop the next complete line, terminator stripped.
    fn next_line(&mut self) -> Option<String> {
        let newline = self.bytes.iter().position(|&b| b == b'\n')?;
        let raw: Vec<u8> = self.bytes.drain(..=newline).collect();
        Some(decode_line(&raw))
    }

    /// Drain whatever is left after transport close as one final line.
    fn take_residual(&mut self) -> Option<String> {
        if self.bytes.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.bytes);
        Some(decode_line(&raw))
    }
}

fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Select the active model identifier from either recognized listing shape,
/// preferring the `models` shape when both are present.
fn select_model_identifier(listing: ModelsResponse) -> Option<String> {
    if let Some(entry) = listing.models.into_iter().next() {
        return Some(entry.name);
    }
    listing.data.into_iter().next().map(|entry| entry.id)
}

/// Derive a display name from a raw model identifier.
///
/// Local servers often report the model as a filesystem path; strip path
/// components and the weight-file extension. Cosmetic only.
fn derive_display_name(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    if name.to_ascii_lowercase().ends_with(".gguf") {
        name[..name.len() - ".gguf".len()].to_string()
    } else {
        name.to_string()
    }
}
