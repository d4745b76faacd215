// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the Quill assistant core.
//!
//! This module provides strongly-typed errors for the protocol adapter and
//! configuration layers, using `thiserror` for ergonomic error definitions
//! and `anyhow` for application-level propagation.
//!
//! One streaming failure mode is deliberately absent from the taxonomy: a
//! single malformed streaming chunk is logged with `tracing::warn!` and
//! skipped, never surfaced as an error (a degraded stream beats an aborted
//! one).

use thiserror::Error;

/// Errors that can occur during protocol adapter operations.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Model listing unreachable, rejected, or empty.
    #[error("Model discovery failed: {0}")]
    Discovery(String),

    /// Non-success HTTP status from a completion call.
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Structurally invalid success response (no choice, no message).
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Bounded wait exceeded; the in-flight request was cancelled.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// Transport-level failure before any response arrived.
    #[error("Network error: {0}")]
    Network(String),

    /// Failure while reading a streaming response body.
    #[error("Streaming error: {0}")]
    Stream(String),

    /// A declared capability gap, not a defect.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A backend/auth method that is recognized but not usable.
    #[error("Backend not configured: {0}")]
    NotConfigured(String),
}

impl AdapterError {
    /// Create an upstream error from a status code and body.
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error happened before any conversation could start.
    pub fn is_discovery(&self) -> bool {
        matches!(self, Self::Discovery(_))
    }

    /// Classify a reqwest failure into the adapter taxonomy.
    pub fn from_transport(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("IO error reading config: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            _ => Self::IoError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidFormat(err.to_string())
    }
}

/// Result type alias using anyhow for flexible error handling.
pub type Result<T> = anyhow::Result<T>;
