// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Protocol adapter for OpenAI-compatible local model servers.
//!
//! This module owns everything between the canonical conversation model and
//! the wire:
//!
//! - [`wire`] - passive request/response/chunk schema definitions
//! - [`translate`] - pure canonical ↔ wire conversion functions
//! - [`assembler`] - streaming tool-call reconstruction state machine
//! - [`client`] - model discovery and the HTTP exchange itself
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use quill::adapter::{create_generator, AuthMethod};
//! use quill::config::Settings;
//!
//! let settings = Settings::with_base_url("http://localhost:8080");
//! let generator = create_generator(AuthMethod::LocalServer, &settings).await?;
//! let response = generator.generate(&request).await?;
//! ```

pub mod assembler;
pub mod client;
pub mod translate;
pub mod wire;

pub use assembler::ToolCallAssembler;
pub use client::LocalClient;

use crate::config::Settings;
use crate::error::AdapterError;
use crate::generator::LocalContentGenerator;
use crate::types::BoxedGenerator;

/// Supported backend authentication methods.
///
/// Only `LocalServer` is populated; the other arms are recognized so that
/// configuration mentioning them produces a descriptive error instead of a
/// silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// A locally hosted server, no credentials required.
    LocalServer,
    /// Hosted API-key authentication. Not wired to any backend.
    ApiKey,
    /// Browser-based OAuth. Not wired to any backend.
    OAuth,
}

/// Error type for parsing an auth method from a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseAuthMethodError;

impl std::fmt::Display for ParseAuthMethodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid auth method")
    }
}

impl std::error::Error for ParseAuthMethodError {}

impl std::str::FromStr for AuthMethod {
    type Err = ParseAuthMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "local-server" | "local_server" => Ok(Self::LocalServer),
            "api-key" | "api_key" => Ok(Self::ApiKey),
            "oauth" => Ok(Self::OAuth),
            _ => Err(ParseAuthMethodError),
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LocalServer => write!(f, "local-server"),
            Self::ApiKey => write!(f, "api-key"),
            Self::OAuth => write!(f, "oauth"),
        }
    }
}

/// Create a content generator for the selected auth method.
///
/// Performs model discovery before returning, so a returned generator is
/// ready for completion calls and a misconfigured or unreachable server
/// fails here, before any conversation starts.
///
/// # Errors
///
/// Returns [`AdapterError::NotConfigured`] for unpopulated auth methods and
/// [`AdapterError::Discovery`] when the server cannot be reached or lists no
/// models.
pub async fn create_generator(
    method: AuthMethod,
    settings: &Settings,
) -> Result<BoxedGenerator, AdapterError> {
    match method {
        AuthMethod::LocalServer => {
            let generator = LocalContentGenerator::connect(settings).await?;
            Ok(Box::new(generator))
        }
        AuthMethod::ApiKey => Err(AdapterError::NotConfigured(
            "api-key authentication is not supported by this build; use the local-server backend"
                .to_string(),
        )),
        AuthMethod::OAuth => Err(AdapterError::NotConfigured(
            "oauth authentication is not supported by this build; use the local-server backend"
                .to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_method_from_str() {
        assert_eq!("local".parse::<AuthMethod>(), Ok(AuthMethod::LocalServer));
        assert_eq!(
            "LOCAL-SERVER".parse::<AuthMethod>(),
            Ok(AuthMethod::LocalServer)
        );
        assert_eq!("api-key".parse::<AuthMethod>(), Ok(AuthMethod::ApiKey));
        assert_eq!("oauth".parse::<AuthMethod>(), Ok(AuthMethod::OAuth));
        assert!("basic".parse::<AuthMethod>().is_err());
    }

    #[test]
    fn test_auth_method_display_round_trip() {
        for method in [AuthMethod::LocalServer, AuthMethod::ApiKey, AuthMethod::OAuth] {
            let parsed: AuthMethod = method.to_string().parse().unwrap();
            assert_eq!(parsed, method);
        }
    }

    #[tokio::test]
    async fn test_unpopulated_auth_methods_are_rejected() {
        let settings = Settings::with_base_url("http://localhost:8080");

        for method in [AuthMethod::ApiKey, AuthMethod::OAuth] {
            let err = create_generator(method, &settings).await.unwrap_err();
            match err {
                AdapterError::NotConfigured(message) => {
                    assert!(message.contains("local-server"));
                }
                other => panic!("Expected NotConfigured, got {other:?}"),
            }
        }
    }
}
