// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading for the Quill assistant core.
//!
//! Settings come from up to three sources, merged with precedence
//! (environment > workspace > global):
//!
//! - Global config: `~/.quill/config.json`
//! - Workspace config: `.quill.json` in the workspace root
//! - Environment: `QUILL_BASE_URL`, `QUILL_MODEL`
//!
//! The only required field is the server base URL; its absence is a
//! startup-time failure surfaced to the calling shell, not something the
//! adapter papers over.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Global config directory under the home directory.
pub const GLOBAL_CONFIG_DIR: &str = ".quill";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Workspace config file name.
pub const WORKSPACE_CONFIG_FILE: &str = ".quill.json";

/// Resolved settings after merging all sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the local server (e.g. `http://localhost:8080`).
    pub base_url: String,

    /// Requested model identifier. Informational; the server's own listing
    /// decides which model is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Sampling temperature (0.0 - 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate per completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    /// Completion request timeout in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

impl Settings {
    /// Create settings pointing at a base URL, everything else default.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: None,
            temperature: None,
            max_output_tokens: None,
            request_timeout_ms: None,
        }
    }

    /// Validate resolved settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField("base_url".to_string()));
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidValue {
                    field: "temperature".to_string(),
                    message: format!("{} is outside 0.0..=2.0", temperature),
                });
            }
        }
        Ok(())
    }
}

/// One partially specified configuration layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

/// Load and merge all configuration sources for a workspace.
///
/// This is the main entry point for configuration loading.
pub fn load_settings(workspace_root: &Path) -> Result<Settings, ConfigError> {
    let global = load_global_config()?;
    let workspace = load_workspace_config(workspace_root)?;
    merge_settings(global, workspace, env_overrides())
}

/// Load the global config file, if present.
pub fn load_global_config() -> Result<PartialSettings, ConfigError> {
    let Some(home) = dirs::home_dir() else {
        return Ok(PartialSettings::default());
    };
    load_config_file(&home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Load the workspace config file, if present.
pub fn load_workspace_config(workspace_root: &Path) -> Result<PartialSettings, ConfigError> {
    load_config_file(&workspace_root.join(WORKSPACE_CONFIG_FILE))
}

/// Load a single JSON config file; a missing file is an empty layer.
pub fn load_config_file(path: &Path) -> Result<PartialSettings, ConfigError> {
    if !path.exists() {
        return Ok(PartialSettings::default());
    }
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Collect environment overrides.
fn env_overrides() -> PartialSettings {
    PartialSettings {
        base_url: std::env::var("QUILL_BASE_URL").ok(),
        model: std::env::var("QUILL_MODEL").ok(),
        ..Default::default()
    }
}

/// Merge configuration layers with precedence (overrides > workspace > global)
/// and validate the result.
pub fn merge_settings(
    global: PartialSettings,
    workspace: PartialSettings,
    overrides: PartialSettings,
) -> Result<Settings, ConfigError> {
    let pick = |o: Option<String>, w: Option<String>, g: Option<String>| o.or(w).or(g);

    let settings = Settings {
        base_url: pick(overrides.base_url, workspace.base_url, global.base_url)
            .unwrap_or_default(),
        model: pick(overrides.model, workspace.model, global.model),
        temperature: overrides
            .temperature
            .or(workspace.temperature)
            .or(global.temperature),
        max_output_tokens: overrides
            .max_output_tokens
            .or(workspace.max_output_tokens)
            .or(global.max_output_tokens),
        request_timeout_ms: overrides
            .request_timeout_ms
            .or(workspace.request_timeout_ms)
            .or(global.request_timeout_ms),
    };

    settings.validate()?;
    Ok(settings)
}
