// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry initialization and configuration.

use std::io;

use tracing::Level;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Configuration for telemetry initialization.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Default log level if RUST_LOG is not set.
    pub default_level: Level,

    /// Whether to include target module path.
    pub include_target: bool,

    /// Whether to use ANSI colors in output.
    pub ansi_colors: bool,

    /// Custom filter directive (overrides default_level).
    pub filter_directive: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            include_target: true,
            ansi_colors: true,
            filter_directive: None,
        }
    }
}

impl TelemetryConfig {
    /// Create a config suitable for development with verbose output.
    pub fn development() -> Self {
        Self {
            default_level: Level::DEBUG,
            ..Default::default()
        }
    }

    /// Set the default log level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    /// Set a custom filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter_directive = Some(filter.into());
        self
    }
}

/// Guard that flushes telemetry on drop.
///
/// Keep this guard alive for the duration of your program.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        // Reserved for flushing exporters if any are added.
    }
}

/// Initialize telemetry with the given configuration.
///
/// Call once at application startup; RUST_LOG takes precedence over the
/// configured default level.
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let filter = match &config.filter_directive {
        Some(directive) => EnvFilter::try_new(directive)
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.default_level))),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("{}", config.default_level))),
    };

    let fmt_layer = fmt::layer()
        .with_ansi(config.ansi_colors)
        .with_target(config.include_target)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| io::Error::other(e.to_string()))?;

    Ok(TelemetryGuard { _private: () })
}
