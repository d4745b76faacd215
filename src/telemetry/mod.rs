// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Telemetry, tracing, and metrics infrastructure.
//!
//! - **Tracing**: structured logging via `tracing`, initialized once at
//!   startup through [`init_telemetry`].
//! - **Metrics**: lightweight counters and latency records in
//!   [`metrics::GLOBAL_METRICS`]. This core only supplies raw numbers
//!   (request counts, latency, token usage); aggregation and persistence
//!   belong to whoever consumes the snapshot.
//!
//! ```rust,ignore
//! use quill::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::default())?;
//! ```

mod init;
pub mod metrics;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
