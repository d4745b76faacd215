// Copyright 2026 Quill Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Metrics collection for request and token accounting.
//!
//! Lightweight in-process counters without external dependencies; the
//! adapter records raw numbers here and anything heavier lives outside this
//! crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use once_cell::sync::Lazy;

/// Global metrics instance.
pub static GLOBAL_METRICS: Lazy<Metrics> = Lazy::new(Metrics::new);

/// Central metrics collection.
#[derive(Debug)]
pub struct Metrics {
    /// Operation latency records by operation name.
    operations: RwLock<HashMap<String, OperationMetrics>>,

    /// Token usage tracking.
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            operations: RwLock::new(HashMap::new()),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
        }
    }

    /// Record one operation's latency.
    pub fn record_operation(&self, name: &str, duration: Duration) {
        let mut ops = self.operations.write().unwrap();
        ops.entry(name.to_string())
            .or_insert_with(OperationMetrics::new)
            .record(duration);
    }

    /// Record token usage reported by the server.
    pub fn record_tokens(&self, input: u64, output: u64) {
        self.input_tokens.fetch_add(input, Ordering::Relaxed);
        self.output_tokens.fetch_add(output, Ordering::Relaxed);
    }

    /// Get metrics for a specific operation.
    pub fn operation_metrics(&self, name: &str) -> Option<OperationMetrics> {
        self.operations.read().unwrap().get(name).cloned()
    }

    /// Get total token counts as (input, output).
    pub fn token_counts(&self) -> (u64, u64) {
        (
            self.input_tokens.load(Ordering::Relaxed),
            self.output_tokens.load(Ordering::Relaxed),
        )
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        self.operations.write().unwrap().clear();
        self.input_tokens.store(0, Ordering::Relaxed);
        self.output_tokens.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Latency metrics for one operation.
#[derive(Debug, Clone)]
pub struct OperationMetrics {
    /// Number of recorded operations.
    pub count: u64,

    /// Total duration.
    pub total_duration: Duration,

    /// Minimum duration.
    pub min_duration: Duration,

    /// Maximum duration.
    pub max_duration: Duration,
}

impl OperationMetrics {
    /// Create new empty operation metrics.
    pub fn new() -> Self {
        Self {
            count: 0,
            total_duration: Duration::ZERO,
            min_duration: Duration::MAX,
            max_duration: Duration::ZERO,
        }
    }

    /// Record an operation.
    pub fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.total_duration += duration;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
    }

    /// Calculate average duration.
    pub fn avg_duration(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.count as u32
        }
    }
}

impl Default for OperationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation() {
        let metrics = Metrics::new();
        metrics.record_operation("local.completion", Duration::from_millis(120));
        metrics.record_operation("local.completion", Duration::from_millis(80));

        let op = metrics.operation_metrics("local.completion").unwrap();
        assert_eq!(op.count, 2);
        assert_eq!(op.min_duration, Duration::from_millis(80));
        assert_eq!(op.max_duration, Duration::from_millis(120));
        assert_eq!(op.avg_duration(), Duration::from_millis(100));
    }

    #[test]
    fn test_record_tokens() {
        let metrics = Metrics::new();
        metrics.record_tokens(100, 40);
        metrics.record_tokens(50, 10);
        assert_eq!(metrics.token_counts(), (150, 50));
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_operation("x", Duration::from_millis(1));
        metrics.record_tokens(5, 5);
        metrics.reset();
        assert!(metrics.operation_metrics("x").is_none());
        assert_eq!(metrics.token_counts(), (0, 0));
    }

    #[test]
    fn test_empty_operation_metrics() {
        let op = OperationMetrics::new();
        assert_eq!(op.avg_duration(), Duration::ZERO);
    }
}
