//! # Metrics
//!
//! Prometheus metrics for monitoring suite operations.
//!
//! ## Metrics Exposed
//!
//! - `secret_suite_operations_total` - Total provider operations by provider and operation type
//! - `secret_suite_operation_errors_total` - Total failed provider operations by provider
//! - `secret_suite_operation_duration_seconds` - Duration of provider operations
//! - `secret_suite_cache_hits_total` - Cache hits by provider
//! - `secret_suite_cache_misses_total` - Cache misses by provider

use anyhow::Result;
use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_suite_operations_total",
            "Total number of secret provider operations",
        ),
        &["provider", "operation"],
    )
    .expect("Failed to create OPERATIONS_TOTAL metric - this should never happen")
});

static OPERATION_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_suite_operation_errors_total",
            "Total number of failed secret provider operations",
        ),
        &["provider"],
    )
    .expect("Failed to create OPERATION_ERRORS_TOTAL metric - this should never happen")
});

static OPERATION_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "secret_suite_operation_duration_seconds",
            "Duration of secret provider operations in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0]),
        &["provider", "operation"],
    )
    .expect("Failed to create OPERATION_DURATION metric - this should never happen")
});

static CACHE_HITS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_suite_cache_hits_total",
            "Total number of secret cache hits",
        ),
        &["provider"],
    )
    .expect("Failed to create CACHE_HITS_TOTAL metric - this should never happen")
});

static CACHE_MISSES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "secret_suite_cache_misses_total",
            "Total number of secret cache misses",
        ),
        &["provider"],
    )
    .expect("Failed to create CACHE_MISSES_TOTAL metric - this should never happen")
});

/// Register all metrics with the suite registry.
///
/// Call once at process startup; registering twice returns an error from
/// prometheus.
///
/// # Errors
/// Returns an error if a collector is already registered.
pub fn register_metrics() -> Result<()> {
    REGISTRY.register(Box::new(OPERATIONS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(OPERATION_DURATION.clone()))?;
    REGISTRY.register(Box::new(CACHE_HITS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(CACHE_MISSES_TOTAL.clone()))?;
    Ok(())
}

/// Record a completed provider operation and its duration
pub fn record_secret_operation(provider: &str, operation: &str, duration_secs: f64) {
    OPERATIONS_TOTAL
        .with_label_values(&[provider, operation])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[provider, operation])
        .observe(duration_secs);
}

/// Record a failed provider operation
pub fn increment_provider_operation_errors(provider: &str) {
    OPERATION_ERRORS_TOTAL.with_label_values(&[provider]).inc();
}

/// Record a cache hit for a provider's read path
pub fn record_cache_hit(provider: &str) {
    CACHE_HITS_TOTAL.with_label_values(&[provider]).inc();
}

/// Record a cache miss for a provider's read path
pub fn record_cache_miss(provider: &str) {
    CACHE_MISSES_TOTAL.with_label_values(&[provider]).inc();
}

/// Export all registered metrics in Prometheus text format.
///
/// # Errors
/// Returns an error if encoding fails.
pub fn export() -> Result<String> {
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
