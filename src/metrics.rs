// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the ownership registry (SPEC_FULL §9.5).
//!
//! This module provides metrics collection with the namespace prefix
//! `zonekeeper_firestoned_io_` (prometheus-safe version of
//! `zonekeeper.firestoned.io`).
//!
//! # Example
//!
//! ```rust,no_run
//! use zonekeeper::metrics::record_records_read;
//!
//! record_records_read("sidecar-txt", 42);
//! ```

use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

const METRICS_NAMESPACE: &str = "zonekeeper_firestoned_io";

/// Global Prometheus metrics registry; exposed via `/metrics` by the
/// demonstration binary.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// Total number of endpoints read from the provider, by store backend.
pub static RECORDS_READ_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_records_read_total"),
        "Total number of endpoints read from the provider by store backend",
    );
    let counter = CounterVec::new(opts, &["backend"]).unwrap();
    METRICS_REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Total number of marks classified, by backend and classification
/// (`parsed`, `foreign`, `orphaned`).
pub static MARKS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_marks_total"),
        "Total number of ownership marks encountered by backend and classification",
    );
    let counter = CounterVec::new(opts, &["backend", "classification"]).unwrap();
    METRICS_REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Total number of `ApplyChanges` outcomes, by backend and status.
pub static APPLY_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_apply_total"),
        "Total number of ApplyChanges outcomes by backend and status",
    );
    let counter = CounterVec::new(opts, &["backend", "status"]).unwrap();
    METRICS_REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Size of side-table batched writes.
pub static BATCH_SIZE: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_batch_size"),
        "Number of statements per side-table batched write",
    )
    .buckets(vec![1.0, 5.0, 10.0, 15.0, 20.0, 25.0]);
    let histogram = HistogramVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY.register(Box::new(histogram.clone())).unwrap();
    histogram
});

/// Endpoint cache hit/miss counts, by backend.
pub static CACHE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_cache_total"),
        "Endpoint cache hit/miss counts by backend",
    );
    let counter = CounterVec::new(opts, &["backend", "result"]).unwrap();
    METRICS_REGISTRY.register(Box::new(counter.clone())).unwrap();
    counter
});

/// Record a `Records` read returning `count` endpoints for `backend`.
pub fn record_records_read(backend: &str, count: usize) {
    RECORDS_READ_TOTAL
        .with_label_values(&[backend])
        .inc_by(count as f64);
}

/// Record a mark classification outcome.
pub fn record_mark(backend: &str, classification: &str) {
    MARKS_TOTAL.with_label_values(&[backend, classification]).inc();
}

/// Record an `ApplyChanges` success or failure.
pub fn record_apply(backend: &str, status: &str) {
    APPLY_TOTAL.with_label_values(&[backend, status]).inc();
}

/// Record a side-table batch's size.
pub fn record_batch_size(operation: &str, size: usize) {
    BATCH_SIZE.with_label_values(&[operation]).observe(size as f64);
}

/// Record an endpoint cache hit or miss.
pub fn record_cache(backend: &str, hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    CACHE_TOTAL.with_label_values(&[backend, result]).inc();
}

/// Gather and encode all metrics in Prometheus text format.
///
/// # Errors
/// Returns an error if encoding fails.
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
