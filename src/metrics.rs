//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("openshelf_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "openshelf_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Material lifecycle metrics
    pub static ref MATERIAL_UPLOADS_TOTAL: IntCounter = IntCounter::new(
        "openshelf_material_uploads_total",
        "Total number of material submissions"
    ).expect("metric can be created");
    pub static ref MODERATION_ACTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("openshelf_moderation_actions_total", "Total number of moderation actions"),
        &["action"]
    ).expect("metric can be created");
    pub static ref SEARCHES_TOTAL: IntCounter = IntCounter::new(
        "openshelf_searches_total",
        "Total number of catalog searches"
    ).expect("metric can be created");

    // Application metrics
    pub static ref MATERIALS_TOTAL: IntGauge = IntGauge::new(
        "openshelf_materials_total",
        "Total number of material records"
    ).expect("metric can be created");

    // Error metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("openshelf_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("HTTP_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("HTTP_REQUEST_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(MATERIAL_UPLOADS_TOTAL.clone()))
        .expect("MATERIAL_UPLOADS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MODERATION_ACTIONS_TOTAL.clone()))
        .expect("MODERATION_ACTIONS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(SEARCHES_TOTAL.clone()))
        .expect("SEARCHES_TOTAL can be registered");
    REGISTRY
        .register(Box::new(MATERIALS_TOTAL.clone()))
        .expect("MATERIALS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(ERRORS_TOTAL.clone()))
        .expect("ERRORS_TOTAL can be registered");

    tracing::info!("Metrics registry initialized");
}
