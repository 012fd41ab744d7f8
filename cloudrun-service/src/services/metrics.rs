//! Prometheus metrics for cloudrun-service.
//!
//! Recording helpers are no-ops until [`init_metrics`] has run, so unit tests
//! never need a registry.

use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

static INIT_LOCK: Mutex<()> = Mutex::new(());

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

// HTTP metrics
pub static HTTP_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static HTTP_REQUEST_DURATION_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

// Counter metrics
pub static COUNTER_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

// Image generation metrics
pub static IMAGE_GENERATION_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static IMAGE_PROVIDER_LATENCY_SECONDS: OnceLock<Histogram> = OnceLock::new();

/// Initialize all metrics. Safe to call more than once; later calls are ignored.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    let registry = Registry::new();

    let http_requests_total = IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests"),
        &["method", "path", "status"],
    )?;

    let http_request_duration = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
        ),
        &["method", "path"],
    )?;

    let counter_operations_total = IntCounterVec::new(
        Opts::new("counter_operations_total", "Counter store operations"),
        &["operation", "status"],
    )?;

    let image_requests_total = IntCounterVec::new(
        Opts::new(
            "image_generation_requests_total",
            "Image generation requests by outcome",
        ),
        &["outcome"],
    )?;

    let provider_latency = Histogram::with_opts(
        HistogramOpts::new(
            "image_generation_provider_latency_seconds",
            "Latency of the external image generation call",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
    )?;

    registry.register(Box::new(http_requests_total.clone()))?;
    registry.register(Box::new(http_request_duration.clone()))?;
    registry.register(Box::new(counter_operations_total.clone()))?;
    registry.register(Box::new(image_requests_total.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;

    // Initialize globals
    let _ = REGISTRY.set(registry);
    let _ = HTTP_REQUESTS_TOTAL.set(http_requests_total);
    let _ = HTTP_REQUEST_DURATION_SECONDS.set(http_request_duration);
    let _ = COUNTER_OPERATIONS_TOTAL.set(counter_operations_total);
    let _ = IMAGE_GENERATION_REQUESTS_TOTAL.set(image_requests_total);
    let _ = IMAGE_PROVIDER_LATENCY_SECONDS.set(provider_latency);

    Ok(())
}

pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    if let Some(m) = HTTP_REQUESTS_TOTAL.get() {
        m.with_label_values(&[method, path, &status.to_string()])
            .inc();
    }
    if let Some(m) = HTTP_REQUEST_DURATION_SECONDS.get() {
        m.with_label_values(&[method, path])
            .observe(duration.as_secs_f64());
    }
}

pub fn record_counter_operation(operation: &str, success: bool) {
    if let Some(m) = COUNTER_OPERATIONS_TOTAL.get() {
        let status = if success { "ok" } else { "error" };
        m.with_label_values(&[operation, status]).inc();
    }
}

pub fn record_image_outcome(outcome: &str) {
    if let Some(m) = IMAGE_GENERATION_REQUESTS_TOTAL.get() {
        m.with_label_values(&[outcome]).inc();
    }
}

pub fn observe_provider_latency(duration: Duration) {
    if let Some(m) = IMAGE_PROVIDER_LATENCY_SECONDS.get() {
        m.observe(duration.as_secs_f64());
    }
}

/// Text exposition of every registered metric.
pub fn get_metrics() -> Result<String, anyhow::Error> {
    let registry = REGISTRY
        .get()
        .ok_or_else(|| anyhow::anyhow!("metrics registry not initialized"))?;

    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    encoder.encode(&registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_values_show_up_in_exposition() {
        init_metrics().unwrap();
        init_metrics().unwrap();

        record_counter_operation("inc", true);
        record_image_outcome("success");
        record_http_request("GET", "/api/count", 200, Duration::from_millis(3));

        let text = get_metrics().unwrap();
        assert!(text.contains("counter_operations_total"));
        assert!(text.contains("image_generation_requests_total"));
        assert!(text.contains("http_requests_total"));
    }
}
