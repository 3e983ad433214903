use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};

/// Process metrics, rendered at `/metrics` in the Prometheus text format.
pub struct MetricsService {
    registry: Registry,
    quota_checks: IntCounterVec,
    gallery_operations: IntCounterVec,
    fabric_operations: IntCounterVec,
    request_duration: HistogramVec,
    errors: IntCounterVec,
}

impl MetricsService {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let quota_checks = IntCounterVec::new(
            Opts::new("quota_checks_total", "Daily quota checks by outcome"),
            &["outcome"],
        )?;
        let gallery_operations = IntCounterVec::new(
            Opts::new("gallery_operations_total", "Gallery mutations by operation and outcome"),
            &["operation", "outcome"],
        )?;
        let fabric_operations = IntCounterVec::new(
            Opts::new("fabric_operations_total", "Fabric catalog mutations by operation"),
            &["operation"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new("request_duration_seconds", "HTTP request latency"),
            &["method", "status"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new("errors_total", "HTTP error responses by class"),
            &["type"],
        )?;

        registry.register(Box::new(quota_checks.clone()))?;
        registry.register(Box::new(gallery_operations.clone()))?;
        registry.register(Box::new(fabric_operations.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(errors.clone()))?;

        Ok(Self {
            registry,
            quota_checks,
            gallery_operations,
            fabric_operations,
            request_duration,
            errors,
        })
    }

    pub fn record_quota_check(&self, allowed: bool) {
        let outcome = if allowed { "allowed" } else { "denied" };
        self.quota_checks.with_label_values(&[outcome]).inc();
    }

    pub fn record_gallery_operation(&self, operation: &str, outcome: &str) {
        self.gallery_operations
            .with_label_values(&[operation, outcome])
            .inc();
    }

    pub fn record_fabric_operation(&self, operation: &str) {
        self.fabric_operations.with_label_values(&[operation]).inc();
    }

    pub fn record_request_duration(&self, duration: Duration, method: &str, status: u16) {
        self.request_duration
            .with_label_values(&[method, &status.to_string()])
            .observe(duration.as_secs_f64());
    }

    pub fn record_error(&self, error_type: &str) {
        self.errors.with_label_values(&[error_type]).inc();
    }

    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
