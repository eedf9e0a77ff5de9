use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Webhook traffic (request counts and latency per intent)
// - Order outcomes (completed orders)
// - Storage health (errors per gateway operation)
// - Accumulator state (sessions with an order in progress)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Webhook Traffic Metrics
    pub requests_total: IntCounterVec,
    pub request_duration: HistogramVec,

    // Order Outcome Metrics
    pub orders_completed_total: IntCounter,

    // Storage Metrics
    pub storage_errors_total: IntCounterVec,

    // Accumulator Metrics
    pub active_sessions: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("webhook_requests_total", "Total webhook requests handled"),
            &["intent"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new(
                "webhook_request_duration_seconds",
                "Webhook request handling duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["intent"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        let orders_completed_total = IntCounter::new(
            "orders_completed_total",
            "Total orders finalized and persisted",
        )?;
        registry.register(Box::new(orders_completed_total.clone()))?;

        let storage_errors_total = IntCounterVec::new(
            Opts::new("storage_errors_total", "Storage gateway failures"),
            &["operation"],
        )?;
        registry.register(Box::new(storage_errors_total.clone()))?;

        let active_sessions = IntGauge::new(
            "active_sessions",
            "Sessions with an order currently in progress",
        )?;
        registry.register(Box::new(active_sessions.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            orders_completed_total,
            storage_errors_total,
            active_sessions,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a storage gateway failure
    pub fn record_storage_error(&self, operation: &str) {
        self.storage_errors_total
            .with_label_values(&[operation])
            .inc();
    }
}
