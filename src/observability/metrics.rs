use prometheus::{Encoder, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub orders_created_total: IntCounterVec,
    pub order_status_updates_total: IntCounterVec,
    pub order_cancellations_total: IntCounterVec,
    pub delivery_updates_total: IntCounterVec,
    pub order_operation_latency_seconds: HistogramVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let orders_created_total = IntCounterVec::new(
            Opts::new("orders_created_total", "Order creation attempts by outcome"),
            &["outcome"],
        )
        .expect("valid orders_created_total metric");

        let order_status_updates_total = IntCounterVec::new(
            Opts::new("order_status_updates_total", "Order status updates by target status"),
            &["status"],
        )
        .expect("valid order_status_updates_total metric");

        let order_cancellations_total = IntCounterVec::new(
            Opts::new("order_cancellations_total", "Cancellation requests by outcome"),
            &["outcome"],
        )
        .expect("valid order_cancellations_total metric");

        let delivery_updates_total = IntCounterVec::new(
            Opts::new("delivery_updates_total", "Simulated delivery updates by status"),
            &["status"],
        )
        .expect("valid delivery_updates_total metric");

        let order_operation_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "order_operation_latency_seconds",
                "Latency of order store round-trips in seconds",
            ),
            &["operation"],
        )
        .expect("valid order_operation_latency_seconds metric");

        registry
            .register(Box::new(orders_created_total.clone()))
            .expect("register orders_created_total");
        registry
            .register(Box::new(order_status_updates_total.clone()))
            .expect("register order_status_updates_total");
        registry
            .register(Box::new(order_cancellations_total.clone()))
            .expect("register order_cancellations_total");
        registry
            .register(Box::new(delivery_updates_total.clone()))
            .expect("register delivery_updates_total");
        registry
            .register(Box::new(order_operation_latency_seconds.clone()))
            .expect("register order_operation_latency_seconds");

        Self {
            registry,
            orders_created_total,
            order_status_updates_total,
            order_cancellations_total,
            delivery_updates_total,
            order_operation_latency_seconds,
        }
    }

    pub fn observe_latency(&self, operation: &str, seconds: f64) {
        self.order_operation_latency_seconds
            .with_label_values(&[operation])
            .observe(seconds);
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
