use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::models::delivery::DeliveryUpdate;
use crate::observability::metrics::Metrics;
use crate::orders::OrderService;
use crate::store::{DocumentStore, MemoryStore};
use crate::tracking::{DeliverySimulator, Subscription};

pub struct AppState {
    pub orders: OrderService,
    pub simulator: Arc<DeliverySimulator>,
    pub subscriptions: DashMap<String, Subscription>,
    pub delivery_events_tx: broadcast::Sender<DeliveryUpdate>,
    pub tracking_interval: Duration,
    pub delivery_fee: f64,
    pub tax_amount: f64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: &Config, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_service(config, OrderService::new(store))
    }

    pub fn with_service(config: &Config, orders: OrderService) -> Self {
        let (delivery_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Self {
            orders,
            simulator: Arc::new(DeliverySimulator::new()),
            subscriptions: DashMap::new(),
            delivery_events_tx,
            tracking_interval: config.tracking_interval,
            delivery_fee: config.delivery_fee,
            tax_amount: config.tax_amount,
            metrics: Metrics::new(),
        }
    }

    /// Drop handles whose timer already stopped; returns how many went.
    pub fn prune_finished_subscriptions(&self) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|_, subscription| subscription.is_active());
        before - self.subscriptions.len()
    }

    /// Subscriptions whose timer is still running.
    pub fn active_subscriptions(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|entry| entry.value().is_active())
            .count()
    }
}
