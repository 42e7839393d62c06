use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use crate::geo::path_length_km;
use crate::models::delivery::{DeliveryStatus, DeliveryUpdate, GeoPoint};
use crate::tracking::subscription::Subscription;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

const MINUTES_PER_STOP: usize = 2;

/// Restaurant to customer, Mumbai.
pub const ROUTE: [GeoPoint; 9] = [
    point(19.0760, 72.8777),
    point(19.0770, 72.8770),
    point(19.0780, 72.8760),
    point(19.0800, 72.8740),
    point(19.0820, 72.8720),
    point(19.0840, 72.8700),
    point(19.0860, 72.8680),
    point(19.0880, 72.8660),
    point(19.0896, 72.8656),
];

const fn point(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint {
        latitude,
        longitude,
    }
}

/// Walks a synthetic delivery agent along [`ROUTE`], one waypoint per update.
///
/// Every order id gets its own cursor over the same route. Cursors live only
/// in this instance.
#[derive(Debug, Default)]
pub struct DeliverySimulator {
    cursors: DashMap<String, usize>,
}

impl DeliverySimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_tracking(&self, order_id: &str) {
        self.cursors.insert(order_id.to_string(), 0);
        debug!(order_id, "tracking started");
    }

    pub fn reset_tracking(&self, order_id: &str) {
        self.cursors.insert(order_id.to_string(), 0);
        debug!(order_id, "tracking reset");
    }

    pub fn is_tracking(&self, order_id: &str) -> bool {
        self.cursors.contains_key(order_id)
    }

    pub fn tracked_orders(&self) -> usize {
        self.cursors.len()
    }

    /// Report the agent at the current cursor, then step the cursor.
    ///
    /// Untracked orders start from the restaurant. Past the last waypoint the
    /// update is terminal and the cursor stays put.
    pub fn get_delivery_update(&self, order_id: &str) -> DeliveryUpdate {
        let mut cursor = self.cursors.entry(order_id.to_string()).or_insert(0);
        let index = *cursor;

        if index >= ROUTE.len() {
            return DeliveryUpdate {
                order_id: order_id.to_string(),
                agent_location: ROUTE[ROUTE.len() - 1],
                status: DeliveryStatus::Delivered,
                timestamp: Utc::now(),
                estimated_arrival: "Delivered!".to_string(),
            };
        }

        let remaining = ROUTE.len() - index - 1;
        *cursor = index + 1;

        DeliveryUpdate {
            order_id: order_id.to_string(),
            agent_location: ROUTE[index],
            status: status_at(index, remaining),
            timestamp: Utc::now(),
            estimated_arrival: estimated_arrival(remaining),
        }
    }

    /// Push an update to `callback` every [`DEFAULT_UPDATE_INTERVAL`] until
    /// the order is delivered or the subscription is cancelled.
    pub fn subscribe_to_updates<F>(self: &Arc<Self>, order_id: &str, callback: F) -> Subscription
    where
        F: FnMut(DeliveryUpdate) + Send + 'static,
    {
        Subscription::spawn(
            self.clone(),
            order_id.to_string(),
            DEFAULT_UPDATE_INTERVAL,
            callback,
        )
    }

    pub fn subscribe_with_interval<F>(
        self: &Arc<Self>,
        order_id: &str,
        interval: Duration,
        callback: F,
    ) -> Subscription
    where
        F: FnMut(DeliveryUpdate) + Send + 'static,
    {
        Subscription::spawn(self.clone(), order_id.to_string(), interval, callback)
    }

    pub fn route(&self) -> &'static [GeoPoint] {
        &ROUTE
    }

    pub fn restaurant_location(&self) -> GeoPoint {
        ROUTE[0]
    }

    pub fn customer_location(&self) -> GeoPoint {
        ROUTE[ROUTE.len() - 1]
    }

    pub fn route_length_km(&self) -> f64 {
        path_length_km(&ROUTE)
    }
}

fn status_at(index: usize, remaining: usize) -> DeliveryStatus {
    if index == 0 {
        DeliveryStatus::PickedUp
    } else if remaining <= 2 {
        DeliveryStatus::Nearby
    } else if remaining == 0 {
        // never taken: the nearby arm already covers it
        DeliveryStatus::Delivered
    } else {
        DeliveryStatus::OnTheWay
    }
}

fn estimated_arrival(remaining: usize) -> String {
    let minutes = remaining * MINUTES_PER_STOP;
    if minutes > 0 {
        format!("{minutes} minutes")
    } else {
        "Arriving now".to_string()
    }
}
