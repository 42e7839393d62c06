use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    PickedUp,
    OnTheWay,
    Nearby,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::PickedUp => "picked_up",
            DeliveryStatus::OnTheWay => "on_the_way",
            DeliveryStatus::Nearby => "nearby",
            DeliveryStatus::Delivered => "delivered",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::PickedUp => "Order Picked Up",
            DeliveryStatus::OnTheWay => "On the Way",
            DeliveryStatus::Nearby => "Nearby",
            DeliveryStatus::Delivered => "Delivered",
        }
    }

    /// Agent marker colour on the map.
    pub fn color(&self) -> &'static str {
        match self {
            DeliveryStatus::PickedUp => "#FF6B35",
            DeliveryStatus::OnTheWay => "#A855F7",
            DeliveryStatus::Nearby => "#10B981",
            DeliveryStatus::Delivered => "#059669",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DeliveryStatus::PickedUp => "📦",
            DeliveryStatus::OnTheWay => "🚗",
            DeliveryStatus::Nearby => "📍",
            DeliveryStatus::Delivered => "✅",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryUpdate {
    pub order_id: String,
    pub agent_location: GeoPoint,
    pub status: DeliveryStatus,
    pub timestamp: DateTime<Utc>,
    pub estimated_arrival: String,
}
