use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// Street/city/state are required; every other key (`pincode`, `postal_code`,
/// `full_address`, phone numbers, landmarks...) is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredAddress {
    pub fn new(street: &str, city: &str, state: &str) -> Self {
        Self {
            street: street.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Postal code under either spelling the checkout form has used.
    pub fn postal_code(&self) -> Option<&str> {
        self.text("postal_code").or_else(|| self.text("pincode"))
    }

    pub fn full_address(&self) -> Option<&str> {
        self.text("full_address")
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Delivery address, kept exactly as the customer supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Address {
    Structured(StructuredAddress),
    Formatted(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    GooglePay,
    PhonePe,
    Upi,
    Cod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    Accepted,
    Preparing,
    OnTheWay,
    Delivered,
    Cancelled,
}

/// Stages that own a timeline entry, in display order.
pub const TIMELINE_STAGES: [OrderStatus; 5] = [
    OrderStatus::Placed,
    OrderStatus::Accepted,
    OrderStatus::Preparing,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
];

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Order Placed",
            OrderStatus::Accepted => "Order Accepted",
            OrderStatus::Preparing => "Preparing Food",
            OrderStatus::OnTheWay => "On the Way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Your order has been placed successfully",
            OrderStatus::Accepted => "Restaurant has accepted your order",
            OrderStatus::Preparing => "The restaurant is preparing your delicious meal",
            OrderStatus::OnTheWay => "Your order is being delivered to you",
            OrderStatus::Delivered => "Enjoy your meal!",
            OrderStatus::Cancelled => "Your order has been cancelled",
        }
    }

    /// Badge colour class used by the status screen.
    pub fn color(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "bg-green-500",
            OrderStatus::Accepted => "bg-blue-500",
            OrderStatus::Preparing => "bg-orange-500",
            OrderStatus::OnTheWay => "bg-purple-500",
            OrderStatus::Delivered => "bg-green-600",
            OrderStatus::Cancelled => "bg-gray-400",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub status: OrderStatus,
    pub label: String,
    pub description: String,
    pub completed: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl TimelineItem {
    pub fn pending(status: OrderStatus) -> Self {
        Self {
            status,
            label: status.label().to_string(),
            description: status.description().to_string(),
            completed: false,
            timestamp: None,
        }
    }
}

/// Fresh five-stage timeline with only `placed` completed at `placed_at`.
pub fn initial_timeline(placed_at: DateTime<Utc>) -> Vec<TimelineItem> {
    TIMELINE_STAGES
        .iter()
        .map(|&status| {
            let mut item = TimelineItem::pending(status);
            if status == OrderStatus::Placed {
                item.completed = true;
                item.timestamp = Some(placed_at);
            }
            item
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub upi_id: Option<String>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: DateTime<Utc>,
    pub timeline: Vec<TimelineItem>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn can_cancel_order(status: OrderStatus) -> bool {
    matches!(status, OrderStatus::Placed | OrderStatus::Accepted)
}

/// Share of completed timeline entries, as a percentage of the five stages.
pub fn order_progress(timeline: &[TimelineItem]) -> f64 {
    let completed = timeline.iter().filter(|item| item.completed).count();
    100.0 * completed as f64 / TIMELINE_STAGES.len() as f64
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn only_placed_and_accepted_are_cancellable() {
        assert!(can_cancel_order(OrderStatus::Placed));
        assert!(can_cancel_order(OrderStatus::Accepted));
        assert!(!can_cancel_order(OrderStatus::Preparing));
        assert!(!can_cancel_order(OrderStatus::OnTheWay));
        assert!(!can_cancel_order(OrderStatus::Delivered));
        assert!(!can_cancel_order(OrderStatus::Cancelled));
    }

    #[test]
    fn three_of_five_completed_is_sixty_percent() {
        let mut timeline = initial_timeline(Utc::now());
        timeline[2].completed = true;
        timeline[4].completed = true;

        assert_eq!(order_progress(&timeline), 60.0);
    }

    #[test]
    fn initial_timeline_has_one_completed_stage() {
        let timeline = initial_timeline(Utc::now());

        assert_eq!(timeline.len(), 5);
        let statuses: Vec<OrderStatus> = timeline.iter().map(|item| item.status).collect();
        assert_eq!(statuses, TIMELINE_STAGES.to_vec());
        assert!(timeline[0].completed && timeline[0].timestamp.is_some());
        assert!(timeline[1..].iter().all(|item| !item.completed && item.timestamp.is_none()));
        assert_eq!(order_progress(&timeline), 20.0);
    }

    #[test]
    fn address_accepts_both_shapes() {
        let structured: Address = serde_json::from_value(serde_json::json!({
            "street": "123 MG Road",
            "city": "Bangalore",
            "state": "Karnataka",
            "pincode": "560001"
        }))
        .unwrap();
        let Address::Structured(structured) = structured else {
            panic!("expected a structured address");
        };
        assert_eq!(structured.postal_code(), Some("560001"));
        assert_eq!(structured.full_address(), None);

        let formatted: Address =
            serde_json::from_value(serde_json::json!("123 MG Road, Bangalore 560001")).unwrap();
        assert_eq!(
            formatted,
            Address::Formatted("123 MG Road, Bangalore 560001".to_string())
        );
    }

    #[test]
    fn structured_address_round_trips_unknown_keys() {
        let raw = serde_json::json!({
            "street": "1 A",
            "city": "B",
            "state": "C",
            "pincode": "560001",
            "phone": "999"
        });

        let address: Address = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&address).unwrap(), raw);
    }

    #[test]
    fn object_without_street_is_not_an_address() {
        let result: Result<Address, _> =
            serde_json::from_value(serde_json::json!({ "city": "B", "state": "C" }));
        assert!(result.is_err());
    }

    #[test]
    fn status_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_value(OrderStatus::OnTheWay).unwrap(),
            serde_json::json!("on_the_way")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::GooglePay).unwrap(),
            serde_json::json!("googlepay")
        );
    }
}
