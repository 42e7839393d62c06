//! Mapping between [`Order`] and its stored document.
//!
//! Stored field names are camelCase (`paymentMethod`, `estimatedDelivery`, ...)
//! and every timestamp uses the store's wire format.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::models::order::{
    initial_timeline, Address, Order, OrderItem, OrderStatus, PaymentMethod, TimelineItem,
    TIMELINE_STAGES,
};
use crate::store::{read_timestamp, server_timestamp, timestamp_value, Fields, StoreError};

pub const ORDERS_COLLECTION: &str = "orders";

pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub address: Address,
    pub payment_method: PaymentMethod,
    pub upi_id: Option<String>,
    pub total_amount: f64,
    pub estimated_delivery: DateTime<Utc>,
}

pub fn encode_new(order: &NewOrder) -> Result<Fields, StoreError> {
    // the store stamps the placed entry with its own clock
    let timeline: Vec<Value> = TIMELINE_STAGES
        .iter()
        .map(|&status| {
            let mut item = TimelineItem::pending(status);
            if status == OrderStatus::Placed {
                item.completed = true;
                return encode_timeline_item(&item, Some(server_timestamp()));
            }
            encode_timeline_item(&item, None)
        })
        .collect();

    let document = json!({
        "items": to_value(&order.items)?,
        "address": to_value(&order.address)?,
        "paymentMethod": to_value(&order.payment_method)?,
        "upiId": order.upi_id,
        "totalAmount": order.total_amount,
        "status": OrderStatus::Placed.as_str(),
        "createdAt": server_timestamp(),
        "estimatedDelivery": timestamp_value(order.estimated_delivery),
        "timeline": timeline,
    });

    into_fields(document)
}

/// Status write that completes the `status` entry with a server timestamp.
///
/// Earlier completions keep the time they were recorded at.
pub fn encode_status_update(
    timeline: &[TimelineItem],
    status: OrderStatus,
) -> Result<Fields, StoreError> {
    let timeline: Vec<Value> = timeline
        .iter()
        .map(|item| {
            if item.status == status {
                let completed = TimelineItem {
                    completed: true,
                    ..item.clone()
                };
                encode_timeline_item(&completed, Some(server_timestamp()))
            } else {
                encode_timeline_item(item, item.timestamp.map(timestamp_value))
            }
        })
        .collect();

    into_fields(json!({
        "status": status.as_str(),
        "timeline": timeline,
        "updatedAt": server_timestamp(),
    }))
}

pub fn encode_cancellation() -> Result<Fields, StoreError> {
    into_fields(json!({
        "status": OrderStatus::Cancelled.as_str(),
        "cancelledAt": server_timestamp(),
        "updatedAt": server_timestamp(),
    }))
}

/// Rebuild an order; `now` fills in missing timestamps and timelines.
pub fn decode(id: &str, fields: &Fields, now: DateTime<Utc>) -> Result<Order, StoreError> {
    let timeline = match fields.get("timeline") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(decode_timeline_item)
            .collect::<Result<Vec<_>, _>>()?,
        _ => initial_timeline(now),
    };

    Ok(Order {
        id: id.to_string(),
        items: required(fields, "items")?,
        address: required(fields, "address")?,
        payment_method: required(fields, "paymentMethod")?,
        upi_id: optional(fields, "upiId")?,
        total_amount: required(fields, "totalAmount")?,
        status: required(fields, "status")?,
        created_at: timestamp_field(fields, "createdAt").unwrap_or(now),
        estimated_delivery: timestamp_field(fields, "estimatedDelivery").unwrap_or(now),
        timeline,
        cancelled_at: timestamp_field(fields, "cancelledAt"),
        updated_at: timestamp_field(fields, "updatedAt"),
    })
}

fn encode_timeline_item(item: &TimelineItem, timestamp: Option<Value>) -> Value {
    json!({
        "status": item.status.as_str(),
        "label": item.label,
        "description": item.description,
        "completed": item.completed,
        "timestamp": timestamp.unwrap_or(Value::Null),
    })
}

fn decode_timeline_item(value: &Value) -> Result<TimelineItem, StoreError> {
    let entry = value
        .as_object()
        .ok_or_else(|| StoreError::Malformed("timeline entry is not an object".to_string()))?;

    let status: OrderStatus = required(entry, "status")?;
    Ok(TimelineItem {
        status,
        label: optional(entry, "label")?.unwrap_or_else(|| status.label().to_string()),
        description: optional(entry, "description")?
            .unwrap_or_else(|| status.description().to_string()),
        completed: optional(entry, "completed")?.unwrap_or(false),
        timestamp: timestamp_field(entry, "timestamp"),
    })
}

fn required<T: DeserializeOwned>(fields: &Fields, key: &str) -> Result<T, StoreError> {
    optional(fields, key)?.ok_or_else(|| StoreError::Malformed(format!("missing field {key}")))
}

fn optional<T: DeserializeOwned>(fields: &Fields, key: &str) -> Result<Option<T>, StoreError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|err| StoreError::Malformed(format!("invalid field {key}: {err}"))),
    }
}

fn timestamp_field(fields: &Fields, key: &str) -> Option<DateTime<Utc>> {
    fields.get(key).and_then(read_timestamp)
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|err| StoreError::Malformed(err.to_string()))
}

fn into_fields(value: Value) -> Result<Fields, StoreError> {
    match value {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::Malformed("document is not an object".to_string())),
    }
}
