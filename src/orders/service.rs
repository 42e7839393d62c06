use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::AppError;
use crate::models::order::{
    can_cancel_order, Address, Order, OrderItem, OrderStatus, PaymentMethod,
};
use crate::orders::document::{self, NewOrder, ORDERS_COLLECTION};
use crate::orders::estimate::{estimated_delivery, RandomSource, ThreadRandom};
use crate::store::DocumentStore;

/// Order lifecycle operations over a [`DocumentStore`].
///
/// Holds no order state of its own; every call reads or writes the store.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn DocumentStore>,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl OrderService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self::with_sources(store, Arc::new(ThreadRandom), Arc::new(SystemClock))
    }

    pub fn with_sources(
        store: Arc<dyn DocumentStore>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            random,
            clock,
        }
    }

    pub async fn create_order(
        &self,
        items: Vec<OrderItem>,
        address: Address,
        payment_method: PaymentMethod,
        total_amount: f64,
        upi_id: Option<String>,
    ) -> Result<String, AppError> {
        let estimated_delivery = self.calculate_estimated_delivery(&address);
        let upi_id = upi_id.filter(|_| payment_method == PaymentMethod::Upi);

        let fields = document::encode_new(&NewOrder {
            items,
            address,
            payment_method,
            upi_id,
            total_amount,
            estimated_delivery,
        })?;

        let id = self.store.create(ORDERS_COLLECTION, fields).await?;
        info!(order_id = %id, total_amount, "order created");

        Ok(id)
    }

    pub async fn get_order(&self, id: &str) -> Result<Option<Order>, AppError> {
        let Some(fields) = self.store.get(ORDERS_COLLECTION, id).await? else {
            return Ok(None);
        };

        let order = document::decode(id, &fields, self.clock.now())?;
        Ok(Some(order))
    }

    /// Set `status` and complete its timeline entry.
    ///
    /// Stages in between are left as they were; no ordering is enforced.
    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<(), AppError> {
        let order = self
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(id.to_string()))?;

        let fields = document::encode_status_update(&order.timeline, status)?;
        self.store.update(ORDERS_COLLECTION, id, fields).await?;

        info!(
            order_id = %id,
            from = order.status.as_str(),
            to = status.as_str(),
            "order status updated"
        );
        Ok(())
    }

    pub async fn cancel_order(&self, id: &str) -> Result<(), AppError> {
        let order = self
            .get_order(id)
            .await?
            .ok_or_else(|| AppError::OrderNotFound(id.to_string()))?;

        if !can_cancel_order(order.status) {
            return Err(AppError::InvalidTransition {
                order_id: id.to_string(),
                status: order.status,
            });
        }

        self.store
            .update(ORDERS_COLLECTION, id, document::encode_cancellation()?)
            .await?;

        info!(order_id = %id, "order cancelled");
        Ok(())
    }

    pub async fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, AppError> {
        let now = self.clock.now();
        let documents = self
            .store
            .find_by_field(ORDERS_COLLECTION, "status", &Value::from(status.as_str()))
            .await?;

        debug!(status = status.as_str(), count = documents.len(), "orders fetched by status");

        let mut orders = documents
            .iter()
            .map(|(id, fields)| document::decode(id, fields, now))
            .collect::<Result<Vec<_>, _>>()?;
        orders.sort_by_key(|order| order.created_at);

        Ok(orders)
    }

    /// The address does not influence the estimate yet; only the random
    /// spread on top of the base time does.
    pub fn calculate_estimated_delivery(&self, _address: &Address) -> DateTime<Utc> {
        estimated_delivery(self.clock.now(), self.random.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::clock::ManualClock;
    use crate::models::order::{order_progress, StructuredAddress};
    use crate::orders::estimate::FixedRandom;
    use crate::store::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        service: OrderService,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let store = Arc::new(MemoryStore::with_clock(clock.clone()));
        let service =
            OrderService::with_sources(store.clone(), Arc::new(FixedRandom(15)), clock.clone());

        Fixture {
            store,
            clock,
            service,
        }
    }

    fn cart() -> Vec<OrderItem> {
        vec![
            OrderItem {
                name: "Hakka Noodles".to_string(),
                quantity: 1,
                unit_price: 220.0,
            },
            OrderItem {
                name: "Chicken Fried Rice".to_string(),
                quantity: 1,
                unit_price: 280.0,
            },
        ]
    }

    fn address() -> Address {
        Address::Structured(
            StructuredAddress::new("123 MG Road", "Bangalore", "Karnataka")
                .with_field("pincode", "560001"),
        )
    }

    async fn place(service: &OrderService) -> String {
        service
            .create_order(cart(), address(), PaymentMethod::GooglePay, 590.0, None)
            .await
            .unwrap()
    }

    fn completed(order: &Order) -> Vec<bool> {
        order.timeline.iter().map(|item| item.completed).collect()
    }

    #[tokio::test]
    async fn created_order_is_placed_with_one_completed_stage() {
        let f = fixture();
        let id = place(&f.service).await;

        let order = f.service.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert_eq!(order.total_amount, 590.0);
        assert_eq!(order.items, cart());
        assert_eq!(order.address, address());
        assert_eq!(completed(&order), vec![true, false, false, false, false]);
        assert_eq!(order.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(order.timeline[0].timestamp, Some(order.created_at));
        assert_eq!(order.estimated_delivery - order.created_at, Duration::minutes(40));
    }

    #[tokio::test]
    async fn structured_address_is_stored_as_given() {
        let f = fixture();
        let given = Address::Structured(
            StructuredAddress::new("1 A", "B", "C")
                .with_field("pincode", "560001")
                .with_field("phone", "999"),
        );

        let id = f
            .service
            .create_order(cart(), given.clone(), PaymentMethod::Cod, 590.0, None)
            .await
            .unwrap();

        let order = f.service.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.address, given);
        assert_eq!(
            serde_json::to_value(&order.address).unwrap(),
            serde_json::json!({
                "street": "1 A",
                "city": "B",
                "state": "C",
                "pincode": "560001",
                "phone": "999"
            })
        );
    }

    #[tokio::test]
    async fn upi_id_is_kept_only_for_upi_payments() {
        let f = fixture();
        let upi_id = Some("me@okbank".to_string());
        let upi = f
            .service
            .create_order(cart(), address(), PaymentMethod::Upi, 590.0, upi_id.clone())
            .await
            .unwrap();
        let cod = f
            .service
            .create_order(cart(), address(), PaymentMethod::Cod, 590.0, upi_id)
            .await
            .unwrap();

        let upi = f.service.get_order(&upi).await.unwrap().unwrap();
        let cod = f.service.get_order(&cod).await.unwrap().unwrap();
        assert_eq!(upi.upi_id.as_deref(), Some("me@okbank"));
        assert_eq!(cod.upi_id, None);
    }

    #[tokio::test]
    async fn create_surfaces_store_failure() {
        let f = fixture();
        f.store.set_fail_writes(true);

        let err = f
            .service
            .create_order(cart(), address(), PaymentMethod::Cod, 590.0, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[tokio::test]
    async fn missing_order_reads_as_none() {
        let f = fixture();
        assert!(f.service.get_order("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_completes_only_the_target_stage() {
        let f = fixture();
        let id = place(&f.service).await;

        f.clock.advance(Duration::minutes(3));
        f.service
            .update_order_status(&id, OrderStatus::Delivered)
            .await
            .unwrap();

        let order = f.service.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(completed(&order), vec![true, false, false, false, true]);
        assert_eq!(order.timeline[0].timestamp, Some(order.created_at));
        assert_eq!(
            order.timeline[4].timestamp,
            Some(order.created_at + Duration::minutes(3))
        );
        assert_eq!(order.updated_at, order.timeline[4].timestamp);
        assert_eq!(order_progress(&order.timeline), 40.0);
    }

    #[tokio::test]
    async fn update_of_missing_order_is_not_found() {
        let f = fixture();
        let err = f
            .service
            .update_order_status("missing", OrderStatus::Accepted)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::OrderNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn accepted_order_can_be_cancelled() {
        let f = fixture();
        let id = place(&f.service).await;
        f.service
            .update_order_status(&id, OrderStatus::Accepted)
            .await
            .unwrap();

        f.service.cancel_order(&id).await.unwrap();

        let order = f.service.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.cancelled_at.is_some());
        assert_eq!(completed(&order), vec![true, true, false, false, false]);
    }

    #[tokio::test]
    async fn preparing_order_cannot_be_cancelled() {
        let f = fixture();
        let id = place(&f.service).await;
        f.service
            .update_order_status(&id, OrderStatus::Preparing)
            .await
            .unwrap();

        let err = f.service.cancel_order(&id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                status: OrderStatus::Preparing,
                ..
            }
        ));

        let order = f.service.get_order(&id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
        assert!(order.cancelled_at.is_none());
    }

    #[tokio::test]
    async fn cancelled_order_cannot_be_cancelled_again() {
        let f = fixture();
        let id = place(&f.service).await;
        f.service.cancel_order(&id).await.unwrap();

        let err = f.service.cancel_order(&id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn orders_by_status_filters_and_sorts() {
        let f = fixture();
        let first = place(&f.service).await;
        f.clock.advance(Duration::minutes(1));
        let second = place(&f.service).await;
        let other = place(&f.service).await;
        f.service
            .update_order_status(&other, OrderStatus::Accepted)
            .await
            .unwrap();

        let placed = f.service.orders_by_status(OrderStatus::Placed).await.unwrap();
        let ids: Vec<&str> = placed.iter().map(|order| order.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    }
}
