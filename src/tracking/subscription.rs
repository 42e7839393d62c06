use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::models::delivery::{DeliveryStatus, DeliveryUpdate};
use crate::tracking::simulator::DeliverySimulator;

/// Shortest period the ticker accepts; tokio panics on a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running update timer.
///
/// One task owns the ticker and runs the callback to completion before it
/// waits for the next tick, so callbacks never overlap. A late tick is
/// delayed rather than fired in a burst. Dropping the handle cancels it.
pub struct Subscription {
    order_id: String,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn spawn<F>(
        simulator: Arc<DeliverySimulator>,
        order_id: String,
        interval: Duration,
        mut callback: F,
    ) -> Self
    where
        F: FnMut(DeliveryUpdate) + Send + 'static,
    {
        let interval = interval.max(MIN_INTERVAL);
        let task_order_id = order_id.clone();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let update = simulator.get_delivery_update(&task_order_id);
                let delivered = update.status == DeliveryStatus::Delivered;
                callback(update);

                if delivered {
                    info!(order_id = %task_order_id, "delivery complete, updates stopped");
                    break;
                }
            }
        });

        debug!(
            order_id = %order_id,
            interval_ms = interval.as_millis() as u64,
            "subscribed to delivery updates"
        );

        Self {
            order_id,
            task: Some(task),
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Stop the timer now, whether or not the order was delivered.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(order_id = %self.order_id, "delivery updates cancelled");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait until the timer stops on its own or is cancelled.
    pub async fn finished(mut self) {
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                if err.is_panic() {
                    warn!(order_id = %self.order_id, "delivery update task panicked");
                }
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
