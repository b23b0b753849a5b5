use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::models::tracking::TrackedOrder;
use crate::services::tracking_client::TrackingSink;

/// Fire-and-forget reporting to the tracking service. Each report runs on its
/// own task; its outcome is only logged. In-flight reports are kept in a
/// `JoinSet` so shutdown can wait for them.
#[derive(Clone)]
pub struct TrackingDispatcher {
    sink: Arc<dyn TrackingSink>,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl TrackingDispatcher {
    pub fn new(sink: Arc<dyn TrackingSink>) -> Self {
        Self {
            sink,
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn dispatch(&self, order: TrackedOrder) {
        let sink = self.sink.clone();
        let task = async move {
            match sink.send_order(&order).await {
                Ok(outcome) if outcome.success => {}
                Ok(outcome) => warn!(
                    order_id = %order.order_id,
                    http_status = outcome.status,
                    "Tracking report dropped: {}",
                    outcome.body
                ),
                Err(e) => error!(order_id = %order.order_id, "Tracking report failed: {}", e),
            }
        };

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        // Reap finished reports so the set only holds pending ones.
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn(task);
    }

    pub fn pending(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Waits up to `grace` for pending reports. Whatever is still running
    /// afterwards is aborted and logged as lost.
    pub async fn shutdown(&self, grace: Duration) {
        let mut reports = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *in_flight)
        };
        if reports.is_empty() {
            return;
        }

        info!("Waiting for {} pending tracking reports", reports.len());
        let drained = tokio::time::timeout(grace, async {
            while reports.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!("{} tracking reports lost at shutdown", reports.len());
            reports.abort_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tracking::{Commission, TrackedCustomer};
    use crate::services::tracking_client::{TrackingError, TrackingOutcome};
    use async_trait::async_trait;

    struct Recording {
        seen: Mutex<Vec<String>>,
        delay: Duration,
    }

    #[async_trait]
    impl TrackingSink for Recording {
        async fn send_order(
            &self,
            order: &TrackedOrder,
        ) -> Result<TrackingOutcome, TrackingError> {
            tokio::time::sleep(self.delay).await;
            self.seen.lock().unwrap().push(order.order_id.clone());
            Err(TrackingError::MissingCredentials)
        }
    }

    fn order(id: &str) -> TrackedOrder {
        TrackedOrder {
            order_id: id.to_string(),
            status: "paid".to_string(),
            payment_method: "pix".to_string(),
            customer: TrackedCustomer {
                name: "Maria".to_string(),
                email: "maria@example.com".to_string(),
                phone: None,
                document: None,
                country: None,
            },
            products: Vec::new(),
            commission: Commission::from_cents(100, 0, "BRL"),
            tracking_parameters: None,
            created_at: None,
            approved_at: None,
            refunded_at: None,
        }
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_pending_reports() {
        let sink = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            delay: Duration::from_millis(20),
        });
        let dispatcher = TrackingDispatcher::new(sink.clone());

        dispatcher.dispatch(order("ORD-1"));
        dispatcher.dispatch(order("ORD-2"));
        assert_eq!(dispatcher.pending(), 2);

        dispatcher.shutdown(Duration::from_secs(2)).await;

        let mut seen = sink.seen.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["ORD-1".to_string(), "ORD-2".to_string()]);
        assert_eq!(dispatcher.pending(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_gives_up_after_grace() {
        let sink = Arc::new(Recording {
            seen: Mutex::new(Vec::new()),
            delay: Duration::from_secs(30),
        });
        let dispatcher = TrackingDispatcher::new(sink.clone());

        dispatcher.dispatch(order("ORD-SLOW"));
        dispatcher.shutdown(Duration::from_millis(10)).await;

        assert!(sink.seen.lock().unwrap().is_empty());
        assert_eq!(dispatcher.pending(), 0);
    }
}
