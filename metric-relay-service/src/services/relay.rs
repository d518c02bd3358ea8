//! Looks up a metric, reshapes it and broadcasts it to subscribers.

use crate::models::{Metric, MetricDto};
use crate::services::database::MetricStore;
use crate::services::hub::{Broadcaster, DATA_UPDATED, METRIC_RECEIVED};
use crate::services::metrics::record_notification;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct NotificationRelay {
    store: Arc<dyn MetricStore>,
    hub: Arc<dyn Broadcaster>,
}

impl NotificationRelay {
    pub fn new(store: Arc<dyn MetricStore>, hub: Arc<dyn Broadcaster>) -> Self {
        Self { store, hub }
    }

    /// Broadcast the stored metric `metric_id`.
    ///
    /// Returns `AppError::NotFound` without broadcasting when no such metric
    /// exists. Every other failure is logged here and returned as-is; a
    /// failure on the second send does not undo the first.
    #[instrument(skip(self))]
    pub async fn notify(&self, metric_id: i32) -> Result<(), AppError> {
        let result = match self.store.find_metric(metric_id).await {
            Ok(Some(metric)) => self.relay(&metric).await,
            Ok(None) => Err(AppError::NotFound(anyhow::anyhow!(
                "Metric not found: {}",
                metric_id
            ))),
            Err(e) => Err(e),
        };

        match &result {
            Ok(()) => {
                record_notification("success");
                info!("Metric notification sent");
            }
            Err(AppError::NotFound(_)) => {
                record_notification("not_found");
                info!("Metric not found, nothing broadcast");
            }
            Err(e) => {
                record_notification("error");
                error!(error = %e, "Failed to send metric notification");
            }
        }

        result
    }

    /// Broadcast a metric the caller already holds.
    #[instrument(skip(self, metric), fields(metric_id = metric.id))]
    pub async fn broadcast_metric(&self, metric: &Metric) -> Result<(), AppError> {
        self.relay(metric).await.inspect_err(|e| {
            error!(error = %e, "Failed to broadcast metric");
        })
    }

    async fn relay(&self, metric: &Metric) -> Result<(), AppError> {
        let dto = MetricDto::try_from(metric)?;
        let argument = serde_json::to_value(&dto)?;

        self.hub.send_to_all(METRIC_RECEIVED, vec![argument]).await?;
        self.hub.send_to_all(DATA_UPDATED, Vec::new()).await?;

        Ok(())
    }
}
