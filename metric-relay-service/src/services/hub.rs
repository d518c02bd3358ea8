//! Fan-out channel to connected subscribers.
//!
//! Every send is serialized once into a text frame and pushed through a
//! `tokio::sync::broadcast` channel; each WebSocket session owns a receiver.
//! Subscribers that are not connected at send time never see the frame.

use crate::services::metrics::record_broadcast;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service_core::error::AppError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Carries one `MetricDto`.
pub const METRIC_RECEIVED: &str = "MetricReceived";
/// Carries no arguments; tells clients to refresh aggregates.
pub const DATA_UPDATED: &str = "DataUpdated";

/// Frame delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubMessage {
    pub target: String,
    pub arguments: Vec<Value>,
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Deliver `event` with `arguments` to every subscriber connected right now.
    async fn send_to_all(
        &self,
        event: &'static str,
        arguments: Vec<Value>,
    ) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct MetricsHub {
    tx: broadcast::Sender<Arc<str>>,
}

impl MetricsHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl Broadcaster for MetricsHub {
    async fn send_to_all(
        &self,
        event: &'static str,
        arguments: Vec<Value>,
    ) -> Result<(), AppError> {
        let frame = serde_json::to_string(&HubMessage {
            target: event.to_string(),
            arguments,
        })
        .map_err(|e| {
            AppError::BroadcastError(anyhow::anyhow!("Failed to encode {} frame: {}", event, e))
        })?;

        match self.tx.send(Arc::from(frame)) {
            Ok(receivers) => tracing::debug!(event, receivers, "Broadcast sent"),
            // No one is listening; best-effort delivery means nothing to do.
            Err(_) => tracing::debug!(event, "Broadcast sent with no subscribers"),
        }
        record_broadcast(event);

        Ok(())
    }
}
