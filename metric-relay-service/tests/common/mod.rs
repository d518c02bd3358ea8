//! Common test utilities for metric-relay-service integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use metric_relay_service::config::{DatabaseConfig, HubConfig, RelayConfig};
use metric_relay_service::models::Metric;
use metric_relay_service::services::{Broadcaster, MetricStore, MetricsHub, NotificationRelay};
use metric_relay_service::startup::Application;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,metric_relay_service=debug,sqlx=warn")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn test_config() -> RelayConfig {
    RelayConfig {
        common: CoreConfig { port: 0 },
        service_name: "metric-relay-service-test".to_string(),
        service_version: "test".to_string(),
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 2,
            min_connections: 0,
            acquire_timeout_secs: 2,
        },
        hub: HubConfig::default(),
    }
}

pub fn sample_metric(id: i32, payload: Option<&str>) -> Metric {
    Metric {
        id,
        metric_type: "energy".to_string(),
        name: "Kitchen".to_string(),
        payload: payload.map(str::to_string),
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 45).unwrap(),
    }
}

/// Store backed by a map; `unavailable()` makes every call fail like a dead pool.
#[derive(Default)]
pub struct InMemoryStore {
    metrics: HashMap<i32, Metric>,
    unavailable: bool,
}

impl InMemoryStore {
    pub fn with(metrics: impl IntoIterator<Item = Metric>) -> Self {
        Self {
            metrics: metrics.into_iter().map(|m| (m.id, m)).collect(),
            unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            metrics: HashMap::new(),
            unavailable: true,
        }
    }
}

#[async_trait]
impl MetricStore for InMemoryStore {
    async fn find_metric(&self, metric_id: i32) -> Result<Option<Metric>, AppError> {
        if self.unavailable {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(self.metrics.get(&metric_id).cloned())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if self.unavailable {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "connection refused"
            )));
        }
        Ok(())
    }
}

/// Records every send; optionally fails on a given event name.
#[derive(Default)]
pub struct RecordingBroadcaster {
    sends: Mutex<Vec<(String, Vec<Value>)>>,
    fail_on: Option<&'static str>,
}

impl RecordingBroadcaster {
    pub fn failing_on(event: &'static str) -> Self {
        Self {
            sends: Mutex::new(Vec::new()),
            fail_on: Some(event),
        }
    }

    pub fn sends(&self) -> Vec<(String, Vec<Value>)> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl Broadcaster for RecordingBroadcaster {
    async fn send_to_all(
        &self,
        event: &'static str,
        arguments: Vec<Value>,
    ) -> Result<(), AppError> {
        if self.fail_on == Some(event) {
            return Err(AppError::BroadcastError(anyhow::anyhow!(
                "hub unavailable"
            )));
        }
        self.sends
            .lock()
            .unwrap()
            .push((event.to_string(), arguments));
        Ok(())
    }
}

pub struct TestApp {
    pub address: String,
    pub ws_address: String,
    pub hub: MetricsHub,
    pub relay: NotificationRelay,
}

impl TestApp {
    /// Spawn the full HTTP server on a random port around `store`.
    pub async fn spawn(store: Arc<dyn MetricStore>) -> Self {
        Self::spawn_with_config(test_config(), store).await
    }

    pub async fn spawn_with_config(config: RelayConfig, store: Arc<dyn MetricStore>) -> Self {
        init_tracing();

        let app = Application::build_with_store(config, store)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let hub = app.hub();
        let relay = app.relay();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            ws_address: format!("ws://127.0.0.1:{}/hubs/metrics", port),
            hub,
            relay,
        }
    }

    /// Block until at least `count` WebSocket sessions are subscribed.
    pub async fn wait_for_subscribers(&self, count: usize) {
        for _ in 0..100 {
            if self.hub.subscriber_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "Expected {} subscribers, found {}",
            count,
            self.hub.subscriber_count()
        );
    }
}
