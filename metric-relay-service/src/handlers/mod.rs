//! HTTP handlers for metric-relay-service.

pub mod health;
pub mod hub;
pub mod notify;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use hub::subscribe;
pub use notify::notify_metric;
