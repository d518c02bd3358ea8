pub mod database;
pub mod hub;
pub mod metrics;
pub mod relay;

pub use database::{MetricDb, MetricStore};
pub use hub::{Broadcaster, HubMessage, MetricsHub, DATA_UPDATED, METRIC_RECEIVED};
pub use self::metrics::{
    get_metrics, init_metrics, record_broadcast, record_db_query, record_notification,
    record_subscribers,
};
pub use relay::NotificationRelay;
