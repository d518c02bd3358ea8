pub mod metric;

pub use metric::{decode_payload, format_created_at, Metric, MetricDto};
