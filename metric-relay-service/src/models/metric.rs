//! Stored metric record and its subscriber-facing shape.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::FromRow;

/// Row of the `metrics` table. Written by the ingestion side, read-only here.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Metric {
    pub id: i32,
    #[sqlx(rename = "type")]
    pub metric_type: String,
    pub name: String,
    /// JSON object as text; `NULL` and `''` both mean "no fields".
    pub payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Argument of the `MetricReceived` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDto {
    pub id: i32,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub name: String,
    pub payload: Map<String, Value>,
    pub created_at: String,
}

impl TryFrom<&Metric> for MetricDto {
    type Error = serde_json::Error;

    fn try_from(metric: &Metric) -> Result<Self, Self::Error> {
        Ok(Self {
            id: metric.id,
            metric_type: metric.metric_type.clone(),
            name: metric.name.clone(),
            payload: decode_payload(metric.payload.as_deref())?,
            created_at: format_created_at(&metric.created_at),
        })
    }
}

/// Decode a stored payload into a field map.
///
/// Absent, empty and JSON `null` payloads yield an empty map. Anything else
/// must be a JSON object. Numbers keep their original text, so values outside
/// `f64` range pass through untouched.
pub fn decode_payload(raw: Option<&str>) -> Result<Map<String, Value>, serde_json::Error> {
    match raw {
        None | Some("") => Ok(Map::new()),
        Some(raw) => {
            let decoded: Option<Map<String, Value>> = serde_json::from_str(raw)?;
            Ok(decoded.unwrap_or_default())
        }
    }
}

/// RFC 3339 with microseconds and a `Z` suffix, e.g. `2024-01-15T14:30:45.000000Z`.
pub fn format_created_at(created_at: &DateTime<Utc>) -> String {
    created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
