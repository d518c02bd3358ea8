use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
};
use service_core::error::AppError;

use crate::startup::AppState;

/// `POST /api/metrics/:metric_id/notify`
///
/// 200 with no body once both broadcasts went out, 404 with no body for an
/// unknown id, opaque 500 for everything else.
#[tracing::instrument(skip(state, metric_id), fields(metric_id))]
pub async fn notify_metric(
    State(state): State<AppState>,
    metric_id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(metric_id) = metric_id.map_err(|rejection| {
        AppError::BadRequest(anyhow::anyhow!(
            "Metric id must be an integer: {}",
            rejection.body_text()
        ))
    })?;
    tracing::Span::current().record("metric_id", metric_id);

    state.relay.notify(metric_id).await?;

    Ok(StatusCode::OK)
}
