//! Usage statistics endpoint

use axum::{Json, extract::State};

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
    },
    stats::StatsSnapshot,
};

/// GET /api/v1/stats
///
/// Returns the latest dashboard snapshot, or 503 before the first
/// successful aggregation
pub async fn get_stats(State(state): State<ApiState>) -> ApiResult<Json<StatsSnapshot>> {
    let snapshot = state
        .snapshots
        .current_stats()
        .ok_or_else(|| ApiError::NotReady("stats have not been aggregated yet".to_string()))?;

    Ok(Json(StatsSnapshot::clone(&snapshot)))
}
