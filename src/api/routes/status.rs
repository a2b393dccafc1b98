//! Messenger server status endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::StatusResponse};

/// GET /api/v1/status
///
/// Returns the latest probe classification, `unknown` until the first probe
/// has completed
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let status = state.snapshots.current_status();
    Json(StatusResponse::from(status.as_deref()))
}
