//! Password-reset link check

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    api::{
        error::{ApiError, ApiResult},
        state::ApiState,
        types::TokenCheckResponse,
    },
    tokens::PASSWORD_RESET,
};

/// GET /api/v1/password-reset/:token
///
/// Tells the front-end whether a reset link is still usable before it shows
/// the new-password form. The token is not consumed and the subject is not
/// disclosed.
pub async fn check_reset_token(
    State(state): State<ApiState>,
    Path(token): Path<String>,
) -> ApiResult<Json<TokenCheckResponse>> {
    state
        .tokens
        .get_token(PASSWORD_RESET, &token)
        .ok_or_else(|| ApiError::NotFound("reset link is invalid or has expired".to_string()))?;

    Ok(Json(TokenCheckResponse { valid: true }))
}
