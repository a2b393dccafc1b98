//! API response types

use serde::{Deserialize, Serialize};

use crate::monitors::health::{HealthState, ServerStatus};

/// Response of `GET /api/v1/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub started_at: String,
}

/// Response of `GET /api/v1/status`
///
/// Before the first probe completes the state is `unknown` and
/// `last_updated` is null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub state: HealthState,
    pub last_updated: Option<String>,
}

impl From<Option<&ServerStatus>> for StatusResponse {
    fn from(status: Option<&ServerStatus>) -> Self {
        match status {
            Some(status) => Self {
                state: status.state,
                last_updated: Some(status.last_updated.to_rfc3339()),
            },
            None => Self {
                state: HealthState::Unknown,
                last_updated: None,
            },
        }
    }
}

/// Response of `GET /api/v1/password-reset/:token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCheckResponse {
    pub valid: bool,
}
