//! API error mapping

use crate::wager::WagerError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::warn;

#[derive(Debug)]
pub enum ApiError {
    Wager(WagerError),
    NotFound(String),
    /// Body that could not be read as the expected JSON.
    BadRequest(String),
}

impl From<WagerError> for ApiError {
    fn from(err: WagerError) -> Self {
        ApiError::Wager(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// HTTP status for a domain failure
pub fn status_for(err: &WagerError) -> StatusCode {
    match err {
        WagerError::UserNotFound { .. }
        | WagerError::GroupNotFound { .. }
        | WagerError::BetNotFound { .. }
        | WagerError::UnknownInviteCode { .. } => StatusCode::NOT_FOUND,
        WagerError::NotGroupMember { .. }
        | WagerError::NotParticipant { .. }
        | WagerError::NotArbiter { .. } => StatusCode::FORBIDDEN,
        WagerError::EmailTaken { .. }
        | WagerError::AlreadyMember { .. }
        | WagerError::InvalidState { .. }
        | WagerError::DuplicateParticipant { .. }
        | WagerError::SideTaken { .. }
        | WagerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        WagerError::InvalidInput { .. }
        | WagerError::InvalidStake { .. }
        | WagerError::MissingArbiter => StatusCode::BAD_REQUEST,
        WagerError::InviteCodeExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Wager(err) => {
                let status = status_for(err);
                warn!(status = status.as_u16(), "Request refused: {}", err);
                (status, err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => {
                warn!("Malformed request body: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
