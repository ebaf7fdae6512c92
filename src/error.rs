use crate::model::leave::LeaveType;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Unified handler error. Every variant renders as `{"message": "..."}` with
/// the matching status code, so handlers can return `Result<_, ApiError>` and
/// bail with `?`.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum ApiError {
    /// Missing/malformed fields, end before start, bad status value
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Insufficient {} leave balance", _0)]
    InsufficientBalance(LeaveType),

    /// Missing, malformed, or expired bearer credential
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    /// Wrong role, not the owner, or not the assigned manager
    #[display(fmt = "{}", _0)]
    Forbidden(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Action on a request that already left the pending state
    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// Underlying store failure; details go to the log, not the caller
    #[display(fmt = "Internal Server Error")]
    Store,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InsufficientBalance(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Store => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientBalance(LeaveType::Vacation).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("managers only".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFound("gone".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("already processed".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(ApiError::Store.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ApiError::InsufficientBalance(LeaveType::Sick).to_string(),
            "Insufficient sick leave balance"
        );
        assert_eq!(ApiError::Store.to_string(), "Internal Server Error");
        assert_eq!(
            ApiError::NotFound("Leave request not found".into()).to_string(),
            "Leave request not found"
        );
    }
}
