//! API error types and helpers.
//!
//! # Purpose
//! Centralizes HTTP error response construction for consistent error shapes.
//! Client-addressable kinds keep their user-visible message; store and
//! transport faults are logged here and reported as a generic server error.
use crate::api::types::ErrorResponse;
use crate::error::OpsError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

pub const SCHEMA_VALIDATION_ERROR_STATUS: u16 = crate::config::SCHEMA_VALIDATION_ERROR_STATUS;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}

/// Map a core error onto the HTTP surface. `showable_status` is the
/// configured code for errors the UI renders verbatim to the user.
pub fn from_ops(err: OpsError, showable_status: u16) -> ApiError {
    let showable =
        StatusCode::from_u16(showable_status).unwrap_or(StatusCode::BAD_REQUEST);
    match err {
        OpsError::Validation(message) => {
            api_error(StatusCode::BAD_REQUEST, "validation_error", &message)
        }
        OpsError::NotFound(message) => api_error(StatusCode::NOT_FOUND, "not_found", &message),
        OpsError::Conflict(message) => api_error(showable, "already_exists", &message),
        OpsError::Unauthorized => {
            api_error(StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized")
        }
        OpsError::Unsupported(message) => api_error(showable, "unsupported", &message),
        OpsError::UnsupportedType(message) => api_error(showable, "unsupported_type", &message),
        OpsError::SchemaValidation(message) => api_error(
            StatusCode::from_u16(SCHEMA_VALIDATION_ERROR_STATUS)
                .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY),
            "schema_validation",
            &message,
        ),
        err @ (OpsError::Store(_) | OpsError::Transport(_) | OpsError::Internal(_)) => {
            tracing::error!(error = ?err, "control plane server error");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Server error",
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;

    #[test]
    fn client_errors_keep_their_message() {
        let err = from_ops(OpsError::Conflict("Schema with that name already exists".into()), 666);
        assert_eq!(err.status.as_u16(), 666);
        assert_eq!(err.body.message, "Schema with that name already exists");

        let err = from_ops(OpsError::SchemaValidation("Your proto file is invalid: x".into()), 666);
        assert_eq!(err.status.as_u16(), 555);

        let err = from_ops(OpsError::NotFound("Schema does not exist".into()), 666);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_do_not_leak_detail() {
        let err = from_ops(
            OpsError::Store(StoreError::Unexpected(anyhow::anyhow!("driver said boom"))),
            666,
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body.message, "Server error");
    }
}
