// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON error responses for the gateway.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use courier_core::CourierError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// An HTTP status plus a message rendered as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<CourierError> for ApiError {
    fn from(err: CourierError) -> Self {
        // Client-facing kinds carry their message bare; the rest use Display.
        match err {
            CourierError::Validation(message) => Self::bad_request(message),
            CourierError::Unauthorized(message) => Self::unauthorized(message),
            CourierError::NotFound(message) => Self::not_found(message),
            CourierError::NotReady => Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
            CourierError::Timeout { .. } => Self::new(StatusCode::GATEWAY_TIMEOUT, err.to_string()),
            CourierError::Transport { .. }
            | CourierError::Fetch { .. }
            | CourierError::Internal(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(format!("invalid query string: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courier_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(CourierError::NotReady).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(CourierError::Validation("to".into())).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CourierError::NotFound("task".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CourierError::transport("boom")).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_is_error_display() {
        let err = ApiError::from(CourierError::NotReady);
        assert_eq!(err.message, "transport is not ready");

        let err = ApiError::from(CourierError::Timeout {
            duration: std::time::Duration::from_secs(3),
        });
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert!(err.message.contains("timed out"));
    }

    #[test]
    fn client_facing_kinds_keep_bare_message() {
        let err = ApiError::from(CourierError::Unauthorized("invalid token".into()));
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.message, "invalid token");

        let err = ApiError::from(CourierError::NotFound("task id not found".into()));
        assert_eq!(err.message, "task id not found");

        let err = ApiError::from(CourierError::Validation("to is required".into()));
        assert_eq!(err.message, "to is required");
    }
}
