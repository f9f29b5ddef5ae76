//! HTTP error handling
//!
//! Every failure leaves the server as a JSON body `{message, code}`. The
//! status is derived from the code.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use problem_admin_core::ServiceError;
use serde::{Deserialize, Serialize};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CONFLICT: &str = "CONFLICT";
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
pub const DATABASE_ERROR: &str = "DATABASE_ERROR";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, VALIDATION_ERROR)
    }

    /// Map a service failure
    ///
    /// Storage failures are logged and answered with `storage_message`; the
    /// underlying error never reaches the client.
    pub fn from_service(err: ServiceError, storage_message: &str) -> Self {
        match err {
            ServiceError::ValidationFailed(e) => Self::validation(e.to_string()),
            ServiceError::Conflict(message) => Self::new(message, CONFLICT),
            not_found @ ServiceError::NotFound { .. } => {
                Self::new(not_found.to_string(), RESOURCE_NOT_FOUND)
            }
            ServiceError::Database(e) => {
                tracing::error!("{}: {}", storage_message, e);
                Self::new(storage_message, DATABASE_ERROR)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            CONFLICT => StatusCode::CONFLICT,
            RESOURCE_NOT_FOUND => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Malformed bodies are client errors in the same shape as everything else
impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use problem_admin_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ServiceError::ValidationFailed(ValidationError::MissingField("slug".into())),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::conflict("taken"), StatusCode::CONFLICT),
            (ServiceError::tag_not_found("x"), StatusCode::NOT_FOUND),
        ];

        for (err, status) in cases {
            assert_eq!(HttpError::from_service(err, "unused").status(), status);
        }
    }

    #[test]
    fn test_storage_message_is_generic() {
        let err = ServiceError::Database(problem_admin_core::db::DatabaseError::sql_execution(
            "no such table: problems",
        ));
        let http = HttpError::from_service(err, "Failed to save problem");

        assert_eq!(http.message, "Failed to save problem");
        assert_eq!(http.code, DATABASE_ERROR);
        assert_eq!(http.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
