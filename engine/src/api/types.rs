use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::query::QueryBindError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }
}

impl From<QueryBindError> for ApiError {
    fn from(e: QueryBindError) -> Self {
        if e.is_configuration() {
            tracing::error!(error = %e, "Query binding misconfigured");
            return Self::internal("Query binding is misconfigured");
        }
        if e.is_transient() {
            tracing::warn!(error = %e, "Store temporarily unavailable");
            return Self::service_unavailable("Data store temporarily unavailable");
        }
        tracing::error!(error = %e, "Query binding failed");
        Self::internal("Database operation failed")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataError;

    #[test]
    fn test_configuration_error_is_internal() {
        let response = ApiError::from(QueryBindError::MissingBinding("/users".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_transient_store_error_is_unavailable() {
        let err = QueryBindError::store("User", DataError::timeout("memory", 5));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_permanent_store_error_is_internal() {
        let err = QueryBindError::store("User", DataError::query("memory", "bad column"));
        assert!(matches!(ApiError::from(err), ApiError::Internal { .. }));
    }

    #[test]
    fn test_bad_request_status() {
        let response = ApiError::bad_request("QUERY_PARSE_ERROR", "bad query").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
