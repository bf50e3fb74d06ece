use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{config::Environment, error::AppError, validation::FieldError};

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// Success envelope: `{message?, data, pagination?}`.
#[derive(Debug, Serialize)]
pub struct JsonApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self {
            status: StatusCode::OK,
            message: None,
            data,
            pagination: None,
        })
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self {
            status,
            message: Some(message.into()),
            data,
            pagination: None,
        })
    }

    pub fn paginated(data: T, pagination: Pagination) -> ApiResult<T> {
        Ok(Self {
            status: StatusCode::OK,
            message: None,
            data,
            pagination: Some(pagination),
        })
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: u64, limit: u64, offset: u64, returned: usize) -> Self {
        Self {
            total,
            limit,
            offset,
            has_more: offset + (returned as u64) < total,
        }
    }
}

/// Error envelope: `{error, message, timestamp, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Classified error carried in the response extensions so the error
/// middleware can re-render it for the running environment.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
    pub public_message: String,
    pub details: Option<Vec<FieldError>>,
}

impl ErrorReport {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            status: err.status(),
            kind: err.kind().to_string(),
            message: err.message().to_string(),
            public_message: err.public_message().to_string(),
            details: err.details().map(<[FieldError]>::to_vec),
        }
    }

    pub fn body(&self, environment: Environment) -> ErrorBody {
        let message = if environment.is_production() {
            &self.public_message
        } else {
            &self.message
        };
        ErrorBody {
            error: self.kind.clone(),
            message: message.clone(),
            timestamp: timestamp(),
            details: self.details.clone(),
        }
    }

    pub fn render(&self, environment: Environment) -> Response {
        (self.status, Json(self.body(environment))).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from_error(&self);
        let mut response = report.render(Environment::Production);
        response.extensions_mut().insert(report);
        response
    }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_until_last_row_is_returned() {
        assert!(Pagination::new(5, 2, 0, 2).has_more);
        assert!(Pagination::new(5, 2, 2, 2).has_more);
        assert!(!Pagination::new(5, 2, 4, 1).has_more);
        assert!(!Pagination::new(0, 50, 0, 0).has_more);
    }

    #[test]
    fn production_hides_server_error_detail() {
        let report = ErrorReport::from_error(&AppError::Database("disk I/O error".to_string()));

        let production = report.body(Environment::Production);
        assert_eq!(production.error, "Database Error");
        assert_eq!(production.message, "A database error occurred");

        let development = report.body(Environment::Development);
        assert_eq!(development.message, "disk I/O error");
    }

    #[test]
    fn client_errors_keep_their_message_everywhere() {
        let report = ErrorReport::from_error(&AppError::not_found("Task with id 3 not found"));
        let body = report.body(Environment::Production);
        assert_eq!(body.message, "Task with id 3 not found");
        assert!(body.details.is_none());
    }

    #[test]
    fn success_envelope_omits_absent_parts() {
        let response = JsonApiResponse::ok(serde_json::json!({ "id": 1 })).expect("ok");
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json, serde_json::json!({ "data": { "id": 1 } }));
    }
}
