use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
};

use crate::{
    db::dao::DaoLayerError,
    validation::{FieldError, ValidationErrors},
};

/// Every failure a request can end in. Each layer returns the variant for the
/// fault it detected; [`crate::middleware::error_envelope_middleware`] renders it.
#[derive(Debug)]
pub enum AppError {
    Validation(Vec<FieldError>),
    BadRequest(String),
    MalformedPayload(String),
    NotFound(String),
    MethodNotAllowed(String),
    Database(String),
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::MalformedPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Value of the envelope's `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Validation Error",
            Self::BadRequest(_) => "Bad Request",
            Self::MalformedPayload(_) => "Invalid JSON",
            Self::NotFound(_) => "Not Found",
            Self::MethodNotAllowed(_) => "Method Not Allowed",
            Self::Database(_) => "Database Error",
            Self::Internal(_) => "Internal Server Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(_) => "Request validation failed",
            Self::BadRequest(message)
            | Self::MalformedPayload(message)
            | Self::NotFound(message)
            | Self::MethodNotAllowed(message)
            | Self::Database(message)
            | Self::Internal(message) => message.as_str(),
        }
    }

    /// Message safe to show a production client; 5xx detail is withheld.
    pub fn public_message(&self) -> &str {
        match self {
            Self::Database(_) => "A database error occurred",
            Self::Internal(_) => "An unexpected error occurred",
            _ => self.message(),
        }
    }

    pub fn details(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(details) => Some(details),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.message())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::Validation(err.0)
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { entity, id } => {
                AppError::not_found(format!("{entity} with id {id} not found"))
            }
            DaoLayerError::Db(err) => AppError::Database(err.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn dao_errors_map_to_distinct_kinds() {
        let missing = AppError::from(DaoLayerError::NotFound {
            entity: "Task",
            id: 7,
        });
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.kind(), "Not Found");
        assert_eq!(missing.message(), "Task with id 7 not found");

        let db = AppError::from(DaoLayerError::Db(DbErr::Custom(
            "CHECK constraint failed: priority".to_string(),
        )));
        assert_eq!(db.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.kind(), "Database Error");
        assert!(db.message().contains("CHECK constraint failed"));
        assert_eq!(db.public_message(), "A database error occurred");
    }

    #[test]
    fn validation_errors_carry_details() {
        let err = AppError::from(ValidationErrors(vec![FieldError::new(
            "title",
            "\"title\" is required",
            None,
        )]));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.details().map(<[FieldError]>::len), Some(1));
    }
}
