// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::common::db_utils::is_unique_violation;

/// Stable classification of every failure the API can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Unauthorized,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    NotFound { code: &'static str, message: String },

    // Business-rule violation detected by a service (bad qty, payment mismatch...)
    #[error("{message}")]
    BusinessRule {
        code: &'static str,
        message: String,
        details: Option<Value>,
    },

    // Shape validation of a request payload
    #[error("Validation error")]
    ValidationError(#[from] ValidationErrors),

    #[error("{message}")]
    Unauthorized { code: &'static str, message: String },

    #[error("Forbidden")]
    Forbidden,

    #[error("{message}")]
    Conflict { code: &'static str, message: String },

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn not_found(code: &'static str, message: impl Into<String>) -> Self {
        AppError::NotFound { code, message: message.into() }
    }

    pub fn business(code: &'static str, message: impl Into<String>) -> Self {
        AppError::BusinessRule { code, message: message.into(), details: None }
    }

    pub fn business_with(code: &'static str, message: impl Into<String>, details: Value) -> Self {
        AppError::BusinessRule { code, message: message.into(), details: Some(details) }
    }

    pub fn unauthorized() -> Self {
        AppError::Unauthorized { code: "UNAUTHORIZED", message: "Unauthorized".into() }
    }

    pub fn invalid_token() -> Self {
        AppError::Unauthorized { code: "UNAUTHORIZED", message: "Invalid or expired token".into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::BusinessRule { .. } | AppError::ValidationError(_) => ErrorKind::Validation,
            AppError::Unauthorized { .. } => ErrorKind::Unauthorized,
            AppError::Forbidden => ErrorKind::Forbidden,
            AppError::Conflict { .. } => ErrorKind::Conflict,
            AppError::DatabaseError(e) if is_unique_violation(e) => ErrorKind::Conflict,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => ErrorKind::Internal,
        }
    }

    /// Machine-readable code sent to clients in `error.code`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound { code, .. }
            | AppError::BusinessRule { code, .. }
            | AppError::Unauthorized { code, .. }
            | AppError::Conflict { code, .. } => *code,
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::Forbidden => "FORBIDDEN",
            AppError::DatabaseError(e) if is_unique_violation(e) => "CONFLICT",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn details(&self) -> Option<Value> {
        match self {
            AppError::BusinessRule { details, .. } => details.clone(),
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                collect_field_errors(errors, "", &mut fields);
                Some(json!(fields))
            }
            AppError::DatabaseError(e) if is_unique_violation(e) => e
                .as_database_error()
                .and_then(|db_err| db_err.constraint())
                .map(|constraint| json!({ "constraint": constraint })),
            _ => None,
        }
    }

    fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Internal => "Internal Server Error".to_string(),
            ErrorKind::Conflict if matches!(self, AppError::DatabaseError(_)) => {
                "Resource already exists".to_string()
            }
            _ => self.to_string(),
        }
    }
}

// Flattens nested payload errors into `items[0].qty` style keys
fn collect_field_errors(
    errors: &ValidationErrors,
    prefix: &str,
    out: &mut HashMap<String, Vec<String>>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                out.entry(path).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(inner) => collect_field_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_field_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        if kind == ErrorKind::Internal {
            // Only place internal errors are logged, with full detail
            tracing::error!(error = %self, "Internal server error");
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
            "error": {
                "code": self.code(),
                "details": self.details(),
            },
        }));

        (kind.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn business_rule_maps_to_bad_request_with_details() {
        let err = AppError::business_with(
            "PAYMENT_MISMATCH",
            "Payment total must equal sale total",
            json!({ "totalAmount": 10.0, "paymentSum": 9.0 }),
        );

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.kind().status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "PAYMENT_MISMATCH");
        assert_eq!(err.details().unwrap()["paymentSum"], json!(9.0));
    }

    #[test]
    fn not_found_keeps_its_code() {
        let err = AppError::not_found("OUTLET_NOT_FOUND", "Outlet not found");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.code(), "OUTLET_NOT_FOUND");
        assert_eq!(err.to_string(), "Outlet not found");
    }

    #[test]
    fn store_errors_are_internal_and_hide_their_message() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert_eq!(err.public_message(), "Internal Server Error");
    }

    #[test]
    fn validation_errors_are_grouped_by_field() {
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("length");
        e.message = Some("items cannot be empty".into());
        errors.add("items", e);

        let err = AppError::from(errors);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.details().unwrap()["items"][0], json!("items cannot be empty"));
    }

    #[test]
    fn nested_errors_are_keyed_by_path() {
        use validator::Validate;

        #[derive(Validate)]
        struct Line {
            #[validate(range(min = 1))]
            qty: i32,
        }

        #[derive(Validate)]
        struct Cart {
            #[validate(nested)]
            items: Vec<Line>,
        }

        let errors = Cart { items: vec![Line { qty: 1 }, Line { qty: 0 }] }
            .validate()
            .unwrap_err();

        let err = AppError::from(errors);
        assert_eq!(err.details().unwrap()["items[1].qty"][0], json!("range"));
    }

    #[test]
    fn forbidden_and_unauthorized_statuses() {
        assert_eq!(AppError::Forbidden.kind().status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::invalid_token().kind().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::invalid_token().code(), "UNAUTHORIZED");
    }
}
