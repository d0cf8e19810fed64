use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::codec::CodecError;

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    MalformedBody(String),
    NotFound(String),
    UnauthorizedAccess,
    StorageFailure(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::MalformedBody(msg) => write!(f, "Malformed request body: {}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized access"),
            AppError::StorageFailure(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    /// Single-field validation failure.
    pub fn invalid_field(field: &str, rule: &str, message: impl Into<String>) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        }])
    }

    /// Re-labels storage failures and missing rows with operation-specific
    /// messages. Validation and body errors pass through untouched.
    pub fn in_context(self, not_found: &str, storage: &str) -> Self {
        match self {
            AppError::NotFound(_) => AppError::NotFound(not_found.to_string()),
            AppError::StorageFailure(_) => AppError::StorageFailure(storage.to_string()),
            other => other,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldError::from_validation(field, e))
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::ValidationError(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => {
                tracing::error!(error = %err, "Database operation failed");
                AppError::StorageFailure("Database operation failed".into())
            }
        }
    }
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        tracing::error!(error = %err, "Stored array field could not be decoded");
        AppError::StorageFailure("Stored record is corrupt".into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl FieldError {
    fn from_validation(field: &str, error: &ValidationError) -> Self {
        FieldError {
            field: to_camel(field),
            rule: error.code.to_string(),
            message: error
                .message
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| format!("Failed `{}` rule", error.code)),
        }
    }
}

/// Request bodies are camelCase on the wire; validator reports Rust names.
fn to_camel(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(AppError::invalid_field("title", "required", "x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MalformedBody("eof".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("Project not found".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::UnauthorizedAccess.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::StorageFailure("Failed".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn in_context_relabels_storage_and_missing_rows_only() {
        let storage = AppError::StorageFailure("connection reset by peer".into())
            .in_context("Project not found", "Failed to update project");
        assert_eq!(storage.to_string(), "Failed to update project");

        let missing = AppError::NotFound("Record not found".into())
            .in_context("Project not found", "Failed to update project");
        assert_eq!(missing.to_string(), "Project not found");

        let invalid = AppError::invalid_field("title", "required", "Title is required")
            .in_context("Project not found", "Failed to update project");
        assert!(matches!(invalid, AppError::ValidationError(_)));
    }

    #[test]
    fn sqlx_errors_never_leak_their_cause() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::StorageFailure(_)));
        assert!(!err.to_string().contains("pool"));

        assert!(matches!(AppError::from(sqlx::Error::RowNotFound), AppError::NotFound(_)));
    }

    #[test]
    fn validation_errors_carry_field_and_rule() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("required");
        err.message = Some("Category is required".into());
        errors.add("category", err);

        match AppError::from(errors) {
            AppError::ValidationError(details) => {
                assert_eq!(details, vec![FieldError {
                    field: "category".into(),
                    rule: "required".into(),
                    message: "Category is required".into(),
                }]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validation_fields_use_wire_names() {
        let mut errors = ValidationErrors::new();
        errors.add("image_url", ValidationError::new("invalid_url"));
        errors.add("read_time", ValidationError::new("range"));

        match AppError::from(errors) {
            AppError::ValidationError(details) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(fields, vec!["imageUrl", "readTime"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
