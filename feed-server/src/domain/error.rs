use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthorized")]
    Unauthenticated,
    #[error("user not authorized")]
    Forbidden,
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Error kind reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "ValidationError",
            DomainError::InvalidCredentials | DomainError::Unauthenticated => {
                "AuthenticationError"
            }
            DomainError::Forbidden => "AuthorizationError",
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::CommentNotFound(_) => "NotFoundError",
            DomainError::Internal(_) => "StoreError",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::CommentNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::InvalidCredentials
            | DomainError::Unauthenticated
            | DomainError::Forbidden => StatusCode::UNAUTHORIZED,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            DomainError::Internal(cause) => {
                error!(cause = %cause, "request failed with internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let details = match self {
            DomainError::Validation { field, .. } => Some(json!({ "field": field })),
            DomainError::PostNotFound(resource)
            | DomainError::UserNotFound(resource)
            | DomainError::CommentNotFound(resource) => Some(json!({ "resource": resource })),
            _ => None,
        };
        let body = ErrorBody {
            kind: self.kind(),
            error: message.as_str(),
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
