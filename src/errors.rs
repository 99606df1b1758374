use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

use crate::handlers::api_types::ApiErrorResponse;
use crate::lifecycle::LifecycleError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum AppError {
    Lifecycle(LifecycleError),
    Store(StoreError),
    BadRequest(String),
    Unauthorized,
    PermissionDenied(String),
    RateLimited,
    Session(String),
    Hash(String),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Lifecycle(e) => write!(f, "{e}"),
            AppError::Store(e) => write!(f, "Store error: {e}"),
            AppError::BadRequest(e) => write!(f, "{e}"),
            AppError::Unauthorized => write!(f, "Authentication required"),
            AppError::PermissionDenied(e) => write!(f, "Permission denied: {e}"),
            AppError::RateLimited => {
                write!(f, "Too many failed login attempts. Please try again later.")
            }
            AppError::Session(e) => write!(f, "Session error: {e}"),
            AppError::Hash(e) => write!(f, "Hash error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Lifecycle(e) => match e {
                LifecycleError::NotFound => StatusCode::NOT_FOUND,
                LifecycleError::Validation(_)
                | LifecycleError::AlreadyEvaluated(_)
                | LifecycleError::NoEvaluationYet(_)
                | LifecycleError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
                LifecycleError::ConcurrentModification(_) => StatusCode::CONFLICT,
                LifecycleError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Session(_) | AppError::Hash(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Lifecycle(LifecycleError::Validation(errors)) => ApiErrorResponse {
                error: "Validation failed".to_string(),
                details: Some(errors.join("; ")),
            },
            _ if status.is_server_error() => {
                log::error!("{self}");
                ApiErrorResponse {
                    error: "Internal Server Error".to_string(),
                    details: None,
                }
            }
            _ => ApiErrorResponse {
                error: self.to_string(),
                details: None,
            },
        };
        HttpResponse::build(status).json(body)
    }
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        AppError::Lifecycle(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}
