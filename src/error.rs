use actix_web::{error, http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use std::fmt::Display;
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::services::{IdentityError, StoreError};

const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Request-level error
///
/// Every handler returns `Result<_, ApiError>`; backend failures are mapped
/// here and rendered as an [`ErrorResponse`] body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{error}: {message}")]
    Validation { error: String, message: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// `error` is shown to the client, `detail` only goes to the log
    #[error("{error}: {detail}")]
    Internal { error: String, detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation {
            error: "Validation failed".to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    /// Mapper for `map_err` that tags a backend failure with a client-facing message
    pub fn internal<E: Display>(error: &'static str) -> impl FnOnce(E) -> ApiError {
        move |e| ApiError::Internal {
            error: error.to_string(),
            detail: e.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error, message) = match self {
            ApiError::Validation { error, message } => (error.clone(), message.clone()),
            ApiError::Unauthorized(reason) => {
                tracing::debug!("Rejected request: {}", reason);
                ("Unauthorized".to_string(), "Invalid or missing access token".to_string())
            }
            ApiError::NotFound(message) => ("Not found".to_string(), message.clone()),
            ApiError::Internal { error, detail } => {
                tracing::error!("{}: {}", error, detail);
                (error.clone(), INTERNAL_MESSAGE.to_string())
            }
        };

        HttpResponse::build(status).json(ErrorResponse {
            error,
            message,
            status_code: status.as_u16(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(message) => ApiError::validation(message),
            StoreError::NotFound(message) => ApiError::NotFound(message),
            other => ApiError::Internal {
                error: "Storage failure".to_string(),
                detail: other.to_string(),
            },
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            IdentityError::Unauthorized(reason) => ApiError::Unauthorized(reason),
            IdentityError::Rejected(message) => ApiError::validation(message),
            IdentityError::StoreError(store) => store.into(),
            other => ApiError::Internal {
                error: "Authentication failure".to_string(),
                detail: other.to_string(),
            },
        }
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::Validation {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &HttpRequest,
) -> actix_web::Error {
    ApiError::Validation {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
    }
    .into()
}
