//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use shared::ErrorResponse;
use thiserror::Error;
use tracing::error;

use crate::domain::errors::ServiceError;

/// Failure of a request handler
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was well-formed but violates a field constraint
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    /// Status code for this error.
    ///
    /// - name conflicts: 409
    /// - validation and spend totals out of range: 422
    /// - other domain outcomes (user, subscription, no subscriptions): 404
    /// - contract violations and storage failures: 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Service(e) => match e {
                ServiceError::UsernameNotUnique | ServiceError::SubNameNotUnique => StatusCode::CONFLICT,
                ServiceError::AmountOverflow => StatusCode::UNPROCESSABLE_ENTITY,
                e if e.is_domain_outcome() => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details stay in the log
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                Self::Service(e) if e.is_contract_violation() => error!("Service contract violated: {}", e),
                _ => error!("Request failed: {}", self),
            }
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
