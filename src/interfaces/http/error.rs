use crate::error::CheckoutError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON error body returned by every route.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub status: u16,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            error: error.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        let status = match &err {
            CheckoutError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CheckoutError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
            CheckoutError::UnknownVariant(_) | CheckoutError::UnknownTransaction(_) => {
                StatusCode::NOT_FOUND
            }
            CheckoutError::DuplicateTransaction(_) | CheckoutError::NotConfigured(_) => {
                StatusCode::CONFLICT
            }
            CheckoutError::MissingInput(_) | CheckoutError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, "request rejected");
        }
        Self::new(status, err.customer_message())
    }
}
