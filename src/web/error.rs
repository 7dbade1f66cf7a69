//! Maps service errors onto HTTP responses.

use crate::core::error::ServiceError;
use crate::core::rates::RateError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Error returned by handlers. The variant picks the body shape:
/// `{"error": "..."}` or, for input errors, `{"errors": {"field": "..."}}`.
#[derive(Debug)]
pub enum ApiError {
    Message(ServiceError),
    Fields(ServiceError),
}

impl ApiError {
    /// Single-message error for a body that did not deserialize.
    pub fn message_for_body(rejection: JsonRejection) -> Self {
        Self::Message(invalid_body(rejection))
    }

    /// Field-keyed error for a body that did not deserialize.
    pub fn fields_for_body(rejection: JsonRejection) -> Self {
        Self::Fields(invalid_body(rejection))
    }

    fn inner(&self) -> &ServiceError {
        match self {
            Self::Message(err) | Self::Fields(err) => err,
        }
    }
}

fn invalid_body(rejection: JsonRejection) -> ServiceError {
    ServiceError::InvalidBody(rejection.body_text())
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Rates(_) => StatusCode::BAD_GATEWAY,
        ServiceError::OrderNotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn public_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Rates(RateError::UpstreamUnavailable(_)) => {
            "Exchange rates are unavailable, try again later.".to_string()
        }
        ServiceError::Rates(RateError::Format(_)) => {
            "Exchange rates could not be read, try again later.".to_string()
        }
        // Don't expose internal error details to clients
        ServiceError::Storage(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.inner();
        let status = status_for(err);

        if status.is_server_error() {
            tracing::error!(error = %err, "Request error");
        } else {
            tracing::debug!(error = %err, "Rejected request");
        }

        let body = match (&self, err.to_validation_errors()) {
            (Self::Fields(_), Some(errors)) => json!({ "errors": errors.into_inner() }),
            _ => json!({ "error": public_message(err) }),
        };

        (status, Json(body)).into_response()
    }
}
