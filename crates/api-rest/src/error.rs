//! Error-to-response mapping for the REST API.

use api_shared::ErrorRes;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ddx_core::DdxError;

/// Errors a handler can return. Every variant renders as an [`ErrorRes`] body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    /// The request body was not valid JSON or did not match the request schema.
    #[error("{message}")]
    Payload { status: StatusCode, message: String },
    #[error("unknown symptom(s): {}", .0.join(", "))]
    UnknownSymptoms(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<DdxError> for ApiError {
    fn from(err: DdxError) -> Self {
        match err {
            DdxError::UnknownSymptom(e) => ApiError::UnknownSymptoms(e.keys),
            DdxError::InvalidInput(message) => ApiError::BadRequest(message),
            DdxError::Dataset(e) => ApiError::Internal(e.to_string()),
            DdxError::Scoring(message) => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Payload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Payload { status, .. } => *status,
            ApiError::UnknownSymptoms(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(detail) => {
                tracing::error!(detail, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_client_error() {
            tracing::warn!(%status, error = %self, "request rejected");
        }

        let body = match self {
            ApiError::Internal(_) => ErrorRes::new("internal error"),
            ApiError::UnknownSymptoms(keys) => {
                let message = format!("unknown symptom(s): {}", keys.join(", "));
                ErrorRes {
                    unknown_symptoms: keys,
                    ..ErrorRes::new(message)
                }
            }
            other => ErrorRes::new(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
