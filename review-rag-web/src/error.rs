use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use review_rag::ReviewRagError;
use thiserror::Error;
use tracing::error;

use crate::protocol::ErrorResponse;

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Service(#[from] ReviewRagError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) if err.is_caller_error() => StatusCode::BAD_REQUEST,
            ApiError::Service(ReviewRagError::EmptyIndex) => StatusCode::CONFLICT,
            ApiError::Service(err) if err.is_external() => StatusCode::BAD_GATEWAY,
            ApiError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_error_kinds_to_statuses() {
        let cases = [
            (ApiError::BadRequest("No file selected".into()), StatusCode::BAD_REQUEST),
            (ReviewRagError::UnsupportedFormat(".txt".into()).into(), StatusCode::BAD_REQUEST),
            (
                ReviewRagError::UnknownMode { mode: "bogus".into(), valid: vec![] }.into(),
                StatusCode::BAD_REQUEST,
            ),
            (ReviewRagError::EmptyIndex.into(), StatusCode::CONFLICT),
            (
                ReviewRagError::GenerationError { provider: "Ollama".into(), message: "down".into() }
                    .into(),
                StatusCode::BAD_GATEWAY,
            ),
            (ReviewRagError::PipelineError("boom".into()).into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status(), status, "{err}");
        }
    }
}
