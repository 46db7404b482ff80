use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use clearcost_core::errors::{DatabaseError, Error as CoreError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match &self {
            ApiError::Core(e) => match e {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION", e.to_string()),
                // No current rate and nothing stored to fall back on: the
                // caller should know this is the upstream, not us.
                CoreError::RatesUnavailable { .. } => {
                    (StatusCode::SERVICE_UNAVAILABLE, "RATES_UNAVAILABLE", e.to_string())
                }
                CoreError::Database(DatabaseError::NotFound(_)) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string())
                }
                CoreError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", e.to_string())
                }
            },
            ApiError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "VALIDATION", reason.clone()),
            ApiError::Anyhow(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", self.to_string())
            }
        };
        let body = Json(ErrorBody { code, message: msg });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
