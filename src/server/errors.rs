use std::any::Any;
use std::fmt::Display;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::telemetry::API_ERRORS_CNTR;

/// Failure kinds a handler can abort with. Each maps to one status code and
/// a fixed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("unprocessable")]
    Unprocessable,
    #[error("internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: u16,
    message: String,
}

impl ApiError {
    pub fn status(self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        API_ERRORS_CNTR
            .with_label_values(&[status.as_str()])
            .inc();
        let body = ErrorBody {
            success: false,
            error: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Picks the [`ApiError`] a failed store call turns into, logging the cause.
pub trait StoreResultExt<T> {
    fn or_abort(self, kind: ApiError) -> Result<T, ApiError>;

    fn or_unprocessable(self) -> Result<T, ApiError>
    where
        Self: Sized,
    {
        self.or_abort(ApiError::Unprocessable)
    }

    fn or_bad_request(self) -> Result<T, ApiError>
    where
        Self: Sized,
    {
        self.or_abort(ApiError::BadRequest)
    }

    fn or_internal(self) -> Result<T, ApiError>
    where
        Self: Sized,
    {
        self.or_abort(ApiError::Internal)
    }
}

impl<T, E: Display> StoreResultExt<T> for Result<T, E> {
    fn or_abort(self, kind: ApiError) -> Result<T, ApiError> {
        self.map_err(|err| {
            tracing::warn!("Request failed with {}: {}", kind.status(), err);
            kind
        })
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", details);
    ApiError::Internal.into_response()
}
