//! HTTP mapping for service errors.
//!
//! [`ApiError`] lets handlers return `Result<_, ApiError>` and rely on `?`.
//! Each case maps to a status code and a plain-text body:
//!
//! - `NotFound` and unparsable ids → `404 Not Found`
//! - `InvalidInput` → `400 Bad Request`
//! - `ServiceShutdown` → `503 Service Unavailable`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hashd::Error;

#[derive(Debug)]
pub enum ApiError {
    /// A failure reported by the digest service.
    Service(Error),
    /// The path segment is not a valid identifier. Reported like an unknown
    /// id.
    InvalidId(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self::Service(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(Error::NotFound { .. }) | Self::InvalidId(_) => StatusCode::NOT_FOUND,
            Self::Service(Error::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            Self::Service(Error::ServiceShutdown) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Service(err) => err.to_string(),
            Self::InvalidId(raw) => format!("id not found: {raw}"),
        };
        (status, format!("{body}\n")).into_response()
    }
}
