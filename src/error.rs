//! Error types for sealradio.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Result type alias for sealradio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sealradio.
///
/// Every handler returns this type, so each failure leaves the service as a
/// JSON `{"error": "..."}` body with a matching status code.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    InvalidInput(String),

    #[error("Upstream returned an empty response")]
    UpstreamEmptyResponse,

    #[error("Upstream returned a malformed response")]
    UpstreamMalformedResponse,

    /// The upstream API reported a failure, either through its status code or
    /// an explicit `error` object.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// The upstream call succeeded but produced no usable text.
    #[error("{0}")]
    UpstreamBlocked(String),

    #[error("{0}")]
    Internal(String),

    #[error("Upstream request failed: {0}")]
    Http(reqwest::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the request URL in its Display output
        Error::Http(err.without_url())
    }
}

impl Error {
    /// HTTP status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Upstream { status, .. } => *status,
            Error::UpstreamEmptyResponse
            | Error::UpstreamMalformedResponse
            | Error::UpstreamBlocked(_)
            | Error::Internal(_)
            | Error::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
