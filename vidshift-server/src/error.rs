//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`], so errors become a plain-text HTTP
//! response with an appropriate status code.
//!
//! **Security note:** transcoder and I/O errors are logged with full detail
//! (including ffmpeg's stderr) but only a generic message is returned to the
//! caller, so file paths and tool output never leak to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;
use vidshift_core::TranscodeError;

/// Body returned for every failed conversion.
pub const TRANSCODE_FAILED_MESSAGE: &str = "Error processing video";

/// All errors that can occur in the vidshift-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The external transcoder failed, timed out, or could not be started.
    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),

    /// Staging the upload or delivering the output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The upload exceeded the configured body limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// All transcoder slots are in use.
    #[error("server busy: {0} transcodes already running")]
    Busy(usize),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            // Client-facing errors: expose the message directly.
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ServerError::PayloadTooLarge(m) => (StatusCode::PAYLOAD_TOO_LARGE, m.clone()),
            ServerError::Busy(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "server busy, try again later".to_owned(),
            ),

            // Internal errors: log the full detail, return a generic message.
            ServerError::Transcode(e) => {
                error!(error = %e, "transcode failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    TRANSCODE_FAILED_MESSAGE.to_owned(),
                )
            }
            ServerError::Io(e) => {
                error!(error = %e, "io error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_owned(),
                )
            }
        };
        (status, client_message).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(e: anyhow::Error) -> Self {
        // Keep the full chain in the logs; clients only see a generic message.
        error!(error = ?e, "converting anyhow error to ServerError::Internal");
        ServerError::Internal(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn transcode_error_hides_stderr() {
        let err = ServerError::from(TranscodeError::Exited {
            code: Some(1),
            stderr: "/srv/uploads/123: Invalid data found".into(),
        });
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(resp).await, TRANSCODE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn bad_request_exposes_message() {
        let resp = ServerError::BadRequest("missing `video` file field".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "missing `video` file field");
    }

    #[tokio::test]
    async fn payload_too_large_is_413() {
        let resp = ServerError::PayloadTooLarge("length limit exceeded".into()).into_response();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_text(resp).await, "length limit exceeded");
    }

    #[tokio::test]
    async fn busy_is_service_unavailable() {
        let resp = ServerError::Busy(4).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn io_and_anyhow_are_generic_500s() {
        let io = ServerError::from(std::io::Error::other("disk full")).into_response();
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(io).await, "internal server error");

        let any = ServerError::from(anyhow::anyhow!("boom")).into_response();
        assert_eq!(any.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
