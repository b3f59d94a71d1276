//! Streaming a finished artifact back to the caller.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use futures::{StreamExt, TryStreamExt};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};
use vidshift_core::{Artifact, OutputFormat};

use crate::error::ServerError;

/// Build a `200` attachment response streaming `output`.
///
/// `output` and every guard in `also_remove` are moved into the response
/// body, so the files are deleted once the body has been fully sent, or as
/// soon as the connection drops mid-transfer.
pub async fn attachment(
    output: Artifact,
    also_remove: Option<Artifact>,
    format: OutputFormat,
    filename: &str,
) -> Result<Response, ServerError> {
    let file = File::open(output.path()).await?;
    let len = file.metadata().await?.len();
    debug!(path = %output.path().display(), len, "delivering output");

    let path = output.path().display().to_string();
    let guards = (output, also_remove);
    let stream = ReaderStream::new(file)
        .inspect_err(move |e| error!(path = %path, error = %e, "delivery failed mid-stream"))
        .map(move |chunk| {
            let _ = &guards;
            chunk
        });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.mime_type())
        .header(header::CONTENT_LENGTH, len)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ServerError::Internal(format!("failed to build response: {e}")))
}
