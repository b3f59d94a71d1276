//! `POST /process-video` – convert a remote video by URL.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;
use vidshift_core::{ArtifactName, MediaSource, OutputFormat, TranscodeJob};

use crate::error::ServerError;
use crate::routes::delivery;
use crate::schemas::video::ProcessVideoRequest;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(process_video), components(schemas(ProcessVideoRequest)))]
pub struct ProcessApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/process-video", post(process_video))
}

/// Convert a remote video to the requested format (`POST /process-video`).
///
/// The transcoder reads `url` directly; nothing is downloaded beforehand.
/// `format` must be one of the supported containers and only selects the
/// muxer and the file extension, never a path.
#[utoipa::path(
    post,
    path = "/process-video",
    tag = "video",
    request_body = ProcessVideoRequest,
    responses(
        (status = 200, description = "Converted file as attachment `video.<format>`"),
        (status = 400, description = "Malformed body, invalid url or unsupported format"),
        (status = 500, description = "Error processing video"),
        (status = 503, description = "All transcoder slots busy"),
    )
)]
pub async fn process_video(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProcessVideoRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = payload.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let format: OutputFormat = req.format.parse().map_err(|_| {
        ServerError::BadRequest(format!(
            "unsupported format '{}'; must be one of: {}",
            req.format,
            OutputFormat::supported_list()
        ))
    })?;
    let source =
        MediaSource::remote(&req.url).map_err(|e| ServerError::BadRequest(e.to_string()))?;

    let permit = state.admission.try_acquire()?;
    let name = ArtifactName::generate();
    // Claimed before the transcoder runs so a partial file is removed on failure.
    let output = state.workspace.output(&name, format);
    let job = TranscodeJob::new(source, output.path(), format);
    let report = state.transcoder.transcode(&job).await?;
    drop(permit);

    info!(
        artifact = %name,
        source = %job.source,
        format = %format,
        output_bytes = report.output_bytes,
        elapsed_ms = report.elapsed.as_millis(),
        "remote video converted"
    );

    let filename = format!("video.{}", format.extension());
    delivery::attachment(output, None, format, &filename).await
}
