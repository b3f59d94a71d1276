//! `POST /upload` – convert an uploaded video to MP4.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::Router;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use utoipa::OpenApi;
use vidshift_core::{Artifact, ArtifactName, MediaSource, OutputFormat, TranscodeJob};

use crate::error::ServerError;
use crate::routes::delivery;
use crate::schemas::video::VideoUpload;
use crate::state::AppState;

/// Multipart field carrying the file.
pub const VIDEO_FIELD: &str = "video";

/// Uploads are always converted to this container.
const UPLOAD_FORMAT: OutputFormat = OutputFormat::Mp4;

#[derive(OpenApi)]
#[openapi(paths(upload), components(schemas(VideoUpload)))]
pub struct UploadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload))
}

/// Convert an uploaded video to MP4 (`POST /upload`).
///
/// The `video` part is streamed to the staging directory under a generated
/// name, converted by the transcoder, and the result is returned as an
/// attachment. Both files are deleted once the response body is done, and
/// immediately on any failure.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "video",
    request_body(content = VideoUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Converted MP4 file as attachment"),
        (status = 400, description = "Missing or unexpected multipart field"),
        (status = 413, description = "Upload exceeds the body limit"),
        (status = 500, description = "Error processing video"),
        (status = 503, description = "All transcoder slots busy"),
    )
)]
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Response, ServerError> {
    // Taken before any bytes are staged so a busy server refuses the upload
    // instead of writing it to disk first.
    let permit = state.admission.try_acquire()?;
    let name = ArtifactName::generate();
    let mut staged: Option<Artifact> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or_default().to_owned();
        let is_file = field.file_name().is_some();
        if field_name != VIDEO_FIELD || !is_file {
            if is_file {
                return Err(ServerError::BadRequest(format!(
                    "Unexpected field `{field_name}`"
                )));
            }
            // Plain form values are ignored, including a text `video` value.
            continue;
        }
        if staged.is_some() {
            return Err(ServerError::BadRequest(format!(
                "only one `{VIDEO_FIELD}` file may be uploaded"
            )));
        }

        let (artifact, mut file) = state.workspace.stage(&name).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(
            artifact = %name,
            file_name = field.file_name().unwrap_or("-"),
            content_type = field.content_type().unwrap_or("-"),
            size_bytes = written,
            "staged upload"
        );
        staged = Some(artifact);
    }

    let input = staged.ok_or_else(|| {
        ServerError::BadRequest(format!("missing `{VIDEO_FIELD}` file field"))
    })?;

    let output = state.workspace.output(&name, UPLOAD_FORMAT);
    let job = TranscodeJob::new(
        MediaSource::File(input.path().to_path_buf()),
        output.path(),
        UPLOAD_FORMAT,
    );
    let report = state.transcoder.transcode(&job).await?;
    drop(permit);

    info!(
        artifact = %name,
        output_bytes = report.output_bytes,
        elapsed_ms = report.elapsed.as_millis(),
        "upload converted"
    );

    let filename = format!("{name}.{}", UPLOAD_FORMAT.extension());
    delivery::attachment(output, Some(input), UPLOAD_FORMAT, &filename).await
}

fn multipart_error(e: MultipartError) -> ServerError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge(e.body_text())
    } else {
        ServerError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}
