use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /process-video`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProcessVideoRequest {
    /// Absolute `http`/`https` URL the transcoder reads from.
    #[schema(example = "https://example.com/clip.mov")]
    pub url: String,
    /// Target container; one of mp4, webm, mkv, mov, avi, gif, mp3, wav, ogg, flac.
    #[schema(example = "webm")]
    pub format: String,
}

/// Multipart body of `POST /upload`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct VideoUpload {
    /// The video file to convert to MP4.
    #[schema(format = Binary, value_type = String)]
    pub video: Vec<u8>,
}
