use utoipa::OpenApi;

use crate::routes::{health, process, upload};

#[derive(OpenApi)]
#[openapi(info(
    title = "vidshift-server",
    description = "Upload or link a video and get it back transcoded",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(upload::UploadApi::openapi());
    root.merge(process::ProcessApi::openapi());
    root
}
