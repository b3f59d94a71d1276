use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of a single transcoder invocation.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The transcoder binary could not be started.
    #[error("failed to launch transcoder '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("transcoder exited with code {code:?}: {stderr}")]
    Exited { code: Option<i32>, stderr: String },

    /// The process did not finish before the configured deadline and was killed.
    #[error("transcoder timed out after {}s", after.as_secs())]
    TimedOut { after: Duration },

    /// Exit status was zero but no output file was written.
    #[error("transcoder reported success but '{}' was not produced", path.display())]
    MissingOutput { path: PathBuf },

    /// The source URL is not an absolute http(s) URL.
    #[error("invalid source url '{url}': {reason}")]
    InvalidSource { url: String, reason: String },

    /// Fetching a static ffmpeg build failed.
    #[error("ffmpeg download failed: {source}")]
    Download {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
