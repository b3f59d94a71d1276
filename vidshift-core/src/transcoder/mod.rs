//! The transcoder seam.
//!
//! Request handlers never spawn processes themselves; they hand a
//! [`TranscodeJob`] to a [`Transcoder`]. Production uses
//! [`FfmpegTranscoder`]; tests substitute their own implementation.

mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::error::TranscodeError;
use crate::format::OutputFormat;

/// Where the transcoder reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A staged local file.
    File(PathBuf),
    /// A remote http(s) resource fetched by the transcoder itself.
    Remote(Url),
}

impl MediaSource {
    /// Parse a caller-supplied URL, accepting only absolute `http`/`https`.
    pub fn remote(raw: &str) -> Result<Self, TranscodeError> {
        let invalid = |reason: String| TranscodeError::InvalidSource {
            url: raw.to_owned(),
            reason,
        };
        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(invalid(format!("unsupported scheme '{other}'"))),
        }
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("missing host".into()));
        }
        Ok(MediaSource::Remote(url))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Remote(_))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::File(p) => write!(f, "{}", p.display()),
            MediaSource::Remote(u) => f.write_str(u.as_str()),
        }
    }
}

/// One conversion request: read `source`, write `output` as `format`.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub source: MediaSource,
    pub output: PathBuf,
    pub format: OutputFormat,
}

impl TranscodeJob {
    pub fn new(source: MediaSource, output: impl AsRef<Path>, format: OutputFormat) -> Self {
        Self {
            source,
            output: output.as_ref().to_path_buf(),
            format,
        }
    }
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone)]
pub struct TranscodeReport {
    /// Size of the produced file in bytes.
    pub output_bytes: u64,
    pub elapsed: Duration,
}

#[async_trait]
pub trait Transcoder: Send + Sync + fmt::Debug {
    /// Run one conversion to completion.
    ///
    /// Implementations must not leave a running process behind when the
    /// returned future is dropped.
    async fn transcode(&self, job: &TranscodeJob) -> Result<TranscodeReport, TranscodeError>;

    /// Human-readable description of the underlying tool, for health output.
    fn describe(&self) -> String;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(MediaSource::remote("http://example.com/a.mp4").is_ok());
        assert!(MediaSource::remote("https://cdn.example.com/v/clip.mov?x=1").is_ok());
    }

    #[test]
    fn rejects_local_and_exotic_schemes() {
        for bad in [
            "file:///etc/passwd",
            "concat:/a|/b",
            "/abs/path.mp4",
            "relative.mp4",
            "ftp://example.com/a.mp4",
            "-i",
            "",
        ] {
            let err = MediaSource::remote(bad).unwrap_err();
            assert!(
                matches!(err, TranscodeError::InvalidSource { .. }),
                "{bad:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn display_shows_url_or_path() {
        let remote = MediaSource::remote("https://example.com/v.mp4").unwrap();
        assert_eq!(remote.to_string(), "https://example.com/v.mp4");
        assert!(remote.is_remote());

        let local = MediaSource::File(PathBuf::from("uploads/abc"));
        assert_eq!(local.to_string(), "uploads/abc");
        assert!(!local.is_remote());
    }
}
