//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for vidshift-server.
///
/// Every field has a default so the server works out-of-the-box without any
/// environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// When set, logs go to a daily-rotated file in this directory instead
    /// of stdout.
    pub log_dir: Option<PathBuf>,

    /// Staging directory for uploaded inputs (default: `uploads`).
    pub upload_dir: PathBuf,

    /// Directory for transcoder outputs (default: `processed`).
    pub output_dir: PathBuf,

    /// Directory served as static files for unmatched GET paths.
    pub public_dir: PathBuf,

    /// Explicit ffmpeg binary; `None` lets ffmpeg-sidecar resolve it.
    pub ffmpeg_path: Option<PathBuf>,

    /// Download a static ffmpeg build at startup if none is found.
    pub ffmpeg_auto_download: bool,

    /// Maximum number of transcoder processes running at once.
    pub max_concurrent_jobs: usize,

    /// Per-job deadline; `None` waits indefinitely.
    pub transcode_timeout: Option<Duration>,

    /// Request body limit for uploads, in bytes.
    pub max_upload_bytes: usize,

    /// Comma-separated CORS origin allow-list; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_docs: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let timeout_secs: u64 = parse_env("VIDSHIFT_TRANSCODE_TIMEOUT_SECS", 600);
        let max_upload_mb: usize = parse_env("VIDSHIFT_MAX_UPLOAD_SIZE_MB", 1024);
        Self {
            bind_address: env_or("VIDSHIFT_BIND", "0.0.0.0:3000"),
            log_level: env_or("VIDSHIFT_LOG", "info"),
            log_json: env_flag("VIDSHIFT_LOG_JSON", false),
            log_dir: env_opt("VIDSHIFT_LOG_DIR").map(PathBuf::from),
            upload_dir: env_or("VIDSHIFT_UPLOAD_DIR", "uploads").into(),
            output_dir: env_or("VIDSHIFT_OUTPUT_DIR", "processed").into(),
            public_dir: env_or("VIDSHIFT_PUBLIC_DIR", "public").into(),
            ffmpeg_path: env_opt("VIDSHIFT_FFMPEG").map(PathBuf::from),
            ffmpeg_auto_download: env_flag("VIDSHIFT_FFMPEG_AUTO_DOWNLOAD", false),
            max_concurrent_jobs: parse_env("VIDSHIFT_MAX_CONCURRENT_JOBS", 4).max(1),
            transcode_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            max_upload_bytes: max_upload_mb.saturating_mul(1024 * 1024),
            cors_allowed_origins: env_opt("VIDSHIFT_CORS_ORIGINS"),
            enable_docs: env_flag("VIDSHIFT_ENABLE_DOCS", true),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".into(),
            log_level: "info".into(),
            log_json: false,
            log_dir: None,
            upload_dir: "uploads".into(),
            output_dir: "processed".into(),
            public_dir: "public".into(),
            ffmpeg_path: None,
            ffmpeg_auto_download: false,
            max_concurrent_jobs: 4,
            transcode_timeout: Some(Duration::from_secs(600)),
            max_upload_bytes: 1024 * 1024 * 1024,
            cors_allowed_origins: None,
            enable_docs: true,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
