use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{MediaSource, TranscodeJob, TranscodeReport, Transcoder};
use crate::error::TranscodeError;

/// Protocols ffmpeg may open when reading a remote source. Keeps a
/// caller-supplied URL from reaching `file:` or `concat:` through redirects
/// or playlists.
const REMOTE_PROTOCOLS: &str = "http,https,tcp,tls,crypto";

/// Bytes of stderr kept for error reports.
const STDERR_TAIL_BYTES: usize = 4096;

/// Runs the external `ffmpeg` binary, one process per job.
#[derive(Debug, Clone)]
pub struct FfmpegTranscoder {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kill the process and fail the job if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// ffmpeg path as resolved by `ffmpeg-sidecar`: the sidecar binary
    /// next to the executable if present, otherwise `ffmpeg` on `PATH`.
    pub fn default_program() -> PathBuf {
        ffmpeg_sidecar::paths::ffmpeg_path()
    }

    /// Download a static ffmpeg build next to the executable if none is
    /// installed. Blocking; call from `spawn_blocking`.
    pub fn auto_download() -> Result<(), TranscodeError> {
        ffmpeg_sidecar::download::auto_download()
            .map_err(|e| TranscodeError::Download { source: e.into() })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// First line of `ffmpeg -version`.
    pub async fn version(&self) -> Result<String, TranscodeError> {
        let output = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| self.spawn_error(source))?;
        if !output.status.success() {
            return Err(TranscodeError::Exited {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
            .to_owned())
    }

    /// Full argument vector for `job`.
    pub fn args(job: &TranscodeJob) -> Vec<OsString> {
        // -nostats: progress lines would otherwise fill the piped stderr
        // for the whole run.
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-nostats", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();

        match &job.source {
            MediaSource::Remote(url) => {
                args.push("-protocol_whitelist".into());
                args.push(REMOTE_PROTOCOLS.into());
                args.push("-i".into());
                args.push(url.as_str().into());
            }
            MediaSource::File(path) => {
                args.push("-i".into());
                args.push(path.as_os_str().to_owned());
            }
        }

        if job.format.supports_faststart() {
            args.push("-movflags".into());
            args.push("+faststart".into());
        }
        // Explicit muxer so the output extension never decides the format.
        args.push("-f".into());
        args.push(job.format.muxer().into());
        args.push(job.output.as_os_str().to_owned());
        args
    }

    fn spawn_error(&self, source: std::io::Error) -> TranscodeError {
        TranscodeError::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, job: &TranscodeJob) -> Result<TranscodeReport, TranscodeError> {
        let started = Instant::now();
        let args = Self::args(job);
        debug!(program = %self.program.display(), ?args, "spawning ffmpeg");

        // kill_on_drop: a dropped request future (client gone, timeout)
        // takes the process down with it.
        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.spawn_error(source))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(res) => res?,
                Err(_) => {
                    warn!(source = %job.source, timeout_s = limit.as_secs(), "ffmpeg timed out; killed");
                    return Err(TranscodeError::TimedOut { after: limit });
                }
            },
            None => child.wait_with_output().await?,
        };

        if !output.status.success() {
            return Err(TranscodeError::Exited {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let output_bytes = match tokio::fs::metadata(&job.output).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => {
                return Err(TranscodeError::MissingOutput {
                    path: job.output.clone(),
                });
            }
        };

        let elapsed = started.elapsed();
        info!(
            source = %job.source,
            output = %job.output.display(),
            format = %job.format,
            output_bytes,
            elapsed_ms = elapsed.as_millis(),
            "ffmpeg conversion succeeded"
        );
        Ok(TranscodeReport {
            output_bytes,
            elapsed,
        })
    }

    fn describe(&self) -> String {
        format!("ffmpeg ({})", self.program.display())
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_owned()
}
