//! vidshift-core – the pieces of a transcode request that do not depend on
//! HTTP: output formats, temporary artifacts and the transcoder process.

mod artifact;
mod error;
mod format;
mod transcoder;

pub use artifact::{Artifact, ArtifactName, Workspace};
pub use error::TranscodeError;
pub use format::OutputFormat;
pub use transcoder::{FfmpegTranscoder, MediaSource, TranscodeJob, TranscodeReport, Transcoder};
