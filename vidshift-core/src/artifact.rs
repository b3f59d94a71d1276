//! Ephemeral request artifacts.
//!
//! A [`Workspace`] owns the staging (`uploads/`) and output (`processed/`)
//! directories shared by every request. Each file a request places there is
//! wrapped in an [`Artifact`], which deletes the file when dropped, so the
//! file lives exactly as long as the request (or the response body) that
//! holds the guard.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::{File, OpenOptions};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::format::OutputFormat;

/// Server-generated file stem: `<unix-millis>-<uuid>`.
///
/// Only ASCII digits, hex and one dash, so it is always a single path
/// component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactName(String);

impl ArtifactName {
    pub fn generate() -> Self {
        Self(format!(
            "{}-{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// RAII guard for a temporary file. The file is removed on drop.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    /// Take ownership of `path`, whether or not the file exists yet.
    ///
    /// Used for transcoder outputs so that a partially written file is
    /// removed along with the guard.
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file on disk, or `None` if it does not exist.
    pub async fn size(&self) -> Option<u64> {
        tokio::fs::metadata(&self.path).await.ok().map(|m| m.len())
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed artifact"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove artifact"
            ),
        }
    }
}

/// The staging and output directories.
#[derive(Debug, Clone)]
pub struct Workspace {
    uploads: PathBuf,
    processed: PathBuf,
}

impl Workspace {
    pub fn new(uploads: impl Into<PathBuf>, processed: impl Into<PathBuf>) -> Self {
        Self {
            uploads: uploads.into(),
            processed: processed.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed
    }

    /// Create both directories if they are missing.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads).await?;
        tokio::fs::create_dir_all(&self.processed).await?;
        Ok(())
    }

    /// Create a fresh staging file for `name` and return its guard together
    /// with a writable handle.
    ///
    /// The file is opened with `create_new`, so a name collision fails with
    /// [`io::ErrorKind::AlreadyExists`] instead of sharing a file between
    /// requests.
    pub async fn stage(&self, name: &ArtifactName) -> io::Result<(Artifact, File)> {
        let path = self.uploads.join(name.as_str());
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        Ok((Artifact::claim(path), file))
    }

    /// Reserve the output path for `name` in `format`.
    pub fn output(&self, name: &ArtifactName, format: OutputFormat) -> Artifact {
        Artifact::claim(
            self.processed
                .join(format!("{}.{}", name.as_str(), format.extension())),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn generated_names_are_unique_single_components() {
        let a = ArtifactName::generate();
        let b = ArtifactName::generate();
        assert_ne!(a, b);
        for name in [&a, &b] {
            assert!(!name.as_str().contains('/'));
            assert!(!name.as_str().contains('\\'));
            assert!(!name.as_str().starts_with('.'));
            assert_eq!(Path::new(name.as_str()).components().count(), 1);
        }
    }

    #[tokio::test]
    async fn staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("uploads"), dir.path().join("processed"));
        ws.ensure_dirs().await.unwrap();

        let name = ArtifactName::generate();
        let (artifact, mut file) = ws.stage(&name).await.unwrap();
        file.write_all(b"hello").await.unwrap();
        file.flush().await.unwrap();
        drop(file);

        let path = artifact.path().to_path_buf();
        assert_eq!(artifact.size().await, Some(5));
        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn staging_refuses_to_reuse_a_name() {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path().join("uploads"), dir.path().join("processed"));
        ws.ensure_dirs().await.unwrap();

        let name = ArtifactName::generate();
        let _first = ws.stage(&name).await.unwrap();
        let err = ws.stage(&name).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn output_path_uses_format_extension() {
        let ws = Workspace::new("uploads", "processed");
        let name = ArtifactName::generate();
        let out = ws.output(&name, OutputFormat::Webm);
        assert_eq!(
            out.path(),
            Path::new("processed").join(format!("{name}.webm"))
        );
        // Nothing was written, so dropping the guard is a no-op.
        assert_eq!(out.size().await, None);
    }
}
