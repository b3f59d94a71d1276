//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use vidshift_core::{Transcoder, Workspace};

use crate::config::Config;
use crate::error::ServerError;

/// Bounds the number of transcoder processes running at once.
///
/// Each in-flight job holds a [`OwnedSemaphorePermit`]; dropping it frees the
/// slot. When every slot is taken new jobs are refused rather than queued.
#[derive(Debug)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl Admission {
    pub fn new(capacity: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn try_acquire(&self) -> Result<OwnedSemaphorePermit, ServerError> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .map_err(|_| ServerError::Busy(self.capacity))
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Staging and output directories.
    pub workspace: Arc<Workspace>,
    /// The external conversion tool.
    pub transcoder: Arc<dyn Transcoder>,
    /// Concurrency cap on transcoder processes.
    pub admission: Arc<Admission>,
}

impl AppState {
    pub fn new(config: Config, transcoder: Arc<dyn Transcoder>) -> Self {
        let workspace = Workspace::new(&config.upload_dir, &config.output_dir);
        let admission = Admission::new(config.max_concurrent_jobs);
        Self {
            config: Arc::new(config),
            workspace: Arc::new(workspace),
            transcoder,
            admission: Arc::new(admission),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn permits_are_bounded_and_released() {
        let admission = Admission::new(2);
        let p1 = admission.try_acquire().expect("first permit");
        let _p2 = admission.try_acquire().expect("second permit");
        assert!(matches!(admission.try_acquire(), Err(ServerError::Busy(2))));
        drop(p1);
        assert_eq!(admission.available(), 1);
        let _p3 = admission.try_acquire().expect("permit after release");
    }
}
