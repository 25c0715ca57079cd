//! Per-job scratch space on the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::TempDir;
use tracing::{debug, warn};

/// A temporary directory owned by exactly one job.
///
/// Everything written through it is removed when the area is dropped, on
/// every exit path. Removal failures are logged and otherwise ignored.
pub struct StagingArea {
    dir: Option<TempDir>,
}

impl StagingArea {
    pub fn create(root: &Path, job_id: &str) -> io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id))
            .tempdir_in(root)?;

        debug!(path = %dir.path().display(), "Staging area created");
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// Path for a staged file named `name` inside the area.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    pub async fn write(&self, name: &str, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.file(name);
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }

    pub async fn read(&self, name: &str) -> io::Result<Bytes> {
        tokio::fs::read(self.file(name)).await.map(Bytes::from)
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "Staging area released"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to release staging area"),
            }
        }
    }
}
