use crate::errors::{JobError, Result};
use crate::types::JobId;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Subdirectory the model tool scans for input assets.
pub const IMAGES_DIR: &str = "images";
/// Fixed name of the artifact the model tool is asked to write.
pub const ARTIFACT_NAME: &str = "predictions.json";

/// An isolated, job-scoped directory tree.
///
/// `release` removes the tree and reports failures through the log. If a `Workspace` is dropped
/// without being released (the job future was cancelled, or something panicked) the tree is
/// still removed, just silently.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    images_dir: PathBuf,
}

impl Workspace {
    /// Create `<root>/job-<id>-<random>/images`.
    pub fn acquire(root: &Path, job_id: JobId) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("job-{}-", job_id.to_simple()))
            .tempdir_in(root)
            .map_err(JobError::Workspace)?;
        let images_dir = dir.path().join(IMAGES_DIR);
        // on error `dir` drops here and takes the half-built tree with it
        fs::create_dir(&images_dir).map_err(JobError::Workspace)?;
        debug!(workspace = %dir.path().display(), "acquired job workspace");
        Ok(Self { dir, images_dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.dir.path().join(ARTIFACT_NAME)
    }

    /// Materialize an input asset inside `images/`.
    pub async fn write_asset(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.images_dir.join(name);
        tokio::fs::write(&path, contents)
            .await
            .map_err(JobError::Workspace)?;
        Ok(path)
    }

    /// Recursively remove the workspace. Never fails the job, a removal error is only logged.
    pub fn release(self) {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => debug!(workspace = %path.display(), "released job workspace"),
            Err(err) => warn!(
                workspace = %path.display(),
                error = %err,
                "failed to remove job workspace"
            ),
        }
    }
}
