//! Per-job scratch directories.
//!
//! A [`Workspace`] owns `<root>/<job id>/` for the lifetime of one
//! conversion. The directory is removed when the workspace is released or
//! dropped, so every exit path (success, error, unwinding panic) cleans up.

use std::io;
use std::path::{Path, PathBuf};

use stickerforge_core::{Error, JobId, Result};
use tempfile::TempDir;

/// Scratch directory exclusively owned by one conversion job.
///
/// # Example
///
/// ```no_run
/// use stickerforge_av::Workspace;
/// use stickerforge_core::JobId;
///
/// let ws = Workspace::acquire("downloads".as_ref(), &JobId::from(42_i64))?;
/// std::fs::write(ws.file("input.webm"), b"...")?;
/// // ... run tools against ws.file("input.webm") ...
/// ws.release();
/// # Ok::<(), stickerforge_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Workspace {
    job_id: JobId,
    temp_dir: TempDir,
}

impl Workspace {
    /// Create `<root>/<job_id>/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Workspace`] if the directory cannot be created or
    /// already exists (another in-flight job holds the same id, or a killed
    /// run left it behind).
    pub fn acquire(root: &Path, job_id: &JobId) -> Result<Self> {
        std::fs::create_dir_all(root).map_err(|e| {
            Error::workspace(format!(
                "failed to create scratch root {}: {e}",
                root.display()
            ))
        })?;

        // No random suffix: the directory name is exactly the job id.
        let temp_dir = tempfile::Builder::new()
            .prefix(job_id.as_str())
            .rand_bytes(0)
            .tempdir_in(root)
            .map_err(|e| {
                let dir = root.join(job_id.as_str());
                if e.kind() == io::ErrorKind::AlreadyExists {
                    Error::workspace(format!(
                        "scratch directory {} for job {job_id} exists (in-flight job or stale leftover)",
                        dir.display()
                    ))
                } else {
                    Error::workspace(format!(
                        "failed to create scratch directory {}: {e}",
                        dir.display()
                    ))
                }
            })?;

        tracing::trace!(job = %job_id, dir = %temp_dir.path().display(), "acquired workspace");

        Ok(Self {
            job_id: job_id.clone(),
            temp_dir,
        })
    }

    /// The job this workspace belongs to.
    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    /// Path to the scratch directory.
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a named file inside the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir().join(name)
    }

    /// Write `data` to a named file inside the workspace and return its path.
    pub fn write(&self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.file(name);
        std::fs::write(&path, data)?;
        Ok(path)
    }

    /// Read a named file from the workspace.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.file(name))?)
    }

    /// Remove the directory now.
    ///
    /// Removal failures are logged, never returned: a conversion that
    /// already produced its bytes must not fail because of cleanup.
    /// Dropping the workspace removes the directory the same way, silently.
    pub fn release(self) {
        let Self { job_id, temp_dir } = self;
        let dir = temp_dir.path().to_path_buf();
        match temp_dir.close() {
            Ok(()) => {
                tracing::trace!(job = %job_id, "released workspace");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    job = %job_id,
                    dir = %dir.display(),
                    "failed to remove scratch directory: {e}"
                );
            }
        }
    }
}
