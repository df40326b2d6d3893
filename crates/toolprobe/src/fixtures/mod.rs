//! Input samples and generated outputs used by scenarios.
//!
//! Source samples are resolved, never created: they live under an asset root
//! supplied by the caller. Generated outputs are [`TempOutput`] guards that
//! delete their file when dropped, so a scenario that owns one releases it on
//! every exit path, including a failed check.

use crate::runner::{RunnerError, RunnerResult};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// The tool at `path` must exist and be runnable.
///
/// Returns the absolute path of the checked file. A bare relative name is
/// resolved against the working directory, never looked up on `PATH`, so the
/// file spawned later is the one checked here.
pub fn require_executable(path: &Path) -> RunnerResult<PathBuf> {
    let path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|err| RunnerError::io("failed to read working directory", err))?
            .join(path)
    };
    let metadata =
        std::fs::metadata(&path).map_err(|_| RunnerError::missing_path("tool", &path))?;
    if !metadata.is_file() || !is_executable(&metadata) {
        return Err(RunnerError::not_executable(&path));
    }
    Ok(path)
}

pub fn require_dir(path: &Path) -> RunnerResult<PathBuf> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        Err(RunnerError::missing_path("directory", path))
    }
}

pub fn require_file(path: &Path) -> RunnerResult<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(RunnerError::missing_path("sample", path))
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Directory that sample files are resolved against.
#[derive(Clone, Debug)]
pub struct AssetRoot {
    dir: PathBuf,
}

impl AssetRoot {
    /// Open an existing asset directory.
    pub fn open(dir: impl AsRef<Path>) -> RunnerResult<Self> {
        Ok(Self {
            dir: require_dir(dir.as_ref())?,
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of `relative` under the root; the file must already exist.
    pub fn sample(&self, relative: &str) -> RunnerResult<PathBuf> {
        require_file(&self.dir.join(relative))
    }
}

/// A uniquely named temporary file, removed when the guard is dropped.
///
/// The file exists (empty) as soon as it is allocated, so a tool writing to
/// it replaces a file the harness already owns.
#[derive(Debug)]
pub struct TempOutput {
    /// Taken on drop so removal errors can be logged.
    path: Option<TempPath>,
}

impl TempOutput {
    /// Allocate a temporary file ending in `extension` (e.g. `".exr"`).
    pub fn allocate(extension: &str) -> RunnerResult<Self> {
        let file = tempfile::Builder::new()
            .prefix("toolprobe-")
            .suffix(extension)
            .tempfile()
            .map_err(|err| RunnerError::io("failed to allocate temporary output", err))?;
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), "allocated temporary output");
        Ok(Self { path: Some(path) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Path as an argument string for a tool.
    #[must_use]
    pub fn arg(&self) -> String {
        self.path().display().to_string()
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();
        tracing::debug!(path = %shown, "deleting temporary output");
        if let Err(err) = path.close() {
            // NotFound when the tool already removed or renamed the file.
            tracing::warn!(path = %shown, error = %err, "failed to delete temporary output");
        }
    }
}
