//! Temporary files scoped to a single generation attempt.
//!
//! Every attempt owns exactly two [`TempArtifact`]s (staged input, engine
//! output). A [`Reaper`] holds them and deletes both when the attempt ends,
//! whether it succeeded, failed or unwound. Deletion errors are housekeeping
//! and never reach the user.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// A uniquely named temporary file.
///
/// Names come from `tempfile`, so concurrent attempts in one or many
/// processes never collide.
#[derive(Debug)]
pub struct TempArtifact {
    path: TempPath,
}

impl TempArtifact {
    /// Create an empty temporary file in `dir`.
    pub fn create(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Create a temporary file in `dir` holding `bytes`.
    pub fn with_contents(dir: &Path, prefix: &str, suffix: &str, bytes: &[u8]) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(suffix)
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn remove(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Deletes the artifacts of one attempt when reaped or dropped.
#[derive(Debug, Default)]
pub struct Reaper {
    artifacts: Vec<TempArtifact>,
}

impl Reaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `artifact` and return its path.
    pub fn track(&mut self, artifact: TempArtifact) -> PathBuf {
        let path = artifact.path().to_path_buf();
        self.artifacts.push(artifact);
        path
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Delete every tracked artifact now.
    pub fn reap(mut self) {
        self.reap_all();
    }

    fn reap_all(&mut self) {
        for artifact in self.artifacts.drain(..) {
            let path = artifact.path().to_path_buf();
            match artifact.remove() {
                Ok(()) => log::debug!("Removed {}", path.display()),
                Err(e) => log::debug!("Ignoring cleanup failure for {}: {e}", path.display()),
            }
        }
    }
}

impl Drop for Reaper {
    fn drop(&mut self) {
        self.reap_all();
    }
}
