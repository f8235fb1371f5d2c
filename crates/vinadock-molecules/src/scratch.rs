//! Per-run scratch directory.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

const PREFIX: &str = "vinadock-";

/// Exclusively owned working directory for one docking run.
///
/// The directory and everything in it is removed when the value is dropped,
/// whichever way the run ends.
pub struct ScratchArea {
    dir: TempDir,
}

impl ScratchArea {
    /// Create a fresh directory under `base`, or the system temp dir.
    pub fn acquire(base: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match base {
            Some(base) => builder.tempdir_in(base)?,
            None => builder.tempdir()?,
        };
        debug!("Acquired scratch area {:?}", dir.path());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        debug!("Releasing scratch area {:?}", self.dir.path());
    }
}
