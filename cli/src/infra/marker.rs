//! PID-named run markers.
//!
//! A marker's existence is its only state. Markers are created once per run
//! and never removed by this tool; there is no locking.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

/// Marker for one process id inside the work directory.
#[derive(Debug, Clone)]
pub struct RunMarker {
    dir: PathBuf,
    pid: u32,
}

impl RunMarker {
    /// Marker for the current process.
    #[must_use]
    pub fn current(dir: &Path) -> Self {
        Self::with_pid(dir, std::process::id())
    }

    /// Marker for an arbitrary process id.
    #[must_use]
    pub fn with_pid(dir: &Path, pid: u32) -> Self {
        Self {
            dir: dir.to_path_buf(),
            pid,
        }
    }

    #[must_use]
    pub fn pid(&self) -> u32 {
        self.pid
    }

    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.pid", self.pid))
    }

    /// Write the marker (pid and start time), creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn create_file(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating directory {}", self.dir.display()))?;
        let path = self.path();
        let content = format!("{}\n{}\n", self.pid, Utc::now().to_rfc3339());
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))
    }

    #[must_use]
    pub fn is_file_exists(&self) -> bool {
        self.path().is_file()
    }
}
