use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Changes the process working directory and changes it back when dropped.
///
/// The working directory is shared by the whole process, so the guard must be
/// held for as short a scope as possible.
#[derive(Debug)]
pub struct WorkingDirGuard {
    previous: PathBuf,
}

impl WorkingDirGuard {
    pub fn enter<P: AsRef<Path>>(dir: P) -> Result<WorkingDirGuard> {
        let dir = dir.as_ref();
        let previous =
            std::env::current_dir().with_context(|| "Failed to read the working directory")?;
        std::env::set_current_dir(dir)
            .with_context(|| format!("Failed to change directory to {}", dir.display()))?;
        log::debug!("working in {}", dir.display());
        Ok(WorkingDirGuard { previous })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            log::error!(
                "failed to restore working directory {}: {e}",
                self.previous.display()
            );
        }
    }
}

/// Held by every test that changes the working directory.
#[cfg(test)]
pub(crate) static CWD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
