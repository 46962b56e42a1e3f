//! Run lock
//!
//! A lock file in the state directory marks an active run. The engine assumes
//! at most one run at a time, so any existing lock file stops the new run,
//! including one left behind by a crashed process: that case is reported as
//! stale and needs the operator to remove the file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::SyncError;

/// Contents of the lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub acquired_at: DateTime<Utc>,
}

/// Guard for the run lock; the file is removed on release or drop
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
    released: bool,
}

impl RunLock {
    /// Acquire the lock at `path`
    ///
    /// # Errors
    ///
    /// Returns `ConcurrentRun` if a lock file already exists, and
    /// `Persistence` if the lock file cannot be created.
    pub fn acquire(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = match OpenOptions::new().create_new(true).write(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(SyncError::ConcurrentRun(describe_held_lock(&path)));
            }
            Err(e) => {
                return Err(SyncError::Persistence(format!(
                    "Failed to create lock file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let info = LockInfo {
            pid: std::process::id(),
            acquired_at: Utc::now(),
        };
        let written = serde_json::to_string_pretty(&info)
            .map_err(SyncError::from)
            .and_then(|json| {
                file.write_all(json.as_bytes())?;
                file.sync_all()?;
                Ok(())
            });
        if let Err(e) = written {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        debug!(path = %path.display(), pid = info.pid, "Run lock acquired");
        Ok(Self {
            path,
            released: false,
        })
    }

    /// Release the lock explicitly, surfacing removal errors
    pub fn release(mut self) -> Result<(), SyncError> {
        self.released = true;
        fs::remove_file(&self.path)?;
        Ok(())
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), "Failed to remove run lock: {}", e);
            }
        }
    }
}

fn describe_held_lock(path: &Path) -> String {
    let holder = fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<LockInfo>(&contents).ok());

    match holder {
        Some(info) if pid_is_alive(info.pid) => format!(
            "lock {} held by pid {} since {}",
            path.display(),
            info.pid,
            info.acquired_at.to_rfc3339()
        ),
        Some(info) => format!(
            "stale lock {} left by pid {} at {}; remove it once no run is active",
            path.display(),
            info.pid,
            info.acquired_at.to_rfc3339()
        ),
        None => format!(
            "unreadable lock {}; remove it once no run is active",
            path.display()
        ),
    }
}

#[cfg(target_os = "linux")]
fn pid_is_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(target_os = "linux"))]
fn pid_is_alive(_pid: u32) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sync.lock");

        let lock = RunLock::acquire(&path).unwrap();
        let err = RunLock::acquire(&path).unwrap_err();
        assert!(matches!(err, SyncError::ConcurrentRun(_)));
        assert!(err.to_string().contains("held by pid"));

        lock.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_releases_lock() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sync.lock");

        {
            let _lock = RunLock::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
        RunLock::acquire(&path).unwrap();
    }

    #[test]
    fn test_leftover_lock_blocks_run() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sync.lock");
        fs::write(&path, "garbage").unwrap();

        let err = RunLock::acquire(&path).unwrap_err();
        assert!(matches!(err, SyncError::ConcurrentRun(_)));
        assert!(err.to_string().contains("unreadable lock"));
        // The file is left for the operator
        assert!(path.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_dead_holder_reported_as_stale() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sync.lock");
        let info = LockInfo {
            pid: u32::MAX,
            acquired_at: Utc::now(),
        };
        fs::write(&path, serde_json::to_string(&info).unwrap()).unwrap();

        let err = RunLock::acquire(&path).unwrap_err();
        assert!(err.to_string().contains("stale lock"));
    }
}
