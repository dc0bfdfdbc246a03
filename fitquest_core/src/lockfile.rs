//! Sidecar lock files.
//!
//! Files that get replaced by rename (the profile file, the session log at
//! rollup) cannot carry their own lock: a waiter would end up holding a lock
//! on the old inode. Writers lock `<path>.lock` instead, which is never
//! renamed, and hold it for the whole read-modify-write.

use crate::Result;
use fs2::FileExt;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Exclusive lock on a file's sidecar, released on drop
#[derive(Debug)]
pub(crate) struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// `profiles.json` -> `profiles.json.lock`
pub(crate) fn lock_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// Block until the sidecar lock for `path` is held exclusively
pub(crate) fn lock_exclusive(path: &Path) -> Result<LockGuard> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path(path))?;
    file.lock_exclusive()?;
    Ok(LockGuard { file })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_path_appends_suffix() {
        assert_eq!(
            lock_path(Path::new("/data/profiles.json")),
            PathBuf::from("/data/profiles.json.lock")
        );
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("profiles.json");

        let guard = lock_exclusive(&path).unwrap();
        let other = File::open(lock_path(&path)).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(guard);
        assert!(other.try_lock_exclusive().is_ok());
        other.unlock().unwrap();
    }
}
