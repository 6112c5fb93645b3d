use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

// The working directory is process-wide; only one guard may hold it at a time.
static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Changes the working directory for its lifetime and restores the previous
/// one on drop, whatever path the scope exits through.
#[derive(Debug)]
pub struct WorkingDirGuard {
    origin: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkingDirGuard {
    pub fn enter(path: &Path) -> std::io::Result<Self> {
        let lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let origin = std::env::current_dir()?;
        std::env::set_current_dir(path)?;
        log::trace!("Entered {:?} (from {:?})", path, origin);
        Ok(Self { origin, _lock: lock })
    }
}

impl Drop for WorkingDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.origin) {
            log::error!("Could not restore working directory {:?}: {}", self.origin, e);
        }
    }
}

/// Reads the working directory while no guard is active.
#[cfg(test)]
pub fn settled_current_dir() -> std::io::Result<PathBuf> {
    let _lock = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::env::current_dir()
}

/// Runs `f` with `path` as the working directory.
pub fn in_directory<T, E, F>(path: &Path, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<std::io::Error>,
{
    let _guard = WorkingDirGuard::enter(path)?;
    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use tempfile::tempdir;

    #[test]
    fn test_restores_after_success() {
        let dir = tempdir().unwrap();
        let before = settled_current_dir().unwrap();
        let inside = in_directory(dir.path(), || {
            Ok::<_, AppError>(std::env::current_dir()?)
        })
        .unwrap();
        assert_eq!(inside.canonicalize().unwrap(), dir.path().canonicalize().unwrap());
        assert_eq!(settled_current_dir().unwrap(), before);
    }

    #[test]
    fn test_restores_after_failed_write() {
        let dir = tempdir().unwrap();
        let before = settled_current_dir().unwrap();
        let result = in_directory(dir.path(), || {
            std::fs::write("missing_subdir/out.jpg", b"data")?;
            Ok::<_, AppError>(())
        });
        assert!(matches!(result, Err(AppError::Io(_))));
        assert_eq!(settled_current_dir().unwrap(), before);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let before = settled_current_dir().unwrap();
        assert!(WorkingDirGuard::enter(&dir.path().join("nope")).is_err());
        assert_eq!(settled_current_dir().unwrap(), before);
    }
}
