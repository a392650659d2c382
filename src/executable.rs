//! Locating the rendering executable.
//!
//! Resolution order:
//! 1. a path stored with [`set_path`]
//! 2. the directory named by the `WKHTMLTOPDF_PATH` environment variable
//! 3. the directories of `PATH`
//!
//! The first successful resolution is cached for the rest of the process.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// File name of the rendering executable.
#[cfg(windows)]
pub const EXECUTABLE_NAME: &str = "wkhtmltopdf.exe";
/// File name of the rendering executable.
#[cfg(not(windows))]
pub const EXECUTABLE_NAME: &str = "wkhtmltopdf";

/// Environment variable naming the directory that holds the executable.
pub const PATH_ENV: &str = "WKHTMLTOPDF_PATH";

/// Access to the environment used during resolution.
pub trait Lookup {
    /// Read an environment variable.
    fn var_os(&self, key: &str) -> Option<OsString>;

    /// Whether `path` names a runnable file.
    fn is_executable(&self, path: &Path) -> bool;
}

/// The real process environment and filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
    fn var_os(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }

    fn is_executable(&self, path: &Path) -> bool {
        let Ok(meta) = std::fs::metadata(path) else {
            return false;
        };
        if !meta.is_file() {
            return false;
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            meta.permissions().mode() & 0o111 != 0
        }
        #[cfg(not(unix))]
        {
            true
        }
    }
}

/// Search the environment directory and then `PATH` for the executable.
pub fn find(lookup: &dyn Lookup) -> Option<PathBuf> {
    if let Some(dir) = lookup.var_os(PATH_ENV).filter(|d| !d.is_empty()) {
        let candidate = Path::new(&dir).join(EXECUTABLE_NAME);
        if lookup.is_executable(&candidate) {
            return Some(candidate);
        }
        log::debug!(
            "{} is set but {} is not runnable",
            PATH_ENV,
            candidate.display()
        );
    }

    let paths = lookup.var_os("PATH")?;
    std::env::split_paths(&paths)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(EXECUTABLE_NAME))
        .find(|candidate| lookup.is_executable(candidate))
}

/// A lock-guarded, resolve-once executable location.
///
/// One instance backs the process-wide functions of this module; tests can
/// create their own.
#[derive(Debug, Default)]
pub struct ExecutableCache {
    path: Mutex<Option<PathBuf>>,
}

impl ExecutableCache {
    /// Create an empty cache.
    pub const fn new() -> Self {
        Self {
            path: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<PathBuf>> {
        self.path.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The cached location, if resolved or set.
    pub fn get(&self) -> Option<PathBuf> {
        self.lock().clone()
    }

    /// Store an explicit location.
    pub fn set(&self, path: impl Into<PathBuf>) {
        *self.lock() = Some(path.into());
    }

    /// Forget the cached location.
    pub fn clear(&self) {
        *self.lock() = None;
    }

    /// Return the cached location, resolving and caching it on first use.
    pub fn resolve_with(&self, lookup: &dyn Lookup) -> Result<PathBuf> {
        let mut cached = self.lock();
        if let Some(path) = cached.as_ref() {
            return Ok(path.clone());
        }

        let path = find(lookup).ok_or_else(|| Error::ExecutableNotFound(EXECUTABLE_NAME.into()))?;
        log::debug!("resolved {} at {}", EXECUTABLE_NAME, path.display());
        *cached = Some(path.clone());
        Ok(path)
    }
}

static GLOBAL: ExecutableCache = ExecutableCache::new();

/// Set the executable location for the whole process.
///
/// Takes precedence over the environment and `PATH`.
pub fn set_path(path: impl Into<PathBuf>) {
    GLOBAL.set(path);
}

/// The process-wide location, if already known.
pub fn path() -> Option<PathBuf> {
    GLOBAL.get()
}

/// Resolve the process-wide location.
pub fn resolve() -> Result<PathBuf> {
    GLOBAL.resolve_with(&SystemLookup)
}
