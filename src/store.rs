//! # Content Store
//!
//! Every filesystem side effect of the pipeline goes through the
//! [`ContentStore`] trait: listing a directory during discovery, reading the
//! base descriptor, probing bind-mount sources, and writing cache entries.
//!
//! - **`DiskStore`**: the real filesystem. Directory listings use `walkdir`
//!   limited to depth one, so discovery never recurses. Writes go through a
//!   `tempfile` in the target directory and are renamed into place.
//! - **`MemoryStore`**: an in-memory tree used by tests and benchmarks. It
//!   counts writes so cache behaviour can be asserted without timestamps.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Filesystem capability used by the locator, transformer and cache.
pub trait ContentStore: Send + Sync {
    /// Names of the regular files directly inside `dir`.
    ///
    /// Fails when the directory cannot be read.
    fn list_files(&self, dir: &Path) -> Result<Vec<String>>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Whether `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create `dir` and any missing parents; succeeds if it already exists.
    fn create_dir_all(&self, dir: &Path) -> Result<()>;

    /// Write `contents` to `path`, replacing any existing file.
    ///
    /// The write is all-or-nothing: on error `path` is left as it was.
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// [`ContentStore`] backed by the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskStore;

impl ContentStore for DiskStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                Error::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("cannot read {}", dir.display()))
                }))
            })?;
            if entry.file_type().is_file() || entry.path_is_symlink() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        Ok(fs::create_dir_all(dir)?)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(contents)?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    unreadable: BTreeSet<PathBuf>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryState {
    fn add_dir_chain(&mut self, dir: &Path) {
        for ancestor in dir.ancestors() {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(ancestor.to_path_buf());
        }
    }
}

/// In-memory [`ContentStore`] for tests.
///
/// Paths are stored exactly as given; callers should use absolute paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add a directory and all of its ancestors.
    pub fn add_dir<P: AsRef<Path>>(&self, dir: P) {
        self.state().add_dir_chain(dir.as_ref());
    }

    /// Add a file with string content. Parent directories are created.
    ///
    /// Seeding does not count as a write.
    pub fn add_file_string<P: AsRef<Path>>(&self, path: P, content: &str) {
        let path = path.as_ref();
        let mut state = self.state();
        if let Some(parent) = path.parent() {
            state.add_dir_chain(parent);
        }
        state
            .files
            .insert(path.to_path_buf(), content.as_bytes().to_vec());
    }

    /// Make `list_files` fail for `dir`, as for a permission error.
    pub fn mark_unreadable<P: AsRef<Path>>(&self, dir: P) {
        self.state().unreadable.insert(dir.as_ref().to_path_buf());
    }

    /// Make every later `write` fail without storing anything, as for a
    /// full disk.
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Contents of a file as a string, if present.
    pub fn get_file_string<P: AsRef<Path>>(&self, path: P) -> Option<String> {
        self.state()
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Number of `write` calls made through the store.
    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    /// Paths of every file in the store.
    pub fn list_all_files(&self) -> Vec<PathBuf> {
        self.state().files.keys().cloned().collect()
    }
}

impl ContentStore for MemoryStore {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>> {
        let state = self.state();
        if state.unreadable.contains(dir) || !state.dirs.contains(dir) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("cannot read {}", dir.display()),
            )));
        }
        Ok(state
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name().and_then(|n| n.to_str()))
            .map(str::to_string)
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        let state = self.state();
        let bytes = state.files.get(path).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            ))
        })?;
        String::from_utf8(bytes.clone()).map_err(|e| {
            Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state().dirs.contains(path)
    }

    fn create_dir_all(&self, dir: &Path) -> Result<()> {
        self.state().add_dir_chain(dir);
        Ok(())
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut state = self.state();
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !state.dirs.contains(parent) => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("parent directory missing: {}", parent.display()),
                )));
            }
            _ => {}
        }
        if state.fail_writes {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::StorageFull,
                format!("no space left writing {}", path.display()),
            )));
        }
        state.files.insert(path.to_path_buf(), contents.to_vec());
        state.writes += 1;
        Ok(())
    }
}
