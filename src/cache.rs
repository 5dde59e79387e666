//! On-disk, content-addressed cache of override files
//!
//! An entry lives at `<cache-root>/<crc32>.yml`. The key is a CRC-32 over the
//! canonical YAML serialization of the parsed base descriptor, the project
//! directory and the working directory the sources were resolved against.
//! The override is a pure function of those inputs, so an existing entry is
//! trusted as-is and never rewritten. Empty overrides are cached too.
//!
//! Entries are written to a temporary file in the cache root and renamed
//! into place, so a reader never sees a partial entry.
//!
//! The pipeline never deletes entries. Stale ones accumulate under old hashes
//! until removed with `mac-dev-shim cache clean`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use log::debug;
use walkdir::WalkDir;

use crate::defaults::CACHE_FILE_EXTENSION;
use crate::descriptor::BaseDescriptor;
use crate::error::{Error, Result};
use crate::store::ContentStore;

/// Cache key for a base descriptor found in `project_dir` and transformed
/// from `source_dir`.
///
/// The two directories are separated by a NUL byte.
pub fn fingerprint(base: &BaseDescriptor, project_dir: &Path, source_dir: &Path) -> Result<u32> {
    let canonical = serde_yaml::to_string(base.as_value())?;
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(canonical.as_bytes());
    hasher.update(project_dir.to_string_lossy().as_bytes());
    hasher.update(b"\0");
    hasher.update(source_dir.to_string_lossy().as_bytes());
    Ok(hasher.finalize())
}

/// Outcome of [`OverrideCache::get_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLookup {
    pub path: PathBuf,
    /// True when the entry already existed and nothing was written.
    pub hit: bool,
}

/// Write-once store of serialized overrides.
pub struct OverrideCache<'a> {
    root: PathBuf,
    store: &'a dyn ContentStore,
}

impl<'a> OverrideCache<'a> {
    pub fn new(root: impl Into<PathBuf>, store: &'a dyn ContentStore) -> Self {
        Self {
            root: root.into(),
            store,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry for `hash`, whether or not it exists.
    pub fn entry_path(&self, hash: u32) -> PathBuf {
        self.root.join(format!("{}.{}", hash, CACHE_FILE_EXTENSION))
    }

    /// Return the entry for `hash`, creating it from `producer` on a miss.
    ///
    /// `producer` runs only on a miss and before anything touches the disk, so
    /// a producer error leaves neither the cache root nor a file behind.
    pub fn get_or_create<F>(&self, hash: u32, producer: F) -> Result<CacheLookup>
    where
        F: FnOnce() -> Result<String>,
    {
        let path = self.entry_path(hash);

        if self.store.exists(&path) {
            debug!("Cache hit: {}", path.display());
            return Ok(CacheLookup { path, hit: true });
        }

        debug!("Cache miss: {}", path.display());
        let content = producer()?;
        self.store.create_dir_all(&self.root).map_err(|e| Error::Cache {
            message: format!("cannot create {}: {}", self.root.display(), e),
        })?;
        self.store
            .write(&path, content.as_bytes())
            .map_err(|e| Error::Cache {
                message: format!("cannot write {}: {}", path.display(), e),
            })?;

        Ok(CacheLookup { path, hit: false })
    }
}

/// A cache file found on disk.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub hash: u32,
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: Option<SystemTime>,
}

/// List the entries under `root`, sorted by hash.
///
/// A missing root yields no entries. Files not named `<u32>.yml` are ignored.
pub fn list_entries(root: &Path) -> Result<Vec<CacheEntry>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Cache {
            message: format!("cannot read {}: {}", root.display(), e),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(hash) = parse_entry_name(entry.file_name().to_str().unwrap_or_default()) else {
            continue;
        };
        let metadata = entry.metadata().ok();
        entries.push(CacheEntry {
            hash,
            path: entry.path().to_path_buf(),
            size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            last_modified: metadata.and_then(|m| m.modified().ok()),
        });
    }

    entries.sort_by_key(|entry| entry.hash);
    Ok(entries)
}

/// Parse `<u32>.yml` into its hash.
fn parse_entry_name(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(CACHE_FILE_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Delete the given entries.
///
/// Returns the number removed and the paths that could not be deleted.
/// A failure does not stop the remaining deletions.
pub fn remove_entries(entries: &[CacheEntry]) -> (usize, Vec<(PathBuf, std::io::Error)>) {
    let mut removed = 0;
    let mut failures = Vec::new();
    for entry in entries {
        match fs::remove_file(&entry.path) {
            Ok(()) => removed += 1,
            Err(e) => failures.push((entry.path.clone(), e)),
        }
    }
    (removed, failures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn base(yaml: &str) -> BaseDescriptor {
        BaseDescriptor::parse(yaml).unwrap()
    }

    fn fingerprint_at(descriptor: &BaseDescriptor, dir: &str) -> u32 {
        fingerprint(descriptor, Path::new(dir), Path::new(dir)).unwrap()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint_at(&base("version: '3'\n"), "/p");
        let b = fingerprint_at(&base("version: '3'\n"), "/p");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_formatting() {
        let compact = fingerprint_at(&base("version: '3'\nservices: {web: {image: x}}\n"), "/p");
        let spaced = fingerprint_at(
            &base("# comment\nversion: \"3\"\n\nservices:\n  web:\n    image: x\n"),
            "/p",
        );
        assert_eq!(compact, spaced);
    }

    #[test]
    fn test_fingerprint_depends_on_content_and_dir() {
        let one = fingerprint_at(&base("version: '3'\n"), "/p");
        let other_content = fingerprint_at(&base("version: '2'\n"), "/p");
        let other_dir = fingerprint_at(&base("version: '3'\n"), "/q");
        assert_ne!(one, other_content);
        assert_ne!(one, other_dir);
    }

    #[test]
    fn test_fingerprint_depends_on_working_dir() {
        let descriptor = base("version: '3'\n");
        let from_root = fingerprint(&descriptor, Path::new("/p"), Path::new("/p")).unwrap();
        let from_sub = fingerprint(&descriptor, Path::new("/p"), Path::new("/p/sub")).unwrap();
        assert_ne!(from_root, from_sub);
    }

    #[test]
    fn test_fingerprint_is_crc32_of_serialization_and_dir() {
        let descriptor = base("version: '3'\n");
        let mut expected = serde_yaml::to_string(descriptor.as_value()).unwrap();
        expected.push_str("/p\0/p/sub");
        assert_eq!(
            fingerprint(&descriptor, Path::new("/p"), Path::new("/p/sub")).unwrap(),
            crc32fast::hash(expected.as_bytes())
        );
    }

    #[test]
    fn test_entry_path_layout() {
        let store = MemoryStore::new();
        let cache = OverrideCache::new("/home/dev/Library/Caches/MacDevShim", &store);
        assert_eq!(cache.root(), Path::new("/home/dev/Library/Caches/MacDevShim"));
        assert_eq!(
            cache.entry_path(42),
            PathBuf::from("/home/dev/Library/Caches/MacDevShim/42.yml")
        );
    }

    #[test]
    fn test_get_or_create_writes_once() {
        let store = MemoryStore::new();
        let cache = OverrideCache::new("/cache", &store);
        let calls = Cell::new(0);

        let first = cache
            .get_or_create(7, || {
                calls.set(calls.get() + 1);
                Ok("version: '3'\n".to_string())
            })
            .unwrap();
        assert!(!first.hit);
        assert_eq!(store.write_count(), 1);

        let second = cache
            .get_or_create(7, || {
                calls.set(calls.get() + 1);
                Ok("changed".to_string())
            })
            .unwrap();
        assert!(second.hit);
        assert_eq!(first.path, second.path);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.write_count(), 1);
        assert_eq!(
            store.get_file_string("/cache/7.yml").unwrap(),
            "version: '3'\n"
        );
    }

    #[test]
    fn test_producer_error_writes_nothing() {
        let store = MemoryStore::new();
        let cache = OverrideCache::new("/cache", &store);

        let result = cache.get_or_create(1, || {
            Err(Error::Schema {
                file: "docker-compose.yml".to_string(),
                message: "missing version".to_string(),
            })
        });
        assert!(result.is_err());
        assert_eq!(store.write_count(), 0);
        assert!(!store.exists(Path::new("/cache")));
    }

    #[test]
    fn test_failed_write_leaves_no_entry() {
        let store = MemoryStore::new();
        let cache = OverrideCache::new("/cache", &store);
        store.fail_writes(true);

        let err = cache
            .get_or_create(9, || Ok("version: '3'\n".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Cache { .. }));
        assert!(store.list_all_files().is_empty());
        assert!(!store.exists(&cache.entry_path(9)));

        store.fail_writes(false);
        let retry = cache
            .get_or_create(9, || Ok("version: '3'\n".to_string()))
            .unwrap();
        assert!(!retry.hit);
        assert_eq!(store.list_all_files(), vec![cache.entry_path(9)]);
    }

    #[test]
    fn test_get_or_create_on_disk_is_complete_or_absent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("cache");
        let cache = OverrideCache::new(&root, &crate::store::DiskStore);

        let lookup = cache
            .get_or_create(11, || Ok("version: '3'\n".to_string()))
            .unwrap();
        assert_eq!(fs::read_to_string(&lookup.path).unwrap(), "version: '3'\n");
        assert_eq!(fs::read_dir(&root).unwrap().count(), 1);
    }

    #[test]
    fn test_parse_entry_name() {
        assert_eq!(parse_entry_name("123.yml"), Some(123));
        assert_eq!(parse_entry_name("4294967295.yml"), Some(u32::MAX));
        assert_eq!(parse_entry_name("4294967296.yml"), None);
        assert_eq!(parse_entry_name("abc.yml"), None);
        assert_eq!(parse_entry_name(".yml"), None);
        assert_eq!(parse_entry_name("123.yaml"), None);
    }

    #[test]
    fn test_list_and_remove_entries_on_disk() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("20.yml"), "version: '3'\n").unwrap();
        fs::write(temp.path().join("3.yml"), "version: '2'\n").unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(temp.path().join("99.yml.d")).unwrap();

        let entries = list_entries(temp.path()).unwrap();
        let hashes: Vec<_> = entries.iter().map(|e| e.hash).collect();
        assert_eq!(hashes, vec![3, 20]);
        assert!(entries.iter().all(|e| e.size > 0));

        let (removed, failures) = remove_entries(&entries);
        assert_eq!(removed, 2);
        assert!(failures.is_empty());
        assert!(list_entries(temp.path()).unwrap().is_empty());
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn test_list_entries_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(list_entries(&temp.path().join("missing")).unwrap().is_empty());
    }
}
