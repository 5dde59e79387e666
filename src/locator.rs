//! Nearest-ancestor project file discovery
//!
//! Starting at the working directory, each directory up to and including the
//! filesystem root is checked for the project file at its top level. The
//! first (nearest) match wins. Directories that cannot be read are skipped.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::store::ContentStore;

/// Find the nearest directory at or above `start` that contains `file_name`.
///
/// Returns the directory, not the file path. Fails with
/// [`Error::NotFound`] when no ancestor contains the file.
pub fn find_project_dir(
    store: &dyn ContentStore,
    start: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    for dir in start.ancestors() {
        match store.list_files(dir) {
            Ok(names) => {
                if names.iter().any(|name| name == file_name) {
                    debug!("Found {} in {}", file_name, dir.display());
                    return Ok(dir.to_path_buf());
                }
            }
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
            }
        }
    }

    Err(Error::NotFound {
        file_name: file_name.to_string(),
        start: start.to_path_buf(),
    })
}
