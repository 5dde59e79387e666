//! Default values for mac-dev-shim configuration.
//!
//! This module provides centralized default values used across the library
//! and commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// The project file searched for by the locator.
pub const PROJECT_FILE_NAME: &str = "docker-compose.yml";

/// Cache location relative to the home directory.
pub const CACHE_SUBDIR: &str = "Library/Caches/MacDevShim";

/// Extension of cached override files.
pub const CACHE_FILE_EXTENSION: &str = "yml";

/// Prefix of synthesized volume names (`nfs0`, `nfs1`, ...).
pub const VOLUME_NAME_PREFIX: &str = "nfs";

/// Volume driver for the synthesized volumes.
pub const NFS_DRIVER: &str = "local";

/// Filesystem type passed to the local driver.
pub const NFS_TYPE: &str = "nfs";

/// Mount options for the NFS export served by the Docker host.
pub const NFS_MOUNT_OPTIONS: &str = "addr=host.docker.internal,rw,nolock,hard,nointr,nfsvers=3";

/// Environment variable set on every rewritten service.
pub const HOST_OS_VAR: &str = "HOST_OS";

/// Value of [`HOST_OS_VAR`].
pub const HOST_OS_VALUE: &str = "Darwin";

/// Environment variable docker-compose reads its file list from.
pub const COMPOSE_FILE_VAR: &str = "COMPOSE_FILE";

/// Returns the cache root for the given home directory.
///
/// This can be overridden by the `--cache-root` CLI flag or the
/// `MAC_DEV_SHIM_CACHE` environment variable.
pub fn cache_root(home_dir: &Path) -> PathBuf {
    home_dir.join(CACHE_SUBDIR)
}
