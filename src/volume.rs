//! Volume specification parsing and NFS volume definitions
//!
//! Only the short string syntax of a compose volume entry is understood:
//! `SOURCE:TARGET[:MODE]`. A spec is a relative bind mount when `SOURCE`
//! starts with `.`; the source ends at the first colon, so the target keeps
//! any trailing options such as `:ro` or `:cached`.

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::defaults::{NFS_DRIVER, NFS_MOUNT_OPTIONS, NFS_TYPE, VOLUME_NAME_PREFIX};
use crate::error::{Error, Result};

/// Lazy first group so the target keeps every later colon.
const BIND_MOUNT_PATTERN: &str = r"^(\..*?):(.*)$";

/// A relative bind mount split out of a volume spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    /// Host path relative to the project directory, starting with `.`.
    pub relative_source: String,
    /// Everything after the first colon: container path plus options.
    pub destination_with_options: String,
}

/// Matches relative bind-mount volume specs.
#[derive(Debug, Clone)]
pub struct BindMountMatcher {
    regex: Regex,
}

impl BindMountMatcher {
    pub fn new() -> Result<Self> {
        let regex = Regex::new(BIND_MOUNT_PATTERN).map_err(Error::Regex)?;
        Ok(Self { regex })
    }

    /// Split `spec` into source and destination.
    ///
    /// Returns `None` for anything that is not a relative bind mount, e.g.
    /// `named-volume:/data`, `/abs:/data` or a spec without a colon.
    pub fn parse(&self, spec: &str) -> Option<VolumeBinding> {
        let captures = self.regex.captures(spec)?;
        Some(VolumeBinding {
            relative_source: captures.get(1)?.as_str().to_string(),
            destination_with_options: captures.get(2)?.as_str().to_string(),
        })
    }
}

/// Build the `device` option for a relative source.
///
/// One leading `.` and then one leading `/` are stripped; whatever remains is
/// appended to `source_dir` with a separating `/`. The result is prefixed
/// with `:`, which the NFS driver reads as a path on the server.
///
/// ```
/// use std::path::Path;
/// use mac_dev_shim::volume::device_path;
///
/// assert_eq!(device_path(Path::new("/work/app"), "."), ":/work/app");
/// assert_eq!(device_path(Path::new("/work/app"), "./foo/bar"), ":/work/app/foo/bar");
/// ```
pub fn device_path(source_dir: &Path, relative_source: &str) -> String {
    let local = relative_source.strip_prefix('.').unwrap_or(relative_source);
    let local = local.strip_prefix('/').unwrap_or(local);
    let dir = source_dir.to_string_lossy();
    let base = dir.trim_end_matches('/');

    match (base.is_empty(), local.is_empty()) {
        (true, true) => ":/".to_string(),
        (false, true) => format!(":{}", base),
        _ => format!(":{}/{}", base, local),
    }
}

/// Name of the volume assigned the given ordinal.
pub fn volume_name(ordinal: usize) -> String {
    format!("{}{}", VOLUME_NAME_PREFIX, ordinal)
}

/// `driver_opts` of an NFS volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverOpts {
    #[serde(rename = "type")]
    pub fs_type: String,
    pub o: String,
    pub device: String,
}

/// A top-level volume declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDefinition {
    pub driver: String,
    pub driver_opts: DriverOpts,
}

/// A synthesized named volume backed by the host's NFS export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedVolume {
    pub name: String,
    pub relative_source: String,
    pub definition: VolumeDefinition,
}

impl NamedVolume {
    pub fn new(ordinal: usize, source_dir: &Path, relative_source: &str) -> Self {
        Self {
            name: volume_name(ordinal),
            relative_source: relative_source.to_string(),
            definition: VolumeDefinition {
                driver: NFS_DRIVER.to_string(),
                driver_opts: DriverOpts {
                    fs_type: NFS_TYPE.to_string(),
                    o: NFS_MOUNT_OPTIONS.to_string(),
                    device: device_path(source_dir, relative_source),
                },
            },
        }
    }
}
