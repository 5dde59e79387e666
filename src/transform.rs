//! # Override Transformer
//!
//! Rewrites the relative bind mounts of a base descriptor into references to
//! NFS-backed named volumes, producing the override descriptor that
//! docker-compose merges on top of the base file.
//!
//! ## Rules
//!
//! - `version` is copied verbatim. A base without a non-empty version is a
//!   [`Error::Schema`]; compose rejects merged files whose versions differ.
//! - Services are visited in document order, their volume entries in
//!   declared order. Non-string entries and specs that are not relative bind
//!   mounts are skipped without error.
//! - Relative sources resolve against the working directory of the
//!   invocation, which may be below the directory holding the base file.
//! - With directory checking on (the default), a source that does not
//!   resolve to an existing directory is skipped. NFS exports single files
//!   poorly.
//! - Each distinct relative source gets one named volume, `nfs<N>`, where N
//!   is the number of sources seen before it. Later mounts of the same source
//!   reuse the name. Compose merges volume entries by container path, so one
//!   declaration per host directory is enough.
//! - Every rewritten service gets `environment.HOST_OS: Darwin`, set once.

use std::path::{Path, PathBuf};

use log::debug;
use serde_yaml::{Mapping, Value};

use crate::defaults::{HOST_OS_VALUE, HOST_OS_VAR, PROJECT_FILE_NAME};
use crate::descriptor::{service_volumes, BaseDescriptor};
use crate::error::{Error, Result};
use crate::store::ContentStore;
use crate::volume::{BindMountMatcher, NamedVolume};

/// Per-service part of the override.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOverride {
    /// Service key exactly as it appears in the base descriptor.
    pub name: Value,
    /// Rewritten entries, `<volume-name>:<destination-with-options>`.
    pub volumes: Vec<String>,
    pub environment: Mapping,
}

impl ServiceOverride {
    fn new(name: Value) -> Self {
        Self {
            name,
            volumes: Vec::new(),
            environment: Mapping::new(),
        }
    }

    fn to_value(&self) -> Value {
        let mut service = Mapping::new();
        service.insert(
            Value::from("volumes"),
            Value::Sequence(self.volumes.iter().map(|v| Value::from(v.as_str())).collect()),
        );
        service.insert(
            Value::from("environment"),
            Value::Mapping(self.environment.clone()),
        );
        Value::Mapping(service)
    }
}

/// The derived override descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideDescriptor {
    pub version: Value,
    pub volumes: Vec<NamedVolume>,
    pub services: Vec<ServiceOverride>,
}

impl OverrideDescriptor {
    /// True when no mount was rewritten; only `version` is emitted.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty() && self.services.is_empty()
    }

    /// Named volumes in the order they were assigned.
    pub fn named_volumes(&self) -> &[NamedVolume] {
        &self.volumes
    }

    /// The override for a service, looked up by its string key.
    pub fn service(&self, name: &str) -> Option<&ServiceOverride> {
        self.services
            .iter()
            .find(|service| service.name.as_str() == Some(name))
    }

    /// Render as a YAML tree: `version`, then `volumes`, then `services`.
    pub fn to_value(&self) -> Result<Value> {
        let mut root = Mapping::new();
        root.insert(Value::from("version"), self.version.clone());

        if !self.volumes.is_empty() {
            let mut volumes = Mapping::new();
            for volume in &self.volumes {
                volumes.insert(
                    Value::from(volume.name.as_str()),
                    serde_yaml::to_value(&volume.definition)?,
                );
            }
            root.insert(Value::from("volumes"), Value::Mapping(volumes));
        }

        if !self.services.is_empty() {
            let mut services = Mapping::new();
            for service in &self.services {
                services.insert(service.name.clone(), service.to_value());
            }
            root.insert(Value::from("services"), Value::Mapping(services));
        }

        Ok(Value::Mapping(root))
    }

    /// Serialize to YAML text.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_value()?)?)
    }
}

/// Derives an [`OverrideDescriptor`] from a [`BaseDescriptor`].
pub struct Transformer<'a> {
    source_dir: PathBuf,
    store: &'a dyn ContentStore,
    matcher: BindMountMatcher,
    require_directories: bool,
    source_name: String,
}

impl<'a> Transformer<'a> {
    /// Create a transformer resolving relative sources against `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>, store: &'a dyn ContentStore) -> Result<Self> {
        Ok(Self {
            source_dir: source_dir.into(),
            store,
            matcher: BindMountMatcher::new()?,
            require_directories: true,
            source_name: PROJECT_FILE_NAME.to_string(),
        })
    }

    /// Only rewrite sources that are existing directories (default: on).
    pub fn require_directories(mut self, require: bool) -> Self {
        self.require_directories = require;
        self
    }

    /// File name reported in schema errors.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn transform(&self, base: &BaseDescriptor) -> Result<OverrideDescriptor> {
        let version = base.version().cloned().ok_or_else(|| Error::Schema {
            file: self.source_name.clone(),
            message: "must specify a version in the base descriptor".to_string(),
        })?;

        let mut result = OverrideDescriptor {
            version,
            volumes: Vec::new(),
            services: Vec::new(),
        };

        for (service_name, service) in base.services() {
            for spec in service_volumes(service) {
                let Some(spec) = spec.as_str() else {
                    continue;
                };
                let Some(binding) = self.matcher.parse(spec) else {
                    continue;
                };
                if self.require_directories && !self.is_source_dir(&binding.relative_source) {
                    debug!(
                        "Skipping {} for service {:?}: not a directory",
                        binding.relative_source, service_name
                    );
                    continue;
                }

                let name = self.volume_for(&mut result.volumes, &binding.relative_source);
                let service_override = Self::service_entry(&mut result.services, service_name);
                service_override
                    .volumes
                    .push(format!("{}:{}", name, binding.destination_with_options));
                service_override
                    .environment
                    .insert(Value::from(HOST_OS_VAR), Value::from(HOST_OS_VALUE));
            }
        }

        debug!(
            "Derived {} named volume(s) for {} service(s)",
            result.volumes.len(),
            result.services.len()
        );
        Ok(result)
    }

    fn is_source_dir(&self, relative_source: &str) -> bool {
        self.store
            .is_dir(&resolve_source(&self.source_dir, relative_source))
    }

    /// Name for `relative_source`, declaring a new volume on first use.
    fn volume_for(&self, volumes: &mut Vec<NamedVolume>, relative_source: &str) -> String {
        if let Some(existing) = volumes
            .iter()
            .find(|volume| volume.relative_source == relative_source)
        {
            return existing.name.clone();
        }
        let volume = NamedVolume::new(volumes.len(), &self.source_dir, relative_source);
        let name = volume.name.clone();
        volumes.push(volume);
        name
    }

    fn service_entry<'s>(
        services: &'s mut Vec<ServiceOverride>,
        name: &Value,
    ) -> &'s mut ServiceOverride {
        let index = match services.iter().position(|service| &service.name == name) {
            Some(index) => index,
            None => {
                services.push(ServiceOverride::new(name.clone()));
                services.len() - 1
            }
        };
        &mut services[index]
    }
}

/// Join a relative source onto `source_dir`, dropping `.` components.
pub fn resolve_source(source_dir: &Path, relative_source: &str) -> PathBuf {
    source_dir.join(relative_source).components().collect()
}
