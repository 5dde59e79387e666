//! # Base Descriptor Parsing
//!
//! The base `docker-compose.yml` is parsed into a generic `serde_yaml::Value`
//! tree rather than a typed schema. Only two parts of it are interpreted:
//!
//! - the top-level `version` scalar, copied verbatim into the override;
//! - the top-level `services` mapping, whose `volumes` sequences are
//!   inspected by the transformer.
//!
//! Everything else is carried along untouched and only contributes to the
//! cache fingerprint.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::store::ContentStore;

/// A parsed base descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDescriptor {
    root: Value,
}

impl BaseDescriptor {
    /// Parse descriptor text.
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(content)?;
        Ok(Self { root })
    }

    /// Read and parse a descriptor through the content store.
    pub fn from_file(store: &dyn ContentStore, path: &Path) -> Result<Self> {
        let content = store.read_to_string(path)?;
        Self::parse(&content)
    }

    /// The `version` value if present and non-empty.
    ///
    /// `null`, `false`, `0` and empty strings count as empty.
    pub fn version(&self) -> Option<&Value> {
        let version = self.root.get("version")?;
        let empty = match version {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty() || s == "0",
            Value::Number(n) => n.as_f64() == Some(0.0),
            Value::Sequence(seq) => seq.is_empty(),
            Value::Mapping(map) => map.is_empty(),
            Value::Tagged(_) => false,
        };
        if empty {
            None
        } else {
            Some(version)
        }
    }

    /// The `services` mapping, in document order.
    ///
    /// Missing or non-mapping `services` yields no services.
    pub fn services(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.root
            .get("services")
            .and_then(Value::as_mapping)
            .into_iter()
            .flat_map(Mapping::iter)
    }

    /// The whole parsed tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }
}

/// The `volumes` entries of a service definition, in declared order.
pub fn service_volumes(service: &Value) -> impl Iterator<Item = &Value> {
    service
        .get("volumes")
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
}
