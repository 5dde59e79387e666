//! # Mac Dev Shim Library
//!
//! Bind mounts are slow on Docker Desktop for macOS. This library derives a
//! docker-compose override file that replaces each relative bind mount of a
//! project's `docker-compose.yml` with a named volume served over NFS by the
//! host, then caches that override so it is computed once per distinct
//! descriptor.
//!
//! ## Quick Example
//!
//! ```
//! use mac_dev_shim::context::WorkingContext;
//! use mac_dev_shim::pipeline::{self, PipelineOptions};
//! use mac_dev_shim::store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! store.add_file_string(
//!     "/work/app/docker-compose.yml",
//!     "version: '3'\nservices:\n  web:\n    volumes:\n      - ./src:/app/src\n",
//! );
//! store.add_dir("/work/app/src");
//!
//! let ctx = WorkingContext::new("/work/app", "/Users/dev").unwrap();
//! let files = pipeline::run(&ctx, &store, &PipelineOptions::default()).unwrap();
//!
//! assert!(files.compose_file_value().starts_with("/work/app/docker-compose.yml:"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Working context (`context`)**: current and home directory, read from
//!   the environment once and passed explicitly everywhere else.
//! - **Content store (`store`)**: the only place filesystem side effects
//!   happen, with an in-memory implementation for tests.
//! - **Locator (`locator`)**: nearest-ancestor search for the project file.
//! - **Descriptor (`descriptor`)**: the base file as a generic YAML tree.
//! - **Transformer (`transform`, `volume`)**: bind mount to NFS volume rewrite.
//! - **Cache (`cache`)**: write-once, content-addressed override files.
//! - **Reporter (`reporter`)**: the `COMPOSE_FILE` value for the shell.
//!
//! The `pipeline` module ties these together in dependency order.

pub mod cache;
pub mod context;
pub mod defaults;
pub mod descriptor;
pub mod error;
pub mod locator;
pub mod pipeline;
pub mod reporter;
pub mod store;
pub mod transform;
pub mod volume;

#[cfg(test)]
mod volume_proptest;
