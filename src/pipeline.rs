//! # Pipeline
//!
//! Runs the whole derivation for one invocation:
//!
//! 1.  **Locate**: find the nearest directory holding the project file.
//! 2.  **Parse**: load it into a YAML tree.
//! 3.  **Fingerprint**: hash the parsed tree, the project directory and the
//!     working directory.
//! 4.  **Transform + cache**: on a cache miss, derive the override and write
//!     it; on a hit, reuse the existing file untouched. Relative sources
//!     resolve against the working directory.
//! 5.  **Report**: return the base and override paths.

use std::path::PathBuf;

use log::info;

use crate::cache::{fingerprint, OverrideCache};
use crate::context::WorkingContext;
use crate::defaults::{self, PROJECT_FILE_NAME};
use crate::descriptor::BaseDescriptor;
use crate::error::Result;
use crate::locator::find_project_dir;
use crate::reporter::ComposeFiles;
use crate::store::ContentStore;
use crate::transform::{OverrideDescriptor, Transformer};

/// Settings for a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Name of the project file to search for.
    pub file_name: String,
    /// Cache directory; `None` means the default under the home directory.
    pub cache_root: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            file_name: PROJECT_FILE_NAME.to_string(),
            cache_root: None,
        }
    }
}

impl PipelineOptions {
    /// Cache root for `ctx`, applying the default when unset.
    pub fn cache_root_for(&self, ctx: &WorkingContext) -> PathBuf {
        self.cache_root
            .clone()
            .unwrap_or_else(|| defaults::cache_root(ctx.home_dir()))
    }
}

/// A located and parsed project file.
struct Project {
    dir: PathBuf,
    file: PathBuf,
    base: BaseDescriptor,
}

fn load_project(
    ctx: &WorkingContext,
    store: &dyn ContentStore,
    options: &PipelineOptions,
) -> Result<Project> {
    let dir = find_project_dir(store, ctx.current_dir(), &options.file_name)?;
    let file = dir.join(&options.file_name);
    let base = BaseDescriptor::from_file(store, &file)?;
    Ok(Project { dir, file, base })
}

fn derive(
    ctx: &WorkingContext,
    project: &Project,
    store: &dyn ContentStore,
    options: &PipelineOptions,
) -> Result<OverrideDescriptor> {
    Transformer::new(ctx.current_dir(), store)?
        .with_source_name(options.file_name.as_str())
        .transform(&project.base)
}

/// Locate, derive and cache the override; return both file paths.
pub fn run(
    ctx: &WorkingContext,
    store: &dyn ContentStore,
    options: &PipelineOptions,
) -> Result<ComposeFiles> {
    let project = load_project(ctx, store, options)?;
    let hash = fingerprint(&project.base, &project.dir, ctx.current_dir())?;
    let cache = OverrideCache::new(options.cache_root_for(ctx), store);

    let lookup = cache.get_or_create(hash, || {
        derive(ctx, &project, store, options)?.to_yaml_string()
    })?;
    if !lookup.hit {
        info!("Wrote override {}", lookup.path.display());
    }

    Ok(ComposeFiles {
        base_file: project.file,
        override_file: lookup.path,
    })
}

/// Derive the override YAML without reading or writing the cache.
pub fn render_override(
    ctx: &WorkingContext,
    store: &dyn ContentStore,
    options: &PipelineOptions,
) -> Result<String> {
    let project = load_project(ctx, store, options)?;
    derive(ctx, &project, store, options)?.to_yaml_string()
}
