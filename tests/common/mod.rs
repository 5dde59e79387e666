//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_compose(composes::SINGLE_MOUNT);
//!     fixture.command().arg("compose-file").assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::composes;
    pub use super::TestFixture;
}

/// docker-compose.yml snippets for testing.
#[allow(dead_code)]
pub mod composes {
    /// One service mounting `./src`.
    pub const SINGLE_MOUNT: &str = r#"version: "3.7"
services:
  web:
    image: nginx
    volumes:
      - ./src:/usr/share/nginx/html:ro
"#;

    /// Two services sharing `./shared`, plus a named volume.
    pub const SHARED_MOUNT: &str = r#"version: "3.7"
services:
  api:
    image: api
    volumes:
      - ./shared:/data
      - db-data:/var/lib/data
  worker:
    image: worker
    volumes:
      - ./shared:/data
"#;

    /// No eligible mounts.
    pub const NO_MOUNTS: &str = r#"version: "3"
services:
  db:
    image: postgres
"#;

    /// Services but no version.
    pub const NO_VERSION: &str = r#"services:
  web:
    volumes:
      - ./src:/src
"#;
}

/// A project directory, a fake home and a cache root, all temporary.
///
/// The command runs with `PWD` and `HOME` pointed into the fixture so the
/// real environment is never read or written.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new fixture with empty `project/` and `home/` directories.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("project")
            .create_dir_all()
            .expect("Failed to create project dir");
        temp_dir
            .child("home")
            .create_dir_all()
            .expect("Failed to create home dir");
        Self { temp_dir }
    }

    /// Write `project/docker-compose.yml`.
    pub fn with_compose(self, content: &str) -> Self {
        self.project()
            .child("docker-compose.yml")
            .write_str(content)
            .expect("Failed to write compose file");
        self
    }

    /// Create a directory under the project.
    pub fn with_dir(self, path: &str) -> Self {
        self.project()
            .child(path)
            .create_dir_all()
            .expect("Failed to create directory");
        self
    }

    /// Write a file under the project.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.project()
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn project(&self) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child("project")
    }

    pub fn project_path(&self) -> PathBuf {
        self.project().path().to_path_buf()
    }

    pub fn home_path(&self) -> PathBuf {
        self.temp_dir.child("home").path().to_path_buf()
    }

    /// Cache root used by [`TestFixture::command`].
    pub fn cache_root(&self) -> PathBuf {
        self.temp_dir.child("cache").path().to_path_buf()
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Command running in the project directory.
    pub fn command(&self) -> Command {
        self.command_in(&self.project_path())
    }

    /// Command running in `dir` with the fixture's home and cache root.
    pub fn command_in(&self, dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("mac-dev-shim");
        cmd.current_dir(dir)
            .env("PWD", dir)
            .env("HOME", self.home_path())
            .env("MAC_DEV_SHIM_CACHE", self.cache_root())
            .env_remove("MAC_DEV_SHIM_FILE")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Cache files currently on disk.
    pub fn cache_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = match std::fs::read_dir(self.cache_root()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        };
        files.sort();
        files
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
