//! Build context containing configuration and state for a build.

use crate::config::ForgeConfig;
use crate::layout::PathConfig;
use crate::manifest::ManifestStore;
use crate::transforms::{Toolchain, TransformError};
use std::path::{Path, PathBuf};

/// Everything a task action needs: configuration, project root and the
/// transform stages to run.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// The loaded configuration
    config: ForgeConfig,
    /// Project root directory (where forge.toml and package.json live)
    project_root: PathBuf,
    /// Opaque stages used by the pipelines
    toolchain: Toolchain,
    /// Whether to run in verbose mode
    verbose: bool,
}

impl BuildContext {
    /// Create a new build context with an explicit toolchain.
    pub fn new(config: ForgeConfig, project_root: PathBuf, toolchain: Toolchain) -> Self {
        Self { config, project_root, toolchain, verbose: false }
    }

    /// Create a build context whose toolchain is described by `config`.
    pub fn from_config(config: ForgeConfig, project_root: PathBuf) -> Result<Self, TransformError> {
        let toolchain = Toolchain::from_config(&config)?;
        Ok(Self::new(config, project_root, toolchain))
    }

    /// Get the configuration.
    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Get the project layout.
    pub fn paths(&self) -> &PathConfig {
        &self.config.paths
    }

    /// Get the project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the transform stages.
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Whether verbose mode is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolve a path relative to the project root.
    ///
    /// If the path is absolute, returns it unchanged.
    /// If relative, joins it with the project root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        crate::config::resolve_path(&self.project_root, path.as_ref())
    }

    /// Path relative to the project root, for display.
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.project_root).unwrap_or(path)
    }

    /// Store for the project manifest.
    pub fn manifest_store(&self) -> ManifestStore {
        ManifestStore::new(self.resolve_path(&self.config.paths.manifest))
    }
}
