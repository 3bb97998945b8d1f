//! Configuration module for the asset build
//!
//! Provides types and parsing for `forge.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::{
    find_config, find_config_from, load_config, load_config_file, merge_cli_overrides,
    project_root, resolve_path, CliOverrides, ConfigError,
};
pub use schema::*;
