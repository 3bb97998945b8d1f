//! Configuration loading and discovery for `forge.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::{ForgeConfig, CONFIG_FILENAME};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML parsing error
    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Enable debug logging
    pub verbose: Option<bool>,
    /// Clear the terminal between watch rebuilds
    pub clear_screen: Option<bool>,
    /// Override the watch debounce delay
    pub debounce_ms: Option<u32>,
}

/// Find forge.toml by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find forge.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a forge.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the
/// default configuration.
///
/// Returns the configuration together with the file it came from, if any.
pub fn load_config(path: Option<&Path>) -> Result<(ForgeConfig, Option<PathBuf>), ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            Ok((config, Some(p)))
        }
        None => Ok((ForgeConfig::default(), None)),
    }
}

/// Load configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<ForgeConfig, ConfigError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    let config: ForgeConfig = toml::from_str(&contents)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ForgeConfig, overrides: &CliOverrides) {
    if overrides.verbose == Some(true) {
        config.log.level = "debug".to_string();
    }

    if let Some(clear) = overrides.clear_screen {
        config.watch.clear_screen = clear;
    }

    if let Some(ms) = overrides.debounce_ms {
        config.watch.debounce_ms = ms;
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the forge.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        fs::write(&path, content).expect("should write config content");
        path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "");

        let subdir = temp.path().join("src").join("js").join("views");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, None);
    }

    #[test]
    #[serial]
    fn test_find_config_from_working_directory() {
        let temp = TempDir::new().expect("should create temp dir");
        write_config(temp.path(), "");
        let nested = temp.path().join("src").join("less");
        fs::create_dir_all(&nested).expect("should create subdirectories");

        let original_dir = env::current_dir().expect("should read working directory");
        env::set_current_dir(&nested).expect("should change directory");
        let found = find_config();
        env::set_current_dir(original_dir).expect("should restore directory");

        let expected = temp.path().canonicalize().expect("should canonicalize").join(CONFIG_FILENAME);
        assert_eq!(found, Some(expected));
    }

    #[test]
    #[serial]
    fn test_load_config_without_file_uses_defaults() {
        let temp = TempDir::new().expect("should create temp dir");

        let original_dir = env::current_dir().expect("should read working directory");
        env::set_current_dir(temp.path()).expect("should change directory");
        let result = load_config(None);
        env::set_current_dir(original_dir).expect("should restore directory");

        let (config, source) = result.expect("defaults should load");
        assert_eq!(config, ForgeConfig::default());
        assert_eq!(source, None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            r#"
[watch]
debounce_ms = 300

[tools]
script_minify = ["uglifyjs", "-c"]
"#,
        );

        let (config, source) =
            load_config(Some(config_path.as_path())).expect("should load valid config");
        assert_eq!(config.watch.debounce_ms, 300);
        assert!(config.tools.script_minify.is_some());
        assert_eq!(source, Some(config_path));
    }

    #[test]
    fn test_load_config_missing_explicit_file_errors() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join("nonexistent.toml");

        let result = load_config(Some(config_path.as_path()));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "this is not valid toml {{{");

        let result = load_config(Some(config_path.as_path()));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), "[watch]\ndebounce_ms = 0\n");

        let result = load_config(Some(config_path.as_path()));
        match result {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("watch.debounce_ms"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides_verbose() {
        let mut config = ForgeConfig::default();
        merge_cli_overrides(&mut config, &CliOverrides { verbose: Some(true), ..Default::default() });
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_merge_cli_overrides_watch() {
        let mut config = ForgeConfig::default();
        let overrides =
            CliOverrides { clear_screen: Some(true), debounce_ms: Some(50), ..Default::default() };

        merge_cli_overrides(&mut config, &overrides);
        assert!(config.watch.clear_screen);
        assert_eq!(config.watch.debounce_ms, 50);
    }

    #[test]
    fn test_merge_cli_overrides_empty_keeps_config() {
        let mut config = ForgeConfig::default();
        merge_cli_overrides(&mut config, &CliOverrides::default());
        assert_eq!(config, ForgeConfig::default());
    }

    #[test]
    fn test_resolve_path_absolute() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
    }

    #[test]
    fn test_resolve_path_relative() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_path(root, Path::new("dist/js/modules.js")),
            PathBuf::from("/project/dist/js/modules.js")
        );
    }

    #[test]
    fn test_project_root() {
        let config_path = Path::new("/project/forge.toml");
        assert_eq!(project_root(config_path), Some(Path::new("/project")));
    }
}
