//! Source file discovery and reading for the asset pipelines.

use crate::error::{BuildError, Result};
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Options shared by discovery and watch matching: `*` never crosses a `/`.
pub fn match_options() -> MatchOptions {
    MatchOptions { require_literal_separator: true, ..MatchOptions::default() }
}

/// Discover files matching a glob pattern relative to `base_dir`.
///
/// Returns regular files only, in sorted path order. A pattern that matches
/// nothing yields an empty list.
pub fn discover_files(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&base_dir.to_string_lossy());
    let full_pattern = format!("{}/{}", base.trim_end_matches('/'), pattern);

    let paths = glob_with(&full_pattern, match_options())
        .map_err(|source| BuildError::Pattern { pattern: pattern.to_string(), source })?;

    let mut files = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    files.push(path);
                }
            }
            Err(e) => {
                tracing::warn!(pattern, error = %e, "skipping unreadable path");
            }
        }
    }

    files.sort();
    Ok(files)
}

/// A compiled set of glob patterns matched against project-relative paths.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile `patterns`, failing on the first malformed one.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Pattern::new(p.as_ref()).map_err(|source| BuildError::Pattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Whether any pattern matches the project-relative `path`.
    pub fn matches(&self, path: &Path) -> bool {
        self.patterns.iter().any(|p| p.matches_path_with(path, match_options()))
    }
}

/// Require `path` to be an existing file.
pub fn require_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(BuildError::NotFound(path.to_path_buf()))
    }
}

/// Read a UTF-8 source file.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => BuildError::NotFound(path.to_path_buf()),
        _ => BuildError::Read { path: path.to_path_buf(), source },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    #[test]
    fn test_discover_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/js/lib/b.js");
        touch(temp.path(), "src/js/lib/a.js");
        touch(temp.path(), "src/js/lib/c.txt");

        let files = discover_files(temp.path(), "src/js/lib/*.js").unwrap();
        let names: Vec<_> =
            files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/js/lib/a.js");
        touch(temp.path(), "src/js/lib/vendor/x.js");

        assert_eq!(discover_files(temp.path(), "src/js/lib/*.js").unwrap().len(), 1);
        assert_eq!(discover_files(temp.path(), "src/js/lib/**/*.js").unwrap().len(), 2);
    }

    #[test]
    fn test_discover_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(discover_files(temp.path(), "src/js/views/*.js").unwrap().is_empty());
    }

    #[test]
    fn test_discover_invalid_pattern() {
        let temp = TempDir::new().unwrap();
        let err = discover_files(temp.path(), "src/[").unwrap_err();
        assert!(matches!(err, BuildError::Pattern { .. }));
    }

    #[test]
    fn test_pattern_set_matches_relative_paths() {
        let set = PatternSet::new(&["src/js/templates/**/*.ejs", "src/js/main.js"]).unwrap();

        assert!(set.matches(Path::new("src/js/templates/list.ejs")));
        assert!(set.matches(Path::new("src/js/templates/user/row.ejs")));
        assert!(set.matches(Path::new("src/js/main.js")));
        assert!(!set.matches(Path::new("src/js/lib/main.js")));
        assert!(!set.matches(Path::new("src/less/main.less")));
    }

    #[test]
    fn test_pattern_set_star_stays_in_directory() {
        let set = PatternSet::new(&["src/js/*.js"]).unwrap();
        assert!(set.matches(Path::new("src/js/main.js")));
        assert!(!set.matches(Path::new("src/js/views/app.js")));
    }

    #[test]
    fn test_pattern_set_invalid() {
        assert!(matches!(PatternSet::new(&["src/["]), Err(BuildError::Pattern { .. })));
    }

    #[test]
    fn test_require_file() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/js/main.js");

        assert!(require_file(&temp.path().join("src/js/main.js")).is_ok());
        assert!(matches!(
            require_file(&temp.path().join("src/js/tpl.js")),
            Err(BuildError::NotFound(_))
        ));
        assert!(require_file(&temp.path().join("src/js")).is_err());
    }

    #[test]
    fn test_read_source_missing_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = read_source(&temp.path().join("src/README.md")).unwrap_err();
        assert!(matches!(err, BuildError::NotFound(_)));
    }
}
