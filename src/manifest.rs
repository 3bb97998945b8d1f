//! Project manifest record and its on-disk store.
//!
//! The manifest is the project's `package.json`. The build reads its metadata
//! (name, description, author, ...) for banners and placeholders, and two
//! build steps mutate it: [`stamp_build_time`] and [`bump_patch`].
//!
//! # Format
//!
//! ```json
//! {
//!   "name": "my-app",
//!   "title": "My App",
//!   "description": "Single page app",
//!   "author": "A",
//!   "license": "MIT",
//!   "repository": "https://example.com/my-app",
//!   "version": "1.2.10",
//!   "lastBuildTimestamp": 1792141503,
//!   "lastBuildDateUtc": "Fri, 16 Oct 2026 09:05:03 GMT"
//! }
//! ```
//!
//! Any other keys (dependencies, scripts, ...) are kept where they are. Key
//! order is preserved across a load/save cycle and new keys are appended, so
//! saving an unmodified record reproduces the file byte for byte as long as
//! it was written by [`ManifestStore::save`].
//!
//! The record is passed explicitly from step to step: each mutation is a
//! pure function from one record to the next, and the caller persists the
//! result before the next step reads it.

use crate::output::write_atomic;
use crate::version::Version;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default manifest filename, relative to the project root.
pub const MANIFEST_FILENAME: &str = "package.json";

pub const KEY_NAME: &str = "name";
pub const KEY_TITLE: &str = "title";
pub const KEY_DESCRIPTION: &str = "description";
pub const KEY_AUTHOR: &str = "author";
pub const KEY_LICENSE: &str = "license";
pub const KEY_REPOSITORY: &str = "repository";
pub const KEY_VERSION: &str = "version";
pub const KEY_LAST_BUILD_TIMESTAMP: &str = "lastBuildTimestamp";
pub const KEY_LAST_BUILD_DATE_UTC: &str = "lastBuildDateUtc";

/// Rendered in place of a field the manifest does not define.
pub const UNKNOWN: &str = "Unknown";

/// Error during manifest operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ManifestError {
    /// No manifest file exists at the configured path
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but could not be read
    #[error("Failed to read manifest {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    /// The file is not valid JSON
    #[error("Failed to parse manifest {}: {source}", path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    /// The file is valid JSON but not an object
    #[error("Manifest {} must contain a JSON object", .0.display())]
    NotAnObject(PathBuf),
    /// The record could not be written back
    #[error("Failed to write manifest {}: {source}", path.display())]
    Persistence { path: PathBuf, source: io::Error },
}

/// Project metadata as stored in the manifest file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestRecord {
    fields: Map<String, Value>,
}

impl ManifestRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a parsed JSON value. Returns `None` unless it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw access to any field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Field names in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.text(KEY_NAME)
    }

    pub fn title(&self) -> Option<&str> {
        self.text(KEY_TITLE)
    }

    pub fn description(&self) -> Option<&str> {
        self.text(KEY_DESCRIPTION)
    }

    pub fn license(&self) -> Option<&str> {
        self.text(KEY_LICENSE)
    }

    /// Author as a string, or the `name` of an author object.
    pub fn author(&self) -> Option<&str> {
        match self.fields.get(KEY_AUTHOR)? {
            Value::String(s) => Some(s),
            Value::Object(o) => o.get("name").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Repository as a string, or the `url` of a repository object.
    pub fn repository(&self) -> Option<&str> {
        match self.fields.get(KEY_REPOSITORY)? {
            Value::String(s) => Some(s),
            Value::Object(o) => o.get("url").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The version text exactly as stored.
    pub fn version_text(&self) -> Option<&str> {
        self.text(KEY_VERSION)
    }

    /// The stored version, parsed leniently.
    ///
    /// A bare JSON number such as `1` is read like the string `"1"`. A
    /// missing version reads as `0.0.0`.
    pub fn version(&self) -> Version {
        match self.fields.get(KEY_VERSION) {
            Some(Value::String(text)) => Version::parse_lenient(text),
            Some(Value::Number(number)) => Version::parse_lenient(&number.to_string()),
            _ => Version::default(),
        }
    }

    /// Seconds since the Unix epoch of the last stamped build.
    pub fn last_build_timestamp(&self) -> Option<i64> {
        self.fields.get(KEY_LAST_BUILD_TIMESTAMP).and_then(Value::as_i64)
    }

    /// Textual UTC date of the last stamped build.
    pub fn last_build_date_utc(&self) -> Option<&str> {
        self.text(KEY_LAST_BUILD_DATE_UTC)
    }

    /// Year of the last stamped build, falling back to the current year.
    pub fn build_year(&self) -> i32 {
        self.last_build_timestamp()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(Utc::now)
            .year()
    }

    /// Serialize with two-space indentation and a trailing newline.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(&self.fields)?;
        json.push('\n');
        Ok(json)
    }
}

/// Return a copy of `record` with the patch component of its version bumped.
///
/// Missing or non-numeric components are treated as 0 first, so `"1"`
/// becomes `"1.0.1"`. The record is not persisted.
pub fn bump_patch(record: &ManifestRecord) -> ManifestRecord {
    let next = record.version().bump_patch();
    record.clone().with_field(KEY_VERSION, next.to_string())
}

/// Return a copy of `record` stamped with the build instant `now`.
///
/// Sets `lastBuildTimestamp` (whole seconds since the epoch) and
/// `lastBuildDateUtc`. An instant older than the stored timestamp leaves the
/// record unchanged, so the stamp never moves backwards.
pub fn stamp_build_time(record: &ManifestRecord, now: DateTime<Utc>) -> ManifestRecord {
    let secs = now.timestamp();
    if record.last_build_timestamp().is_some_and(|prev| prev > secs) {
        return record.clone();
    }
    record
        .clone()
        .with_field(KEY_LAST_BUILD_TIMESTAMP, secs)
        .with_field(KEY_LAST_BUILD_DATE_UTC, format_build_date(now))
}

/// Format an instant the way HTTP dates are written: `Fri, 16 Oct 2026 09:05:03 GMT`.
pub fn format_build_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Reads and writes the manifest file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Create a store for the manifest at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the manifest file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. There is no default: a missing file is an error.
    pub fn load(&self) -> Result<ManifestRecord, ManifestError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound(self.path.clone()));
            }
            Err(source) => return Err(ManifestError::Read { path: self.path.clone(), source }),
        };

        let value: Value = serde_json::from_str(&content)
            .map_err(|source| ManifestError::Parse { path: self.path.clone(), source })?;

        ManifestRecord::from_value(value).ok_or_else(|| ManifestError::NotAnObject(self.path.clone()))
    }

    /// Persist the record, replacing the file atomically.
    pub fn save(&self, record: &ManifestRecord) -> Result<(), ManifestError> {
        let json = record.to_json_string().map_err(|e| ManifestError::Persistence {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;

        write_atomic(&self.path, json.as_bytes())
            .map_err(|source| ManifestError::Persistence { path: self.path.clone(), source })
    }

    /// Load the latest persisted record, apply `step`, and persist the result.
    ///
    /// Returns the record as written.
    pub fn update<F>(&self, step: F) -> Result<ManifestRecord, ManifestError>
    where
        F: FnOnce(&ManifestRecord) -> ManifestRecord,
    {
        let current = self.load()?;
        let next = step(&current);
        self.save(&next)?;
        Ok(next)
    }
}
