//! Configuration schema types for `forge.toml`
//!
//! Every section is optional. An empty file (or no file at all) describes the
//! standard project layout with the built-in CSS engine and pass-through
//! stages for tools that are not configured.

use crate::layout::PathConfig;
use crate::placeholder::PlaceholderMap;
use crate::transforms::css::{default_browser_matrix, parse_browser_version, BROWSER_NAMES};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Config file name looked up in the project root and its parents.
pub const CONFIG_FILENAME: &str = "forge.toml";

/// Watch mode settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u32,
    /// Clear terminal on rebuild
    #[serde(default)]
    pub clear_screen: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce(), clear_screen: false }
    }
}

fn default_debounce() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

/// Stylesheet post-processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StylesConfig {
    /// Add vendor prefixes for `browsers`
    #[serde(default = "default_true")]
    pub prefix: bool,
    /// Oldest supported version per browser
    #[serde(default = "default_browser_matrix")]
    pub browsers: BTreeMap<String, String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self { prefix: true, browsers: default_browser_matrix() }
    }
}

/// A literal rewrite applied to the minified markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplaceRule {
    pub from: String,
    pub to: String,
}

/// Markup minifier retention flags and rewrites
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkupConfig {
    /// Keep conditional comments
    #[serde(default = "default_true")]
    pub conditionals: bool,
    /// Keep redundant attributes
    #[serde(default = "default_true")]
    pub spare: bool,
    /// Keep empty attributes
    #[serde(default = "default_true")]
    pub empty: bool,
    /// Keep CDATA sections
    #[serde(default = "default_true")]
    pub cdata: bool,
    /// Keep attribute quotes
    #[serde(default = "default_true")]
    pub quotes: bool,
    /// Collapse whitespace to a single space instead of removing it
    #[serde(default)]
    pub loose: bool,
    /// Rewrites applied after minification, in order
    #[serde(default = "default_replace")]
    pub replace: Vec<ReplaceRule>,
}

fn default_replace() -> Vec<ReplaceRule> {
    vec![ReplaceRule { from: "/src/js/main".to_string(), to: "/dist/js/modules".to_string() }]
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            conditionals: true,
            spare: true,
            empty: true,
            cdata: true,
            quotes: true,
            loose: false,
            replace: default_replace(),
        }
    }
}

impl MarkupConfig {
    /// Command-line flags passed to the markup minifier.
    pub fn minifier_flags(&self) -> Vec<String> {
        [
            (self.conditionals, "--conditionals"),
            (self.spare, "--spare"),
            (self.empty, "--empty"),
            (self.cdata, "--cdata"),
            (self.quotes, "--quotes"),
            (self.loose, "--loose"),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, flag)| flag.to_string())
        .collect()
    }

    /// The rewrite rules as a placeholder map.
    pub fn replacements(&self) -> PlaceholderMap {
        self.replace.iter().map(|r| (r.from.clone(), r.to.clone())).collect()
    }
}

/// External commands for the opaque stages.
///
/// Each command reads content on stdin and writes the result to stdout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_minify: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_minify: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_minify: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_compile: Option<Vec<String>>,
}

impl ToolsConfig {
    fn entries(&self) -> [(&'static str, Option<&Vec<String>>); 4] {
        [
            ("script_minify", self.script_minify.as_ref()),
            ("template_minify", self.template_minify.as_ref()),
            ("markup_minify", self.markup_minify.as_ref()),
            ("style_compile", self.style_compile.as_ref()),
        ]
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root configuration structure for `forge.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForgeConfig {
    #[serde(default)]
    pub paths: PathConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub styles: StylesConfig,
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// Config validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "tools.script_minify")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: '{}' {}", CONFIG_FILENAME, self.field, self.message)
    }
}

impl ForgeConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut push = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        for (name, value) in self.paths.entries() {
            if value.trim().is_empty() {
                push(format!("paths.{}", name), "must be a non-empty path");
            }
        }
        if glob::Pattern::new(&self.paths.templates_pattern()).is_err() {
            push("paths.templates_glob".to_string(), "must be a valid glob pattern");
        }

        if self.watch.debounce_ms == 0 {
            push("watch.debounce_ms".to_string(), "must be a positive integer");
        }

        for (browser, version) in &self.styles.browsers {
            if !BROWSER_NAMES.contains(&browser.as_str()) {
                push(format!("styles.browsers.{}", browser), "is not a known browser");
            } else if parse_browser_version(version).is_none() {
                push(format!("styles.browsers.{}", browser), "must be a version like \"4\" or \"2.3\"");
            }
        }

        for (i, rule) in self.markup.replace.iter().enumerate() {
            if rule.from.is_empty() {
                push(format!("markup.replace[{}].from", i), "must be a non-empty string");
            }
        }

        for (name, argv) in self.tools.entries() {
            if let Some(argv) = argv {
                if argv.first().map_or(true, |p| p.trim().is_empty()) {
                    push(format!("tools.{}", name), "must name a program to run");
                }
            }
        }

        if tracing_subscriber::EnvFilter::try_new(&self.log.level).is_err() {
            push("log.level".to_string(), "must be a valid log filter (e.g. \"info\")");
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
