//! Project layout: where each asset class reads its sources and writes its outputs.
//!
//! All paths are relative to the project root and use `/` separators so
//! they double as glob patterns.

use crate::build::target::AssetClass;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Source and destination paths for every asset class (`[paths]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathConfig {
    /// Root of the script sources
    #[serde(default = "default_scripts_dir")]
    pub scripts_dir: String,
    /// Script subdirectories under `scripts_dir`, in concatenation order
    #[serde(default = "default_script_subdirs")]
    pub script_subdirs: Vec<String>,
    /// Compiled templates module, concatenated after the subdirectories
    #[serde(default = "default_templates_module")]
    pub templates_module: String,
    /// Script entry point, concatenated last
    #[serde(default = "default_script_entry")]
    pub script_entry: String,
    /// Concatenated script bundle
    #[serde(default = "default_scripts_out")]
    pub scripts_out: String,

    /// Template source tree
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Template file pattern, relative to `templates_dir`
    #[serde(default = "default_templates_glob")]
    pub templates_glob: String,
    /// Destination tree for minified templates
    #[serde(default = "default_templates_out")]
    pub templates_out: String,

    /// Stand-alone plugin script
    #[serde(default = "default_plugin")]
    pub plugin: String,
    #[serde(default = "default_plugin_out")]
    pub plugin_out: String,

    /// Markup shell
    #[serde(default = "default_markup")]
    pub markup: String,
    #[serde(default = "default_markup_out")]
    pub markup_out: String,

    /// Stylesheet source tree (watched)
    #[serde(default = "default_styles_dir")]
    pub styles_dir: String,
    /// Stylesheet entry file
    #[serde(default = "default_style_entry")]
    pub style_entry: String,
    #[serde(default = "default_styles_out")]
    pub styles_out: String,

    /// Documentation source
    #[serde(default = "default_docs")]
    pub docs: String,
    #[serde(default = "default_docs_out")]
    pub docs_out: String,

    /// Project manifest
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_scripts_dir() -> String {
    "src/js".to_string()
}

fn default_script_subdirs() -> Vec<String> {
    ["lib", "models", "collections", "views"].iter().map(|s| s.to_string()).collect()
}

fn default_templates_module() -> String {
    "templates.js".to_string()
}

fn default_script_entry() -> String {
    "main.js".to_string()
}

fn default_scripts_out() -> String {
    "dist/js/modules.js".to_string()
}

fn default_templates_dir() -> String {
    "src/js/templates".to_string()
}

fn default_templates_glob() -> String {
    "**/*.ejs".to_string()
}

fn default_templates_out() -> String {
    "dist/js/templates".to_string()
}

fn default_plugin() -> String {
    "src/js/tpl.js".to_string()
}

fn default_plugin_out() -> String {
    "dist/js/tpl.js".to_string()
}

fn default_markup() -> String {
    "index-src.html".to_string()
}

fn default_markup_out() -> String {
    "index.html".to_string()
}

fn default_styles_dir() -> String {
    "src/less".to_string()
}

fn default_style_entry() -> String {
    "src/less/main.less".to_string()
}

fn default_styles_out() -> String {
    "dist/css/app.css".to_string()
}

fn default_docs() -> String {
    "src/README.md".to_string()
}

fn default_docs_out() -> String {
    "README.md".to_string()
}

fn default_manifest() -> String {
    crate::manifest::MANIFEST_FILENAME.to_string()
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            scripts_dir: default_scripts_dir(),
            script_subdirs: default_script_subdirs(),
            templates_module: default_templates_module(),
            script_entry: default_script_entry(),
            scripts_out: default_scripts_out(),
            templates_dir: default_templates_dir(),
            templates_glob: default_templates_glob(),
            templates_out: default_templates_out(),
            plugin: default_plugin(),
            plugin_out: default_plugin_out(),
            markup: default_markup(),
            markup_out: default_markup_out(),
            styles_dir: default_styles_dir(),
            style_entry: default_style_entry(),
            styles_out: default_styles_out(),
            docs: default_docs(),
            docs_out: default_docs_out(),
            manifest: default_manifest(),
        }
    }
}

/// One entry of the script concatenation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptSource {
    /// Every file matching the pattern, in sorted order (may match nothing)
    Glob(String),
    /// A single file that must exist
    File(String),
}

fn join(dir: &str, rest: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", dir, rest)
    }
}

impl PathConfig {
    /// Script inputs in concatenation order: each subdirectory, then the
    /// templates module, then the entry point.
    pub fn script_sources(&self) -> Vec<ScriptSource> {
        let mut sources: Vec<ScriptSource> = self
            .script_subdirs
            .iter()
            .map(|sub| ScriptSource::Glob(join(&join(&self.scripts_dir, sub), "*.js")))
            .collect();
        sources.push(ScriptSource::File(join(&self.scripts_dir, &self.templates_module)));
        sources.push(ScriptSource::File(join(&self.scripts_dir, &self.script_entry)));
        sources
    }

    /// Glob selecting every template source.
    pub fn templates_pattern(&self) -> String {
        join(&self.templates_dir, &self.templates_glob)
    }

    /// Destination of a template, mirroring its path under `templates_dir`.
    pub fn template_destination(&self, relative: &Path) -> PathBuf {
        Path::new(&self.templates_out).join(relative)
    }

    /// Watch patterns that should re-run the task for `class`.
    pub fn triggers(&self, class: AssetClass) -> Vec<String> {
        match class {
            AssetClass::Styles => vec![join(&self.styles_dir, "**/*.less")],
            AssetClass::Markup => vec![self.markup.clone()],
            AssetClass::Plugin => vec![self.plugin.clone()],
            AssetClass::Templates => vec![self.templates_pattern()],
            AssetClass::Scripts => {
                let mut patterns: Vec<String> = self
                    .script_subdirs
                    .iter()
                    .map(|sub| join(&join(&self.scripts_dir, sub), "**/*.js"))
                    .collect();
                patterns.push(join(&self.scripts_dir, &self.script_entry));
                patterns.push(join(&self.scripts_dir, &self.templates_module));
                patterns
            }
            AssetClass::Docs => vec![self.docs.clone()],
        }
    }

    /// Every configured path, addressed by its field name.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("scripts_dir", self.scripts_dir.as_str()),
            ("templates_module", self.templates_module.as_str()),
            ("script_entry", self.script_entry.as_str()),
            ("scripts_out", self.scripts_out.as_str()),
            ("templates_dir", self.templates_dir.as_str()),
            ("templates_glob", self.templates_glob.as_str()),
            ("templates_out", self.templates_out.as_str()),
            ("plugin", self.plugin.as_str()),
            ("plugin_out", self.plugin_out.as_str()),
            ("markup", self.markup.as_str()),
            ("markup_out", self.markup_out.as_str()),
            ("styles_dir", self.styles_dir.as_str()),
            ("style_entry", self.style_entry.as_str()),
            ("styles_out", self.styles_out.as_str()),
            ("docs", self.docs.as_str()),
            ("docs_out", self.docs_out.as_str()),
            ("manifest", self.manifest.as_str()),
        ]
    }
}
