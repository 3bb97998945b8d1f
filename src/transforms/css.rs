//! Stylesheet prefixing and minification using lightningcss.
//!
//! Both stages expect plain CSS, i.e. the output of the style compiler.
//! Vendor prefixes are added for the configured browser matrix; a matrix
//! entry is the oldest supported version of that browser.

use super::{Result, Transform, TransformError};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use std::collections::BTreeMap;

/// Browser names accepted in `[styles.browsers]`.
pub const BROWSER_NAMES: [&str; 9] =
    ["android", "chrome", "edge", "firefox", "ie", "ios_saf", "opera", "safari", "samsung"];

/// The default support matrix.
pub fn default_browser_matrix() -> BTreeMap<String, String> {
    [
        ("android", "2.3"),
        ("chrome", "20"),
        ("firefox", "24"),
        ("ie", "8"),
        ("ios_saf", "6"),
        ("opera", "12"),
        ("safari", "6"),
    ]
    .into_iter()
    .map(|(name, version)| (name.to_string(), version.to_string()))
    .collect()
}

/// Encode `major[.minor[.patch]]` the way lightningcss stores versions.
///
/// Returns `None` for anything that is not one to three small integers.
pub fn parse_browser_version(text: &str) -> Option<u32> {
    let parts: Vec<&str> = text.trim().split('.').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut encoded = 0u32;
    for (i, part) in parts.iter().enumerate() {
        let value: u32 = part.parse().ok()?;
        if value > 255 && i > 0 {
            return None;
        }
        encoded |= value << (16 - 8 * i as u32);
    }
    Some(encoded)
}

/// Convert a browser matrix to lightningcss targets.
pub fn targets_from_matrix(matrix: &BTreeMap<String, String>) -> std::result::Result<Targets, String> {
    let mut browsers = Browsers::default();
    for (name, version) in matrix {
        let encoded = parse_browser_version(version)
            .ok_or_else(|| format!("invalid version '{}' for browser '{}'", version, name))?;
        let slot = match name.as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            other => return Err(format!("unknown browser '{}'", other)),
        };
        *slot = Some(encoded);
    }
    Ok(Targets::from(browsers))
}

fn process(stage: &str, code: &str, targets: Targets, minify: bool) -> Result<String> {
    let mut sheet = StyleSheet::parse(code, ParserOptions::default())
        .map_err(|e| TransformError::rejected(stage, e.to_string()))?;

    sheet
        .minify(MinifyOptions { targets, ..Default::default() })
        .map_err(|e| TransformError::rejected(stage, e.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions { minify, targets, ..Default::default() })
        .map_err(|e| TransformError::rejected(stage, e.to_string()))?;

    Ok(printed.code)
}

/// Adds vendor prefixes for the target browsers. Output stays readable.
#[derive(Debug, Clone, Copy)]
pub struct CssPrefixer {
    targets: Targets,
}

impl CssPrefixer {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Transform for CssPrefixer {
    fn name(&self) -> &str {
        "css-prefix"
    }

    fn apply(&self, input: &str) -> Result<String> {
        process(self.name(), input, self.targets, false)
    }
}

/// Minifies a stylesheet, keeping prefixes required by the target browsers.
#[derive(Debug, Clone, Copy)]
pub struct CssMinifier {
    targets: Targets,
}

impl CssMinifier {
    pub fn new(targets: Targets) -> Self {
        Self { targets }
    }
}

impl Transform for CssMinifier {
    fn name(&self) -> &str {
        "css-minify"
    }

    fn apply(&self, input: &str) -> Result<String> {
        process(self.name(), input, self.targets, true)
    }
}
