//! Asset classes and artifact kinds.
//!
//! An asset class is one category of source with its own pipeline and its
//! own granular task. The artifact kind is the coarser tag carried by the
//! in-memory buffer a pipeline produces.

use std::fmt;
use std::str::FromStr;

/// Declared kind of an in-memory artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Script,
    Style,
    Template,
    Markup,
    Document,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKind::Script => write!(f, "script"),
            AssetKind::Style => write!(f, "style"),
            AssetKind::Template => write!(f, "template"),
            AssetKind::Markup => write!(f, "markup"),
            AssetKind::Document => write!(f, "document"),
        }
    }
}

/// One category of source artifact, each built by its own task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    /// Compiled, prefixed and minified stylesheet
    Styles,
    /// Minified markup shell with placeholders filled in
    Markup,
    /// Stand-alone plugin script
    Plugin,
    /// Mirrored tree of minified templates
    Templates,
    /// Concatenated script bundle
    Scripts,
    /// Regenerated documentation
    Docs,
}

impl AssetClass {
    /// Every class, in the order the composite build runs them.
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Styles,
        AssetClass::Markup,
        AssetClass::Plugin,
        AssetClass::Templates,
        AssetClass::Scripts,
        AssetClass::Docs,
    ];

    /// Name of the granular task that builds this class.
    pub fn task_name(self) -> &'static str {
        match self {
            AssetClass::Styles => "styles",
            AssetClass::Markup => "markup",
            AssetClass::Plugin => "plugin",
            AssetClass::Templates => "templates",
            AssetClass::Scripts => "scripts",
            AssetClass::Docs => "docs",
        }
    }

    /// Kind of the artifacts this class produces.
    pub fn kind(self) -> AssetKind {
        match self {
            AssetClass::Styles => AssetKind::Style,
            AssetClass::Markup => AssetKind::Markup,
            AssetClass::Plugin | AssetClass::Scripts => AssetKind::Script,
            AssetClass::Templates => AssetKind::Template,
            AssetClass::Docs => AssetKind::Document,
        }
    }

    /// Whether outputs of this class carry the metadata banner.
    pub fn has_banner(self) -> bool {
        matches!(self, AssetClass::Styles | AssetClass::Plugin | AssetClass::Scripts)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.task_name())
    }
}

impl FromStr for AssetClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetClass::ALL
            .into_iter()
            .find(|class| class.task_name() == s)
            .ok_or_else(|| format!("Unknown asset class: {}", s))
    }
}
