//! In-memory build artifacts.

use crate::build::target::AssetKind;
use std::path::{Path, PathBuf};

/// A text buffer tagged with its destination path and kind.
///
/// Artifacts are values: every transformation produces a new one and leaves
/// the original untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    content: String,
    destination: PathBuf,
    kind: AssetKind,
}

impl Artifact {
    pub fn new(content: impl Into<String>, destination: impl Into<PathBuf>, kind: AssetKind) -> Self {
        Self { content: content.into(), destination: destination.into(), kind }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    /// Same destination and kind, new content.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self { content: content.into(), destination: self.destination.clone(), kind: self.kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_content_leaves_original() {
        let original = Artifact::new("a", "dist/js/tpl.js", AssetKind::Script);
        let next = original.with_content("b");

        assert_eq!(original.content(), "a");
        assert_eq!(next.content(), "b");
        assert_eq!(next.destination(), Path::new("dist/js/tpl.js"));
        assert_eq!(next.kind(), AssetKind::Script);
    }
}
