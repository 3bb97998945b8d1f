//! Content transform stages.
//!
//! A stage is a pure `content -> content` function behind the [`Transform`]
//! trait. Minifiers and compilers are opaque to the build: they are either
//! external commands configured in `[tools]`, the built-in CSS engine, or a
//! pass-through when nothing is configured.
//!
//! # Module Structure
//!
//! - [`command`] - Stages backed by an external program (stdin to stdout)
//! - [`css`] - Vendor prefixing and minification of plain stylesheets
//! - [`text`] - Pass-through and placeholder substitution stages

pub mod command;
pub mod css;
pub mod text;

pub use command::ExternalCommand;
pub use css::{CssMinifier, CssPrefixer};
pub use text::{Passthrough, Substitute};

use crate::config::ForgeConfig;
use std::fmt;
use std::sync::Arc;

/// Errors raised by a transform stage.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TransformError {
    /// The stage rejected its input (malformed source, tool error)
    #[error("{stage} rejected its input: {message}")]
    Rejected { stage: String, message: String },

    /// The external program could not be started
    #[error("{stage} could not run `{program}`: {source}")]
    Spawn {
        stage: String,
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The configured command line is unusable
    #[error("{stage} has an empty command line")]
    EmptyCommand { stage: String },
}

impl TransformError {
    /// Shorthand for [`TransformError::Rejected`].
    pub fn rejected(stage: &str, message: impl Into<String>) -> Self {
        TransformError::Rejected { stage: stage.to_string(), message: message.into() }
    }
}

/// Result type alias for transform operations.
pub type Result<T> = std::result::Result<T, TransformError>;

/// A single content-to-content pipeline stage.
pub trait Transform: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Transform `input`, returning the new content.
    fn apply(&self, input: &str) -> Result<String>;
}

/// Shared handle to a stage.
pub type Stage = Arc<dyn Transform>;

/// The opaque stages used by the asset pipelines.
#[derive(Clone)]
pub struct Toolchain {
    pub script_minify: Stage,
    pub template_minify: Stage,
    pub markup_minify: Stage,
    pub style_compile: Stage,
    /// Vendor prefixing, skipped when disabled
    pub style_prefix: Option<Stage>,
    pub style_minify: Stage,
}

impl Toolchain {
    /// Build the toolchain described by the `[tools]`, `[styles]` and
    /// `[markup]` sections.
    ///
    /// Stages without a configured command pass content through unchanged.
    pub fn from_config(config: &ForgeConfig) -> Result<Self> {
        let tools = &config.tools;

        let markup_argv = tools.markup_minify.as_ref().map(|argv| {
            let mut argv = argv.clone();
            argv.extend(config.markup.minifier_flags());
            argv
        });

        let targets = if config.styles.prefix {
            Some(css::targets_from_matrix(&config.styles.browsers).map_err(|message| {
                TransformError::Rejected { stage: "styles.browsers".to_string(), message }
            })?)
        } else {
            None
        };

        Ok(Self {
            script_minify: command_or_passthrough("script-minify", tools.script_minify.as_ref())?,
            template_minify: command_or_passthrough(
                "template-minify",
                tools.template_minify.as_ref(),
            )?,
            markup_minify: command_or_passthrough("markup-minify", markup_argv.as_ref())?,
            style_compile: command_or_passthrough("style-compile", tools.style_compile.as_ref())?,
            style_prefix: targets.map(|t| Arc::new(CssPrefixer::new(t)) as Stage),
            style_minify: Arc::new(CssMinifier::new(targets.unwrap_or_default())),
        })
    }

    /// A toolchain where every stage passes content through unchanged.
    pub fn passthrough() -> Self {
        let stage = |name: &str| Arc::new(Passthrough::new(name)) as Stage;
        Self {
            script_minify: stage("script-minify"),
            template_minify: stage("template-minify"),
            markup_minify: stage("markup-minify"),
            style_compile: stage("style-compile"),
            style_prefix: None,
            style_minify: stage("style-minify"),
        }
    }
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Toolchain")
            .field("script_minify", &self.script_minify.name())
            .field("template_minify", &self.template_minify.name())
            .field("markup_minify", &self.markup_minify.name())
            .field("style_compile", &self.style_compile.name())
            .field("style_prefix", &self.style_prefix.as_ref().map(|s| s.name()))
            .field("style_minify", &self.style_minify.name())
            .finish()
    }
}

fn command_or_passthrough(stage: &str, argv: Option<&Vec<String>>) -> Result<Stage> {
    match argv {
        Some(argv) => Ok(Arc::new(ExternalCommand::new(stage, argv.clone())?)),
        None => {
            tracing::warn!(stage, "no tool configured, content passes through unchanged");
            Ok(Arc::new(Passthrough::new(stage)))
        }
    }
}
