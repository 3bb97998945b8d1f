//! Per-asset-class build actions.
//!
//! Each action reads its sources, runs them through the class pipeline and
//! writes the result. The order of operations is fixed:
//!
//! | Class | Pipeline |
//! |-------|----------|
//! | styles | compile, prefix (optional), minify, banner |
//! | markup | minify, rewrites + manifest placeholders |
//! | plugin | minify, banner |
//! | templates | minify, one output per input |
//! | scripts | concatenate, minify, banner |
//! | docs | manifest placeholders |
//!
//! The banner is added last so it survives minification and appears once
//! per output. Outputs are written atomically and only after every stage has
//! succeeded, so a failed action leaves previous outputs untouched.

use crate::banner::{self, render_banner};
use crate::build::artifact::Artifact;
use crate::build::context::BuildContext;
use crate::build::discovery::{discover_files, read_source, require_file};
use crate::build::pipeline::TransformPipeline;
use crate::build::target::{AssetClass, AssetKind};
use crate::error::{BuildError, Result};
use crate::layout::ScriptSource;
use crate::manifest::ManifestRecord;
use crate::output::write_atomic;
use crate::placeholder::{docs_tokens, markup_tokens};
use crate::transforms::Substitute;
use std::path::{Path, PathBuf};

/// Build one asset class, loading the latest persisted manifest when the
/// class needs metadata.
///
/// Returns the paths written.
pub fn build_class(ctx: &BuildContext, class: AssetClass) -> Result<Vec<PathBuf>> {
    if class == AssetClass::Templates {
        return build_templates(ctx);
    }

    let record = ctx.manifest_store().load()?;
    build_class_with(ctx, class, &record)
}

/// Build one asset class with an explicit manifest record.
pub fn build_class_with(
    ctx: &BuildContext,
    class: AssetClass,
    record: &ManifestRecord,
) -> Result<Vec<PathBuf>> {
    match class {
        AssetClass::Styles => build_styles(ctx, record),
        AssetClass::Markup => build_markup(ctx, record),
        AssetClass::Plugin => build_plugin(ctx, record),
        AssetClass::Templates => build_templates(ctx),
        AssetClass::Scripts => build_scripts(ctx, record),
        AssetClass::Docs => build_docs(ctx, record),
    }
}

/// Compile, prefix and minify the stylesheet entry, then add the banner.
pub fn build_styles(ctx: &BuildContext, record: &ManifestRecord) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let tools = ctx.toolchain();
    let (source, content) = read_required(ctx, &paths.style_entry)?;

    let pipeline = TransformPipeline::new()
        .then(tools.style_compile.clone())
        .then_maybe(tools.style_prefix.clone())
        .then(tools.style_minify.clone());

    let css = run_pipeline(&pipeline, &[content], &source)?;
    let artifact = Artifact::new(css, &paths.styles_out, AssetKind::Style);
    let artifact = banner::prepend(&artifact, &render_banner(record));

    Ok(vec![write_artifact(ctx, &artifact)?])
}

/// Minify the markup shell and fill in rewrites and manifest placeholders.
pub fn build_markup(ctx: &BuildContext, record: &ManifestRecord) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let (source, content) = read_required(ctx, &paths.markup)?;

    let mut placeholders = ctx.config().markup.replacements();
    placeholders.extend(&markup_tokens(record));

    let pipeline = TransformPipeline::new()
        .then(ctx.toolchain().markup_minify.clone())
        .then_stage(Substitute::new(placeholders));

    let html = run_pipeline(&pipeline, &[content], &source)?;
    let artifact = Artifact::new(html, &paths.markup_out, AssetKind::Markup);

    Ok(vec![write_artifact(ctx, &artifact)?])
}

/// Minify the stand-alone plugin script and add the banner.
pub fn build_plugin(ctx: &BuildContext, record: &ManifestRecord) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let (source, content) = read_required(ctx, &paths.plugin)?;

    let pipeline = TransformPipeline::new().then(ctx.toolchain().script_minify.clone());

    let js = run_pipeline(&pipeline, &[content], &source)?;
    let artifact = Artifact::new(js, &paths.plugin_out, AssetKind::Script);
    let artifact = banner::prepend(&artifact, &render_banner(record));

    Ok(vec![write_artifact(ctx, &artifact)?])
}

/// Minify every template into a mirrored output tree.
///
/// All templates are transformed before any is written, so one malformed
/// template leaves the whole output tree as it was. A write failure stops
/// at the first template that could not be written; templates written
/// before it keep their new content.
pub fn build_templates(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let base = ctx.resolve_path(&paths.templates_dir);
    let sources = discover_files(ctx.project_root(), &paths.templates_pattern())?;

    if sources.is_empty() {
        tracing::debug!(pattern = %paths.templates_pattern(), "no templates found");
    }

    let pipeline = TransformPipeline::new().then(ctx.toolchain().template_minify.clone());

    let mut artifacts = Vec::with_capacity(sources.len());
    for source in &sources {
        let content = read_source(source)?;
        let minified = run_pipeline(&pipeline, &[content], source)?;
        let relative = relative_to(&base, source);
        artifacts.push(Artifact::new(
            minified,
            paths.template_destination(&relative),
            AssetKind::Template,
        ));
    }

    artifacts.iter().map(|artifact| write_artifact(ctx, artifact)).collect()
}

/// Concatenate the script sources in precedence order, minify, add the banner.
pub fn build_scripts(ctx: &BuildContext, record: &ManifestRecord) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let sources = script_sources(ctx)?;

    let contents = sources.iter().map(|path| read_source(path)).collect::<Result<Vec<_>>>()?;

    let pipeline = TransformPipeline::new().then(ctx.toolchain().script_minify.clone());

    let bundle_source = ctx.resolve_path(&paths.scripts_dir);
    let js = run_pipeline(&pipeline, &contents, &bundle_source)?;
    let artifact = Artifact::new(js, &paths.scripts_out, AssetKind::Script);
    let artifact = banner::prepend(&artifact, &render_banner(record));

    Ok(vec![write_artifact(ctx, &artifact)?])
}

/// Regenerate the documentation with manifest placeholders filled in.
pub fn build_docs(ctx: &BuildContext, record: &ManifestRecord) -> Result<Vec<PathBuf>> {
    let paths = ctx.paths();
    let (source, content) = read_required(ctx, &paths.docs)?;

    let pipeline = TransformPipeline::new().then_stage(Substitute::new(docs_tokens(record)));

    let text = run_pipeline(&pipeline, &[content], &source)?;
    let artifact = Artifact::new(text, &paths.docs_out, AssetKind::Document);

    Ok(vec![write_artifact(ctx, &artifact)?])
}

/// Resolve the ordered list of script files to concatenate.
///
/// Subdirectory globs may match nothing; the templates module and the entry
/// point must exist.
pub fn script_sources(ctx: &BuildContext) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for source in ctx.paths().script_sources() {
        match source {
            ScriptSource::Glob(pattern) => {
                files.extend(discover_files(ctx.project_root(), &pattern)?);
            }
            ScriptSource::File(path) => {
                files.push(require_file(&ctx.resolve_path(&path))?);
            }
        }
    }
    Ok(files)
}

fn read_required(ctx: &BuildContext, relative: &str) -> Result<(PathBuf, String)> {
    let path = require_file(&ctx.resolve_path(relative))?;
    let content = read_source(&path)?;
    Ok((path, content))
}

fn run_pipeline(pipeline: &TransformPipeline, inputs: &[String], source: &Path) -> Result<String> {
    tracing::trace!(
        source = %source.display(),
        inputs = inputs.len(),
        stages = pipeline.len(),
        "running pipeline"
    );
    pipeline
        .run(inputs)
        .map_err(|e| BuildError::Transform { path: source.to_path_buf(), source: e })
}

fn write_artifact(ctx: &BuildContext, artifact: &Artifact) -> Result<PathBuf> {
    let path = ctx.resolve_path(artifact.destination());
    write_atomic(&path, artifact.content().as_bytes())
        .map_err(|source| BuildError::Persistence { path: path.clone(), source })?;

    tracing::debug!(
        kind = %artifact.kind(),
        path = %ctx.display_path(&path).display(),
        bytes = artifact.content().len(),
        "wrote artifact"
    );
    if ctx.is_verbose() {
        println!("  wrote {}", ctx.display_path(&path).display());
    }
    Ok(path)
}

fn relative_to(base: &Path, path: &Path) -> PathBuf {
    match path.strip_prefix(base) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => path.file_name().map(PathBuf::from).unwrap_or_else(|| path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForgeConfig;
    use crate::manifest::{KEY_AUTHOR, KEY_NAME, KEY_TITLE, KEY_VERSION};
    use crate::transforms::{Toolchain, Transform, TransformError};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Upper;

    impl Transform for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn apply(&self, input: &str) -> crate::transforms::Result<String> {
            Ok(input.to_uppercase())
        }
    }

    struct RejectContaining(&'static str);

    impl Transform for RejectContaining {
        fn name(&self) -> &str {
            "reject"
        }

        fn apply(&self, input: &str) -> crate::transforms::Result<String> {
            if input.contains(self.0) {
                Err(TransformError::rejected("reject", "syntax error"))
            } else {
                Ok(input.to_string())
            }
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn record() -> ManifestRecord {
        ManifestRecord::new()
            .with_field(KEY_NAME, "my-app")
            .with_field(KEY_TITLE, "My App")
            .with_field(KEY_AUTHOR, "A")
            .with_field(KEY_VERSION, "1.2.10")
    }

    fn context(root: &Path, toolchain: Toolchain) -> BuildContext {
        BuildContext::new(ForgeConfig::default(), root.to_path_buf(), toolchain)
    }

    #[test]
    fn test_scripts_concatenate_in_precedence_order() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "src/js/main.js", "main");
        write(root, "src/js/templates.js", "tpls");
        write(root, "src/js/views/b.js", "view-b");
        write(root, "src/js/views/a.js", "view-a");
        write(root, "src/js/models/m.js", "model");
        write(root, "src/js/lib/l.js", "lib");
        write(root, "src/js/collections/c.js", "coll");

        let ctx = context(root, Toolchain::passthrough());
        build_scripts(&ctx, &record()).unwrap();

        let out = fs::read_to_string(root.join("dist/js/modules.js")).unwrap();
        assert!(out.starts_with("/**\n"));
        assert_eq!(out.matches("/**").count(), 1);
        assert!(out.ends_with(" */\nlib\nmodel\ncoll\nview-a\nview-b\ntpls\nmain"));
    }

    #[test]
    fn test_scripts_require_entry_point() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/js/templates.js", "tpls");

        let ctx = context(temp.path(), Toolchain::passthrough());
        let err = build_scripts(&ctx, &record()).unwrap_err();
        assert!(matches!(err, BuildError::NotFound(ref p) if p.ends_with("src/js/main.js")));
    }

    #[test]
    fn test_banner_follows_minification() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/js/tpl.js", "plugin()");

        let mut tools = Toolchain::passthrough();
        tools.script_minify = Arc::new(Upper);
        let ctx = context(temp.path(), tools);
        build_plugin(&ctx, &record()).unwrap();

        let out = fs::read_to_string(temp.path().join("dist/js/tpl.js")).unwrap();
        assert!(out.contains(" * @version v1.2.10\n"));
        assert!(out.ends_with(" */\nPLUGIN()"));
    }

    #[test]
    fn test_markup_rewrites_and_placeholders() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "index-src.html",
            r#"<title>##TITLE##</title><script src="/src/js/main.js"></script>##REPOSITORY##"#,
        );

        let ctx = context(temp.path(), Toolchain::passthrough());
        build_markup(&ctx, &record()).unwrap();

        let out = fs::read_to_string(temp.path().join("index.html")).unwrap();
        assert_eq!(
            out,
            r#"<title>My App</title><script src="/dist/js/modules.js"></script>Unknown"#
        );
    }

    #[test]
    fn test_templates_mirror_tree() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/js/templates/list.ejs", "<ul></ul>");
        write(temp.path(), "src/js/templates/user/row.ejs", "<li></li>");

        let mut tools = Toolchain::passthrough();
        tools.template_minify = Arc::new(Upper);
        let ctx = context(temp.path(), tools);
        let written = build_templates(&ctx).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("dist/js/templates/user/row.ejs")).unwrap(),
            "<LI></LI>"
        );
        assert!(temp.path().join("dist/js/templates/list.ejs").exists());
    }

    #[test]
    fn test_templates_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/js/templates/a.ejs", "fine");
        write(temp.path(), "src/js/templates/b.ejs", "<% broken");
        write(temp.path(), "dist/js/templates/a.ejs", "previous");

        let mut tools = Toolchain::passthrough();
        tools.template_minify = Arc::new(RejectContaining("<% broken"));
        let ctx = context(temp.path(), tools);

        let err = build_templates(&ctx).unwrap_err();
        assert!(matches!(err, BuildError::Transform { ref path, .. } if path.ends_with("b.ejs")));
        assert_eq!(
            fs::read_to_string(temp.path().join("dist/js/templates/a.ejs")).unwrap(),
            "previous"
        );
    }

    #[test]
    fn test_styles_failure_keeps_previous_output() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/less/main.less", "@broken");
        write(temp.path(), "dist/css/app.css", "old css");

        let mut tools = Toolchain::passthrough();
        tools.style_compile = Arc::new(RejectContaining("@broken"));
        let ctx = context(temp.path(), tools);

        let err = build_styles(&ctx, &record()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::TransformFailure);
        assert_eq!(fs::read_to_string(temp.path().join("dist/css/app.css")).unwrap(), "old css");
    }

    #[test]
    fn test_styles_with_builtin_css_engine() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/less/main.less", ".a {\n  color: red;\n}\n");

        let ctx =
            BuildContext::from_config(ForgeConfig::default(), temp.path().to_path_buf()).unwrap();
        build_styles(&ctx, &record()).unwrap();

        let out = fs::read_to_string(temp.path().join("dist/css/app.css")).unwrap();
        assert!(out.ends_with(" */\n.a{color:red}"));
    }

    #[test]
    fn test_docs_placeholders() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/README.md", "# ##NAME## v##VERSION##\nBuilt ##DATE##\n");

        let ctx = context(temp.path(), Toolchain::passthrough());
        build_docs(&ctx, &record()).unwrap();

        let out = fs::read_to_string(temp.path().join("README.md")).unwrap();
        assert_eq!(out, "# my-app v1.2.10\nBuilt Unknown\n");
    }

    #[test]
    fn test_build_class_requires_manifest() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/README.md", "docs");

        let ctx = context(temp.path(), Toolchain::passthrough());
        let err = build_class(&ctx, AssetClass::Docs).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotFound);
        assert!(!temp.path().join("README.md").exists());
    }

    #[test]
    fn test_templates_do_not_need_manifest() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/js/templates/a.ejs", "a");

        let ctx = context(temp.path(), Toolchain::passthrough());
        assert_eq!(build_class(&ctx, AssetClass::Templates).unwrap().len(), 1);
    }
}
