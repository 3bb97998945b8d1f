//! Criterion benchmarks for assetforge critical paths
//!
//! Benchmarks the operations every build repeats:
//! - Placeholder: single-pass token substitution
//! - Banner: header rendering and prepending
//! - Pipeline: concatenation through in-process stages
//! - CSS: prefixing and minification of a compiled stylesheet

use assetforge::banner::{prepend_text, render_banner};
use assetforge::build::TransformPipeline;
use assetforge::manifest::{ManifestRecord, KEY_AUTHOR, KEY_DESCRIPTION, KEY_NAME, KEY_VERSION};
use assetforge::placeholder::{markup_tokens, substitute};
use assetforge::transforms::css::{default_browser_matrix, targets_from_matrix};
use assetforge::transforms::{CssMinifier, CssPrefixer, Passthrough};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// =============================================================================
// Test Data Generators
// =============================================================================

fn make_record() -> ManifestRecord {
    ManifestRecord::new()
        .with_field(KEY_NAME, "bench-app")
        .with_field(KEY_DESCRIPTION, "Benchmark fixture")
        .with_field(KEY_AUTHOR, "Bench")
        .with_field(KEY_VERSION, "3.14.159")
}

/// Markup with a placeholder every few lines
fn make_markup(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 4 {
            0 => "<h1>##TITLE##</h1>".to_string(),
            1 => "<p>v##VERSION## by ##AUTHOR##</p>".to_string(),
            _ => format!("<div class=\"row-{}\">plain content</div>", i),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Stylesheet with rules that need vendor prefixes
fn make_stylesheet(rules: usize) -> String {
    (0..rules)
        .map(|i| {
            format!(
                ".item-{} {{ display: flex; transition: transform 0.2s; user-select: none; color: #ff0000; }}",
                i
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Placeholder Benchmarks
// =============================================================================

fn bench_placeholder(c: &mut Criterion) {
    let mut group = c.benchmark_group("placeholder");
    let tokens = markup_tokens(&make_record());

    for size in [16, 256, 4096].iter() {
        let markup = make_markup(*size);
        group.throughput(Throughput::Bytes(markup.len() as u64));
        group.bench_with_input(BenchmarkId::new("substitute", size), &markup, |b, markup| {
            b.iter(|| substitute(black_box(markup), &tokens))
        });
    }

    group.finish();
}

// =============================================================================
// Banner Benchmarks
// =============================================================================

fn bench_banner(c: &mut Criterion) {
    let mut group = c.benchmark_group("banner");
    let record = make_record();
    let body = "x".repeat(64 * 1024);

    group.bench_function("render", |b| b.iter(|| render_banner(black_box(&record))));
    group.bench_function("prepend_64k", |b| {
        let banner = render_banner(&record);
        b.iter(|| prepend_text(black_box(&banner), black_box(&body)))
    });

    group.finish();
}

// =============================================================================
// Pipeline Benchmarks
// =============================================================================

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let pipeline = TransformPipeline::new()
        .then_stage(Passthrough::new("script-minify"))
        .then_stage(Passthrough::new("noop"));

    for count in [8, 64, 512].iter() {
        let inputs: Vec<String> = (0..*count).map(|i| format!("var m{} = {{}};", i)).collect();
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("concat", count), &inputs, |b, inputs| {
            b.iter(|| pipeline.run(black_box(inputs)))
        });
    }

    group.finish();
}

// =============================================================================
// CSS Benchmarks
// =============================================================================

fn bench_css(c: &mut Criterion) {
    let mut group = c.benchmark_group("css");
    let targets = targets_from_matrix(&default_browser_matrix()).unwrap_or_default();
    let pipeline = TransformPipeline::new()
        .then_stage(CssPrefixer::new(targets))
        .then_stage(CssMinifier::new(targets));

    for rules in [10, 100].iter() {
        let css = make_stylesheet(*rules);
        group.throughput(Throughput::Bytes(css.len() as u64));
        group.bench_with_input(BenchmarkId::new("prefix_minify", rules), &css, |b, css| {
            b.iter(|| pipeline.apply(black_box(css)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_placeholder, bench_banner, bench_pipeline, bench_css);

criterion_main!(benches);
