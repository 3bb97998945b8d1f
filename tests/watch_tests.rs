//! Watch mode routing tests
//!
//! Drive the watcher with synthetic change batches and check which asset
//! classes get rebuilt.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use tempfile::TempDir;

use assetforge::build::{BuildContext, Scheduler};
use assetforge::config::{ForgeConfig, WatchConfig};
use assetforge::transforms::Toolchain;
use assetforge::watch::{subscribe_tasks, Watcher};

fn create_test_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    create_test_file(root, "package.json", "{\n  \"name\": \"site\",\n  \"version\": \"0.3.1\"\n}\n");
    create_test_file(root, "src/less/main.less", "a { color: blue }\n");
    create_test_file(root, "src/less/vars.less", "@blue: blue;\n");
    create_test_file(root, "index-src.html", "<p>##VERSION##</p>\n");
    create_test_file(root, "src/js/tpl.js", "tpl();\n");
    create_test_file(root, "src/js/templates/list.ejs", "<ul></ul>\n");
    create_test_file(root, "src/js/templates.js", "var t;\n");
    create_test_file(root, "src/js/main.js", "main();\n");
    create_test_file(root, "src/README.md", "##NAME##\n");
    temp
}

fn watcher_for(root: &Path) -> Watcher {
    let ctx = BuildContext::new(ForgeConfig::default(), root.to_path_buf(), Toolchain::passthrough());
    let scheduler = Arc::new(Scheduler::standard(Arc::new(ctx)).unwrap());
    let mut watcher = Watcher::new(root, WatchConfig::default());
    subscribe_tasks(&mut watcher, scheduler).unwrap();
    watcher
}

#[test]
fn test_template_change_rebuilds_only_templates() {
    let temp = create_project();
    let root = temp.path();
    let mut watcher = watcher_for(root);

    let fired = watcher.dispatch(&[root.join("src/js/templates/list.ejs")]);

    assert_eq!(fired, vec!["templates"]);
    assert!(root.join("dist/js/templates/list.ejs").is_file());
    assert!(!root.join("dist/css/app.css").exists());
    assert!(!root.join("dist/js/modules.js").exists());
}

#[test]
fn test_style_change_rebuilds_only_styles() {
    let temp = create_project();
    let root = temp.path();
    let mut watcher = watcher_for(root);

    let fired = watcher.dispatch(&[root.join("src/less/vars.less")]);

    assert_eq!(fired, vec!["styles"]);
    assert!(root.join("dist/css/app.css").is_file());
    assert!(!root.join("dist/js/templates").exists());
    assert!(!root.join("index.html").exists());
}

#[test]
fn test_script_changes_route_to_bundle() {
    let temp = create_project();
    let root = temp.path();
    let watcher = watcher_for(root);

    assert_eq!(watcher.matching(Path::new("src/js/views/app.js")), vec!["scripts"]);
    assert_eq!(watcher.matching(Path::new("src/js/templates.js")), vec!["scripts"]);
    assert_eq!(watcher.matching(Path::new("src/js/tpl.js")), vec!["plugin"]);
    assert_eq!(watcher.matching(Path::new("src/README.md")), vec!["docs"]);
    assert!(watcher.matching(Path::new("package.json")).is_empty());
    assert!(watcher.matching(Path::new("dist/js/modules.js")).is_empty());
}

#[test]
fn test_batch_triggers_each_class_once_in_registration_order() {
    let temp = create_project();
    let root = temp.path();
    let mut watcher = watcher_for(root);

    let fired = watcher.dispatch(&[
        root.join("src/js/main.js"),
        root.join("src/less/main.less"),
        root.join("src/js/main.js"),
        root.join("index-src.html"),
    ]);

    assert_eq!(fired, vec!["styles", "markup", "scripts"]);
}

#[test]
fn test_outputs_written_during_watch_do_not_retrigger() {
    let temp = create_project();
    let root = temp.path();
    let mut watcher = watcher_for(root);

    watcher.dispatch(&[root.join("index-src.html"), root.join("src/README.md")]);

    let fired = watcher.dispatch(&[root.join("index.html"), root.join("README.md")]);
    assert!(fired.is_empty());
}

#[test]
fn test_failed_rebuild_keeps_watching() {
    let temp = create_project();
    let root = temp.path();
    let mut watcher = watcher_for(root);
    fs::remove_file(root.join("src/js/main.js")).unwrap();

    assert_eq!(watcher.dispatch(&[root.join("src/js/templates.js")]), vec!["scripts"]);
    assert!(!root.join("dist/js/modules.js").exists());

    create_test_file(root, "src/js/main.js", "main();\n");
    assert_eq!(watcher.dispatch(&[root.join("src/js/main.js")]), vec!["scripts"]);
    assert!(root.join("dist/js/modules.js").is_file());
}

#[test]
fn test_overlapping_subscriptions_fire_in_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut watcher = Watcher::new("/site", WatchConfig::default());

    for (label, pattern) in [("any-js", "src/js/**/*.js"), ("entry", "src/js/main.js")] {
        let log = Rc::clone(&log);
        watcher
            .watch(label, &[pattern], move |paths: &[PathBuf]| {
                log.borrow_mut().push((label, paths.to_vec()))
            })
            .unwrap();
    }

    watcher.dispatch(&[PathBuf::from("/site/src/js/main.js")]);

    let log = log.borrow();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, "any-js");
    assert_eq!(log[1], ("entry", vec![PathBuf::from("src/js/main.js")]));
}
