//! Watch mode for automatic rebuilds on file changes
//!
//! A [`Watcher`] holds subscriptions (glob patterns plus a handler) and
//! turns debounced file-system batches into handler calls. [`watch_tasks`]
//! binds every watched scheduler task to its trigger patterns and runs the
//! loop for the `forge watch` command.

use crate::build::{BuildResult, PatternSet, Scheduler, TaskStatus};
use crate::config::schema::WatchConfig;
use crate::error::BuildError;
use chrono::Local;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;

/// Error during watch mode
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch {}: {source}", path.display())]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    ChannelError(String),
    /// Project root does not exist
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),
    /// A subscription pattern is malformed
    #[error(transparent)]
    Pattern(#[from] BuildError),
}

/// Handler invoked with the project-relative paths that matched its patterns.
pub type Handler = Box<dyn FnMut(&[PathBuf])>;

struct Subscription {
    label: String,
    patterns: PatternSet,
    handler: Handler,
}

/// Debounced file watcher with pattern subscriptions.
///
/// Within one debounced batch every subscription fires at most once, and
/// subscriptions fire in registration order.
pub struct Watcher {
    root: PathBuf,
    canonical_root: Option<PathBuf>,
    config: WatchConfig,
    subscriptions: Vec<Subscription>,
}

impl Watcher {
    /// Create a watcher for the project at `root`.
    pub fn new(root: impl Into<PathBuf>, config: WatchConfig) -> Self {
        let root = root.into();
        let canonical_root = root.canonicalize().ok();
        Self { root, canonical_root, config, subscriptions: Vec::new() }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(u64::from(self.config.debounce_ms))
    }

    /// Register a persistent subscription.
    pub fn watch<S, F>(&mut self, label: &str, patterns: &[S], handler: F) -> Result<(), WatchError>
    where
        S: AsRef<str>,
        F: FnMut(&[PathBuf]) + 'static,
    {
        let patterns = PatternSet::new(patterns)?;
        self.subscriptions.push(Subscription {
            label: label.to_string(),
            patterns,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Labels of the subscriptions matching a project-relative path.
    pub fn matching(&self, path: &Path) -> Vec<&str> {
        self.subscriptions
            .iter()
            .filter(|s| s.patterns.matches(path))
            .map(|s| s.label.as_str())
            .collect()
    }

    /// Reduce a raw batch to distinct project-relative paths that match at
    /// least one subscription, in first-seen order.
    pub fn relevant(&self, changed: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        changed
            .iter()
            .filter_map(|path| self.relativize(path))
            .filter(|path| self.subscriptions.iter().any(|s| s.patterns.matches(path)))
            .filter(|path| seen.insert(path.clone()))
            .collect()
    }

    /// Invoke each subscription matching any of `relevant` once, in
    /// registration order. Returns the labels that fired.
    pub fn notify(&mut self, relevant: &[PathBuf]) -> Vec<String> {
        let mut fired = Vec::new();
        for subscription in &mut self.subscriptions {
            let hits: Vec<PathBuf> =
                relevant.iter().filter(|p| subscription.patterns.matches(p)).cloned().collect();
            if hits.is_empty() {
                continue;
            }
            tracing::debug!(subscription = %subscription.label, paths = hits.len(), "triggered");
            (subscription.handler)(hits.as_slice());
            fired.push(subscription.label.clone());
        }
        fired
    }

    /// Process one batch of changed paths.
    pub fn dispatch(&mut self, changed: &[PathBuf]) -> Vec<String> {
        let relevant = self.relevant(changed);
        self.notify(&relevant)
    }

    /// Watch the project root until the channel closes.
    ///
    /// Events are handled one batch at a time; a batch arriving while
    /// handlers run is queued for the next iteration.
    pub fn run(&mut self) -> Result<(), WatchError> {
        if !self.root.is_dir() {
            return Err(WatchError::RootNotFound(self.root.clone()));
        }

        let (tx, rx) = channel();
        let mut debouncer = new_debouncer(self.debounce(), tx).map_err(WatchError::WatcherInit)?;
        debouncer
            .watcher()
            .watch(&self.root, RecursiveMode::Recursive)
            .map_err(|source| WatchError::WatchPath { path: self.root.clone(), source })?;

        println!("[{}] Watching {} for changes...", timestamp(), self.root.display());

        loop {
            match rx.recv() {
                Ok(Ok(events)) => {
                    let changed: Vec<PathBuf> = events
                        .into_iter()
                        .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                        .map(|e| e.path)
                        .collect();

                    let relevant = self.relevant(&changed);
                    if relevant.is_empty() {
                        continue;
                    }

                    if self.config.clear_screen {
                        clear_screen();
                    }
                    for path in &relevant {
                        println!("[{}] Changed: {}", timestamp(), path.display());
                    }

                    self.notify(&relevant);
                    println!("[{}] Watching {} for changes...", timestamp(), self.root.display());
                }
                Ok(Err(error)) => {
                    eprintln!("[{}] Watch error: {:?}", timestamp(), error);
                    eprintln!("[{}] Continuing to watch...", timestamp());
                }
                Err(e) => {
                    return Err(WatchError::ChannelError(e.to_string()));
                }
            }
        }
    }

    fn relativize(&self, path: &Path) -> Option<PathBuf> {
        if path.is_relative() {
            return Some(path.to_path_buf());
        }
        if let Ok(rel) = path.strip_prefix(&self.root) {
            return Some(rel.to_path_buf());
        }
        self.canonical_root
            .as_ref()
            .and_then(|root| path.strip_prefix(root).ok())
            .map(Path::to_path_buf)
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.subscriptions.iter().map(|s| s.label.as_str()).collect();
        f.debug_struct("Watcher")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("subscriptions", &labels)
            .finish()
    }
}

/// Tracks failing tasks across rebuilds for recovery detection
#[derive(Debug, Default)]
pub struct ErrorTracker {
    failing: HashSet<String>,
}

impl ErrorTracker {
    /// Create a new error tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a task run. Returns true when the task had
    /// failed previously and now succeeded.
    pub fn update(&mut self, task: &str, result: &BuildResult) -> bool {
        if result.is_success() {
            self.failing.remove(task)
        } else {
            self.failing.insert(task.to_string());
            false
        }
    }

    /// Check if there are any tracked errors
    pub fn has_errors(&self) -> bool {
        !self.failing.is_empty()
    }

    /// Get the number of failing tasks
    pub fn error_count(&self) -> usize {
        self.failing.len()
    }
}

/// Subscribe every watched scheduler task to its trigger patterns.
///
/// Each handler runs its task to completion and reports the outcome; a
/// failed rebuild is reported and watching continues.
pub fn subscribe_tasks(watcher: &mut Watcher, scheduler: Arc<Scheduler>) -> Result<(), WatchError> {
    let tracker = Rc::new(RefCell::new(ErrorTracker::new()));

    for task in scheduler.watched() {
        let name = task.name().to_string();
        let scheduler = Arc::clone(&scheduler);
        let tracker = Rc::clone(&tracker);

        watcher.watch(task.name(), task.triggers(), move |_changed| {
            println!("[{}] Building {}...", timestamp(), name);
            match scheduler.run(&name) {
                Ok(result) => {
                    let fixed = tracker.borrow_mut().update(&name, &result);
                    print_task_result(&name, &result, fixed);

                    let tracker = tracker.borrow();
                    if tracker.has_errors() {
                        println!("[{}] {} task(s) still failing", timestamp(), tracker.error_count());
                    }
                }
                Err(e) => {
                    tracing::warn!(task = %name, error = %e, "rebuild not started");
                    eprintln!("[{}] Error: {}", timestamp(), e);
                }
            }
        })?;
    }

    Ok(())
}

/// Watch the project and re-run affected tasks until interrupted.
pub fn watch_tasks(
    scheduler: Arc<Scheduler>,
    root: &Path,
    config: WatchConfig,
) -> Result<(), WatchError> {
    let mut watcher = Watcher::new(root, config);
    subscribe_tasks(&mut watcher, scheduler)?;
    watcher.run()
}

/// Clear the terminal screen
fn clear_screen() {
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Local wall-clock time for log lines
fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn print_task_result(task: &str, result: &BuildResult, fixed: bool) {
    if fixed {
        println!("[{}] Fixed: {}", timestamp(), task);
    }

    if result.is_success() {
        let files = result.all_outputs().len();
        println!(
            "[{}] Build complete ({}) - {}: {} file{}",
            timestamp(),
            format_duration(result.total_duration),
            task,
            files,
            if files == 1 { "" } else { "s" }
        );
    } else {
        println!(
            "[{}] Build failed ({}) - {}",
            timestamp(),
            format_duration(result.total_duration),
            task
        );
        for failure in result.failures() {
            if let TaskStatus::Failed { message, .. } = &failure.status {
                eprintln!("[{}] Error: {}", timestamp(), message);
            }
        }
    }
}
