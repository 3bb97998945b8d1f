//! Named tasks and their invocation.
//!
//! The scheduler owns a registry of [`TaskDefinition`]s. A task is either a
//! single action or a composite that runs other tasks in a fixed order.
//! Tasks do not declare dependencies on each other: every action is
//! self-contained and safe to re-run.
//!
//! # Failure policy
//!
//! A failing action is reported in the returned [`BuildResult`]; previous
//! outputs stay in place because actions only write after their pipeline
//! succeeded. Inside a composite, each step's failure is scoped to that step
//! and the composite moves on, except for steps marked
//! [`required`](TaskDefinition::required): when one of those fails, the
//! remaining steps are skipped. The manifest steps are required.

use crate::build::assets::build_class;
use crate::build::context::BuildContext;
use crate::build::discovery::PatternSet;
use crate::build::result::{BuildResult, TaskResult};
use crate::build::target::AssetClass;
use crate::error::{BuildError, Result};
use crate::manifest::{bump_patch, stamp_build_time};
use chrono::Utc;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Name of the composite task that builds everything.
pub const BUILD_TASK: &str = "build";
/// Name of the task that stamps the build time into the manifest.
pub const STAMP_TASK: &str = "stamp";
/// Name of the task that bumps the manifest's patch version.
pub const BUMP_TASK: &str = "bump";

/// A zero-argument effectful operation returning the files it wrote.
pub type Action = Arc<dyn Fn() -> Result<Vec<PathBuf>> + Send + Sync>;

/// What a task does when invoked.
#[derive(Clone)]
pub enum TaskBody {
    /// Run a single action
    Action(Action),
    /// Run the named tasks in order
    Composite(Vec<String>),
}

/// A named task, optionally bound to watch trigger patterns.
#[derive(Clone)]
pub struct TaskDefinition {
    name: String,
    description: String,
    body: TaskBody,
    triggers: Vec<String>,
    required: bool,
}

impl TaskDefinition {
    /// Create a task running `action`.
    pub fn action<F>(name: &str, description: &str, action: F) -> Self
    where
        F: Fn() -> Result<Vec<PathBuf>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            body: TaskBody::Action(Arc::new(action)),
            triggers: Vec::new(),
            required: false,
        }
    }

    /// Create a composite task running `steps` in order.
    pub fn composite(name: &str, description: &str, steps: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            body: TaskBody::Composite(steps.iter().map(|s| s.to_string()).collect()),
            triggers: Vec::new(),
            required: false,
        }
    }

    /// Bind watch trigger patterns (project-relative globs).
    pub fn with_triggers(mut self, triggers: Vec<String>) -> Self {
        self.triggers = triggers;
        self
    }

    /// Mark the task as a prerequisite: when it fails inside a composite,
    /// the composite skips its remaining steps.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn triggers(&self) -> &[String] {
        &self.triggers
    }

    pub fn body(&self) -> &TaskBody {
        &self.body
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.body, TaskBody::Composite(_))
    }

    /// Whether watch mode re-runs this task. Composites never are.
    pub fn is_watched(&self) -> bool {
        !self.is_composite() && !self.triggers.is_empty()
    }
}

impl std::fmt::Debug for TaskDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let steps = match &self.body {
            TaskBody::Action(_) => None,
            TaskBody::Composite(steps) => Some(steps),
        };
        f.debug_struct("TaskDefinition")
            .field("name", &self.name)
            .field("steps", &steps)
            .field("triggers", &self.triggers)
            .finish()
    }
}

/// Execution state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
}

struct Registered {
    definition: TaskDefinition,
    patterns: PatternSet,
}

/// Registry and runner for named tasks.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Registered>,
    states: Mutex<HashMap<String, TaskState>>,
}

/// Marks a task as running for as long as it lives.
struct RunGuard<'a> {
    scheduler: &'a Scheduler,
    name: String,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.states().insert(self.name.clone(), TaskState::Idle);
    }
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard task set for a project:
    ///
    /// - `stamp` and `bump` update the manifest; a build stops when they fail
    /// - one task per asset class, watched on its trigger patterns
    /// - `build` runs stamp, bump, styles, markup, plugin, templates,
    ///   scripts, docs
    pub fn standard(ctx: Arc<BuildContext>) -> Result<Self> {
        let mut scheduler = Scheduler::new();

        let store = ctx.manifest_store();
        scheduler.register(TaskDefinition::action(
            STAMP_TASK,
            "Record the build time in the manifest",
            move || {
                store.update(|record| stamp_build_time(record, Utc::now()))?;
                Ok(vec![store.path().to_path_buf()])
            },
        )
        .required())?;

        let store = ctx.manifest_store();
        scheduler.register(TaskDefinition::action(
            BUMP_TASK,
            "Increment the patch version in the manifest",
            move || {
                store.update(bump_patch)?;
                Ok(vec![store.path().to_path_buf()])
            },
        )
        .required())?;

        for class in AssetClass::ALL {
            let task_ctx = Arc::clone(&ctx);
            let definition = TaskDefinition::action(
                class.task_name(),
                class_description(class),
                move || build_class(&task_ctx, class),
            )
            .with_triggers(ctx.paths().triggers(class));
            scheduler.register(definition)?;
        }

        let mut steps = vec![STAMP_TASK, BUMP_TASK];
        steps.extend(AssetClass::ALL.iter().map(|c| c.task_name()));
        scheduler.register(TaskDefinition::composite(BUILD_TASK, "Build every asset class", &steps))?;

        Ok(scheduler)
    }

    /// Register a task.
    ///
    /// Names are unique; composite steps must name action tasks that are
    /// already registered.
    pub fn register(&mut self, definition: TaskDefinition) -> Result<()> {
        if self.get(definition.name()).is_some() {
            return Err(BuildError::DuplicateTask(definition.name().to_string()));
        }

        if let TaskBody::Composite(steps) = definition.body() {
            for step in steps {
                match self.get(step) {
                    Some(task) if !task.is_composite() => {}
                    _ => return Err(BuildError::UnknownTask(step.clone())),
                }
            }
        }

        let patterns = PatternSet::new(definition.triggers())?;
        self.states().insert(definition.name().to_string(), TaskState::Idle);
        self.tasks.push(Registered { definition, patterns });
        Ok(())
    }

    /// Look up a task by name.
    pub fn get(&self, name: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().map(|t| &t.definition).find(|t| t.name() == name)
    }

    /// All tasks in registration order.
    pub fn list(&self) -> Vec<&TaskDefinition> {
        self.tasks.iter().map(|t| &t.definition).collect()
    }

    /// Tasks re-run by watch mode, in registration order.
    pub fn watched(&self) -> Vec<&TaskDefinition> {
        self.tasks.iter().map(|t| &t.definition).filter(|t| t.is_watched()).collect()
    }

    /// Current state of a task.
    pub fn state(&self, name: &str) -> Option<TaskState> {
        self.states().get(name).copied()
    }

    /// Names of the watched tasks whose triggers match a project-relative path.
    pub fn tasks_for_path(&self, path: &Path) -> Vec<&str> {
        self.tasks
            .iter()
            .filter(|t| t.definition.is_watched() && t.patterns.matches(path))
            .map(|t| t.definition.name())
            .collect()
    }

    /// Run a task to completion.
    ///
    /// Returns an error only when the task cannot be started (unknown name,
    /// already running). Failures of the task itself are reported in the
    /// returned result.
    pub fn run(&self, name: &str) -> Result<BuildResult> {
        let start = Instant::now();
        let task = self.get(name).ok_or_else(|| BuildError::UnknownTask(name.to_string()))?;

        let mut result = BuildResult::new();
        match task.body() {
            TaskBody::Action(action) => {
                result.add_result(self.run_action(name, action)?);
            }
            TaskBody::Composite(steps) => {
                let _guard = self.acquire(name)?;
                let mut aborted = false;
                for step in steps {
                    if aborted {
                        result.add_result(TaskResult::skipped(step));
                        continue;
                    }

                    let definition = match self.get(step) {
                        Some(definition) => definition,
                        None => return Err(BuildError::UnknownTask(step.clone())),
                    };
                    let action = match definition.body() {
                        TaskBody::Action(action) => action,
                        TaskBody::Composite(_) => return Err(BuildError::UnknownTask(step.clone())),
                    };

                    let step_result = self.run_action(step, action)?;
                    if step_result.status.is_failure() && definition.is_required() {
                        tracing::error!(task = name, step = %step, "aborting remaining steps");
                        aborted = true;
                    }
                    result.add_result(step_result);
                }
            }
        }

        Ok(result.with_duration(start.elapsed()))
    }

    fn run_action(&self, name: &str, action: &Action) -> Result<TaskResult> {
        let _guard = self.acquire(name)?;
        let start = Instant::now();
        tracing::info!(task = name, "starting");

        let result = match action() {
            Ok(outputs) => {
                let elapsed = start.elapsed();
                tracing::info!(task = name, files = outputs.len(), elapsed = ?elapsed, "finished");
                TaskResult::success(name, outputs, elapsed)
            }
            Err(e) => {
                let elapsed = start.elapsed();
                tracing::error!(task = name, kind = %e.kind(), error = %e, "failed");
                TaskResult::failed(name, e.kind(), e.to_string(), elapsed)
            }
        };
        Ok(result)
    }

    fn acquire(&self, name: &str) -> Result<RunGuard<'_>> {
        let mut states = self.states();
        if states.get(name) == Some(&TaskState::Running) {
            return Err(BuildError::Busy(name.to_string()));
        }
        states.insert(name.to_string(), TaskState::Running);
        Ok(RunGuard { scheduler: self, name: name.to_string() })
    }

    fn states(&self) -> MutexGuard<'_, HashMap<String, TaskState>> {
        // A poisoned map only means an action panicked; the states are still usable.
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("tasks", &self.list()).finish()
    }
}

fn class_description(class: AssetClass) -> &'static str {
    match class {
        AssetClass::Styles => "Compile, prefix and minify the stylesheet",
        AssetClass::Markup => "Minify the markup shell and fill placeholders",
        AssetClass::Plugin => "Minify the stand-alone plugin script",
        AssetClass::Templates => "Minify templates into the output tree",
        AssetClass::Scripts => "Concatenate and minify the script bundle",
        AssetClass::Docs => "Regenerate the documentation",
    }
}
