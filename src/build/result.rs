//! Build result types.
//!
//! Contains types for representing the outcome of task runs.

use crate::error::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

/// Status of a single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task succeeded
    Success,
    /// Task did not run because an earlier step aborted the build
    Skipped,
    /// Task failed with error
    Failed { kind: ErrorKind, message: String },
}

impl TaskStatus {
    /// Check if the status indicates success.
    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }

    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskStatus::Failed { .. })
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Skipped => write!(f, "skipped"),
            TaskStatus::Failed { kind, message } => write!(f, "{}: {}", kind, message),
        }
    }
}

/// Result of running a single task.
#[derive(Debug, Clone)]
pub struct TaskResult {
    /// Task name
    pub task: String,
    /// Task status
    pub status: TaskStatus,
    /// Output files written
    pub outputs: Vec<PathBuf>,
    /// Run duration
    pub duration: Duration,
}

impl TaskResult {
    /// Create a successful result.
    pub fn success(task: &str, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { task: task.to_string(), status: TaskStatus::Success, outputs, duration }
    }

    /// Create a skipped result.
    pub fn skipped(task: &str) -> Self {
        Self {
            task: task.to_string(),
            status: TaskStatus::Skipped,
            outputs: vec![],
            duration: Duration::ZERO,
        }
    }

    /// Create a failed result.
    pub fn failed(task: &str, kind: ErrorKind, message: String, duration: Duration) -> Self {
        Self {
            task: task.to_string(),
            status: TaskStatus::Failed { kind, message },
            outputs: vec![],
            duration,
        }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Result of a task invocation: one entry per step that was attempted.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each step
    pub tasks: Vec<TaskResult>,
    /// Total duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task result.
    pub fn add_result(&mut self, result: TaskResult) {
        self.tasks.push(result);
    }

    /// Set the total duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.total_duration = duration;
        self
    }

    /// Get the number of successful tasks.
    pub fn success_count(&self) -> usize {
        self.tasks.iter().filter(|r| r.status.is_success()).count()
    }

    /// Get the number of skipped tasks.
    pub fn skipped_count(&self) -> usize {
        self.tasks.iter().filter(|r| matches!(r.status, TaskStatus::Skipped)).count()
    }

    /// Get the number of failed tasks.
    pub fn failed_count(&self) -> usize {
        self.tasks.iter().filter(|r| r.status.is_failure()).count()
    }

    /// Check if the overall run succeeded (no failures).
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }

    /// Get all outputs produced.
    pub fn all_outputs(&self) -> Vec<&PathBuf> {
        self.tasks.iter().flat_map(|r| r.outputs.iter()).collect()
    }

    /// Get failed task results.
    pub fn failures(&self) -> Vec<&TaskResult> {
        self.tasks.iter().filter(|r| r.status.is_failure()).collect()
    }

    /// Look up the result of a step by task name.
    pub fn task(&self, name: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|r| r.task == name)
    }

    /// Format a summary of the result.
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();

        let success = self.success_count();
        let skipped = self.skipped_count();
        let failed = self.failed_count();
        let total = self.tasks.len();

        if failed > 0 {
            lines.push(format!(
                "Build failed: {} succeeded, {} skipped, {} failed ({} total)",
                success, skipped, failed, total
            ));
            for task in self.failures() {
                lines.push(format!("  - {}: {}", task.task, task.status));
            }
        } else {
            lines.push(format!(
                "Build succeeded: {} tasks, {} files in {:?}",
                success,
                self.all_outputs().len(),
                self.total_duration
            ));
        }

        lines.join("\n")
    }
}
