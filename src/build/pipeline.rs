//! Ordered transform pipelines.
//!
//! A pipeline joins its inputs (when there is more than one) and then runs
//! each stage on the result of the previous one. Stages are shared handles,
//! so building a pipeline per task invocation is cheap.

use crate::transforms::{Stage, TransformError};
use std::sync::Arc;

/// Separator placed between concatenated inputs.
pub const CONCAT_SEPARATOR: &str = "\n";

/// An ordered list of transform stages.
#[derive(Clone)]
pub struct TransformPipeline {
    stages: Vec<Stage>,
    separator: String,
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { stages: Vec::new(), separator: CONCAT_SEPARATOR.to_string() }
    }

    /// Use `separator` when joining inputs.
    pub fn concat_with(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Append a stage.
    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a stage given by value.
    pub fn then_stage<T: crate::transforms::Transform + 'static>(self, stage: T) -> Self {
        self.then(Arc::new(stage))
    }

    /// Append a stage when present.
    pub fn then_maybe(self, stage: Option<Stage>) -> Self {
        match stage {
            Some(stage) => self.then(stage),
            None => self,
        }
    }

    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage on `content`, stopping at the first failure.
    pub fn apply(&self, content: &str) -> Result<String, TransformError> {
        let mut current = content.to_string();
        for stage in &self.stages {
            tracing::trace!(stage = stage.name(), bytes = current.len(), "applying stage");
            current = stage.apply(&current)?;
        }
        Ok(current)
    }

    /// Join `inputs` and run the stages on the result.
    pub fn run(&self, inputs: &[String]) -> Result<String, TransformError> {
        self.apply(&inputs.join(&self.separator))
    }
}

impl std::fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("stages", &self.stage_names())
            .field("separator", &self.separator)
            .finish()
    }
}
