//! Stages backed by an external program.
//!
//! The program receives the content on stdin and must write the transformed
//! content to stdout. A non-zero exit status is a rejection of the input;
//! whatever the tool printed on stderr becomes the error message.

use super::{Result, Transform, TransformError};
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;

/// Runs a configured command line for every invocation.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    stage: String,
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Create a stage named `stage` running `argv`.
    pub fn new(stage: &str, argv: Vec<String>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| TransformError::EmptyCommand { stage: stage.to_string() })?;

        Ok(Self { stage: stage.to_string(), program, args: argv.collect() })
    }

    /// The program and its arguments.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Transform for ExternalCommand {
    fn name(&self) -> &str {
        &self.stage
    }

    fn apply(&self, input: &str) -> Result<String> {
        tracing::debug!(stage = %self.stage, command = %self.command_line(), "running tool");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TransformError::Spawn {
                stage: self.stage.clone(),
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from a separate thread so a tool that writes before it
        // has read everything cannot deadlock on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            let content = input.to_string();
            thread::spawn(move || stdin.write_all(content.as_bytes()))
        });

        let output = child.wait_with_output().map_err(|source| TransformError::Spawn {
            stage: self.stage.clone(),
            program: self.program.clone(),
            source,
        })?;

        let write_result = match writer {
            Some(handle) => handle
                .join()
                .map_err(|_| TransformError::rejected(&self.stage, "stdin writer panicked"))?,
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("`{}` exited with {}", self.program, output.status),
                text => text.to_string(),
            };
            return Err(TransformError::rejected(&self.stage, message));
        }

        write_result.map_err(|e| {
            TransformError::rejected(&self.stage, format!("failed to write input: {}", e))
        })?;

        String::from_utf8(output.stdout)
            .map_err(|_| TransformError::rejected(&self.stage, "tool produced non UTF-8 output"))
    }
}
