//! Build pipeline module for assetforge
//!
//! Turns project sources into deployable artifacts and exposes each asset
//! class as a named task.
//!
//! # Overview
//!
//! The build system consists of:
//! - **Discovery**: Find source files using glob patterns from config
//! - **Pipelines**: Run ordered transform stages over source text
//! - **Assets**: One build action per asset class
//! - **Scheduling**: Named tasks, the composite build, watch triggers
//!
//! # Example
//!
//! ```ignore
//! use assetforge::build::{BuildContext, Scheduler};
//! use assetforge::config::load_config;
//! use std::sync::Arc;
//!
//! let (config, _) = load_config(None)?;
//! let context = BuildContext::from_config(config, project_root)?;
//! let scheduler = Scheduler::standard(Arc::new(context))?;
//!
//! let result = scheduler.run("build")?;
//! println!("{}", result.summary());
//! ```

pub mod artifact;
pub mod assets;
pub mod context;
pub mod discovery;
pub mod pipeline;
pub mod result;
pub mod scheduler;
pub mod target;

pub use artifact::*;
pub use assets::*;
pub use context::*;
pub use discovery::*;
pub use pipeline::*;
pub use result::*;
pub use scheduler::*;
pub use target::*;
