//! Assetforge - Library for building front-end assets
//!
//! This library provides functionality to:
//! - Concatenate, minify and banner scripts and stylesheets
//! - Fill placeholders in markup and documentation from package.json
//! - Bump and stamp the manifest version on every build
//! - Re-run only the affected asset class when sources change

pub mod banner;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod placeholder;
pub mod transforms;
pub mod version;
pub mod watch;
