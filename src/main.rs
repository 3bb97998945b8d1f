//! forge - Command-line tool for building front-end assets

use std::process::ExitCode;

use assetforge::cli;

fn main() -> ExitCode {
    cli::run()
}
