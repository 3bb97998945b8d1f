//! Build command implementations (one-shot tasks, watch, list)

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{BuildContext, Scheduler};
use crate::config::{find_config_from, load_config, merge_cli_overrides, CliOverrides, ForgeConfig};

/// A loaded project: its configuration, root and task registry.
pub(crate) struct Project {
    pub config: ForgeConfig,
    pub root: PathBuf,
    pub scheduler: Arc<Scheduler>,
}

pub(crate) fn overrides(verbose: bool, clear: bool, debounce: Option<u32>) -> CliOverrides {
    CliOverrides {
        verbose: verbose.then_some(true),
        clear_screen: clear.then_some(true),
        debounce_ms: debounce,
    }
}

/// Load forge.toml, install logging and register the standard tasks.
///
/// The project root is `--root` when given, else the directory holding
/// forge.toml, else the current directory.
pub(crate) fn load_project(
    config_path: Option<&Path>,
    root: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<Project, ExitCode> {
    let cwd = env::current_dir().unwrap_or_default();
    let search_from = root.map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());

    let explicit = config_path.map(Path::to_path_buf).or_else(|| find_config_from(search_from));
    let (mut config, found) = match load_config(explicit.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };
    merge_cli_overrides(&mut config, overrides);
    crate::logging::init(&config.log.level);

    let project_root = match (root, found.as_deref().and_then(Path::parent)) {
        (Some(root), _) => root.to_path_buf(),
        (None, Some(parent)) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => cwd,
    };

    match &found {
        Some(path) => tracing::debug!(config = %path.display(), "using config"),
        None => tracing::debug!("no forge.toml found, using defaults"),
    }

    let verbose = overrides.verbose == Some(true);
    let context = match BuildContext::from_config(config.clone(), project_root.clone()) {
        Ok(ctx) => ctx.with_verbose(verbose),
        Err(e) => {
            eprintln!("Error in [tools]: {}", e);
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
    };

    let scheduler = match Scheduler::standard(Arc::new(context)) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(ExitCode::from(EXIT_ERROR));
        }
    };

    Ok(Project { config, root: project_root, scheduler: Arc::new(scheduler) })
}

/// Run a single named task and print its summary.
pub(crate) fn run_task(project: &Project, task: &str) -> ExitCode {
    match project.scheduler.run(task) {
        Ok(result) => {
            println!("{}", result.summary());
            if result.is_success() {
                ExitCode::from(EXIT_SUCCESS)
            } else {
                ExitCode::from(EXIT_ERROR)
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Watch the project until interrupted.
pub(crate) fn run_watch(project: &Project) -> ExitCode {
    let result = crate::watch::watch_tasks(
        Arc::clone(&project.scheduler),
        &project.root,
        project.config.watch.clone(),
    );

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Print every task with its description and triggers.
pub(crate) fn run_list(project: &Project) -> ExitCode {
    for task in project.scheduler.list() {
        println!("{:<10} {}", task.name(), task.description());
        if task.is_watched() {
            println!("{:<10} watches: {}", "", task.triggers().join(", "));
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
