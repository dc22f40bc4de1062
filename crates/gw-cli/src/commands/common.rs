//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use gw_core::catalog;
use gw_core::migration::MigrationDefinition;
use gw_core::resolver::MigrationDag;
use gw_core::Config;
use gw_db::{Database, DuckDbBackend};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Per-run project context: config plus the absolute project root.
///
/// Everything downstream resolves paths against `root`, never the process
/// cwd.
pub(crate) struct ProjectContext {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

/// Load groundwork.yml for the given global arguments.
pub(crate) fn load_context(global: &GlobalArgs) -> Result<ProjectContext> {
    let root = Path::new(&global.project_dir)
        .canonicalize()
        .with_context(|| format!("Project directory not found: {}", global.project_dir))?;

    let config_path = match &global.config {
        Some(path) => PathBuf::from(path),
        None => root.join("groundwork.yml"),
    };

    let config = Config::load(&config_path).context("Failed to load project config")?;
    Ok(ProjectContext { root, config })
}

/// Open the configured database backend.
pub(crate) fn open_db(context: &ProjectContext) -> Result<Arc<dyn Database>> {
    let path = &context.config.database.path;
    let resolved = if path == ":memory:" || Path::new(path).is_absolute() {
        path.clone()
    } else {
        context.root.join(path).display().to_string()
    };
    let backend = DuckDbBackend::new(&resolved)
        .with_context(|| format!("Failed to open database: {}", resolved))?;
    Ok(Arc::new(backend))
}

/// Load the catalog and return definitions in resolver (execution) order.
pub(crate) fn load_ordered_catalog(context: &ProjectContext) -> Result<Vec<MigrationDefinition>> {
    let dir = context.config.migrations_dir(&context.root);
    let definitions =
        catalog::load(&dir).context("Failed to load migration catalog")?;

    let dag = MigrationDag::build(&definitions);
    let order = dag.execution_order().context("Failed to resolve migration order")?;

    let mut by_name: HashMap<String, MigrationDefinition> = definitions
        .into_iter()
        .map(|d| (d.filename.clone(), d))
        .collect();

    Ok(order
        .iter()
        .filter_map(|name| by_name.remove(name))
        .collect())
}
