//! Project discovery and structure

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::config::Config;

/// Marker directory that makes a directory a hangar project
pub const PROJECT_DIR: &str = ".hangar";

/// Represents a hangar project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .hangar/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    ///
    /// With `force`, an existing project is re-initialized; stored records
    /// are left alone, only the config file is rewritten.
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        std::fs::create_dir_all(path).map_err(|e| ProjectError::IoError(e.to_string()))?;
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let hangar_dir = root.join(PROJECT_DIR);
        if hangar_dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&hangar_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(hangar_dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let defaults = Config::default();
        for dir in [defaults.data_dir(), defaults.reports_dir()] {
            std::fs::create_dir_all(root.join(dir))
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        tracing::debug!(root = %root.display(), "project initialized");
        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Hangar project configuration

# Employee (id or username) acting on team commands
# actor: admin

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto

# Where records and reports live, relative to the project root
# data_dir: data
# reports_dir: reports

# Log filter when HANGAR_LOG is unset (error, warn, info, debug, trace)
# log_level: warn
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .hangar configuration directory
    pub fn hangar_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.hangar_dir().join("config.yaml")
    }

    /// Directory holding the record files
    pub fn data_dir(&self, config: &Config) -> PathBuf {
        self.root.join(config.data_dir())
    }

    /// Directory reports are written to
    pub fn reports_dir(&self, config: &Config) -> PathBuf {
        self.root.join(config.reports_dir())
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error, Diagnostic)]
pub enum ProjectError {
    #[error("not a hangar project (searched from {searched_from:?})")]
    #[diagnostic(
        code(hangar::project::not_found),
        help("run 'hangar init' to create one, or pass --project")
    )]
    NotFound { searched_from: PathBuf },

    #[error("hangar project already exists at {0:?}")]
    #[diagnostic(
        code(hangar::project::already_exists),
        help("use --force to reinitialize")
    )]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(hangar::project::io))]
    IoError(String),
}
