//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::project::Project;

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_REPORTS_DIR: &str = "reports";

/// Hangar configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Employee id or username used as the acting identity
    pub actor: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Record directory, relative to the project root
    pub data_dir: Option<String>,

    /// Report directory, relative to the project root
    pub reports_dir: Option<String>,

    /// Log filter used when HANGAR_LOG is unset
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/hangar/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.hangar/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        config.apply_env(
            std::env::var("HANGAR_ACTOR").ok(),
            std::env::var("HANGAR_LOG").ok(),
        );

        config
    }

    /// Parse a single config file; unreadable files are ignored
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "hangar")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.actor.is_some() {
            self.actor = other.actor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.reports_dir.is_some() {
            self.reports_dir = other.reports_dir;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    fn apply_env(&mut self, actor: Option<String>, log: Option<String>) {
        if let Some(actor) = actor.filter(|a| !a.is_empty()) {
            self.actor = Some(actor);
        }
        if let Some(log) = log.filter(|l| !l.is_empty()) {
            self.log_level = Some(log);
        }
    }

    pub fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    pub fn reports_dir(&self) -> &str {
        self.reports_dir.as_deref().unwrap_or(DEFAULT_REPORTS_DIR)
    }
}
