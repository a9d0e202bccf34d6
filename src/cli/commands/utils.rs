//! Shared utilities for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::project::Project;
use crate::core::registry::ProductionRegistry;
use crate::core::store::FileStore;
use crate::core::team::TeamRoster;

/// An opened project together with its effective configuration
pub struct Workspace {
    pub project: Project,
    pub config: Config,
}

impl Workspace {
    /// Locate the project (from `--project` or the cwd) and load its config
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = locate_project(global)?;
        let config = Config::load(Some(&project));
        Ok(Self { project, config })
    }

    pub fn store(&self) -> FileStore {
        FileStore::new(self.project.data_dir(&self.config))
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.project.reports_dir(&self.config)
    }

    pub fn registry(&self) -> Result<ProductionRegistry<FileStore>> {
        let registry = ProductionRegistry::open(self.store())?;
        warn_skipped(registry.skipped_records(), "aircraft");
        Ok(registry)
    }

    pub fn roster(&self) -> Result<TeamRoster<FileStore>> {
        let roster = TeamRoster::open(self.store())?;
        warn_skipped(roster.skipped_records(), "employee");
        Ok(roster)
    }

    /// The acting identity: `--actor`, then the `actor` config key
    pub fn actor(&self, global: &GlobalOpts) -> Result<String> {
        global
            .actor
            .clone()
            .or_else(|| self.config.actor.clone())
            .ok_or_else(|| {
                miette::miette!(
                    help = "pass --actor <id|username> or set 'actor' in .hangar/config.yaml",
                    "no acting employee given"
                )
            })
    }

    /// Output format for list commands; `auto` defers to `default_format`
    pub fn list_format(&self, global: &GlobalOpts) -> OutputFormat {
        match global.format {
            OutputFormat::Auto => self
                .config
                .default_format
                .as_deref()
                .and_then(|f| f.parse().ok())
                .unwrap_or(OutputFormat::Auto),
            f => f,
        }
    }
}

/// Find the project from `--project` or by walking up from the cwd
pub fn locate_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path)?,
        None => Project::discover()?,
    };
    Ok(project)
}

fn warn_skipped(skipped: usize, what: &str) {
    if skipped > 0 {
        eprintln!(
            "{} skipped {} unreadable {} record(s)",
            style("warning:").yellow().bold(),
            skipped,
            what
        );
    }
}

/// Ask before a destructive action; `yes` skips the prompt
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print a success line unless quiet
pub fn success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}
