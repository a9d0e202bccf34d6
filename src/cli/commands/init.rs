//! `hangar init` command - Initialize a new hangar project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::project::{Project, ProjectError, PROJECT_DIR};
use crate::core::store::FileStore;
use crate::core::team::{TeamRoster, BOOTSTRAP_PASSWORD, BOOTSTRAP_USERNAME};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .hangar/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    let project = match Project::init(&path, args.force) {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} hangar project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("hangar init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let config = Config::load(Some(&project));
    let roster = TeamRoster::open(FileStore::new(project.data_dir(&config)))?;

    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Initialized hangar project at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!();
    println!("Created project structure:");
    print_structure(project.root(), &config);

    if roster.list().len() == 1 {
        println!();
        println!(
            "Default administrator: {} / {} (change it with {})",
            style(BOOTSTRAP_USERNAME).cyan(),
            style(BOOTSTRAP_PASSWORD).cyan(),
            style("hangar team update admin --password ...").yellow()
        );
    }

    println!();
    println!("Next steps:");
    println!(
        "  {} Register your first aircraft",
        style("hangar aircraft new <CODE> --model <MODEL> --capacity <N> --range <KM>").yellow()
    );
    println!(
        "  {} Add production stages",
        style("hangar stage add <CODE> --name <NAME> --deadline <DAYS>").yellow()
    );
    println!(
        "  {} Review production status",
        style("hangar status").yellow()
    );
    Ok(())
}

fn print_structure(root: &Path, config: &Config) {
    let entries = [
        format!("{}/", PROJECT_DIR),
        format!("{}/config.yaml", PROJECT_DIR),
        format!("{}/", config.data_dir()),
        format!("{}/", config.reports_dir()),
    ];

    for entry in entries {
        if root.join(&entry).exists() {
            println!("  {}", style(entry).dim());
        }
    }
}
