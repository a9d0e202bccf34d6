//! `hangar report` command - Write production reports

use console::style;
use miette::{bail, Result};

use crate::cli::commands::utils::{success, Workspace};
use crate::cli::GlobalOpts;
use crate::core::report::{render_report, write_report};

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Aircraft code (omit with --all)
    #[arg(required_unless_present = "all")]
    pub code: Option<String>,

    /// Write a report for every registered aircraft
    #[arg(long, conflicts_with = "code")]
    pub all: bool,

    /// Print to stdout instead of writing to the reports directory
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let aircraft = match &args.code {
        Some(code) => vec![registry.get(code)?],
        None => registry.list().collect(),
    };

    if aircraft.is_empty() {
        bail!("no aircraft registered");
    }

    if args.stdout {
        for (i, a) in aircraft.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", render_report(a)?);
        }
        return Ok(());
    }

    let dir = workspace.reports_dir();
    for a in aircraft {
        let path = write_report(&dir, a)?;
        success(
            global,
            format!(
                "Wrote report for {} to {}",
                style(&a.code).cyan(),
                style(path.display()).dim()
            ),
        );
    }
    Ok(())
}
