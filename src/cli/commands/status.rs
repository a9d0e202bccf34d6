//! `hangar status` command - Production status dashboard

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::commands::utils::Workspace;
use crate::cli::helpers::{styled_stage_status, truncate_str, Listing};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::workflow::{self, ReleaseGate};
use crate::entities::aircraft::Aircraft;
use crate::entities::part::PartStatus;
use crate::entities::stage::StageStatus;
use crate::entities::test::TestKind;

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Only aircraft whose final stage is currently blocked
    #[arg(long)]
    pub blocked: bool,
}

#[derive(Serialize)]
struct AircraftStatus {
    code: String,
    model: String,
    stages_done: usize,
    stages_total: usize,
    current_stage: Option<String>,
    parts_installed: usize,
    parts_total: usize,
    release_blocked_by: Vec<TestKind>,
}

impl AircraftStatus {
    fn of(aircraft: &Aircraft, gate: ReleaseGate) -> Self {
        Self {
            code: aircraft.code.clone(),
            model: aircraft.model.clone(),
            stages_done: aircraft.stages_done(),
            stages_total: aircraft.stages.len(),
            current_stage: workflow::current_stage(&aircraft.stages)
                .map(|(_, stage)| stage.name.clone()),
            parts_installed: aircraft
                .parts
                .iter()
                .filter(|p| p.status == PartStatus::Installed)
                .count(),
            parts_total: aircraft.parts.len(),
            release_blocked_by: gate.blocking,
        }
    }

    fn release(&self) -> String {
        if self.release_blocked_by.is_empty() {
            style("ready").green().to_string()
        } else {
            let kinds: Vec<String> = self
                .release_blocked_by
                .iter()
                .map(|k| k.to_string())
                .collect();
            style(format!("blocked by {}", kinds.join(", ")))
                .red()
                .to_string()
        }
    }
}

pub fn run(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let mut rows = Vec::with_capacity(registry.len());
    for aircraft in registry.list() {
        let gate = registry.release_readiness(&aircraft.code)?;
        if args.blocked && gate.is_clear() {
            continue;
        }
        rows.push(AircraftStatus::of(aircraft, gate));
    }

    let format = workspace.list_format(global);
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "aircraft": rows,
            "skipped_records": registry.skipped_records(),
        }))
        .into_diagnostic()?;
        println!("{}", json);
        return Ok(());
    }

    if format == OutputFormat::Auto && !global.quiet {
        println!("{}", style("Hangar Production Status").bold().underlined());
        println!();
    }

    if rows.is_empty() {
        println!("No aircraft found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["CODE", "MODEL", "STAGES", "CURRENT", "PARTS", "RELEASE"]);
    for row in &rows {
        let current = match &row.current_stage {
            Some(name) => truncate_str(name, 20),
            None if row.stages_total > 0 => styled_stage_status(StageStatus::Done),
            None => "-".to_string(),
        };
        listing.push(
            row.code.clone(),
            vec![
                row.code.clone(),
                truncate_str(&row.model, 20),
                format!("{}/{}", row.stages_done, row.stages_total),
                current,
                format!("{}/{} installed", row.parts_installed, row.parts_total),
                row.release(),
            ],
        );
    }
    listing.print(format, &rows)?;

    if format == OutputFormat::Auto && !global.quiet {
        let blocked = rows
            .iter()
            .filter(|r| !r.release_blocked_by.is_empty())
            .count();
        println!();
        println!(
            "{} aircraft, {} blocked at release",
            style(rows.len()).cyan(),
            style(blocked).cyan()
        );
        if registry.skipped_records() > 0 {
            println!(
                "{} {} stored record(s) could not be read",
                style("!").yellow(),
                registry.skipped_records()
            );
        }
    }
    Ok(())
}
