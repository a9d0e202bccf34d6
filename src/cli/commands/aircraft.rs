//! `hangar aircraft` command - Aircraft registration and lookup

use clap::Subcommand;
use console::style;
use miette::{bail, Result};

use crate::cli::commands::utils::{confirm, success, Workspace};
use crate::cli::helpers::{print_record, truncate_str, Listing};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::workflow;
use crate::entities::aircraft::{Aircraft, AircraftCategory, AircraftUpdate};

#[derive(Subcommand, Debug)]
pub enum AircraftCommands {
    /// Register a new aircraft
    New(NewArgs),

    /// List registered aircraft
    List(ListArgs),

    /// Show an aircraft with its parts, stages and tests
    Show(ShowArgs),

    /// Change aircraft attributes
    Update(UpdateArgs),

    /// Delete an aircraft and everything it owns
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique aircraft code
    pub code: String,

    /// Model name
    #[arg(long, short = 'm')]
    pub model: String,

    /// Aircraft category
    #[arg(long, short = 'c', default_value = "commercial")]
    pub category: AircraftCategory,

    /// Passenger capacity
    #[arg(long)]
    pub capacity: u32,

    /// Range in kilometres
    #[arg(long)]
    pub range: u32,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only aircraft of this category
    #[arg(long, short = 'c')]
    pub category: Option<AircraftCategory>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Aircraft code
    pub code: String,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    /// Aircraft code
    pub code: String,

    #[arg(long, short = 'm')]
    pub model: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<AircraftCategory>,

    #[arg(long)]
    pub capacity: Option<u32>,

    #[arg(long)]
    pub range: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Aircraft code
    pub code: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an aircraft subcommand
pub fn run(cmd: AircraftCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AircraftCommands::New(args) => run_new(args, global),
        AircraftCommands::List(args) => run_list(args, global),
        AircraftCommands::Show(args) => run_show(args, global),
        AircraftCommands::Update(args) => run_update(args, global),
        AircraftCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let code = args.code.trim();
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let aircraft = Aircraft::new(code, args.model, args.category, args.capacity, args.range);
    let registered = registry.register(aircraft)?;

    success(
        global,
        format!(
            "Registered aircraft {} ({})",
            style(&registered.code).cyan(),
            registered.model
        ),
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let aircraft: Vec<&Aircraft> = registry
        .list()
        .filter(|a| args.category.map_or(true, |c| a.category == c))
        .collect();

    if args.count {
        println!("{}", aircraft.len());
        return Ok(());
    }

    if aircraft.is_empty() {
        println!("No aircraft found.");
        return Ok(());
    }

    let mut listing = Listing::new(&[
        "CODE", "MODEL", "CATEGORY", "CAPACITY", "RANGE_KM", "PARTS", "STAGES", "TESTS",
    ]);
    for a in &aircraft {
        listing.push(
            a.code.clone(),
            vec![
                a.code.clone(),
                truncate_str(&a.model, 24),
                a.category.to_string(),
                a.capacity.to_string(),
                a.range_km.to_string(),
                a.parts.len().to_string(),
                format!("{}/{}", a.stages_done(), a.stages.len()),
                a.tests.len().to_string(),
            ],
        );
    }
    listing.print(workspace.list_format(global), &aircraft)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;
    let aircraft = registry.get(&args.code)?;

    print_record(global.format, &aircraft.code, aircraft)?;

    if !global.quiet && global.format == OutputFormat::Auto {
        let gate = workflow::release_gate(&aircraft.tests);
        if !gate.is_clear() {
            let kinds: Vec<String> = gate.blocking.iter().map(|k| k.to_string()).collect();
            eprintln!(
                "{} final stage blocked by rejected {} test(s)",
                style("!").yellow(),
                kinds.join(", ")
            );
        }
    }
    Ok(())
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let update = AircraftUpdate {
        model: args.model,
        category: args.category,
        capacity: args.capacity,
        range_km: args.range,
    };
    if update.is_empty() {
        bail!("nothing to update: pass at least one of --model, --category, --capacity, --range");
    }

    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    registry.update(&args.code, update)?;

    success(
        global,
        format!("Updated aircraft {}", style(&args.code).cyan()),
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let aircraft = registry.get(&args.code)?;

    let prompt = format!(
        "Delete aircraft {} with {} part(s), {} stage(s) and {} test(s)?",
        aircraft.code,
        aircraft.parts.len(),
        aircraft.stages.len(),
        aircraft.tests.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    registry.delete(&args.code)?;
    success(
        global,
        format!("Deleted aircraft {}", style(&args.code).cyan()),
    );
    Ok(())
}
