//! `hangar part` command - Parts attached to an aircraft

use clap::Subcommand;
use console::style;
use miette::{bail, Result};

use crate::cli::commands::utils::{confirm, success, Workspace};
use crate::cli::helpers::{format_short_id, print_record, styled_part_status, truncate_str, Listing};
use crate::cli::GlobalOpts;
use crate::core::entity::Record;
use crate::core::identity::Selector;
use crate::core::registry::ChildKind;
use crate::entities::part::{Part, PartCategory, PartStatus, PartUpdate};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// Attach a part to an aircraft
    Add(AddArgs),

    /// List the parts of an aircraft
    List(ListArgs),

    /// Show one part
    Show(PartRef),

    /// Change a part, e.g. its logistics status
    Update(UpdateArgs),

    /// Remove a part; later parts shift down by one
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Aircraft code
    pub code: String,

    /// Part name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Origin of the part
    #[arg(long, short = 'c', default_value = "national")]
    pub category: PartCategory,

    /// Supplier name
    #[arg(long, short = 's')]
    pub supplier: String,

    /// Initial logistics status
    #[arg(long, default_value = "in-production")]
    pub status: PartStatus,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Aircraft code
    pub code: String,

    /// Only parts in this status
    #[arg(long)]
    pub status: Option<PartStatus>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct PartRef {
    /// Aircraft code
    pub code: String,

    /// Part index (0-based) or PRT id
    pub part: Selector,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: PartRef,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub category: Option<PartCategory>,

    #[arg(long, short = 's')]
    pub supplier: Option<String>,

    #[arg(long)]
    pub status: Option<PartStatus>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: PartRef,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a part subcommand
pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::Add(args) => run_add(args, global),
        PartCommands::List(args) => run_list(args, global),
        PartCommands::Show(args) => run_show(args, global),
        PartCommands::Update(args) => run_update(args, global),
        PartCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;

    let part = Part::new(args.name, args.category, args.supplier).with_status(args.status);
    let id = part.id.to_string();
    let index = registry.add_part(&args.code, part)?;

    success(
        global,
        format!(
            "Added part #{} {} to {}",
            index,
            style(&id).dim(),
            style(&args.code).cyan()
        ),
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let parts: Vec<(usize, &Part)> = registry
        .parts(&args.code)?
        .iter()
        .enumerate()
        .filter(|(_, p)| args.status.map_or(true, |s| p.status == s))
        .collect();

    if args.count {
        println!("{}", parts.len());
        return Ok(());
    }

    if parts.is_empty() {
        println!("No parts found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["#", "ID", "NAME", "CATEGORY", "SUPPLIER", "STATUS"]);
    for (index, part) in &parts {
        let id = part.id.to_string();
        listing.push(
            id.clone(),
            vec![
                index.to_string(),
                format_short_id(&id),
                truncate_str(&part.name, 28),
                part.category.to_string(),
                truncate_str(&part.supplier, 20),
                styled_part_status(part.status),
            ],
        );
    }
    let records: Vec<&Part> = parts.iter().map(|(_, p)| *p).collect();
    listing.print(workspace.list_format(global), &records)
}

fn run_show(args: PartRef, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let index = registry.locate(&args.code, ChildKind::Part, &args.part)?;
    let part = registry.part(&args.code, index)?;
    print_record(global.format, &part.id.to_string(), part)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let update = PartUpdate {
        name: args.name,
        category: args.category,
        supplier: args.supplier,
        status: args.status,
    };
    if update.is_empty() {
        bail!("nothing to update: pass at least one of --name, --category, --supplier, --status");
    }

    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let code = &args.target.code;

    let index = registry.locate(code, ChildKind::Part, &args.target.part)?;
    registry.update_part(code, index, update)?;

    let part = registry.part(code, index)?;
    success(
        global,
        format!(
            "Updated part #{} {} ({})",
            index,
            part.name,
            styled_part_status(part.status)
        ),
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let code = &args.target.code;

    let index = registry.locate(code, ChildKind::Part, &args.target.part)?;
    let name = registry.part(code, index)?.label();
    if !confirm(&format!("Delete part #{} {} from {}?", index, name, code), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = registry.delete_part(code, index)?;
    success(
        global,
        format!("Deleted part {} from {}", removed.name, style(code).cyan()),
    );
    Ok(())
}
