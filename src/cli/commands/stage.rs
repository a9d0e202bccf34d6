//! `hangar stage` command - Production stages and their progression

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{success, Workspace};
use crate::cli::helpers::{format_short_id, styled_stage_status, truncate_str, Listing};
use crate::cli::GlobalOpts;
use crate::core::identity::Selector;
use crate::core::registry::ChildKind;
use crate::core::workflow;
use crate::entities::stage::{Stage, StageStatus};

#[derive(Subcommand, Debug)]
pub enum StageCommands {
    /// Append a stage to the end of the pipeline
    Add(AddArgs),

    /// List the pipeline of an aircraft
    List(ListArgs),

    /// Start a stage (the previous stage must be done)
    Start(StageRef),

    /// Mark a stage done (the final stage requires no rejected tests)
    Complete(StageRef),

    /// Assign an employee to a stage
    Assign(AssignArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Aircraft code
    pub code: String,

    /// Stage name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Deadline in days
    #[arg(long, short = 'd')]
    pub deadline: u32,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Aircraft code
    pub code: String,

    /// Print only the number of stages
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct StageRef {
    /// Aircraft code
    pub code: String,

    /// Stage index (0-based) or STG id
    pub stage: Selector,
}

#[derive(clap::Args, Debug)]
pub struct AssignArgs {
    #[command(flatten)]
    pub target: StageRef,

    /// Employee id or username
    pub employee: String,
}

/// Run a stage subcommand
pub fn run(cmd: StageCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StageCommands::Add(args) => run_add(args, global),
        StageCommands::List(args) => run_list(args, global),
        StageCommands::Start(args) => run_start(args, global),
        StageCommands::Complete(args) => run_complete(args, global),
        StageCommands::Assign(args) => run_assign(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;

    let index = registry.add_stage(&args.code, Stage::new(args.name.clone(), args.deadline))?;
    success(
        global,
        format!(
            "Added stage #{} {} to {}",
            index,
            args.name,
            style(&args.code).cyan()
        ),
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;
    let stages = registry.stages(&args.code)?;

    if args.count {
        println!("{}", stages.len());
        return Ok(());
    }

    if stages.is_empty() {
        println!("No stages found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["#", "ID", "NAME", "DEADLINE", "STATUS", "NEXT", "EMPLOYEES"]);
    for (index, stage) in stages.iter().enumerate() {
        let id = stage.id.to_string();
        listing.push(
            id.clone(),
            vec![
                index.to_string(),
                format_short_id(&id),
                truncate_str(&stage.name, 24),
                format!("{}d", stage.deadline_days),
                styled_stage_status(stage.status),
                next_action(stages, index),
                stage.employees.len().to_string(),
            ],
        );
    }
    listing.print(workspace.list_format(global), stages)
}

/// Hint for the next command that applies to a stage
fn next_action(stages: &[Stage], index: usize) -> String {
    let next = workflow::allowed_transitions(stages[index].status);
    match next.first() {
        Some(StageStatus::InProgress) if workflow::can_start(stages, index) => "start",
        Some(StageStatus::InProgress) => "waiting",
        Some(StageStatus::Done) => "complete",
        _ => "-",
    }
    .to_string()
}

fn run_start(args: StageRef, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;

    let index = registry.locate(&args.code, ChildKind::Stage, &args.stage)?;
    registry.advance(&args.code, index)?;
    let stage = registry.stage(&args.code, index)?;

    success(
        global,
        format!(
            "Stage #{} {} of {} is now {}",
            index,
            stage.name,
            style(&args.code).cyan(),
            styled_stage_status(stage.status)
        ),
    );
    Ok(())
}

fn run_complete(args: StageRef, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;

    let index = registry.locate(&args.code, ChildKind::Stage, &args.stage)?;
    registry.complete(&args.code, index)?;
    let stages = registry.stages(&args.code)?;

    success(
        global,
        format!(
            "Stage #{} {} of {} is now {}",
            index,
            stages[index].name,
            style(&args.code).cyan(),
            styled_stage_status(stages[index].status)
        ),
    );
    if !global.quiet && stages.iter().all(Stage::is_done) {
        println!(
            "{} all {} stage(s) of {} are done",
            style("✓").green(),
            stages.len(),
            args.code
        );
    }
    Ok(())
}

fn run_assign(args: AssignArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let roster = workspace.roster()?;
    let mut registry = workspace.registry()?;
    let code = &args.target.code;

    // Known usernames are stored by id; anything else is kept as given
    let employee_id = match roster.find(&args.employee) {
        Some(employee) => employee.id.to_string(),
        None => {
            tracing::debug!(employee = %args.employee, "employee not in roster, assigning as given");
            args.employee.clone()
        }
    };

    let index = registry.locate(code, ChildKind::Stage, &args.target.stage)?;
    let added = registry.assign(code, index, &employee_id)?;

    if added {
        success(
            global,
            format!(
                "Assigned {} to stage #{} of {}",
                employee_id,
                index,
                style(code).cyan()
            ),
        );
    } else if !global.quiet {
        println!(
            "{} {} is already assigned to stage #{} of {}",
            style("!").yellow(),
            employee_id,
            index,
            code
        );
    }
    Ok(())
}
