//! `hangar test` command - Quality test outcomes

use clap::Subcommand;
use console::style;
use miette::{bail, Result};

use crate::cli::commands::utils::{confirm, success, Workspace};
use crate::cli::helpers::{format_short_id, print_record, styled_outcome, Listing};
use crate::cli::GlobalOpts;
use crate::core::entity::Record;
use crate::core::identity::Selector;
use crate::core::registry::ChildKind;
use crate::entities::test::{QualityTest, TestKind, TestOutcome, TestUpdate};

#[derive(Subcommand, Debug)]
pub enum TestCommands {
    /// Record a test outcome
    Add(AddArgs),

    /// List recorded tests in registration order
    List(ListArgs),

    /// Show one test record
    Show(TestRef),

    /// Correct a recorded test
    Update(UpdateArgs),

    /// Remove a test record; later records shift down by one
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Aircraft code
    pub code: String,

    /// Test kind
    #[arg(long, short = 'k')]
    pub kind: TestKind,

    /// Test outcome
    #[arg(long, short = 'o')]
    pub outcome: TestOutcome,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Aircraft code
    pub code: String,

    /// Only tests of this kind
    #[arg(long, short = 'k')]
    pub kind: Option<TestKind>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct TestRef {
    /// Aircraft code
    pub code: String,

    /// Test index (0-based) or TST id
    pub test: Selector,
}

#[derive(clap::Args, Debug)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: TestRef,

    #[arg(long, short = 'k')]
    pub kind: Option<TestKind>,

    #[arg(long, short = 'o')]
    pub outcome: Option<TestOutcome>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TestRef,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run a test subcommand
pub fn run(cmd: TestCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TestCommands::Add(args) => run_add(args, global),
        TestCommands::List(args) => run_list(args, global),
        TestCommands::Show(args) => run_show(args, global),
        TestCommands::Update(args) => run_update(args, global),
        TestCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;

    let index = registry.register_test(&args.code, QualityTest::new(args.kind, args.outcome))?;
    success(
        global,
        format!(
            "Recorded test #{} {} : {} for {}",
            index,
            args.kind,
            styled_outcome(args.outcome),
            style(&args.code).cyan()
        ),
    );
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let tests: Vec<(usize, &QualityTest)> = registry
        .tests(&args.code)?
        .iter()
        .enumerate()
        .filter(|(_, t)| args.kind.map_or(true, |k| t.kind == k))
        .collect();

    if args.count {
        println!("{}", tests.len());
        return Ok(());
    }

    if tests.is_empty() {
        println!("No tests found.");
        return Ok(());
    }

    let mut listing = Listing::new(&["#", "ID", "KIND", "OUTCOME", "RECORDED"]);
    for (index, test) in &tests {
        let id = test.id.to_string();
        listing.push(
            id.clone(),
            vec![
                index.to_string(),
                format_short_id(&id),
                test.kind.to_string(),
                styled_outcome(test.outcome),
                test.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
            ],
        );
    }
    let records: Vec<&QualityTest> = tests.iter().map(|(_, t)| *t).collect();
    listing.print(workspace.list_format(global), &records)
}

fn run_show(args: TestRef, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let registry = workspace.registry()?;

    let index = registry.locate(&args.code, ChildKind::Test, &args.test)?;
    let test = registry.test(&args.code, index)?;
    print_record(global.format, &test.id.to_string(), test)
}

fn run_update(args: UpdateArgs, global: &GlobalOpts) -> Result<()> {
    let update = TestUpdate {
        kind: args.kind,
        outcome: args.outcome,
    };
    if update.kind.is_none() && update.outcome.is_none() {
        bail!("nothing to update: pass --kind and/or --outcome");
    }

    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let code = &args.target.code;

    let index = registry.locate(code, ChildKind::Test, &args.target.test)?;
    registry.update_test(code, index, update)?;

    let test = registry.test(code, index)?;
    success(
        global,
        format!(
            "Updated test #{} to {} : {}",
            index,
            test.kind,
            styled_outcome(test.outcome)
        ),
    );
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let mut registry = workspace.registry()?;
    let code = &args.target.code;

    let index = registry.locate(code, ChildKind::Test, &args.target.test)?;
    let label = registry.test(code, index)?.label();
    if !confirm(&format!("Delete test #{} ({}) from {}?", index, label, code), args.yes)? {
        println!("Aborted.");
        return Ok(());
    }

    registry.delete_test(code, index)?;
    success(
        global,
        format!("Deleted test #{} ({}) from {}", index, label, style(code).cyan()),
    );
    Ok(())
}
