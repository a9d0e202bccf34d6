//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    aircraft::AircraftCommands, completions::CompletionsArgs, init::InitArgs, part::PartCommands,
    report::ReportArgs, stage::StageCommands, status::StatusArgs, team::TeamCommands,
    test::TestCommands,
};

#[derive(Parser)]
#[command(name = "hangar")]
#[command(author, version, about = "Aircraft production tracker")]
#[command(
    long_about = "Tracks aircraft through production: parts, an ordered pipeline of stages, and the quality tests that gate final release."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .hangar/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Acting employee, by id or username (default: `actor` from config)
    #[arg(long, global = true)]
    pub actor: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new hangar project
    Init(InitArgs),

    /// Aircraft registration and lookup
    #[command(subcommand)]
    Aircraft(AircraftCommands),

    /// Parts attached to an aircraft
    #[command(subcommand)]
    Part(PartCommands),

    /// Production stages and their progression
    #[command(subcommand)]
    Stage(StageCommands),

    /// Quality test outcomes
    #[command(subcommand)]
    Test(TestCommands),

    /// Write the production report for an aircraft
    Report(ReportArgs),

    /// Show production status dashboard
    Status(StatusArgs),

    /// Employees and permissions
    #[command(subcommand)]
    Team(TeamCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, table for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <OutputFormat as ValueEnum>::from_str(s, true)
    }
}
