//! `hangar team` command - Employees and permissions

use clap::{Args, Subcommand};
use console::style;
use miette::{bail, IntoDiagnostic, Result};

use crate::cli::commands::utils::{confirm, success, Workspace};
use crate::cli::helpers::{format_short_id, truncate_str, Listing};
use crate::cli::GlobalOpts;
use crate::entities::employee::{Employee, EmployeeUpdate, PermissionLevel};

/// Employee roster management
#[derive(Debug, Subcommand)]
pub enum TeamCommands {
    /// List employees
    List(TeamListArgs),
    /// Show the acting employee
    Whoami,
    /// Register an employee (admin only)
    Add(TeamAddArgs),
    /// Change an employee (admin, or yourself)
    Update(TeamUpdateArgs),
    /// Remove an employee (admin, or yourself)
    Remove(TeamRemoveArgs),
    /// Check a username and password
    Auth(TeamAuthArgs),
}

/// List employees
#[derive(Debug, Args)]
pub struct TeamListArgs {
    /// Filter by permission level
    #[arg(long, short = 'l')]
    pub level: Option<PermissionLevel>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

/// Register an employee
#[derive(Debug, Args)]
pub struct TeamAddArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Login name (unique, case-insensitive)
    #[arg(long)]
    pub username: String,

    /// Permission level
    #[arg(long, short = 'l', default_value = "operator")]
    pub level: PermissionLevel,

    #[arg(long, default_value = "")]
    pub phone: String,

    #[arg(long, default_value = "")]
    pub address: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Change an employee
#[derive(Debug, Args)]
pub struct TeamUpdateArgs {
    /// Employee id or username
    pub target: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,

    /// New password
    #[arg(long)]
    pub password: Option<String>,

    /// New permission level (admin only)
    #[arg(long, short = 'l')]
    pub level: Option<PermissionLevel>,
}

/// Remove an employee
#[derive(Debug, Args)]
pub struct TeamRemoveArgs {
    /// Employee id or username
    pub target: String,

    /// Skip confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Check credentials
#[derive(Debug, Args)]
pub struct TeamAuthArgs {
    pub username: String,

    /// Password (prompted for when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

impl TeamCommands {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        match self {
            TeamCommands::List(args) => args.run(global),
            TeamCommands::Whoami => run_whoami(global),
            TeamCommands::Add(args) => args.run(global),
            TeamCommands::Update(args) => args.run(global),
            TeamCommands::Remove(args) => args.run(global),
            TeamCommands::Auth(args) => args.run(global),
        }
    }
}

impl TeamListArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let workspace = Workspace::open(global)?;
        let roster = workspace.roster()?;

        let employees: Vec<&Employee> = roster
            .list()
            .iter()
            .filter(|e| self.level.map_or(true, |l| e.level == l))
            .collect();

        if self.count {
            println!("{}", employees.len());
            return Ok(());
        }

        if employees.is_empty() {
            println!("No employees found.");
            return Ok(());
        }

        let mut listing = Listing::new(&["ID", "USERNAME", "NAME", "LEVEL", "PHONE"]);
        for e in &employees {
            let id = e.id.to_string();
            listing.push(
                id.clone(),
                vec![
                    format_short_id(&id),
                    e.username.clone(),
                    truncate_str(&e.name, 24),
                    e.level.to_string(),
                    e.phone.clone(),
                ],
            );
        }

        // Hashes never leave the roster
        let public: Vec<PublicEmployee> = employees.iter().map(|e| PublicEmployee::from(*e)).collect();
        listing.print(workspace.list_format(global), &public)
    }
}

#[derive(serde::Serialize)]
struct PublicEmployee<'a> {
    id: String,
    name: &'a str,
    username: &'a str,
    phone: &'a str,
    address: &'a str,
    level: PermissionLevel,
}

impl<'a> From<&'a Employee> for PublicEmployee<'a> {
    fn from(e: &'a Employee) -> Self {
        Self {
            id: e.id.to_string(),
            name: &e.name,
            username: &e.username,
            phone: &e.phone,
            address: &e.address,
            level: e.level,
        }
    }
}

fn run_whoami(global: &GlobalOpts) -> Result<()> {
    let workspace = Workspace::open(global)?;
    let roster = workspace.roster()?;
    let actor = workspace.actor(global)?;

    let Some(user) = roster.find(&actor) else {
        bail!(
            "acting employee '{}' is not in the roster; see 'hangar team list'",
            actor
        );
    };

    println!("Name:     {}", user.name);
    println!("Username: {}", user.username);
    println!("ID:       {}", user.id);
    println!("Level:    {}", user.level);
    println!(
        "Can manage employees: {}",
        if user.is_admin() { "yes" } else { "only themselves" }
    );
    Ok(())
}

impl TeamAddArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let workspace = Workspace::open(global)?;
        let actor = workspace.actor(global)?;
        let mut roster = workspace.roster()?;

        let password = match &self.password {
            Some(password) => password.clone(),
            None => dialoguer::Password::new()
                .with_prompt(format!("Password for {}", self.username))
                .with_confirmation("Repeat password", "Passwords do not match")
                .interact()
                .into_diagnostic()?,
        };

        let employee = Employee::new(&self.name, &self.username, &password, self.level)
            .with_contact(&self.phone, &self.address);
        let added = roster.register(employee, &actor)?;

        success(
            global,
            format!(
                "Added {} ({}) as {}",
                style(&added.username).cyan(),
                added.id,
                added.level
            ),
        );
        Ok(())
    }
}

impl TeamUpdateArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let update = EmployeeUpdate {
            name: self.name.clone(),
            username: self.username.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            password: self.password.clone(),
            level: self.level,
        };
        if update.is_empty() {
            bail!("nothing to update: pass at least one field to change");
        }

        let workspace = Workspace::open(global)?;
        let actor = workspace.actor(global)?;
        let mut roster = workspace.roster()?;

        let updated = roster.update(&self.target, update, &actor)?;
        success(
            global,
            format!(
                "Updated {} ({})",
                style(&updated.username).cyan(),
                updated.level
            ),
        );
        Ok(())
    }
}

impl TeamRemoveArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let workspace = Workspace::open(global)?;
        let actor = workspace.actor(global)?;
        let mut roster = workspace.roster()?;

        if !confirm(&format!("Remove employee {}?", self.target), self.yes)? {
            println!("Aborted.");
            return Ok(());
        }

        let removed = roster.remove(&self.target, &actor)?;
        success(
            global,
            format!("Removed {}", style(&removed.username).cyan()),
        );
        Ok(())
    }
}

impl TeamAuthArgs {
    pub fn run(&self, global: &GlobalOpts) -> Result<()> {
        let workspace = Workspace::open(global)?;
        let roster = workspace.roster()?;

        let password = match &self.password {
            Some(password) => password.clone(),
            None => dialoguer::Password::new()
                .with_prompt("Password")
                .interact()
                .into_diagnostic()?,
        };

        match roster.authenticate(&self.username, &password) {
            Some(employee) => {
                success(
                    global,
                    format!(
                        "Authenticated {} ({})",
                        style(&employee.username).cyan(),
                        employee.level
                    ),
                );
                Ok(())
            }
            None => {
                tracing::warn!(username = %self.username, "authentication failed");
                bail!("authentication failed for '{}'", self.username)
            }
        }
    }
}
