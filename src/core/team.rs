//! Employee roster and permission checks
//!
//! Every mutation is authorized against an acting employee and leaves a line
//! in the audit log, including attempts that were denied.

use chrono::Utc;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::store::{self, RecordStore, StoreError};
use crate::entities::employee::{Employee, EmployeeUpdate, PermissionLevel};

/// Storage file holding one employee per line
pub const EMPLOYEES_FILE: &str = "employees.jsonl";

/// Append-only audit trail of roster changes
pub const AUDIT_FILE: &str = "employee_audit.log";

/// Username of the bootstrap administrator
pub const BOOTSTRAP_USERNAME: &str = "admin";

/// Password given to the bootstrap administrator on first open
pub const BOOTSTRAP_PASSWORD: &str = "admin123";

/// Errors raised by roster operations
#[derive(Debug, Error, Diagnostic)]
pub enum TeamError {
    #[error("employee '{0}' not found")]
    #[diagnostic(
        code(hangar::team::not_found),
        help("run 'hangar team list' to see employees")
    )]
    NotFound(String),

    #[error("username '{0}' is already taken")]
    #[diagnostic(code(hangar::team::duplicate_username))]
    DuplicateUsername(String),

    #[error("'{actor}' may not {action} '{target}'")]
    #[diagnostic(
        code(hangar::team::permission_denied),
        help("act as an administrator with --actor or set 'actor' in the config")
    )]
    PermissionDenied {
        actor: String,
        action: &'static str,
        target: String,
    },

    #[error("'{0}' is the last administrator")]
    #[diagnostic(
        code(hangar::team::last_admin),
        help("promote another employee to admin first")
    )]
    LastAdminProtected(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Roster actions recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Register,
    Update,
    Delete,
    RegisterDenied,
    UpdateDenied,
    DeleteDenied,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Register => "REGISTER",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
            AuditAction::RegisterDenied => "REGISTER_DENIED",
            AuditAction::UpdateDenied => "UPDATE_DENIED",
            AuditAction::DeleteDenied => "DELETE_DENIED",
        }
    }
}

/// Loaded roster of employees
pub struct TeamRoster<S: RecordStore> {
    store: S,
    employees: Vec<Employee>,
    skipped: usize,
}

impl<S: RecordStore> TeamRoster<S> {
    /// Load the roster, creating the bootstrap administrator when absent
    pub fn open(store: S) -> Result<Self, TeamError> {
        let loaded = store::load_all::<Employee, _>(&store, EMPLOYEES_FILE)?;
        if loaded.skipped > 0 {
            tracing::warn!(file = EMPLOYEES_FILE, skipped = loaded.skipped, "skipped unreadable employee records");
        }

        let mut roster = Self {
            store,
            employees: loaded.records,
            skipped: loaded.skipped,
        };

        if roster.find(BOOTSTRAP_USERNAME).is_none() {
            let admin = Employee::new(
                "Administrator",
                BOOTSTRAP_USERNAME,
                BOOTSTRAP_PASSWORD,
                PermissionLevel::Admin,
            );
            store::append_one(&roster.store, EMPLOYEES_FILE, &admin)?;
            tracing::info!(id = %admin.id, "bootstrap administrator created");
            roster.employees.push(admin);
        }

        tracing::debug!(count = roster.employees.len(), "employee roster loaded");
        Ok(roster)
    }

    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Find by id or username (case-insensitive)
    pub fn find(&self, id_or_username: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.matches(id_or_username))
    }

    pub fn list(&self) -> &[Employee] {
        &self.employees
    }

    pub fn admins(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|e| e.is_admin())
    }

    /// Check credentials
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|e| e.username.eq_ignore_ascii_case(username))
            .filter(|e| e.verify_password(password))
    }

    /// Add an employee on behalf of an administrator
    pub fn register(&mut self, employee: Employee, actor: &str) -> Result<&Employee, TeamError> {
        let actor = self.resolve(actor)?.clone();

        if !actor.is_admin() {
            self.audit(
                AuditAction::RegisterDenied,
                &actor,
                &employee.username,
                None,
            );
            return Err(TeamError::PermissionDenied {
                actor: actor.username,
                action: "register",
                target: employee.username,
            });
        }

        if self.find(&employee.username).is_some() {
            return Err(TeamError::DuplicateUsername(employee.username));
        }

        store::append_one(&self.store, EMPLOYEES_FILE, &employee)?;
        self.audit(
            AuditAction::Register,
            &actor,
            &employee.id.to_string(),
            Some(&employee),
        );
        tracing::info!(id = %employee.id, username = %employee.username, level = %employee.level, "employee registered");

        self.employees.push(employee);
        let index = self.employees.len() - 1;
        Ok(&self.employees[index])
    }

    /// Change an employee; allowed for administrators and for oneself
    ///
    /// Only administrators may change a permission level.
    pub fn update(
        &mut self,
        target: &str,
        update: EmployeeUpdate,
        actor: &str,
    ) -> Result<&Employee, TeamError> {
        let actor = self.resolve(actor)?.clone();
        let index = self.position(target)?;
        let current = self.employees[index].clone();

        let changes_level = update.level.is_some_and(|level| level != current.level);
        let allowed = actor.is_admin() || (actor.id == current.id && !changes_level);
        if !allowed {
            self.audit(
                AuditAction::UpdateDenied,
                &actor,
                &current.id.to_string(),
                None,
            );
            return Err(TeamError::PermissionDenied {
                actor: actor.username,
                action: "update",
                target: current.username,
            });
        }

        let demotes_admin = current.is_admin()
            && update
                .level
                .is_some_and(|level| level != PermissionLevel::Admin);
        if demotes_admin && self.admins().count() <= 1 {
            return Err(TeamError::LastAdminProtected(current.username));
        }

        if let Some(username) = &update.username {
            if self
                .employees
                .iter()
                .any(|e| e.id != current.id && e.username.eq_ignore_ascii_case(username))
            {
                return Err(TeamError::DuplicateUsername(username.clone()));
            }
        }

        let mut draft = current.clone();
        draft.apply(update);
        self.employees[index] = draft;

        if let Err(e) = self.persist_all() {
            self.employees[index] = current;
            return Err(e);
        }

        let updated = self.employees[index].clone();
        self.audit(
            AuditAction::Update,
            &actor,
            &updated.id.to_string(),
            Some(&updated),
        );
        tracing::info!(id = %updated.id, actor = %actor.id, "employee updated");
        Ok(&self.employees[index])
    }

    /// Delete an employee; allowed for administrators and for oneself
    pub fn remove(&mut self, target: &str, actor: &str) -> Result<Employee, TeamError> {
        let actor = self.resolve(actor)?.clone();
        let index = self.position(target)?;
        let current = self.employees[index].clone();

        if !(actor.is_admin() || actor.id == current.id) {
            self.audit(
                AuditAction::DeleteDenied,
                &actor,
                &current.id.to_string(),
                None,
            );
            return Err(TeamError::PermissionDenied {
                actor: actor.username,
                action: "remove",
                target: current.username,
            });
        }

        if current.is_admin() && self.admins().count() <= 1 {
            return Err(TeamError::LastAdminProtected(current.username));
        }

        let removed = self.employees.remove(index);
        if let Err(e) = self.persist_all() {
            self.employees.insert(index, removed);
            return Err(e);
        }

        self.audit(
            AuditAction::Delete,
            &actor,
            &removed.id.to_string(),
            None,
        );
        tracing::info!(id = %removed.id, actor = %actor.id, "employee removed");
        Ok(removed)
    }

    fn resolve(&self, id_or_username: &str) -> Result<&Employee, TeamError> {
        self.find(id_or_username)
            .ok_or_else(|| TeamError::NotFound(id_or_username.to_string()))
    }

    fn position(&self, id_or_username: &str) -> Result<usize, TeamError> {
        self.employees
            .iter()
            .position(|e| e.matches(id_or_username))
            .ok_or_else(|| TeamError::NotFound(id_or_username.to_string()))
    }

    fn persist_all(&self) -> Result<(), TeamError> {
        store::replace_all(&self.store, EMPLOYEES_FILE, &self.employees)?;
        Ok(())
    }

    /// Append an audit line; failures are logged and swallowed
    fn audit(
        &self,
        action: AuditAction,
        actor: &Employee,
        target: &str,
        subject: Option<&Employee>,
    ) {
        let line = audit_line(action, actor, target, subject);
        if let Err(e) = self.store.append_line(AUDIT_FILE, &line) {
            tracing::warn!(error = %e, action = action.as_str(), "failed to write audit entry");
        }
    }
}

fn audit_line(
    action: AuditAction,
    actor: &Employee,
    target: &str,
    subject: Option<&Employee>,
) -> String {
    let mut line = format!(
        "{} | action:{} | actor:{} | target:{}",
        Utc::now().to_rfc3339(),
        action.as_str(),
        actor.id,
        target
    );
    if let Some(subject) = subject {
        line.push_str(&format!(
            " | username:{} | level:{}",
            subject.username, subject.level
        ));
    }
    line
}
