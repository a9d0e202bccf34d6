//! Employee record - an identity that can act on the roster and be assigned to stages

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Permission level of an employee
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Operator,
    Engineer,
    Admin,
}

impl std::fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionLevel::Operator => write!(f, "operator"),
            PermissionLevel::Engineer => write!(f, "engineer"),
            PermissionLevel::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "operator" => Ok(PermissionLevel::Operator),
            "engineer" => Ok(PermissionLevel::Engineer),
            "admin" | "administrator" => Ok(PermissionLevel::Admin),
            _ => Err(format!("Unknown permission level: {}", s)),
        }
    }
}

/// An employee identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier (EMP-xxx)
    pub id: EntityId,

    pub name: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub address: String,

    /// Login name, unique ignoring case
    pub username: String,

    /// `salt$sha256(salt || password)`, both hex encoded
    pub password_hash: String,

    pub level: PermissionLevel,
}

impl Employee {
    /// Create an employee, hashing the given password with a fresh salt
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: &str,
        level: PermissionLevel,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Emp),
            name: name.into(),
            phone: String::new(),
            address: String::new(),
            username: username.into(),
            password_hash: hash_password(password),
            level,
        }
    }

    pub fn with_contact(mut self, phone: impl Into<String>, address: impl Into<String>) -> Self {
        self.phone = phone.into();
        self.address = address.into();
        self
    }

    pub fn is_admin(&self) -> bool {
        self.level == PermissionLevel::Admin
    }

    /// Check a plain-text password against the stored hash
    pub fn verify_password(&self, password: &str) -> bool {
        match self.password_hash.split_once('$') {
            Some((salt, digest)) => salted_digest(salt, password) == digest,
            None => false,
        }
    }

    pub fn set_password(&mut self, password: &str) {
        self.password_hash = hash_password(password);
    }

    /// Matches either the full id or the username (case-insensitive)
    pub fn matches(&self, id_or_username: &str) -> bool {
        self.id.to_string() == id_or_username
            || self.username.eq_ignore_ascii_case(id_or_username)
    }

    /// Apply the provided fields, leaving the rest untouched
    pub fn apply(&mut self, update: EmployeeUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(username) = update.username {
            self.username = username;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(password) = update.password {
            self.set_password(&password);
        }
        if let Some(level) = update.level {
            self.level = level;
        }
    }
}

impl Record for Employee {
    const PREFIX: EntityPrefix = EntityPrefix::Emp;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.username)
    }
}

/// Partial update for an employee
#[derive(Debug, Clone, Default)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub level: Option<PermissionLevel>,
}

impl EmployeeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.username.is_none()
            && self.phone.is_none()
            && self.address.is_none()
            && self.password.is_none()
            && self.level.is_none()
    }
}

fn hash_password(password: &str) -> String {
    let salt: [u8; 16] = rand::random();
    let salt_hex: String = salt.iter().map(|b| format!("{:02x}", b)).collect();
    let digest = salted_digest(&salt_hex, password);
    format!("{}${}", salt_hex, digest)
}

fn salted_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_is_not_stored_in_plain_text() {
        let emp = Employee::new("Ana", "ana", "s3cret", PermissionLevel::Engineer);
        assert!(!emp.password_hash.contains("s3cret"));
        assert!(emp.verify_password("s3cret"));
        assert!(!emp.verify_password("wrong"));
    }

    #[test]
    fn test_same_password_different_salt() {
        let a = Employee::new("A", "a", "pw", PermissionLevel::Operator);
        let b = Employee::new("B", "b", "pw", PermissionLevel::Operator);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn test_matches_id_or_username() {
        let emp = Employee::new("Ana", "Ana.Souza", "pw", PermissionLevel::Operator);
        assert!(emp.matches("ana.souza"));
        assert!(emp.matches(&emp.id.to_string()));
        assert!(!emp.matches("ana"));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!(
            "Administrator".parse::<PermissionLevel>().unwrap(),
            PermissionLevel::Admin
        );
        assert!("root".parse::<PermissionLevel>().is_err());
    }
}
