//! Part record - a component attached to one aircraft

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Where the part is sourced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    National,
    Imported,
}

impl std::fmt::Display for PartCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartCategory::National => write!(f, "national"),
            PartCategory::Imported => write!(f, "imported"),
        }
    }
}

impl std::str::FromStr for PartCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "national" => Ok(PartCategory::National),
            "imported" => Ok(PartCategory::Imported),
            _ => Err(format!(
                "Invalid part category: {}. Use national or imported",
                s
            )),
        }
    }
}

/// Logistics status of a part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum PartStatus {
    #[default]
    InProduction,
    InTransport,
    Received,
    Installed,
}

impl std::fmt::Display for PartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartStatus::InProduction => write!(f, "in_production"),
            PartStatus::InTransport => write!(f, "in_transport"),
            PartStatus::Received => write!(f, "received"),
            PartStatus::Installed => write!(f, "installed"),
        }
    }
}

impl std::str::FromStr for PartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "in_production" | "inproduction" => Ok(PartStatus::InProduction),
            "in_transport" | "intransport" => Ok(PartStatus::InTransport),
            "received" => Ok(PartStatus::Received),
            "installed" => Ok(PartStatus::Installed),
            _ => Err(format!(
                "Invalid part status: {}. Use in_production, in_transport, received, or installed",
                s
            )),
        }
    }
}

fn new_part_id() -> EntityId {
    EntityId::new(EntityPrefix::Prt)
}

/// A part owned by an aircraft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Stable identifier (PRT-xxx)
    #[serde(default = "new_part_id")]
    pub id: EntityId,

    pub name: String,

    pub category: PartCategory,

    pub supplier: String,

    #[serde(default)]
    pub status: PartStatus,
}

impl Part {
    /// Create a new part in production
    pub fn new(name: impl Into<String>, category: PartCategory, supplier: impl Into<String>) -> Self {
        Self {
            id: new_part_id(),
            name: name.into(),
            category,
            supplier: supplier.into(),
            status: PartStatus::default(),
        }
    }

    pub fn with_status(mut self, status: PartStatus) -> Self {
        self.status = status;
        self
    }

    /// Apply the provided fields, leaving the rest untouched
    pub fn apply(&mut self, update: PartUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(supplier) = update.supplier {
            self.supplier = supplier;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

impl Record for Part {
    const PREFIX: EntityPrefix = EntityPrefix::Prt;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}

/// Partial update for a part
#[derive(Debug, Clone, Default)]
pub struct PartUpdate {
    pub name: Option<String>,
    pub category: Option<PartCategory>,
    pub supplier: Option<String>,
    pub status: Option<PartStatus>,
}

impl PartUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.supplier.is_none()
            && self.status.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_creation() {
        let part = Part::new("Landing gear", PartCategory::Imported, "Gearworks");
        assert!(part.id.to_string().starts_with("PRT-"));
        assert_eq!(part.status, PartStatus::InProduction);
    }

    #[test]
    fn test_part_status_parsing() {
        assert_eq!(
            "in_transport".parse::<PartStatus>().unwrap(),
            PartStatus::InTransport
        );
        assert_eq!(
            "in-production".parse::<PartStatus>().unwrap(),
            PartStatus::InProduction
        );
        assert_eq!("INSTALLED".parse::<PartStatus>().unwrap(), PartStatus::Installed);
        assert!("lost".parse::<PartStatus>().is_err());
    }

    #[test]
    fn test_partial_update_only_touches_given_fields() {
        let mut part = Part::new("Wing", PartCategory::National, "Acme");
        part.apply(PartUpdate {
            status: Some(PartStatus::Received),
            ..Default::default()
        });
        assert_eq!(part.name, "Wing");
        assert_eq!(part.supplier, "Acme");
        assert_eq!(part.status, PartStatus::Received);
    }

    #[test]
    fn test_part_without_id_gets_one() {
        let json = r#"{"name":"Rudder","category":"national","supplier":"Acme","status":"received"}"#;
        let part: Part = serde_json::from_str(json).unwrap();
        assert_eq!(part.id.prefix(), EntityPrefix::Prt);
        assert_eq!(part.status, PartStatus::Received);
    }
}
