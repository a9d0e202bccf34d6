//! Record identity using type-prefixed ULIDs, plus index-or-id selectors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use miette::Diagnostic;
use thiserror::Error;
use ulid::Ulid;

use crate::core::entity::Record;

/// Record type prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityPrefix {
    /// Part attached to an aircraft
    Prt,
    /// Production stage of an aircraft
    Stg,
    /// Quality test recorded against an aircraft
    Tst,
    /// Employee identity
    Emp,
}

impl EntityPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Prt => "PRT",
            EntityPrefix::Stg => "STG",
            EntityPrefix::Tst => "TST",
            EntityPrefix::Emp => "EMP",
        }
    }

    /// Get all valid prefixes
    pub fn all() -> &'static [EntityPrefix] {
        &[
            EntityPrefix::Prt,
            EntityPrefix::Stg,
            EntityPrefix::Tst,
            EntityPrefix::Emp,
        ]
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityPrefix {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PRT" => Ok(EntityPrefix::Prt),
            "STG" => Ok(EntityPrefix::Stg),
            "TST" => Ok(EntityPrefix::Tst),
            "EMP" => Ok(EntityPrefix::Emp),
            _ => Err(IdParseError::InvalidPrefix(s.to_string())),
        }
    }
}

/// A unique record identifier combining a type prefix and ULID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityId {
    prefix: EntityPrefix,
    ulid: Ulid,
}

impl EntityId {
    /// Create a new EntityId with the given prefix
    pub fn new(prefix: EntityPrefix) -> Self {
        Self {
            prefix,
            ulid: Ulid::new(),
        }
    }

    /// Get the record prefix
    pub fn prefix(&self) -> EntityPrefix {
        self.prefix
    }

    /// Parse an EntityId from a string
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        s.parse()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.ulid)
    }
}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix_str, ulid_str) = s
            .split_once('-')
            .ok_or_else(|| IdParseError::MissingDelimiter(s.to_string()))?;

        let prefix = prefix_str.parse()?;
        let ulid = Ulid::from_string(ulid_str)
            .map_err(|e| IdParseError::InvalidUlid(ulid_str.to_string(), e.to_string()))?;

        Ok(Self { prefix, ulid })
    }
}

impl Serialize for EntityId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when parsing record IDs
#[derive(Debug, Error, Diagnostic)]
pub enum IdParseError {
    #[error("invalid record prefix: '{0}' (valid: PRT, STG, TST, EMP)")]
    #[diagnostic(code(hangar::id::prefix))]
    InvalidPrefix(String),

    #[error("missing '-' delimiter in record ID: '{0}'")]
    #[diagnostic(
        code(hangar::id::delimiter),
        help("address a record by its index (e.g. 0) or its full id (e.g. PRT-01J...)")
    )]
    MissingDelimiter(String),

    #[error("invalid ULID '{0}': {1}")]
    #[diagnostic(code(hangar::id::ulid))]
    InvalidUlid(String, String),
}

/// Addresses a child record either by its current position or by its stable id
///
/// Positions shift when an earlier record is deleted; ids never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Index(usize),
    Id(EntityId),
}

impl Selector {
    /// Resolve against the current sequence, returning the position if it exists
    pub fn position<T: Record>(&self, items: &[T]) -> Option<usize> {
        match self {
            Selector::Index(i) if *i < items.len() => Some(*i),
            Selector::Index(_) => None,
            Selector::Id(id) => items.iter().position(|item| item.id() == id),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Index(i) => write!(f, "#{}", i),
            Selector::Id(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Selector {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('#');
        if let Ok(index) = trimmed.parse::<usize>() {
            return Ok(Selector::Index(index));
        }
        Ok(Selector::Id(trimmed.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::{Part, PartCategory};

    #[test]
    fn test_entity_id_generation() {
        let id = EntityId::new(EntityPrefix::Prt);
        assert!(id.to_string().starts_with("PRT-"));
        assert_eq!(id.to_string().len(), 30); // PRT- (4) + ULID (26) = 30
    }

    #[test]
    fn test_entity_id_roundtrip() {
        let original = EntityId::new(EntityPrefix::Stg);
        let parsed = EntityId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed.prefix(), EntityPrefix::Stg);
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_entity_id_invalid_prefix() {
        let err = EntityId::parse("XXX-01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidPrefix(_)));
    }

    #[test]
    fn test_entity_id_missing_delimiter() {
        let err = EntityId::parse("PRT01HQ3K4N5M6P7R8S9T0UVWXYZ").unwrap_err();
        assert!(matches!(err, IdParseError::MissingDelimiter(_)));
    }

    #[test]
    fn test_entity_id_invalid_ulid() {
        let err = EntityId::parse("TST-notaulid").unwrap_err();
        assert!(matches!(err, IdParseError::InvalidUlid(_, _)));
    }

    #[test]
    fn test_all_prefixes_parse() {
        for prefix in EntityPrefix::all() {
            let id = EntityId::new(*prefix);
            let parsed = EntityId::parse(&id.to_string()).unwrap();
            assert_eq!(parsed.prefix(), *prefix);
        }
    }

    #[test]
    fn test_selector_parsing() {
        assert_eq!("3".parse::<Selector>().unwrap(), Selector::Index(3));
        assert_eq!("#0".parse::<Selector>().unwrap(), Selector::Index(0));

        let id = EntityId::new(EntityPrefix::Prt);
        assert_eq!(
            id.to_string().parse::<Selector>().unwrap(),
            Selector::Id(id)
        );
        assert!("wing".parse::<Selector>().is_err());
    }

    #[test]
    fn test_selector_position_survives_deletes() {
        let mut parts = vec![
            Part::new("Wing", PartCategory::National, "Acme"),
            Part::new("Engine", PartCategory::Imported, "Turbo"),
        ];
        let engine = Selector::Id(parts[1].id.clone());
        assert_eq!(engine.position(&parts), Some(1));
        assert_eq!(Selector::Index(2).position(&parts), None);

        parts.remove(0);
        assert_eq!(engine.position(&parts), Some(0));
    }
}
