//! Record trait - common interface for child records owned by an aircraft

use serde::{de::DeserializeOwned, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// Common trait for parts, stages, tests and employees
pub trait Record: Serialize + DeserializeOwned {
    /// The id prefix (e.g., PRT, STG)
    const PREFIX: EntityPrefix;

    /// Get the record's stable ID
    fn id(&self) -> &EntityId;

    /// Short human-readable label for listings and log lines
    fn label(&self) -> String;
}

