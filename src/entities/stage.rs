//! Stage record - one step of an aircraft's production pipeline

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Stage status (moves forward only)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Pending => write!(f, "pending"),
            StageStatus::InProgress => write!(f, "in_progress"),
            StageStatus::Done => write!(f, "done"),
        }
    }
}

impl std::str::FromStr for StageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(StageStatus::Pending),
            "in_progress" | "inprogress" => Ok(StageStatus::InProgress),
            "done" => Ok(StageStatus::Done),
            _ => Err(format!(
                "Invalid stage status: {}. Use pending, in_progress, or done",
                s
            )),
        }
    }
}

fn new_stage_id() -> EntityId {
    EntityId::new(EntityPrefix::Stg)
}

/// A production stage. Position in the aircraft's stage list is the pipeline order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Stable identifier (STG-xxx)
    #[serde(default = "new_stage_id")]
    pub id: EntityId,

    pub name: String,

    /// Planned duration in days
    pub deadline_days: u32,

    #[serde(default)]
    pub status: StageStatus,

    /// Assigned employee ids
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub employees: BTreeSet<String>,
}

impl Stage {
    /// Create a new pending stage
    pub fn new(name: impl Into<String>, deadline_days: u32) -> Self {
        Self {
            id: new_stage_id(),
            name: name.into(),
            deadline_days,
            status: StageStatus::Pending,
            employees: BTreeSet::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == StageStatus::Done
    }
}

impl Record for Stage {
    const PREFIX: EntityPrefix = EntityPrefix::Stg;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }
}
