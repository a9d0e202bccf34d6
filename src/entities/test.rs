//! Quality test record - one recorded test outcome for an aircraft

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::identity::{EntityId, EntityPrefix};

/// Kind of quality test
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    Electrical,
    Hydraulic,
    Aerodynamic,
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestKind::Electrical => write!(f, "electrical"),
            TestKind::Hydraulic => write!(f, "hydraulic"),
            TestKind::Aerodynamic => write!(f, "aerodynamic"),
        }
    }
}

impl std::str::FromStr for TestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "electrical" => Ok(TestKind::Electrical),
            "hydraulic" => Ok(TestKind::Hydraulic),
            "aerodynamic" => Ok(TestKind::Aerodynamic),
            _ => Err(format!(
                "Invalid test kind: {}. Use electrical, hydraulic, or aerodynamic",
                s
            )),
        }
    }
}

/// Outcome of a quality test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TestOutcome {
    Approved,
    Rejected,
}

impl std::fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestOutcome::Approved => write!(f, "approved"),
            TestOutcome::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for TestOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "approved" | "pass" => Ok(TestOutcome::Approved),
            "rejected" | "fail" => Ok(TestOutcome::Rejected),
            _ => Err(format!(
                "Invalid test outcome: {}. Use approved or rejected",
                s
            )),
        }
    }
}

fn new_test_id() -> EntityId {
    EntityId::new(EntityPrefix::Tst)
}

/// A recorded test. Registration order, not `recorded_at`, decides which
/// record of a kind is the latest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityTest {
    /// Stable identifier (TST-xxx)
    #[serde(default = "new_test_id")]
    pub id: EntityId,

    pub kind: TestKind,

    pub outcome: TestOutcome,

    #[serde(default = "Utc::now")]
    pub recorded_at: DateTime<Utc>,
}

impl QualityTest {
    pub fn new(kind: TestKind, outcome: TestOutcome) -> Self {
        Self {
            id: new_test_id(),
            kind,
            outcome,
            recorded_at: Utc::now(),
        }
    }

    /// Apply the provided fields, leaving the rest untouched
    pub fn apply(&mut self, update: TestUpdate) {
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(outcome) = update.outcome {
            self.outcome = outcome;
        }
    }
}

impl Record for QualityTest {
    const PREFIX: EntityPrefix = EntityPrefix::Tst;

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} : {}", self.kind, self.outcome)
    }
}

/// Partial update for a recorded test
#[derive(Debug, Clone, Default)]
pub struct TestUpdate {
    pub kind: Option<TestKind>,
    pub outcome: Option<TestOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_parsing() {
        assert_eq!(
            "APPROVED".parse::<TestOutcome>().unwrap(),
            TestOutcome::Approved
        );
        assert_eq!("fail".parse::<TestOutcome>().unwrap(), TestOutcome::Rejected);
        assert!("maybe".parse::<TestOutcome>().is_err());
    }

    #[test]
    fn test_update_changes_outcome_only() {
        let mut test = QualityTest::new(TestKind::Hydraulic, TestOutcome::Rejected);
        test.apply(TestUpdate {
            outcome: Some(TestOutcome::Approved),
            ..Default::default()
        });
        assert_eq!(test.kind, TestKind::Hydraulic);
        assert_eq!(test.outcome, TestOutcome::Approved);
    }

    #[test]
    fn test_serialization_tokens() {
        let test = QualityTest::new(TestKind::Aerodynamic, TestOutcome::Approved);
        let json = serde_json::to_string(&test).unwrap();
        assert!(json.contains("\"kind\":\"aerodynamic\""));
        assert!(json.contains("\"outcome\":\"approved\""));
        assert!(json.contains("TST-"));
    }
}
