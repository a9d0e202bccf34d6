//! Aircraft record - the unit of production tracking

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::entities::part::Part;
use crate::entities::stage::Stage;
use crate::entities::test::QualityTest;

/// Aircraft category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AircraftCategory {
    Commercial,
    Military,
}

impl std::fmt::Display for AircraftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AircraftCategory::Commercial => write!(f, "commercial"),
            AircraftCategory::Military => write!(f, "military"),
        }
    }
}

impl std::str::FromStr for AircraftCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commercial" => Ok(AircraftCategory::Commercial),
            "military" => Ok(AircraftCategory::Military),
            _ => Err(format!(
                "Invalid aircraft category: {}. Use commercial or military",
                s
            )),
        }
    }
}

/// An aircraft under production, owning its parts, stages and tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    /// Unique code, immutable once registered
    pub code: String,

    pub model: String,

    pub category: AircraftCategory,

    /// Passenger or payload capacity
    pub capacity: u32,

    /// Range in kilometres
    pub range_km: u32,

    #[serde(default)]
    pub parts: Vec<Part>,

    /// Pipeline order is list order
    #[serde(default)]
    pub stages: Vec<Stage>,

    #[serde(default)]
    pub tests: Vec<QualityTest>,
}

impl Aircraft {
    /// Create an aircraft with no parts, stages or tests
    pub fn new(
        code: impl Into<String>,
        model: impl Into<String>,
        category: AircraftCategory,
        capacity: u32,
        range_km: u32,
    ) -> Self {
        Self {
            code: code.into(),
            model: model.into(),
            category,
            capacity,
            range_km,
            parts: Vec::new(),
            stages: Vec::new(),
            tests: Vec::new(),
        }
    }

    /// Apply the provided fields; the code is never touched
    pub fn apply(&mut self, update: AircraftUpdate) {
        if let Some(model) = update.model {
            self.model = model;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(range_km) = update.range_km {
            self.range_km = range_km;
        }
    }

    /// Number of stages already done
    pub fn stages_done(&self) -> usize {
        self.stages.iter().filter(|s| s.is_done()).count()
    }
}

/// Partial update for an aircraft
#[derive(Debug, Clone, Default)]
pub struct AircraftUpdate {
    pub model: Option<String>,
    pub category: Option<AircraftCategory>,
    pub capacity: Option<u32>,
    pub range_km: Option<u32>,
}

impl AircraftUpdate {
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.category.is_none()
            && self.capacity.is_none()
            && self.range_km.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::part::PartCategory;
    use crate::entities::test::{TestKind, TestOutcome};

    #[test]
    fn test_aircraft_update_is_partial() {
        let mut aircraft = Aircraft::new("AC1", "E195", AircraftCategory::Commercial, 120, 4000);
        aircraft.apply(AircraftUpdate {
            capacity: Some(132),
            ..Default::default()
        });
        assert_eq!(aircraft.model, "E195");
        assert_eq!(aircraft.capacity, 132);
        assert_eq!(aircraft.range_km, 4000);
    }

    #[test]
    fn test_aircraft_deserialization_without_children() {
        let json = r#"{"code":"AC9","model":"KC-390","category":"military","capacity":80,"range_km":5800}"#;
        let aircraft: Aircraft = serde_json::from_str(json).unwrap();
        assert_eq!(aircraft.category, AircraftCategory::Military);
        assert!(aircraft.parts.is_empty());
        assert!(aircraft.stages.is_empty());
        assert!(aircraft.tests.is_empty());
    }

    #[test]
    fn test_aircraft_json_roundtrip_keeps_children() {
        let mut aircraft = Aircraft::new("AC1", "E195", AircraftCategory::Commercial, 120, 4000);
        aircraft
            .parts
            .push(Part::new("Wing", PartCategory::National, "Acme"));
        aircraft.stages.push(Stage::new("Assembly", 30));
        aircraft
            .tests
            .push(QualityTest::new(TestKind::Electrical, TestOutcome::Approved));

        let line = serde_json::to_string(&aircraft).unwrap();
        assert!(!line.contains('\n'));
        let back: Aircraft = serde_json::from_str(&line).unwrap();
        assert_eq!(back, aircraft);
    }
}
