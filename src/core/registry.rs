//! Production registry - the in-memory source of truth for all aircraft
//!
//! The registry owns every aircraft keyed by code, in registration order, and
//! mirrors each mutation to durable storage before reporting success. A
//! mutation whose persist fails is rolled back, so memory and storage never
//! disagree about a successful call.

use indexmap::IndexMap;
use std::collections::HashSet;
use miette::Diagnostic;
use thiserror::Error;

use crate::core::identity::Selector;
use crate::core::store::{self, RecordStore, StoreError};
use crate::core::workflow::{self, ReleaseGate};
use crate::entities::aircraft::{Aircraft, AircraftUpdate};
use crate::entities::part::{Part, PartStatus, PartUpdate};
use crate::entities::stage::{Stage, StageStatus};
use crate::entities::test::{QualityTest, TestKind, TestUpdate};

/// Storage file holding one aircraft per line
pub const AIRCRAFT_FILE: &str = "aircraft.jsonl";

/// Child sequences owned by an aircraft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Part,
    Stage,
    Test,
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildKind::Part => write!(f, "part"),
            ChildKind::Stage => write!(f, "stage"),
            ChildKind::Test => write!(f, "test"),
        }
    }
}

/// Errors raised by registry operations
#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("aircraft '{code}' not found")]
    #[diagnostic(
        code(hangar::registry::not_found),
        help("run 'hangar aircraft list' to see registered codes")
    )]
    NotFound { code: String },

    #[error("aircraft '{code}' has no {kind} at {index} ({len} recorded)")]
    #[diagnostic(code(hangar::registry::invalid_index))]
    InvalidIndex {
        code: String,
        kind: ChildKind,
        index: usize,
        len: usize,
    },

    #[error("aircraft '{code}' has no {kind} matching {selector}")]
    #[diagnostic(code(hangar::registry::invalid_index))]
    UnknownChild {
        code: String,
        kind: ChildKind,
        selector: String,
    },

    #[error("invalid aircraft code '{code}': {reason}")]
    #[diagnostic(
        code(hangar::registry::invalid_code),
        help("codes are used in report file names; use letters, digits, '-' or '_'")
    )]
    InvalidCode { code: String, reason: &'static str },

    #[error("aircraft code '{code}' is already registered")]
    #[diagnostic(code(hangar::registry::duplicate_code))]
    DuplicateCode { code: String },

    #[error("cannot start stage {index} of '{code}': previous stage '{previous}' is {previous_status}, not done")]
    #[diagnostic(
        code(hangar::workflow::previous_stage_incomplete),
        help("complete the previous stage first")
    )]
    PreviousStageIncomplete {
        code: String,
        index: usize,
        previous: String,
        previous_status: StageStatus,
    },

    #[error("cannot complete the final stage of '{code}': latest {} test rejected", join_kinds(.kinds))]
    #[diagnostic(
        code(hangar::workflow::failed_tests_pending),
        help("record a new approved test of each rejected kind, then retry")
    )]
    FailedTestsPending { code: String, kinds: Vec<TestKind> },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Check that a code is usable as a registry key and a file name component
pub fn validate_code(code: &str) -> Result<(), RegistryError> {
    let reason = if code.trim().is_empty() {
        "code cannot be empty"
    } else if code.contains(['/', '\\']) {
        "code cannot contain path separators"
    } else if code.chars().any(char::is_control) {
        "code cannot contain control characters"
    } else {
        return Ok(());
    };
    Err(RegistryError::InvalidCode {
        code: code.to_string(),
        reason,
    })
}

fn lacks_child_ids(value: &serde_json::Value) -> bool {
    ["parts", "stages", "tests"].iter().any(|key| {
        value
            .get(key)
            .and_then(serde_json::Value::as_array)
            .map_or(false, |items| items.iter().any(|item| item.get("id").is_none()))
    })
}

fn join_kinds(kinds: &[TestKind]) -> String {
    kinds
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The production registry
pub struct ProductionRegistry<S: RecordStore> {
    store: S,
    aircraft: IndexMap<String, Aircraft>,
    skipped: usize,
}

impl<S: RecordStore> ProductionRegistry<S> {
    /// Load every stored aircraft
    ///
    /// Malformed lines, and lines repeating an already loaded code, are skipped
    /// and counted in [`skipped_records`](Self::skipped_records).
    pub fn open(store: S) -> Result<Self, RegistryError> {
        let loaded = store::load_all::<Aircraft, _>(&store, AIRCRAFT_FILE)?;
        let mut skipped = loaded.skipped;
        let mut aircraft = IndexMap::with_capacity(loaded.records.len());

        for record in loaded.records {
            if aircraft.contains_key(&record.code) {
                skipped += 1;
                continue;
            }
            aircraft.insert(record.code.clone(), record);
        }

        if skipped > 0 {
            tracing::warn!(file = AIRCRAFT_FILE, skipped, "skipped unreadable aircraft records");
        }
        tracing::debug!(count = aircraft.len(), "aircraft registry loaded");

        let registry = Self {
            store,
            aircraft,
            skipped,
        };
        match registry.backfill_child_ids() {
            Ok(0) => {}
            Ok(filled) => tracing::info!(filled, "stored missing child ids"),
            Err(e) => tracing::warn!(error = %e, "could not store generated child ids"),
        }
        Ok(registry)
    }

    /// Rewrite stored lines whose parts, stages or tests had no id
    ///
    /// Ids generated while loading would otherwise change on every open.
    /// Every other line, corrupted ones included, is written back unchanged.
    fn backfill_child_ids(&self) -> Result<usize, RegistryError> {
        let Some(lines) = self.store.read_lines(AIRCRAFT_FILE)? else {
            return Ok(0);
        };

        let mut seen = HashSet::new();
        let mut filled = 0;
        let mut out = Vec::with_capacity(lines.len());
        for line in lines {
            let Ok(value) = serde_json::from_str::<serde_json::Value>(line.trim()) else {
                out.push(line);
                continue;
            };
            let Ok(record) = serde_json::from_value::<Aircraft>(value.clone()) else {
                out.push(line);
                continue;
            };
            // Only the first line of a code is live; later duplicates stay as they are
            let live = seen.insert(record.code.clone());
            match self.aircraft.get(&record.code) {
                Some(loaded) if live && lacks_child_ids(&value) => {
                    out.push(store::encode(AIRCRAFT_FILE, loaded)?);
                    filled += 1;
                }
                _ => out.push(line),
            }
        }

        if filled > 0 {
            self.store.write_lines(AIRCRAFT_FILE, &out)?;
        }
        Ok(filled)
    }

    /// Number of stored records that could not be loaded
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Aircraft
    // =========================================================================

    /// Register a new aircraft; its record is appended to storage
    pub fn register(&mut self, aircraft: Aircraft) -> Result<&Aircraft, RegistryError> {
        validate_code(&aircraft.code)?;
        if self.aircraft.contains_key(&aircraft.code) {
            return Err(RegistryError::DuplicateCode {
                code: aircraft.code,
            });
        }

        store::append_one(&self.store, AIRCRAFT_FILE, &aircraft)?;
        tracing::info!(aircraft = %aircraft.code, model = %aircraft.model, "aircraft registered");

        let code = aircraft.code.clone();
        self.aircraft.insert(code.clone(), aircraft);
        self.get(&code)
    }

    pub fn get(&self, code: &str) -> Result<&Aircraft, RegistryError> {
        self.aircraft
            .get(code)
            .ok_or_else(|| RegistryError::NotFound {
                code: code.to_string(),
            })
    }

    /// All aircraft in registration order
    pub fn list(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.values()
    }

    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Apply the provided fields to an aircraft
    pub fn update(&mut self, code: &str, update: AircraftUpdate) -> Result<(), RegistryError> {
        self.modify(code, |aircraft| {
            aircraft.apply(update);
            Ok(())
        })
    }

    /// Remove an aircraft from memory and storage
    pub fn delete(&mut self, code: &str) -> Result<Aircraft, RegistryError> {
        let (index, key, removed) =
            self.aircraft
                .shift_remove_full(code)
                .ok_or_else(|| RegistryError::NotFound {
                    code: code.to_string(),
                })?;

        if let Err(e) = self.persist_all() {
            self.aircraft.shift_insert(index, key, removed);
            return Err(e);
        }

        tracing::info!(aircraft = code, "aircraft deleted");
        Ok(removed)
    }

    // =========================================================================
    // Parts
    // =========================================================================

    /// Attach a part; returns its index
    pub fn add_part(&mut self, code: &str, part: Part) -> Result<usize, RegistryError> {
        self.modify(code, |aircraft| {
            aircraft.parts.push(part);
            Ok(aircraft.parts.len() - 1)
        })
    }

    pub fn parts(&self, code: &str) -> Result<&[Part], RegistryError> {
        Ok(&self.get(code)?.parts)
    }

    pub fn part(&self, code: &str, index: usize) -> Result<&Part, RegistryError> {
        let aircraft = self.get(code)?;
        aircraft
            .parts
            .get(index)
            .ok_or_else(|| invalid_index(aircraft, ChildKind::Part, index))
    }

    pub fn update_part(
        &mut self,
        code: &str,
        index: usize,
        update: PartUpdate,
    ) -> Result<(), RegistryError> {
        self.modify(code, |aircraft| {
            let err = invalid_index(aircraft, ChildKind::Part, index);
            let part = aircraft.parts.get_mut(index).ok_or(err)?;
            part.apply(update);
            Ok(())
        })
    }

    pub fn set_part_status(
        &mut self,
        code: &str,
        index: usize,
        status: PartStatus,
    ) -> Result<(), RegistryError> {
        self.update_part(
            code,
            index,
            PartUpdate {
                status: Some(status),
                ..Default::default()
            },
        )
    }

    /// Remove a part; later parts shift down by one
    pub fn delete_part(&mut self, code: &str, index: usize) -> Result<Part, RegistryError> {
        self.modify(code, |aircraft| {
            if index >= aircraft.parts.len() {
                return Err(invalid_index(aircraft, ChildKind::Part, index));
            }
            Ok(aircraft.parts.remove(index))
        })
    }

    // =========================================================================
    // Stages
    // =========================================================================

    /// Append a stage to the end of the pipeline; returns its index
    pub fn add_stage(&mut self, code: &str, stage: Stage) -> Result<usize, RegistryError> {
        self.modify(code, |aircraft| {
            aircraft.stages.push(stage);
            Ok(aircraft.stages.len() - 1)
        })
    }

    pub fn stages(&self, code: &str) -> Result<&[Stage], RegistryError> {
        Ok(&self.get(code)?.stages)
    }

    pub fn stage(&self, code: &str, index: usize) -> Result<&Stage, RegistryError> {
        let aircraft = self.get(code)?;
        aircraft
            .stages
            .get(index)
            .ok_or_else(|| invalid_index(aircraft, ChildKind::Stage, index))
    }

    /// Start a stage; see [`workflow::start_stage`]
    pub fn advance(&mut self, code: &str, index: usize) -> Result<StageStatus, RegistryError> {
        self.modify(code, |aircraft| workflow::start_stage(aircraft, index))
    }

    /// Close a stage; see [`workflow::complete_stage`]
    pub fn complete(&mut self, code: &str, index: usize) -> Result<StageStatus, RegistryError> {
        self.modify(code, |aircraft| workflow::complete_stage(aircraft, index))
    }

    /// Assign an employee to a stage; assigning twice is a no-op
    pub fn assign(
        &mut self,
        code: &str,
        index: usize,
        employee_id: &str,
    ) -> Result<bool, RegistryError> {
        self.modify(code, |aircraft| {
            workflow::assign_employee(aircraft, index, employee_id)
        })
    }

    /// Evaluate the release gate without mutating anything
    pub fn release_readiness(&self, code: &str) -> Result<ReleaseGate, RegistryError> {
        Ok(workflow::release_gate(&self.get(code)?.tests))
    }

    // =========================================================================
    // Tests
    // =========================================================================

    /// Record a test outcome; returns its index
    pub fn register_test(&mut self, code: &str, test: QualityTest) -> Result<usize, RegistryError> {
        self.modify(code, |aircraft| {
            tracing::info!(aircraft = %aircraft.code, kind = %test.kind, outcome = %test.outcome, "test recorded");
            aircraft.tests.push(test);
            Ok(aircraft.tests.len() - 1)
        })
    }

    pub fn tests(&self, code: &str) -> Result<&[QualityTest], RegistryError> {
        Ok(&self.get(code)?.tests)
    }

    pub fn test(&self, code: &str, index: usize) -> Result<&QualityTest, RegistryError> {
        let aircraft = self.get(code)?;
        aircraft
            .tests
            .get(index)
            .ok_or_else(|| invalid_index(aircraft, ChildKind::Test, index))
    }

    pub fn update_test(
        &mut self,
        code: &str,
        index: usize,
        update: TestUpdate,
    ) -> Result<(), RegistryError> {
        self.modify(code, |aircraft| {
            let err = invalid_index(aircraft, ChildKind::Test, index);
            let test = aircraft.tests.get_mut(index).ok_or(err)?;
            test.apply(update);
            Ok(())
        })
    }

    /// Remove a test record; later records shift down by one
    pub fn delete_test(&mut self, code: &str, index: usize) -> Result<QualityTest, RegistryError> {
        self.modify(code, |aircraft| {
            if index >= aircraft.tests.len() {
                return Err(invalid_index(aircraft, ChildKind::Test, index));
            }
            Ok(aircraft.tests.remove(index))
        })
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// Resolve a selector to a current index of the given child sequence
    pub fn locate(
        &self,
        code: &str,
        kind: ChildKind,
        selector: &Selector,
    ) -> Result<usize, RegistryError> {
        let aircraft = self.get(code)?;
        let position = match kind {
            ChildKind::Part => selector.position(&aircraft.parts),
            ChildKind::Stage => selector.position(&aircraft.stages),
            ChildKind::Test => selector.position(&aircraft.tests),
        };
        position.ok_or_else(|| match selector {
            Selector::Index(index) => invalid_index(aircraft, kind, *index),
            Selector::Id(_) => RegistryError::UnknownChild {
                code: code.to_string(),
                kind,
                selector: selector.to_string(),
            },
        })
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Run `op` on a draft copy of the aircraft and commit it with a full persist
    ///
    /// Nothing changes if `op` fails. If the persist fails, the previous
    /// record is restored and the store error is returned.
    fn modify<R>(
        &mut self,
        code: &str,
        op: impl FnOnce(&mut Aircraft) -> Result<R, RegistryError>,
    ) -> Result<R, RegistryError> {
        let slot = self
            .aircraft
            .get_mut(code)
            .ok_or_else(|| RegistryError::NotFound {
                code: code.to_string(),
            })?;

        let mut draft = slot.clone();
        let out = op(&mut draft)?;
        let previous = std::mem::replace(slot, draft);

        if let Err(e) = self.persist_all() {
            if let Some(slot) = self.aircraft.get_mut(code) {
                *slot = previous;
            }
            return Err(e);
        }
        Ok(out)
    }

    fn persist_all(&self) -> Result<(), RegistryError> {
        store::replace_all(&self.store, AIRCRAFT_FILE, self.aircraft.values())?;
        tracing::debug!(count = self.aircraft.len(), "aircraft registry persisted");
        Ok(())
    }
}

fn invalid_index(aircraft: &Aircraft, kind: ChildKind, index: usize) -> RegistryError {
    let len = match kind {
        ChildKind::Part => aircraft.parts.len(),
        ChildKind::Stage => aircraft.stages.len(),
        ChildKind::Test => aircraft.tests.len(),
    };
    RegistryError::InvalidIndex {
        code: aircraft.code.clone(),
        kind,
        index,
        len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{FileStore, MemoryStore};
    use crate::entities::aircraft::AircraftCategory;
    use crate::entities::part::PartCategory;
    use crate::entities::test::TestOutcome;
    use tempfile::tempdir;

    /// Store whose rewrites always fail, to exercise rollback
    #[derive(Default)]
    struct FailingRewrites(MemoryStore);

    impl RecordStore for FailingRewrites {
        fn read_lines(&self, name: &str) -> Result<Option<Vec<String>>, StoreError> {
            self.0.read_lines(name)
        }

        fn append_line(&self, name: &str, line: &str) -> Result<(), StoreError> {
            self.0.append_line(name, line)
        }

        fn write_lines(&self, name: &str, _lines: &[String]) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: name.into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            })
        }
    }

    fn sample(code: &str) -> Aircraft {
        Aircraft::new(code, "E195", AircraftCategory::Commercial, 120, 4000)
    }

    fn registry_with(code: &str, stages: &[&str]) -> ProductionRegistry<MemoryStore> {
        let mut registry = ProductionRegistry::open(MemoryStore::new()).unwrap();
        registry.register(sample(code)).unwrap();
        for name in stages {
            registry.add_stage(code, Stage::new(*name, 10)).unwrap();
        }
        registry
    }

    #[test]
    fn test_register_rejects_duplicate_code() {
        let mut registry = registry_with("AC1", &[]);
        let err = registry.register(sample("AC1")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateCode { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_codes_unfit_for_file_names() {
        let mut registry = ProductionRegistry::open(MemoryStore::new()).unwrap();
        for code in ["", "  ", "../AC1", "AC/1", "AC\\1", "AC\n1"] {
            let err = registry.register(sample(code)).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidCode { .. }), "{:?}", code);
        }
        assert!(registry.is_empty());
        assert!(registry.store().lines(AIRCRAFT_FILE).is_empty());

        registry.register(sample("AC-1_b")).unwrap();
    }

    #[test]
    fn test_register_appends_one_line() {
        let mut registry = ProductionRegistry::open(MemoryStore::new()).unwrap();
        registry.register(sample("AC1")).unwrap();
        registry.register(sample("AC2")).unwrap();
        assert_eq!(registry.store().lines(AIRCRAFT_FILE).len(), 2);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let registry = ProductionRegistry::open(MemoryStore::new()).unwrap();
        assert!(matches!(
            registry.get("nope"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_list_keeps_registration_order() {
        let mut registry = ProductionRegistry::open(MemoryStore::new()).unwrap();
        for code in ["C", "A", "B"] {
            registry.register(sample(code)).unwrap();
        }
        let codes: Vec<_> = registry.list().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_update_applies_only_given_fields() {
        let mut registry = registry_with("AC1", &[]);
        registry
            .update(
                "AC1",
                AircraftUpdate {
                    model: Some("E195-E2".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let aircraft = registry.get("AC1").unwrap();
        assert_eq!(aircraft.model, "E195-E2");
        assert_eq!(aircraft.capacity, 120);
        assert!(matches!(
            registry.update("AC9", AircraftUpdate::default()),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_removes_from_storage() {
        let mut registry = registry_with("AC1", &[]);
        registry.register(sample("AC2")).unwrap();
        registry.delete("AC1").unwrap();

        assert!(registry.get("AC1").is_err());
        assert_eq!(registry.store().lines(AIRCRAFT_FILE).len(), 1);
        assert!(matches!(
            registry.delete("AC1"),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_part_crud_and_index_bounds() {
        let mut registry = registry_with("AC1", &[]);
        registry
            .add_part("AC1", Part::new("Wing", PartCategory::National, "Acme"))
            .unwrap();
        registry
            .add_part("AC1", Part::new("Engine", PartCategory::Imported, "Turbo"))
            .unwrap();

        registry
            .set_part_status("AC1", 1, PartStatus::Installed)
            .unwrap();
        assert_eq!(registry.part("AC1", 1).unwrap().status, PartStatus::Installed);

        let removed = registry.delete_part("AC1", 0).unwrap();
        assert_eq!(removed.name, "Wing");
        assert_eq!(registry.part("AC1", 0).unwrap().name, "Engine");

        assert!(matches!(
            registry.delete_part("AC1", 1),
            Err(RegistryError::InvalidIndex {
                kind: ChildKind::Part,
                index: 1,
                len: 1,
                ..
            })
        ));
        assert!(matches!(
            registry.add_part("AC9", Part::new("x", PartCategory::National, "y")),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_empty_pipeline_index_zero_is_invalid() {
        let mut registry = registry_with("AC1", &[]);
        assert!(matches!(
            registry.advance("AC1", 0),
            Err(RegistryError::InvalidIndex { .. })
        ));
        assert!(matches!(
            registry.complete("AC1", 0),
            Err(RegistryError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_scenario_assembly_then_paint() {
        let mut registry = registry_with("AC1", &["Assembly", "Paint"]);

        assert!(matches!(
            registry.advance("AC1", 1),
            Err(RegistryError::PreviousStageIncomplete { .. })
        ));

        registry.complete("AC1", 0).unwrap();
        assert_eq!(registry.stage("AC1", 0).unwrap().status, StageStatus::Done);

        registry.advance("AC1", 1).unwrap();
        assert_eq!(
            registry.stage("AC1", 1).unwrap().status,
            StageStatus::InProgress
        );

        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Electrical, TestOutcome::Rejected),
            )
            .unwrap();
        assert!(matches!(
            registry.complete("AC1", 1),
            Err(RegistryError::FailedTestsPending { .. })
        ));
        assert_eq!(
            registry.stage("AC1", 1).unwrap().status,
            StageStatus::InProgress
        );

        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Electrical, TestOutcome::Approved),
            )
            .unwrap();
        registry.complete("AC1", 1).unwrap();
        assert_eq!(registry.stage("AC1", 1).unwrap().status, StageStatus::Done);
    }

    #[test]
    fn test_failed_gate_does_not_persist() {
        let mut registry = registry_with("AC1", &["Assembly"]);
        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Hydraulic, TestOutcome::Rejected),
            )
            .unwrap();
        let before = registry.store().lines(AIRCRAFT_FILE);

        assert!(registry.complete("AC1", 0).is_err());
        assert_eq!(registry.store().lines(AIRCRAFT_FILE), before);
    }

    #[test]
    fn test_editing_test_history_changes_gate() {
        let mut registry = registry_with("AC1", &["Assembly"]);
        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Hydraulic, TestOutcome::Rejected),
            )
            .unwrap();
        assert!(!registry.release_readiness("AC1").unwrap().is_clear());

        registry
            .update_test(
                "AC1",
                0,
                TestUpdate {
                    outcome: Some(TestOutcome::Approved),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(registry.release_readiness("AC1").unwrap().is_clear());

        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Aerodynamic, TestOutcome::Rejected),
            )
            .unwrap();
        registry.delete_test("AC1", 1).unwrap();
        registry.complete("AC1", 0).unwrap();
        assert!(matches!(
            registry.test("AC1", 1),
            Err(RegistryError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_assign_twice_is_noop() {
        let mut registry = registry_with("AC1", &["Assembly"]);
        assert!(registry.assign("AC1", 0, "EMP-1").unwrap());
        assert!(!registry.assign("AC1", 0, "EMP-1").unwrap());
        assert_eq!(registry.stage("AC1", 0).unwrap().employees.len(), 1);
        assert!(matches!(
            registry.assign("AC1", 5, "EMP-1"),
            Err(RegistryError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn test_locate_by_index_and_id() {
        let mut registry = registry_with("AC1", &["Assembly", "Paint"]);
        let paint_id = registry.stage("AC1", 1).unwrap().id.clone();

        assert_eq!(
            registry
                .locate("AC1", ChildKind::Stage, &Selector::Id(paint_id.clone()))
                .unwrap(),
            1
        );
        assert!(matches!(
            registry.locate("AC1", ChildKind::Stage, &Selector::Index(2)),
            Err(RegistryError::InvalidIndex { .. })
        ));

        registry
            .add_part("AC1", Part::new("Wing", PartCategory::National, "Acme"))
            .unwrap();
        assert!(matches!(
            registry.locate("AC1", ChildKind::Part, &Selector::Id(paint_id)),
            Err(RegistryError::UnknownChild { .. })
        ));
    }

    #[test]
    fn test_failed_persist_rolls_back() {
        let mut registry = ProductionRegistry::open(FailingRewrites::default()).unwrap();
        registry.register(sample("AC1")).unwrap();

        let err = registry
            .add_stage("AC1", Stage::new("Assembly", 10))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert!(registry.get("AC1").unwrap().stages.is_empty());

        assert!(registry.delete("AC1").is_err());
        assert!(registry.get("AC1").is_ok());
    }

    #[test]
    fn test_reload_reproduces_collection() {
        let dir = tempdir().unwrap();
        let mut registry = ProductionRegistry::open(FileStore::new(dir.path())).unwrap();
        registry.register(sample("AC1")).unwrap();
        registry
            .add_part("AC1", Part::new("Wing", PartCategory::National, "Acme"))
            .unwrap();
        registry.add_stage("AC1", Stage::new("Assembly", 30)).unwrap();
        registry.assign("AC1", 0, "EMP-2").unwrap();
        registry.assign("AC1", 0, "EMP-1").unwrap();
        registry.advance("AC1", 0).unwrap();
        registry
            .register_test(
                "AC1",
                QualityTest::new(TestKind::Electrical, TestOutcome::Approved),
            )
            .unwrap();
        registry.register(sample("AC2")).unwrap();

        let reloaded = ProductionRegistry::open(FileStore::new(dir.path())).unwrap();
        assert_eq!(reloaded.skipped_records(), 0);
        assert_eq!(reloaded.get("AC1").unwrap(), registry.get("AC1").unwrap());
        assert_eq!(reloaded.get("AC2").unwrap(), registry.get("AC2").unwrap());
        let codes: Vec<_> = reloaded.list().map(|a| a.code.clone()).collect();
        assert_eq!(codes, vec!["AC1", "AC2"]);
    }

    #[test]
    fn test_corrupted_lines_are_counted() {
        let good = serde_json::to_string(&sample("AC1")).unwrap();
        let store = MemoryStore::new().with_lines(
            AIRCRAFT_FILE,
            &[good.as_str(), "{broken", good.as_str()],
        );
        let registry = ProductionRegistry::open(store).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.skipped_records(), 2);
    }

    #[test]
    fn test_generated_child_ids_survive_reopen() {
        let dir = tempdir().unwrap();
        let legacy = r#"{"code":"AC1","model":"E195","category":"commercial","capacity":120,"range_km":4000,"stages":[{"name":"Assembly","deadline_days":30}]}"#;
        std::fs::write(
            dir.path().join(AIRCRAFT_FILE),
            format!("{}\n{{broken\n", legacy),
        )
        .unwrap();

        let first = ProductionRegistry::open(FileStore::new(dir.path())).unwrap();
        let id = first.stage("AC1", 0).unwrap().id.clone();
        assert_eq!(first.skipped_records(), 1);

        let second = ProductionRegistry::open(FileStore::new(dir.path())).unwrap();
        assert_eq!(second.stage("AC1", 0).unwrap().id, id);
        assert_eq!(second.skipped_records(), 1);

        let content = std::fs::read_to_string(dir.path().join(AIRCRAFT_FILE)).unwrap();
        assert!(content.contains(&id.to_string()));
        assert!(content.lines().any(|l| l == "{broken"));
    }
}
