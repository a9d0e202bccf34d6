//! Stage progression and release gating
//!
//! Stages move `pending -> in_progress -> done` in pipeline order. Starting a
//! stage requires its predecessor to be done; completing the final stage is
//! gated on the latest outcome of every test kind recorded for the aircraft.

use indexmap::IndexMap;

use crate::core::registry::{ChildKind, RegistryError};
use crate::entities::aircraft::Aircraft;
use crate::entities::stage::{Stage, StageStatus};
use crate::entities::test::{QualityTest, TestKind, TestOutcome};

/// Get allowed forward transitions from the current status
pub fn allowed_transitions(current: StageStatus) -> Vec<StageStatus> {
    match current {
        StageStatus::Pending => vec![StageStatus::InProgress],
        StageStatus::InProgress => vec![StageStatus::Done],
        StageStatus::Done => vec![],
    }
}

/// First stage of the pipeline that is not done yet
pub fn current_stage(stages: &[Stage]) -> Option<(usize, &Stage)> {
    stages.iter().enumerate().find(|(_, s)| !s.is_done())
}

/// Whether the predecessor rule lets the stage at `index` start
pub fn can_start(stages: &[Stage], index: usize) -> bool {
    match index {
        0 => !stages.is_empty(),
        i if i < stages.len() => stages[i - 1].is_done(),
        _ => false,
    }
}

/// Start the stage at `index`, returning its previous status
///
/// Stage 0 has no predecessor gate. Any later stage requires the one
/// before it to be done. The target's own status is not checked, so a
/// done stage can be started again.
pub fn start_stage(aircraft: &mut Aircraft, index: usize) -> Result<StageStatus, RegistryError> {
    let len = aircraft.stages.len();
    if index >= len {
        return Err(RegistryError::InvalidIndex {
            code: aircraft.code.clone(),
            kind: ChildKind::Stage,
            index,
            len,
        });
    }

    if index > 0 {
        let prev = &aircraft.stages[index - 1];
        if !prev.is_done() {
            return Err(RegistryError::PreviousStageIncomplete {
                code: aircraft.code.clone(),
                index,
                previous: prev.name.clone(),
                previous_status: prev.status,
            });
        }
    }

    let stage = &mut aircraft.stages[index];
    let before = stage.status;
    stage.status = StageStatus::InProgress;

    tracing::info!(
        aircraft = %aircraft.code,
        stage = index,
        name = %stage.name,
        from = %before,
        to = %stage.status,
        "stage started"
    );
    Ok(before)
}

/// Complete the stage at `index`, returning its previous status
///
/// Completing the final stage is refused while the latest outcome of any
/// test kind is rejected. The aircraft is left untouched on refusal.
pub fn complete_stage(aircraft: &mut Aircraft, index: usize) -> Result<StageStatus, RegistryError> {
    let len = aircraft.stages.len();
    if index >= len {
        return Err(RegistryError::InvalidIndex {
            code: aircraft.code.clone(),
            kind: ChildKind::Stage,
            index,
            len,
        });
    }

    if index == len - 1 {
        let gate = release_gate(&aircraft.tests);
        if !gate.is_clear() {
            tracing::warn!(
                aircraft = %aircraft.code,
                stage = index,
                blocking = ?gate.blocking,
                "final stage completion refused"
            );
            return Err(RegistryError::FailedTestsPending {
                code: aircraft.code.clone(),
                kinds: gate.blocking,
            });
        }
    }

    let stage = &mut aircraft.stages[index];
    let before = stage.status;
    stage.status = StageStatus::Done;

    tracing::info!(
        aircraft = %aircraft.code,
        stage = index,
        name = %stage.name,
        from = %before,
        to = %stage.status,
        "stage completed"
    );
    Ok(before)
}

/// Add an employee to a stage; returns false when already assigned
pub fn assign_employee(
    aircraft: &mut Aircraft,
    index: usize,
    employee_id: &str,
) -> Result<bool, RegistryError> {
    let len = aircraft.stages.len();
    let Some(stage) = aircraft.stages.get_mut(index) else {
        return Err(RegistryError::InvalidIndex {
            code: aircraft.code.clone(),
            kind: ChildKind::Stage,
            index,
            len,
        });
    };

    let added = stage.employees.insert(employee_id.to_string());
    if added {
        tracing::info!(aircraft = %aircraft.code, stage = index, employee = employee_id, "employee assigned");
    }
    Ok(added)
}

/// Reduce a test history to one outcome per kind; later records win
pub fn latest_outcomes(tests: &[QualityTest]) -> IndexMap<TestKind, TestOutcome> {
    let mut latest = IndexMap::new();
    for test in tests {
        latest.insert(test.kind, test.outcome);
    }
    latest
}

/// Result of evaluating the release gate
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseGate {
    /// Latest outcome per kind, in first-seen order
    pub latest: IndexMap<TestKind, TestOutcome>,
    /// Kinds whose latest outcome is rejected
    pub blocking: Vec<TestKind>,
}

impl ReleaseGate {
    pub fn is_clear(&self) -> bool {
        self.blocking.is_empty()
    }
}

/// Evaluate the release gate over a test history
///
/// Kinds without any record and kinds whose latest record is approved never block.
pub fn release_gate(tests: &[QualityTest]) -> ReleaseGate {
    let latest = latest_outcomes(tests);
    let blocking = latest
        .iter()
        .filter(|(_, outcome)| **outcome == TestOutcome::Rejected)
        .map(|(kind, _)| *kind)
        .collect();
    ReleaseGate { latest, blocking }
}
