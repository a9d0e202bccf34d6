//! Record type definitions
//!
//! - [`Aircraft`] - the tracked unit, owning the sequences below
//! - [`Part`] - components attached to an aircraft
//! - [`Stage`] - ordered production pipeline steps
//! - [`QualityTest`] - recorded test outcomes used by the release gate
//! - [`Employee`] - identities with permission levels

pub mod aircraft;
pub mod employee;
pub mod part;
pub mod stage;
pub mod test;

pub use aircraft::{Aircraft, AircraftCategory, AircraftUpdate};
pub use employee::{Employee, EmployeeUpdate, PermissionLevel};
pub use part::{Part, PartCategory, PartStatus, PartUpdate};
pub use stage::{Stage, StageStatus};
pub use test::{QualityTest, TestKind, TestOutcome, TestUpdate};
