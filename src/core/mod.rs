//! Core module - fundamental types and services

pub mod config;
pub mod entity;
pub mod identity;
pub mod logging;
pub mod project;
pub mod registry;
pub mod report;
pub mod store;
pub mod team;
pub mod workflow;

pub use config::Config;
pub use entity::Record;
pub use identity::{EntityId, EntityPrefix, IdParseError, Selector};
pub use project::{Project, ProjectError};
pub use registry::{ChildKind, ProductionRegistry, RegistryError};
pub use report::{render_report, write_report, ReportError};
pub use store::{FileStore, MemoryStore, RecordStore, StoreError};
pub use team::{TeamError, TeamRoster};
pub use workflow::ReleaseGate;
