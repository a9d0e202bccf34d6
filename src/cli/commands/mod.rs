//! CLI command implementations

pub mod utils;

pub mod aircraft;
pub mod completions;
pub mod init;
pub mod part;
pub mod report;
pub mod stage;
pub mod status;
pub mod team;
pub mod test;
