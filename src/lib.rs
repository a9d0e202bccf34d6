//! Hangar: aircraft production tracker
//!
//! Tracks aircraft through production: their parts, an ordered pipeline of
//! stages, and the quality tests that gate final release. Records live in
//! line-delimited JSON files inside a project directory.

pub mod cli;
pub mod core;
pub mod entities;
