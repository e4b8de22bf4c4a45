//! Core business logic - framework-agnostic operations over the portal store.
//!
//! Every function here takes a database connection and returns the crate
//! `Result`; none of them know about HTTP.

/// Guideline knowledge base: create, replace, list, search
pub mod guideline;
/// Maintenance registry: routine records, fault reports, resolution
pub mod maintenance;
/// Catalog and announcement seeding for a fresh database
pub mod seed;
/// Key/value settings and the announcement ticker
pub mod settings;
/// Per-device health derived from maintenance entries
pub mod status;
/// Shift notes
pub mod work_log;
