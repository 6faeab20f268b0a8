//! Genealogy domain model.
//!
//! # Responsibility
//! - Define the person record exchanged with the store and snapshots.
//! - Keep birth-date parsing and ordering rules in one place.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId`.
//! - Deletion is represented by soft-delete flags, not hard delete.

pub mod person;
