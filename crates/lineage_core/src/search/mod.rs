//! Member search entry points.
//!
//! # Responsibility
//! - Filter laid-out members by name, generation and birth date range.
//! - Keep result ordering identical to node order.

pub mod filter;
