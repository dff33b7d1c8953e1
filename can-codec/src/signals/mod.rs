//! Layout database and DBC parser
//!
//! This module turns signal definition files into message layouts and keeps
//! them in one registry.

pub mod database;
pub mod dbc;

// Re-export key types for convenience
pub use database::{DatabaseStats, LayoutDatabase};
