//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the fund
//! registry test suite.
//!
//! # Modules
//!
//! - `fixtures`: known-valid CNPJs and ready-made funds and reports
//! - `builders`: builder for fund payloads with sensible defaults
//! - `database`: PostgreSQL test container management
//! - `assertions`: assertion helpers for field-keyed errors
//! - `generators`: property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
