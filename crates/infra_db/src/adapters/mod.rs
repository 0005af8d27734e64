//! Domain Adapters
//!
//! Implementations of the fund domain ports backed by PostgreSQL.

pub mod fundo;

pub use fundo::{PostgresFundoAdapter, PostgresRelatorioAdapter};
