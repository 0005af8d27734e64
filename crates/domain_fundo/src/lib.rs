//! Fund Registry Domain
//!
//! This crate holds the fund ("Fundo") and report ("Relatório") model, the
//! rules every write must satisfy, and the ports through which storage is
//! reached.
//!
//! # Key Concepts
//!
//! - **Fundo**: an investment fund identified by its CNPJ
//! - **Relatorio**: a report type a fund can produce; only active reports
//!   can be linked or listed
//! - **FundoRelatorio**: the link between a fund and a report, written as a
//!   whole set (replace, never merge)
//! - **Fundo master**: a soft reference to a parent fund through a free-form
//!   code and CNPJ, never checked against other fund rows
//!
//! # Layers
//!
//! - [`fundo`] / [`relatorio`]: entities and their invariants
//! - [`validation`]: field-keyed error collection
//! - [`query`]: listing filters
//! - [`ports`]: storage traits (and an in-memory store with the `mock` feature)
//! - [`service`]: the write path (uniqueness, active-report and link rules)

pub mod fundo;
pub mod relatorio;
pub mod validation;
pub mod query;
pub mod ports;
pub mod service;
pub mod error;

pub use fundo::{Fundo, NewFundo, FundoChanges, FundoDetail, FundoSummary};
pub use relatorio::{Relatorio, NewRelatorio, FundoRelatorio};
pub use validation::{FieldErrors, fields};
pub use query::{FundoFilter, RelatorioFilter};
pub use ports::{FundoPort, RelatorioPort, UpsertOutcome};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::MockFundoStore;
pub use service::{FundoService, UpdateMode};
pub use error::FundoError;
