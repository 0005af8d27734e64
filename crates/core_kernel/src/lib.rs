//! Core Kernel - Foundational types for the fund registry
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for funds and reports
//! - The CNPJ (Brazilian legal-entity tax id) validator and formatter
//! - Port infrastructure used by domain ports and their adapters

pub mod cnpj;
pub mod identifiers;
pub mod error;
pub mod ports;

pub use cnpj::{
    is_valid_cnpj, is_formatted_cnpj, format_cnpj, normalize_cnpj, cnpj_digits, complete_cnpj,
    CNPJ_LENGTH,
};
pub use identifiers::{FundoId, RelatorioId};
pub use error::CoreError;
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
