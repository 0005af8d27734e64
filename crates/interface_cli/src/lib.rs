//! CSV Bulk Import
//!
//! Loads fund rows from a CSV file into the registry through
//! [`domain_fundo::FundoService`], so imported rows obey the same rules as
//! API writes.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_cli::{ImportConfig, Importer};
//!
//! let importer = Importer::new(service, ImportConfig::load("config/import.toml")?);
//! let report = importer.run(Path::new("fundos.csv")).await?;
//! println!("{}", report);
//! ```

pub mod config;
pub mod error;
pub mod importer;
pub mod logger;
pub mod row;

pub use config::{CliConfig, ImportConfig};
pub use error::ImportError;
pub use importer::{ImportReport, Importer};
pub use row::FundoRow;
