//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the fund registry using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`]: SQL access to `fundos`, `relatorios` and
//!   `fundo_relatorios`, returning row types
//! - [`adapters`]: implementations of the domain ports on top of the
//!   repositories
//!
//! The schema lives in the workspace `migrations/` directory and is embedded
//! with [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, run_migrations};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/fundos")).await?;
//! run_migrations(&pool).await?;
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, run_migrations};
pub use error::DatabaseError;
pub use adapters::{PostgresFundoAdapter, PostgresRelatorioAdapter};
