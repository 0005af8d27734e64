//! Database error types
//!
//! This module defines the errors raised by the repositories and their
//! translation into the port errors seen by the domain.

use thiserror::Error;

use core_kernel::PortError;
use domain_fundo::fields;
use domain_fundo::validation::messages;

/// Unique constraint on the fund CNPJ
pub const FUNDO_CNPJ_UNIQUE: &str = "fundos_st_cnpj_fundo_key";

/// Check constraint tying the master code to the master CNPJ
pub const FUNDO_MASTER_CHECK: &str = "fundos_master_requires_cnpj";

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique constraint violation
    #[error("Duplicate entry: {message}")]
    DuplicateEntry {
        constraint: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {message}")]
    ConstraintViolation {
        constraint: Option<String>,
        message: String,
    },

    /// Migration error
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Any other SQLx error
    #[error("SQL error: {0}")]
    Sql(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    ///
    /// # Example
    ///
    /// ```rust
    /// use infra_db::DatabaseError;
    ///
    /// let error = DatabaseError::not_found("Fundo", 42);
    /// assert!(error.to_string().contains("Fundo"));
    /// ```
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

/// Maps SQLx errors by PostgreSQL error code
///
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                let constraint = db_err.constraint().map(str::to_string);
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateEntry { constraint, message },
                    Some("23503") => DatabaseError::ForeignKeyViolation(message),
                    Some("23514") => DatabaseError::ConstraintViolation { constraint, message },
                    _ => DatabaseError::QueryFailed(message),
                }
            }
            other => DatabaseError::Sql(other),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(error.to_string())
    }
}

/// Translates database errors into port errors
///
/// Constraint violations that correspond to a fund field are reported
/// against that field.
impl From<DatabaseError> for PortError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
            DatabaseError::DuplicateEntry { constraint, message } => {
                if constraint.as_deref() == Some(FUNDO_CNPJ_UNIQUE) {
                    PortError::conflict_field(messages::CNPJ_TAKEN, fields::ST_CNPJ_FUNDO)
                } else {
                    PortError::conflict(message)
                }
            }
            DatabaseError::ConstraintViolation { constraint, message } => {
                if constraint.as_deref() == Some(FUNDO_MASTER_CHECK) {
                    PortError::validation_field(
                        messages::MASTER_CNPJ_REQUIRED,
                        fields::ST_CNPJ_FUNDOMASTER,
                    )
                } else {
                    PortError::validation(message)
                }
            }
            DatabaseError::ForeignKeyViolation(message) => {
                PortError::validation_field(message, fields::RELATORIOS_IDS)
            }
            DatabaseError::ConnectionFailed(message) => PortError::connection(message),
            DatabaseError::PoolExhausted => PortError::connection("Connection pool exhausted"),
            other => PortError::Internal {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
