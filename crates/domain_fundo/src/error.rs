//! Fund domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::validation::FieldErrors;

/// Errors that can occur in the fund domain
#[derive(Debug, Error)]
pub enum FundoError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(PortError),
}

impl FundoError {
    /// Returns the field errors if this is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FundoError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for FundoError {
    fn from(errors: FieldErrors) -> Self {
        FundoError::Validation(errors)
    }
}

/// Unique-key conflicts carrying a field become field errors, so a race
/// lost to the database constraint reports the same payload as the
/// up-front check.
impl From<PortError> for FundoError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => {
                FundoError::NotFound(format!("{} with id {}", entity_type, id))
            }
            PortError::Conflict { message, field: Some(field) }
            | PortError::Validation { message, field: Some(field) } => {
                FundoError::Validation(FieldErrors::single(field, message))
            }
            other => FundoError::Storage(other),
        }
    }
}
