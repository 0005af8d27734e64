//! Import error types

use std::path::PathBuf;

use thiserror::Error;

use core_kernel::CoreError;
use domain_fundo::FundoError;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Fundo(#[from] FundoError),

    #[error("Invalid value for {column}: {value:?}")]
    InvalidValue { column: &'static str, value: String },

    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("Row is not valid UTF-8: {0}")]
    Encoding(#[from] csv::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ImportError>;
