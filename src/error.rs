//! This module defines all error types used throughout the application.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed input data (unparseable date, missing column or field)
    #[error("Data format error at row {}: {message}", display_row(.row))]
    DataFormat { row: Option<usize>, message: String },

    /// A node's metadata lookup key is absent from the state metadata table
    #[error("Unknown state '{lookup_key}' for node '{node}': add it to the state metadata table")]
    UnknownState { node: String, lookup_key: String },

    /// A node key string that does not follow `tokens-bucket`
    #[error("Invalid node key: {0}")]
    InvalidNodeKey(String),

    /// Parser errors
    #[error("Parser error: {0}")]
    Parser(String),

    /// Configuration file parsing errors
    #[error("Configuration parse error in {file:?}: {message}")]
    ConfigParse { file: PathBuf, message: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn display_row(row: &Option<usize>) -> String {
    row.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string())
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a data format error for a given (1-based) data row
    pub fn data_format(row: Option<usize>, msg: impl Into<String>) -> Self {
        Self::DataFormat {
            row,
            message: msg.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors caused by the input data rather than the environment
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::DataFormat { .. } | Error::UnknownState { .. } | Error::InvalidNodeKey(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse {
            file: PathBuf::from("unknown"),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parser(format!("JSON error: {}", err))
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}
