//! Error types for the SQL engine

use thiserror::Error;

use crate::data_type::DataType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    // Lexical errors
    #[error("character {ch:?} is not supported at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },

    #[error("unterminated string starting at position {pos}")]
    UnterminatedString { pos: usize },

    #[error("malformed number {literal:?} at position {pos}")]
    MalformedNumber { literal: String, pos: usize },

    // Syntax errors
    #[error("expected {expected}, found {found} at position {pos}")]
    UnexpectedToken {
        expected: String,
        found: String,
        pos: usize,
    },

    // Semantic errors
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("column '{column}' does not exist in table '{table}'")]
    ColumnNotFound { column: String, table: String },

    #[error("column '{column}' expects {expected}, got {found}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: &'static str,
    },

    #[error("value for '{column}' exceeds maximum length of {size}")]
    LengthExceeded { column: String, size: usize },

    #[error("column '{0}' not found in row")]
    ColumnNotInRow(String),

    #[error("cannot compare {left} with {right}")]
    IncomparableTypes {
        left: &'static str,
        right: &'static str,
    },

    #[error("INSERT names {columns} columns but provides {values} values")]
    InsertArityMismatch { columns: usize, values: usize },

    // Storage errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid table record: {0}")]
    Serialization(#[from] serde_json::Error),
}
